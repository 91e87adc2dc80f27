use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use querydesk::api::create_router;
use querydesk::client::ApiClient;
use querydesk::config::Config;
use querydesk::controller::{QueryController, SUBMIT_KEY};
use querydesk::data_models::AuthOutcome;
use querydesk::forms::{LoginForm, RegistrationForm};
use querydesk::location::Location;
use querydesk::renderer::render;
use querydesk::sanitize::HtmlEscaper;
use querydesk::store::PageStore;

#[derive(Parser)]
#[command(name = "querydesk", about = "Search page client and demo search endpoint")]
struct Cli {
    /// Backend base url, overrides BACKEND_URL
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the demo search endpoint
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// JSON file with the pages to serve, overrides PAGES_FILE
        #[arg(long)]
        pages: Option<PathBuf>,
    },
    /// Run a single search and print the results
    Search {
        query: String,
        #[arg(long)]
        language: Option<String>,
        /// Print the rendered markup instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Load a search page url, searching for its `q` parameter
    Open { url: String },
    /// Type queries line by line into the search box
    Interactive {
        #[arg(long, default_value = "http://localhost/search")]
        url: String,
    },
    /// Log in with a username and password
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password2: String,
    },
    /// End the current session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }

    match cli.command {
        Command::Serve { bind, pages } => {
            let bind = bind.unwrap_or_else(|| config.bind_addr.clone());
            let store = match pages.or_else(|| config.pages_file.clone()) {
                Some(path) => PageStore::load(&path).await?,
                None => PageStore::demo(),
            };
            serve(&bind, store).await
        }
        Command::Search {
            query,
            language,
            html,
        } => {
            let client = ApiClient::from_config(&config)?;
            let language = language.unwrap_or_else(|| config.language.clone());
            let response = client.search(&query, &language).await;
            if html {
                println!("{}", render(&response.search_results, &HtmlEscaper).to_html());
            } else if response.search_results.is_empty() {
                println!("No results found.");
            } else {
                for result in &response.search_results {
                    println!("{}\n  {}\n  {}\n", result.title, result.url, result.description);
                }
            }
            Ok(())
        }
        Command::Open { url } => {
            let client = ApiClient::from_config(&config)?;
            let controller = QueryController::new(client, Location::parse(&url)?, &config.language);
            controller.page_load().await;
            println!("{}", controller.state().to_html());
            Ok(())
        }
        Command::Interactive { url } => {
            let client = ApiClient::from_config(&config)?;
            let controller = QueryController::new(client, Location::parse(&url)?, &config.language);
            controller.page_load().await;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                controller.set_input(&line);
                controller.key_press(SUBMIT_KEY).await;
                println!("{}", controller.location().as_str());
                println!("{}", controller.state().to_html());
            }
            Ok(())
        }
        Command::Login { username, password } => {
            let form = LoginForm::new(&username, &password)?;
            let client = ApiClient::from_config(&config)?;
            report(client.login(&form).await)
        }
        Command::Register {
            username,
            email,
            password,
            password2,
        } => {
            let form = RegistrationForm::new(&username, &email, &password, &password2)?;
            let client = ApiClient::from_config(&config)?;
            report(client.register(&form).await)
        }
        Command::Logout => {
            let client = ApiClient::from_config(&config)?;
            report(client.logout().await)
        }
    }
}

async fn serve(bind: &str, store: PageStore) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("serving {} pages on {}", store.len(), listener.local_addr()?);
    axum::serve(listener, create_router(Arc::new(store))).await?;
    Ok(())
}

fn report(outcome: AuthOutcome) -> Result<()> {
    if outcome.success {
        println!("{}", outcome.message.as_deref().unwrap_or("ok"));
        Ok(())
    } else {
        anyhow::bail!("{}", outcome.error.as_deref().unwrap_or("request failed"))
    }
}
