use std::cell::{Cell, Ref, RefCell};

use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::{debug, info};

use crate::client::SearchTransport;
use crate::data_models::SearchQuery;
use crate::location::{Location, QUERY_PARAM};
use crate::renderer::{self, RenderedResults};
use crate::sanitize::{HtmlEscaper, Sanitizer};

pub const SUBMIT_KEY: &str = "Enter";
pub const LOADING_HTML: &str = "<p>Searching...</p>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Loading {
        query: String,
    },
    Displayed {
        query: String,
        results: RenderedResults,
    },
}

impl SearchState {
    pub fn to_html(&self) -> String {
        match self {
            SearchState::Idle => String::new(),
            SearchState::Loading { .. } => LOADING_HTML.to_string(),
            SearchState::Displayed { results, .. } => results.to_html(),
        }
    }
}

/// What became of one submission once its continuation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing to search for; no request was made.
    Skipped,
    /// The response was rendered.
    Applied,
    /// A newer submission was made while this one was in flight.
    Discarded,
}

struct Ticket {
    seq: u64,
    query: SearchQuery,
}

/// Drives the search page: owns the input box, the address bar and what is
/// currently displayed. Meant for a single task; overlapping searches are
/// interleaved, never parallel.
///
/// Each event handler does its synchronous work (read the input, rewrite
/// the address bar, mark the page as loading) as soon as it is called and
/// hands back a future for the network continuation. Only the continuation
/// of the most recently submitted search may write the results.
pub struct QueryController<T, S = HtmlEscaper> {
    transport: T,
    sanitizer: S,
    language: String,
    location: RefCell<Location>,
    input: RefCell<String>,
    state: RefCell<SearchState>,
    latest: Cell<u64>,
}

impl<T: SearchTransport> QueryController<T, HtmlEscaper> {
    pub fn new(transport: T, location: Location, language: &str) -> Self {
        QueryController::with_sanitizer(transport, HtmlEscaper, location, language)
    }
}

impl<T: SearchTransport, S: Sanitizer> QueryController<T, S> {
    pub fn with_sanitizer(transport: T, sanitizer: S, location: Location, language: &str) -> Self {
        QueryController {
            transport,
            sanitizer,
            language: language.to_string(),
            location: RefCell::new(location),
            input: RefCell::new(String::new()),
            state: RefCell::new(SearchState::Idle),
            latest: Cell::new(0),
        }
    }

    pub fn state(&self) -> Ref<'_, SearchState> {
        self.state.borrow()
    }

    pub fn location(&self) -> Ref<'_, Location> {
        self.location.borrow()
    }

    pub fn input(&self) -> String {
        self.input.borrow().clone()
    }

    /// Typing into the search box.
    pub fn set_input(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
    }

    /// Searches for the `q` parameter of the current address, if there is
    /// one, and fills the search box with it. The address is left as is.
    pub fn page_load(&self) -> LocalBoxFuture<'_, SearchOutcome> {
        let param = self.location.borrow().query_param(QUERY_PARAM);
        let Some(query) = param
            .as_deref()
            .and_then(|q| SearchQuery::new(q, &self.language))
        else {
            debug!("no query in address, staying idle");
            return future::ready(SearchOutcome::Skipped).boxed_local();
        };

        if let Some(raw) = param {
            self.set_input(&raw);
        }
        let ticket = self.issue(query);
        self.complete(ticket).boxed_local()
    }

    pub fn key_press(&self, key: &str) -> LocalBoxFuture<'_, SearchOutcome> {
        if key != SUBMIT_KEY {
            return future::ready(SearchOutcome::Skipped).boxed_local();
        }
        self.submit()
    }

    /// The search button.
    pub fn click(&self) -> LocalBoxFuture<'_, SearchOutcome> {
        self.submit()
    }

    /// Submits whatever is in the search box. Blank input changes nothing.
    pub fn submit(&self) -> LocalBoxFuture<'_, SearchOutcome> {
        let Some(query) = SearchQuery::new(&self.input.borrow(), &self.language) else {
            return future::ready(SearchOutcome::Skipped).boxed_local();
        };

        self.location
            .borrow_mut()
            .replace_query_param(QUERY_PARAM, query.text());
        let ticket = self.issue(query);
        self.complete(ticket).boxed_local()
    }

    fn issue(&self, query: SearchQuery) -> Ticket {
        let seq = self.latest.get() + 1;
        self.latest.set(seq);
        info!(query = query.text(), seq, "searching");
        *self.state.borrow_mut() = SearchState::Loading {
            query: query.text().to_string(),
        };
        Ticket { seq, query }
    }

    async fn complete(&self, ticket: Ticket) -> SearchOutcome {
        let response = self.transport.send(&ticket.query).await;

        if ticket.seq != self.latest.get() {
            debug!(
                query = ticket.query.text(),
                seq = ticket.seq,
                latest = self.latest.get(),
                "discarding stale search response"
            );
            return SearchOutcome::Discarded;
        }

        let results = renderer::render(&response.search_results, &self.sanitizer);
        *self.state.borrow_mut() = SearchState::Displayed {
            query: ticket.query.text().to_string(),
            results,
        };
        SearchOutcome::Applied
    }
}
