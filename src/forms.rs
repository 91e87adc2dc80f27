use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter both username and password.")]
    MissingCredentials,

    #[error("You have to enter a username")]
    MissingUsername,

    #[error("You have to enter a valid email address")]
    InvalidEmail,

    #[error("You have to enter a password")]
    MissingPassword,

    #[error("The two passwords do not match")]
    PasswordMismatch,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    username: String,
    password: String,
}

impl LoginForm {
    /// The username is trimmed; the password is taken as typed.
    pub fn new(username: &str, password: &str) -> Result<LoginForm, FormError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    username: String,
    email: String,
    password: String,
    password2: String,
}

impl RegistrationForm {
    /// Checks run in form order and the first failure wins.
    pub fn new(
        username: &str,
        email: &str,
        password: &str,
        password2: &str,
    ) -> Result<RegistrationForm, FormError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(FormError::MissingUsername);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(FormError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        if password != password2 {
            return Err(FormError::PasswordMismatch);
        }

        Ok(RegistrationForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: password2.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
