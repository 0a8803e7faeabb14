//! HTTP Basic authentication for the Vendus API.
//!
//! Vendus authenticates with the API key as the Basic user name and an empty
//! password.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

pub const AUTHORIZATION: &str = "Authorization";

/// Static Basic credential derived from an API key.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    api_key: String,
}

impl BasicAuth {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// `base64(api_key + ":")`.
    pub fn token(&self) -> String {
        STANDARD.encode(format!("{}:", self.api_key))
    }

    /// The single `Authorization` header carrying the credential.
    pub fn header(&self) -> (String, String) {
        (AUTHORIZATION.to_string(), format!("Basic {}", self.token()))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth").field("api_key", &"<redacted>").finish()
    }
}
