//! Identity of the server under test.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The target server: its logical name and the network root of its platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerIdentity {
    /// Logical server name, as registered on the platform.
    pub name: String,
    /// Root URL of the platform hosting the server, e.g. `https://localhost:9443`.
    pub root_url: String,
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>, root_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_url: root_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.root_url)
    }
}
