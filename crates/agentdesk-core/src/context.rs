use serde::{Deserialize, Serialize};

/// Identity already verified by the caller (session layer, CLI flag, etc.).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Per-request context handed to actions explicitly instead of being resolved globally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// User id of the verified identity; blank ids count as unauthenticated.
    pub fn user_id(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.user_id.as_str())
            .filter(|id| !id.trim().is_empty())
    }
}

impl From<Option<Identity>> for RequestContext {
    fn from(identity: Option<Identity>) -> Self {
        Self { identity }
    }
}
