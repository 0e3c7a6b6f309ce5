use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable failure codes surfaced in the result envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionErrorCode {
    /// No verified identity on the request.
    Unauthorized,
    /// The authenticated user owns no wallet record.
    WalletNotFound,
    /// A collaborator failed; the cause is logged, never returned.
    UnexpectedError,
}

impl ActionErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionErrorCode::Unauthorized => "UNAUTHORIZED",
            ActionErrorCode::WalletNotFound => "WALLET_NOT_FOUND",
            ActionErrorCode::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

impl fmt::Display for ActionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform `{ success, data?, error? }` envelope returned by validated actions.
///
/// Fields are private so the envelope can only be built through
/// [`ActionResponse::success`], [`ActionResponse::empty`] or
/// [`ActionResponse::failure`]: a failure never carries data and a success
/// never carries an error code.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ActionErrorCode>,
}

/// Envelope for actions that return nothing on success (`{"success":true}`).
pub type ActionEmptyResponse = ActionResponse<()>;

impl<T> ActionResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ActionErrorCode) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(code),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<ActionErrorCode> {
        self.error
    }

    /// Collapse the envelope into a `Result`, dropping the wire shape.
    pub fn into_result(self) -> Result<Option<T>, ActionErrorCode> {
        match self.error {
            Some(code) => Err(code),
            None => Ok(self.data),
        }
    }
}

impl ActionEmptyResponse {
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}
