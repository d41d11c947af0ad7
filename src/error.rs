use reqwest::StatusCode;
use std::fmt;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Input problems caught before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .problems.join("; "))]
pub struct ValidationErrors {
    pub problems: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { problems: Vec::new() }
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.problems.extend(other.problems);
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No response was received
    #[error("no response from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A response arrived with a non-success status
    #[error("{url} responded with {status}: {body}")]
    Remote {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected record shape
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
}

impl ConsoleError {
    pub fn transport(url: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

/// User-triggered actions, each surfacing a single message on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadProperties,
    LoadProperty,
    LoadDashboard,
    SaveProperty,
    DeleteProperty,
    SubmitRentalRequest,
    SubmitReview,
}

impl Action {
    pub fn user_message(self) -> &'static str {
        match self {
            Action::LoadProperties => "Error loading properties. Please try again later.",
            Action::LoadProperty => "Error loading property data. Please try again later.",
            Action::LoadDashboard => "Error loading dashboard data. Please try again later.",
            Action::SaveProperty => "Error saving property. Please try again.",
            Action::DeleteProperty => "Error deleting property. Please try again later.",
            Action::SubmitRentalRequest => {
                "Error sending rental request. Please try again later."
            }
            Action::SubmitReview => "Error sending review. Please try again later.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::LoadProperties => "load properties",
            Action::LoadProperty => "load property",
            Action::LoadDashboard => "load dashboard",
            Action::SaveProperty => "save property",
            Action::DeleteProperty => "delete property",
            Action::SubmitRentalRequest => "submit rental request",
            Action::SubmitReview => "submit review",
        };
        f.write_str(name)
    }
}

/// Failure of one user-facing operation. Display is the user message,
/// the underlying cause stays available through `source()`.
#[derive(Debug, thiserror::Error)]
#[error("{}", .action.user_message())]
pub struct OperationError {
    pub action: Action,
    #[source]
    pub cause: ConsoleError,
}

impl OperationError {
    pub fn new(action: Action, cause: impl Into<ConsoleError>) -> Self {
        Self {
            action,
            cause: cause.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.cause, ConsoleError::Validation(_))
    }
}

/// Attach the failing action to a gateway result
pub(crate) trait ActionContext<T> {
    fn during(self, action: Action) -> Result<T, OperationError>;
}

impl<T, E: Into<ConsoleError>> ActionContext<T> for Result<T, E> {
    fn during(self, action: Action) -> Result<T, OperationError> {
        self.map_err(|e| OperationError::new(action, e))
    }
}
