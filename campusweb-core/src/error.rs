use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} at {step}")]
    Status {
        step: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("login marker missing (sid: {sid})")]
    LoginMarkerMissing { sid: String },

    #[error("flow execution key not found")]
    FlowKeyNotFound,

    #[error("calendar URL not found in portal response")]
    CalendarUrlNotFound,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{step} failed (sid: {sid}): {source}")]
    Step {
        step: &'static str,
        sid: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Unwraps the step-context envelope, if any, to the underlying cause.
    pub fn root(&self) -> &Error {
        match self {
            Error::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
