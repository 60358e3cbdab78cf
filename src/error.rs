//! Error types for routewise modules using thiserror.

use thiserror::Error;

/// Errors from loading or validating router configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[source] toml::de::Error),

    #[error("No worker models configured")]
    NoWorkers,

    #[error("Worker at position {0} has an empty name")]
    EmptyWorkerName(usize),

    #[error("Worker '{0}' is configured more than once")]
    DuplicateWorker(String),

    #[error("Default worker must not be empty")]
    EmptyDefaultWorker,

    #[error("Decision model must not be empty")]
    EmptyDecisionModel,
}

/// Errors from the credential supplier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No API keys configured")]
    Empty,
}

/// Errors from an upstream model call.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream returned status code {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream returned an unreadable response: {0}")]
    Envelope(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl UpstreamError {
    /// HTTP status carried by the error, if the upstream answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors from persisting audit records.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to write audit record: {0}")]
    WriteFailed(String),
}

/// Why a routing call resolved to the default worker.
#[derive(Error, Debug)]
pub enum FallbackReason {
    #[error("no user prompt found in request")]
    NoIntent,

    #[error("could not acquire a credential: {0}")]
    Credential(#[source] CredentialError),

    #[error("decision call failed: {0}")]
    Upstream(#[source] UpstreamError),

    #[error("could not decode routing decision: {0}")]
    Decode(String),

    #[error("decision model chose unknown worker '{0}'")]
    InvalidChoice(String),
}

impl FallbackReason {
    /// Short machine-friendly tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackReason::NoIntent => "no_intent",
            FallbackReason::Credential(_) => "credential",
            FallbackReason::Upstream(_) => "upstream",
            FallbackReason::Decode(_) => "decode",
            FallbackReason::InvalidChoice(_) => "invalid_choice",
        }
    }
}

impl From<CredentialError> for FallbackReason {
    fn from(err: CredentialError) -> Self {
        FallbackReason::Credential(err)
    }
}

impl From<UpstreamError> for FallbackReason {
    fn from(err: UpstreamError) -> Self {
        FallbackReason::Upstream(err)
    }
}
