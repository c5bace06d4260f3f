use serde::Serialize;

use crate::types::Side;

/// One schema violation in a gateway request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `sideADocs` or `previousVerdict`.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in a request, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure to turn the model's free text into a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("could not locate a JSON object in the model reply")]
    NoJson,
    #[error("model reply is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("model reply is JSON but not a verdict: {0}")]
    Shape(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("LLM gateway API key is not configured")]
    MissingCredential,
    #[error("AI gateway error: {status}")]
    Upstream { status: u16, body: String },
    #[error("AI gateway request failed: {0}")]
    Transport(String),
    #[error("AI gateway returned an unexpected payload: {0}")]
    UpstreamShape(String),
    #[error(transparent)]
    Reply(#[from] ReplyError),
    /// The remote judge service answered with an error body.
    #[error("judge service rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl GatewayError {
    /// True when the request itself was at fault rather than the processing.
    pub fn is_client_error(&self) -> bool {
        match self {
            GatewayError::Invalid(_) => true,
            GatewayError::Rejected { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

/// Why a controller action did not change the case.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("both sides must provide documents first")]
    MissingDocuments,
    #[error("argument text is empty")]
    EmptyArgument,
    #[error("no verdict yet; submit the initial documents first")]
    NoVerdict,
    #[error("side {0} has no arguments left")]
    BudgetExhausted(Side),
    #[error("documents are locked for this case")]
    DocumentsLocked,
    #[error("documents were already submitted")]
    AlreadyDecided,
    #[error("a request for this action is already in flight")]
    Pending,
    #[error("unsupported document type: {0}")]
    UnsupportedFile(String),
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("case was reset while the request was in flight")]
    CaseReset,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ControllerError {
    /// Rejected locally; no request reached the gateway.
    pub fn is_local(&self) -> bool {
        !matches!(self, ControllerError::Gateway(_) | ControllerError::CaseReset)
    }
}
