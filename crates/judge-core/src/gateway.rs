use async_trait::async_trait;

use crate::error::GatewayError;
use crate::request::VerdictRequest;
use crate::types::Verdict;

/// Anything that can turn a case or argument into a verdict: the upstream
/// model client in-process, or the judge service over HTTP.
///
/// Implementations hold no per-case state; every call stands alone.
#[async_trait]
pub trait VerdictGateway: Send + Sync {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, GatewayError>;
}
