pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod request;
pub mod samples;
pub mod types;

pub use controller::{CaseController, CaseSnapshot};
pub use error::{ControllerError, GatewayError, ReplyError, ValidationError, ValidationIssue};
pub use gateway::VerdictGateway;
pub use request::{ArgumentRequest, InitialRequest, VerdictRequest};
pub use types::*;
