//! One-shot request/response abstraction.
//!
//! This module provides the request transport contract, the caller-facing
//! options and typed response, the host request capability, and the outcome
//! classification shared by every implementation.

pub mod capability;
pub mod classify;
pub mod contract;
pub mod options;
pub mod response;

// Re-export commonly used types
pub use capability::{
    DROPPED_MESSAGE, HostFailure, HostOutcome, HostResponse, PendingResponse, RequestCapability,
    Responder,
};
pub use classify::{classify_failure, classify_response, is_abort, is_success};
pub use contract::RequestTransport;
pub use options::{DEFAULT_TIMEOUT, DataType, HostRequest, Method, RequestOptions, ResponseType};
pub use response::{Response, ResponseBody};
