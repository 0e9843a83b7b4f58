//! REST API client module for the SeniorHub backend.
//!
//! This module provides the `ApiClient` for calling the backend with an
//! explicit per-request `RequestContext`. The context carries the bearer
//! token and the `x-user-*` identity headers, so the client itself holds
//! no session state.

pub mod client;
pub mod context;
pub mod error;

pub use client::{ApiClient, ApiResponse, ApiStatus};
pub use context::RequestContext;
pub use error::ApiError;
