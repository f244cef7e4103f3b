//! HTTP-facing middleware-chain pieces of the Tollgate gateway.
//!
//! This crate wires the authentication and analytics cores into axum:
//!
//! - [`middleware::basic_auth`] — the authentication gate: credential
//!   extraction, identity resolution, cached password verification and
//!   session binding
//! - [`errors`] — the symbolic error registry and the content-negotiated
//!   error templates
//! - [`handler_error`] — the shared failure path every halting middleware
//!   goes through: render the error response, dispatch the analytics
//!   record, report health
//! - [`context`] — typed request-extension values shared along the chain
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state, routing::any};
//! use tollgate_gateway::middleware::basic_auth::{BasicAuthState, basic_auth_middleware};
//!
//! let state = BasicAuthState::new(/* ... */)?;
//! let app: Router = Router::new()
//!     .route("/{*path}", any(proxy_handler))
//!     .layer(from_fn_with_state(state, basic_auth_middleware));
//! ```

pub mod context;
pub mod errors;
pub mod handler_error;
pub mod middleware;

pub use context::{AuthToken, AuthedSession, SuppressTracking, TrackedPath};
pub use errors::registry::ErrorRegistry;
pub use errors::templates::TemplateRegistry;
pub use handler_error::ErrorHandler;
pub use middleware::basic_auth::{BasicAuthState, basic_auth_middleware};
