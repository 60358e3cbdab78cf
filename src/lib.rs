//! routewise - routes chat requests to worker models.
//!
//! # Overview
//!
//! A dedicated decision model is asked which configured worker should serve
//! a chat request. Its JSON answer is validated against the worker list; any
//! failure (no user prompt, no credential, upstream error, bad JSON, unknown
//! worker) resolves to the configured default worker, so routing never fails.

pub mod audit;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod error;
pub mod router;
pub mod upstream;

// Re-export commonly used types
pub use chat::{ChatRequest, Message, MessageContent, Role};
pub use config::{RouterConfig, WorkerDescriptor};
pub use credentials::{CredentialSupplier, KeyPool};
pub use error::{AuditError, ConfigError, CredentialError, FallbackReason, UpstreamError};
pub use router::{RouteOutcome, RoutingDecision, RoutingEngine};
pub use upstream::{AuditedInvoker, HttpInvoker, UpstreamInvoker};
