//! Chat-completion client for OpenRouter-compatible APIs.
//!
//! - [`config`]: [`CompletionConfig`] and the env loader
//! - [`services`]: the [`CompletionBackend`] seam and [`OpenRouterService`]
//! - [`error_handler`]: [`CompletionError`] and env helpers
//! - [`health_service`]: config snapshot for `/health`
//! - [`telemetry`]: tracing subscriber setup used by the binary

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use config::completion_config::CompletionConfig;
pub use error_handler::{CompletionError, ConfigError, HttpError};
pub use services::{CompletionBackend, open_router_service::OpenRouterService};
