//! HTML-encoded problem details for the modkit framework
//!
//! Turns a status code, optional free-text members and field-level validation
//! errors into a problem payload that is safe to render in HTML clients:
//! - `ProblemFactory` builds plain and validation payloads
//! - `ClientErrorTable` supplies default titles and type links per status code
//! - `TraceContext` carries the trace identifier stamped into `extensions`
//!
//! Routing, CORS and response rendering stay with the hosting HTTP layer. With the
//! `axum` feature, `ProblemPayload` implements `IntoResponse`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod config;
pub mod context;
pub mod encode;
pub mod factory;
pub mod problem;
pub mod validation;

// Re-export commonly used types
pub use catalog::{ClientErrorDefault, ClientErrorTable};
pub use config::{ClientErrorOverride, ConfigError, ProblemConfig};
pub use context::TraceContext;
pub use encode::{html_encode, is_html_safe};
pub use factory::{ProblemArgs, ProblemFactory, VALIDATION_TITLE};
pub use problem::{
    APPLICATION_PROBLEM_JSON, FieldErrors, ProblemPayload, RESERVED_MEMBERS, TRACE_ID_EXTENSION,
};
pub use validation::encode_field_errors;
