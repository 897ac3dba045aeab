//! Problem factory: builds HTML-encoded problem payloads for failed requests.
//!
//! The hosting HTTP layer calls [`ProblemFactory::create_problem`] for plain errors
//! and [`ProblemFactory::create_validation_problem`] for model validation failures.
//! Both are pure functions of their arguments, the configured client-error table and
//! the explicit [`TraceContext`].

use http::StatusCode;

use crate::catalog::ClientErrorTable;
use crate::config::{ConfigError, ProblemConfig};
use crate::context::TraceContext;
use crate::encode::{encode_owned, html_encode};
use crate::problem::{ProblemPayload, TRACE_ID_EXTENSION};
use crate::validation::encode_field_errors;

/// Title used by validation payloads when the caller supplies none.
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// Optional inputs shared by both factory operations. Values are raw (unencoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct ProblemArgs {
    pub status: Option<StatusCode>,
    pub title: Option<String>,
    pub type_url: Option<String>,
    pub detail: Option<String>,
    pub instance: Option<String>,
}

impl ProblemArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn type_url(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = Some(type_url.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }
}

/// Builds [`ProblemPayload`]s. Cheap to clone; share one per process.
#[derive(Debug, Clone, Default)]
pub struct ProblemFactory {
    client_errors: ClientErrorTable,
    encode_trace_id: bool,
}

impl ProblemFactory {
    #[must_use]
    pub fn new(client_errors: ClientErrorTable) -> Self {
        Self {
            client_errors,
            encode_trace_id: false,
        }
    }

    /// # Errors
    /// Returns `ConfigError::InvalidStatus` if the config names an invalid status code.
    pub fn from_config(config: &ProblemConfig) -> Result<Self, ConfigError> {
        let factory = Self::new(config.client_error_table()?)
            .with_trace_id_encoding(config.encode_trace_id);
        Ok(factory)
    }

    /// HTML-encode the trace identifier as well. Off by default: trace ids are
    /// expected to be server-generated tokens.
    #[must_use]
    pub fn with_trace_id_encoding(mut self, enabled: bool) -> Self {
        self.encode_trace_id = enabled;
        self
    }

    #[must_use]
    pub fn client_errors(&self) -> &ClientErrorTable {
        &self.client_errors
    }

    /// Build a plain problem payload.
    ///
    /// Status defaults to 500. Title, type, detail and instance default to the empty
    /// string and are HTML-encoded; an empty title or type is then filled from the
    /// client-error table when the status has an entry.
    pub fn create_problem(&self, trace: &TraceContext, args: ProblemArgs) -> ProblemPayload {
        let status = args.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut problem = ProblemPayload::new(status);
        problem.title = Some(encode_or_empty(args.title));
        problem.type_url = Some(encode_or_empty(args.type_url));
        problem.detail = Some(encode_or_empty(args.detail));
        problem.instance = Some(encode_or_empty(args.instance));

        self.apply_defaults(trace, &mut problem);

        tracing::debug!(
            status = status.as_u16(),
            trace_id = problem.trace_id().is_some(),
            "Built problem payload"
        );
        problem
    }

    /// Build a validation problem payload from `(field, messages)` pairs.
    ///
    /// Status defaults to 400. Unlike [`create_problem`](Self::create_problem), an
    /// absent title is not replaced by the empty string: the payload keeps
    /// [`VALIDATION_TITLE`] unless the caller supplies a title of its own.
    pub fn create_validation_problem<I, K, M, S>(
        &self,
        trace: &TraceContext,
        field_errors: I,
        args: ProblemArgs,
    ) -> ProblemPayload
    where
        I: IntoIterator<Item = (K, M)>,
        K: AsRef<str>,
        M: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let status = args.status.unwrap_or(StatusCode::BAD_REQUEST);
        let errors = encode_field_errors(field_errors);
        let fields = errors.len();

        let mut problem = ProblemPayload::new(status);
        problem.errors = Some(errors);
        problem.type_url = Some(encode_or_empty(args.type_url));
        problem.detail = Some(encode_or_empty(args.detail));
        problem.instance = Some(encode_or_empty(args.instance));

        // Validation payloads never fall back to an empty title
        problem.title = Some(match args.title {
            Some(title) => encode_owned(title),
            None => VALIDATION_TITLE.to_owned(),
        });

        self.apply_defaults(trace, &mut problem);

        tracing::debug!(
            status = status.as_u16(),
            fields,
            trace_id = problem.trace_id().is_some(),
            "Built validation problem payload"
        );
        problem
    }

    fn apply_defaults(&self, trace: &TraceContext, problem: &mut ProblemPayload) {
        if let Some(default) = self.client_errors.get(problem.status) {
            if fill_if_empty(&mut problem.title, &default.title) {
                tracing::trace!(status = problem.status.as_u16(), "Applied default title");
            }
            if fill_if_empty(&mut problem.type_url, &default.link) {
                tracing::trace!(status = problem.status.as_u16(), "Applied default type");
            }
        }

        // Stored verbatim unless configured otherwise: trace ids come from the host
        if let Some(trace_id) = trace.resolve() {
            let value = if self.encode_trace_id {
                html_encode(trace_id).into_owned()
            } else {
                trace_id.to_owned()
            };
            problem
                .extensions
                .insert(TRACE_ID_EXTENSION.to_owned(), value.into());
        }
    }
}

fn encode_or_empty(value: Option<String>) -> String {
    value.map(encode_owned).unwrap_or_default()
}

/// Replace an absent or empty value with the encoded default. Returns whether it did.
fn fill_if_empty(slot: &mut Option<String>, default: &str) -> bool {
    if slot.as_deref().is_none_or(str::is_empty) {
        *slot = Some(html_encode(default).into_owned());
        true
    } else {
        false
    }
}
