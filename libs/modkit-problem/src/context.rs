//! Request-scoped trace identifiers handed to the problem factory.
//!
//! The factory never reads ambient tracing state. Hosting layers resolve the
//! identifiers they trust and pass them in explicitly.

use http::HeaderMap;

const TRACEPARENT: &str = "traceparent";
const REQUEST_ID_HEADERS: [&str; 2] = ["x-request-id", "x-trace-id"];

/// Trace identifiers for the request that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    activity_id: Option<String>,
    request_id: Option<String>,
}

impl TraceContext {
    #[must_use]
    pub fn new(activity_id: Option<String>, request_id: Option<String>) -> Self {
        Self {
            activity_id,
            request_id,
        }
    }

    /// No identifiers; the payload will carry no `traceId`.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Identifier of the active distributed-tracing activity (preferred).
    #[must_use]
    pub fn with_activity_id(mut self, id: impl Into<String>) -> Self {
        self.activity_id = Some(id.into());
        self
    }

    /// Identifier assigned to the request by the hosting server (fallback).
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The identifier to stamp: activity id, then request id, empty values skipped.
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        self.activity_id()
            .filter(|id| !id.is_empty())
            .or_else(|| self.request_id().filter(|id| !id.is_empty()))
    }

    /// Build a context from inbound request headers.
    ///
    /// `traceparent` is taken as the activity id only when it is a well-formed W3C
    /// trace context value. Request id headers are client-supplied, so they are kept
    /// only when they contain nothing an HTML encoder would rewrite.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let activity_id = headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_w3c_traceparent(v))
            .map(str::to_owned);

        let request_id = REQUEST_ID_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find(|v| !v.is_empty() && crate::encode::is_html_safe(v))
            .map(str::to_owned);

        if activity_id.is_none() && headers.contains_key(TRACEPARENT) {
            tracing::debug!("ignoring malformed traceparent header");
        }

        Self {
            activity_id,
            request_id,
        }
    }
}

/// `version-traceid-parentid-flags`, lower-case hex, non-zero ids.
fn is_w3c_traceparent(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    let [version, trace_id, parent_id, flags] = *parts.as_slice() else {
        return false;
    };
    is_lower_hex(version, 2)
        && version != "ff"
        && is_lower_hex(trace_id, 32)
        && trace_id.bytes().any(|b| b != b'0')
        && is_lower_hex(parent_id, 16)
        && parent_id.bytes().any(|b| b != b'0')
        && is_lower_hex(flags, 2)
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const PARENT: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

    #[test]
    fn resolve_prefers_activity_id() {
        let ctx = TraceContext::none()
            .with_activity_id("activity-1")
            .with_request_id("req-1");
        assert_eq!(ctx.resolve(), Some("activity-1"));
    }

    #[test]
    fn resolve_falls_back_to_request_id() {
        let ctx = TraceContext::new(None, Some("req-1".to_owned()));
        assert_eq!(ctx.resolve(), Some("req-1"));

        let ctx = TraceContext::new(Some(String::new()), Some("req-2".to_owned()));
        assert_eq!(ctx.resolve(), Some("req-2"));
    }

    #[test]
    fn resolve_none_when_both_absent() {
        assert_eq!(TraceContext::none().resolve(), None);
        assert_eq!(
            TraceContext::new(Some(String::new()), Some(String::new())).resolve(),
            None
        );
    }

    #[test]
    fn from_headers_reads_traceparent_and_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", PARENT.parse().unwrap());
        headers.insert("x-request-id", "req-456".parse().unwrap());

        let ctx = TraceContext::from_headers(&headers);
        assert_eq!(ctx.activity_id(), Some(PARENT));
        assert_eq!(ctx.request_id(), Some("req-456"));
        assert_eq!(ctx.resolve(), Some(PARENT));
    }

    #[test]
    fn from_headers_rejects_malformed_traceparent() {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", "<script>".parse().unwrap());
        headers.insert("x-trace-id", "trace-123".parse().unwrap());

        let ctx = TraceContext::from_headers(&headers);
        assert_eq!(ctx.activity_id(), None);
        assert_eq!(ctx.resolve(), Some("trace-123"));
    }

    #[test]
    fn from_headers_skips_unsafe_request_ids() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "\"><img>".parse().unwrap());

        let ctx = TraceContext::from_headers(&headers);
        assert_eq!(ctx.resolve(), None);
    }

    #[test]
    fn traceparent_shape() {
        assert!(is_w3c_traceparent(PARENT));
        assert!(!is_w3c_traceparent(
            "00-00000000000000000000000000000000-b7ad6b7169203331-01"
        ));
        assert!(!is_w3c_traceparent(
            "ff-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"
        ));
        assert!(!is_w3c_traceparent(
            "00-0AF7651916CD43DD8448EB211C80319C-b7ad6b7169203331-01"
        ));
        assert!(!is_w3c_traceparent("00-abc-def-01"));
    }
}
