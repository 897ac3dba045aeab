//! Problem payload data model (RFC 9457 shape, HTML-encoded members)

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Extension member carrying the request trace identifier.
pub const TRACE_ID_EXTENSION: &str = "traceId";

/// Standard members that extensions must not shadow in the flattened document.
pub const RESERVED_MEMBERS: [&str; 6] =
    ["type", "title", "status", "detail", "instance", "errors"];

/// Encoded field name -> encoded messages, in caller order.
pub type FieldErrors = IndexMap<String, Vec<String>>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// Problem payload returned to the hosting layer for one failed request.
///
/// Every string member that came from caller input or from the client-error
/// defaults table is HTML-encoded by the factory before it lands here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ProblemPayload {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,
    /// A short, human-readable summary of the problem type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The HTTP status code for this occurrence of the problem.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    /// A human-readable explanation specific to this occurrence of the problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies the specific occurrence of the problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Field-level validation errors, present only on validation payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Extension members, serialized inline with the standard members. Keys must not
    /// be one of [`RESERVED_MEMBERS`]; [`ProblemPayload::with_extension`] enforces this.
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl ProblemPayload {
    /// Bare payload with only `status` set.
    pub fn new(status: StatusCode) -> Self {
        Self {
            type_url: None,
            title: None,
            status,
            detail: None,
            instance: None,
            errors: None,
            extensions: IndexMap::new(),
        }
    }

    /// Add an extension member. The value is stored as given, so it must already be
    /// safe for HTML rendering. Keys naming a standard member are dropped.
    pub fn with_extension(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        let key = key.into();
        if RESERVED_MEMBERS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Ignoring extension that shadows a standard member");
            return self;
        }
        self.extensions.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.extension(TRACE_ID_EXTENSION)
            .and_then(serde_json::Value::as_str)
    }
}

/// Axum integration: make the payload directly usable as a response
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ProblemPayload {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_members_are_omitted() {
        let p = ProblemPayload::new(StatusCode::INTERNAL_SERVER_ERROR);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, json!({ "status": 500 }));
    }

    #[test]
    fn extensions_are_flattened() {
        let mut p =
            ProblemPayload::new(StatusCode::NOT_FOUND).with_extension(TRACE_ID_EXTENSION, "abc");
        p.title = Some("Not Found".to_owned());
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"title":"Not Found","status":404,"traceId":"abc"}"#);
        assert_eq!(p.trace_id(), Some("abc"));
    }

    #[test]
    fn deserializes_from_problem_json() {
        let json = r#"{"type":"https://x/400","title":"Bad","status":400,"errors":{"name":["required"]},"traceId":"t-1"}"#;
        let p: ProblemPayload = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.type_url.as_deref(), Some("https://x/400"));
        assert!(p.errors.is_some());
        assert_eq!(p.errors.unwrap()["name"], vec!["required".to_owned()]);
        assert_eq!(p.extensions.get("traceId"), Some(&json!("t-1")));
    }

    #[test]
    fn extensions_cannot_shadow_standard_members() {
        let mut p = ProblemPayload::new(StatusCode::NOT_FOUND)
            .with_extension("status", "hijack")
            .with_extension("type", "<x>")
            .with_extension("errors", json!({ "a": ["b"] }))
            .with_extension("tenant", "t-1");
        p.detail = Some("gone".to_owned());

        assert_eq!(p.extensions.len(), 1);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"status":404,"detail":"gone","tenant":"t-1"}"#);

        let back: ProblemPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn rejects_out_of_range_status() {
        let result: Result<ProblemPayload, _> = serde_json::from_str(r#"{"status":1000}"#);
        assert!(result.is_err());
    }
}
