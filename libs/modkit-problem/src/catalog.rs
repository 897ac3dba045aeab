//! Client-error defaults catalog (status code -> default title and documentation link)

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Default title and documentation link for one status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientErrorDefault {
    /// Short human-readable summary, used when the caller gives no title.
    pub title: String,
    /// Documentation URI, used when the caller gives no problem type.
    pub link: String,
}

impl ClientErrorDefault {
    #[must_use]
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

const BUILTIN: &[(u16, &str, &str)] = &[
    (
        400,
        "Bad Request",
        "https://tools.ietf.org/html/rfc7231#section-6.5.1",
    ),
    (
        401,
        "Unauthorized",
        "https://tools.ietf.org/html/rfc7235#section-3.1",
    ),
    (
        403,
        "Forbidden",
        "https://tools.ietf.org/html/rfc7231#section-6.5.3",
    ),
    (
        404,
        "Not Found",
        "https://tools.ietf.org/html/rfc7231#section-6.5.4",
    ),
    (
        405,
        "Method Not Allowed",
        "https://tools.ietf.org/html/rfc7231#section-6.5.5",
    ),
    (
        406,
        "Not Acceptable",
        "https://tools.ietf.org/html/rfc7231#section-6.5.6",
    ),
    (
        408,
        "Request Timeout",
        "https://tools.ietf.org/html/rfc7231#section-6.5.7",
    ),
    (
        409,
        "Conflict",
        "https://tools.ietf.org/html/rfc7231#section-6.5.8",
    ),
    (
        412,
        "Precondition Failed",
        "https://tools.ietf.org/html/rfc7232#section-4.2",
    ),
    (
        415,
        "Unsupported Media Type",
        "https://tools.ietf.org/html/rfc7231#section-6.5.13",
    ),
    (
        422,
        "Unprocessable Entity",
        "https://tools.ietf.org/html/rfc4918#section-11.2",
    ),
    (
        426,
        "Upgrade Required",
        "https://tools.ietf.org/html/rfc7231#section-6.5.15",
    ),
];

/// Read-only lookup table of [`ClientErrorDefault`]s keyed by status code.
///
/// Built once at startup and shared by every factory call. `Default` returns the
/// built-in client-error (4xx) table; 5xx codes are left out so server errors keep
/// an empty title unless configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientErrorTable {
    entries: BTreeMap<u16, ClientErrorDefault>,
}

impl Default for ClientErrorTable {
    fn default() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(status, title, link)| (status, ClientErrorDefault::new(title, link)))
            .collect();
        Self { entries }
    }
}

impl ClientErrorTable {
    /// Table with no defaults at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace the default for `status` (last write wins).
    pub fn insert(&mut self, status: StatusCode, default: ClientErrorDefault) {
        self.entries.insert(status.as_u16(), default);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, status: StatusCode, default: ClientErrorDefault) -> Self {
        self.insert(status, default);
        self
    }

    #[must_use]
    pub fn get(&self, status: StatusCode) -> Option<&ClientErrorDefault> {
        self.entries.get(&status.as_u16())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &ClientErrorDefault)> + '_ {
        self.entries.iter().map(|(status, d)| (*status, d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StatusCode, ClientErrorDefault)> for ClientErrorTable {
    fn from_iter<T: IntoIterator<Item = (StatusCode, ClientErrorDefault)>>(iter: T) -> Self {
        let mut table = Self::empty();
        for (status, default) in iter {
            table.insert(status, default);
        }
        table
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_covers_common_client_errors() {
        let table = ClientErrorTable::default();
        let not_found = table.get(StatusCode::NOT_FOUND).unwrap();
        assert_eq!(not_found.title, "Not Found");
        assert_eq!(
            not_found.link,
            "https://tools.ietf.org/html/rfc7231#section-6.5.4"
        );
        assert!(table.get(StatusCode::BAD_REQUEST).is_some());
        assert!(table.get(StatusCode::UNPROCESSABLE_ENTITY).is_some());
        assert!(table.get(StatusCode::INTERNAL_SERVER_ERROR).is_none());
        assert!(table.iter().all(|(status, _)| (400..500).contains(&status)));
    }

    #[test]
    fn insert_is_last_write_wins() {
        let table = ClientErrorTable::empty()
            .with(
                StatusCode::NOT_FOUND,
                ClientErrorDefault::new("first", "https://a"),
            )
            .with(
                StatusCode::NOT_FOUND,
                ClientErrorDefault::new("second", "https://b"),
            );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(StatusCode::NOT_FOUND).unwrap().title, "second");
    }

    #[test]
    fn empty_table_has_no_entries() {
        let table = ClientErrorTable::empty();
        assert!(table.is_empty());
        assert!(table.get(StatusCode::BAD_REQUEST).is_none());
    }
}
