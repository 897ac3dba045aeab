//! Field-level validation error encoding

use crate::encode::html_encode;
use crate::problem::FieldErrors;

/// Encode `(field, messages)` pairs into a [`FieldErrors`] map.
///
/// - Output order follows input order.
/// - Fields with no messages are left out.
/// - Field names and messages are HTML-encoded individually; message order is kept.
/// - A repeated field name replaces the earlier messages but keeps the earlier
///   position in the map.
#[must_use]
pub fn encode_field_errors<I, K, M, S>(field_errors: I) -> FieldErrors
where
    I: IntoIterator<Item = (K, M)>,
    K: AsRef<str>,
    M: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut encoded = FieldErrors::new();
    for (field, messages) in field_errors {
        let messages: Vec<String> = messages
            .into_iter()
            .map(|m| html_encode(m.as_ref()).into_owned())
            .collect();
        if messages.is_empty() {
            continue;
        }
        encoded.insert(html_encode(field.as_ref()).into_owned(), messages);
    }
    encoded
}
