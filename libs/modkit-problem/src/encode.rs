//! HTML encoding for untrusted text placed into problem payloads.
//!
//! The encoder works from an allow-list: printable ASCII passes through unchanged,
//! except for characters that can open markup, close an attribute value or be read
//! back as an encoded space. Everything else is emitted as a character reference.

use std::borrow::Cow;

/// Printable ASCII characters that are never emitted raw.
const FORBIDDEN: [char; 6] = ['<', '>', '&', '"', '\'', '+'];

#[inline]
fn passes_through(c: char) -> bool {
    matches!(c, ' '..='~') && !FORBIDDEN.contains(&c)
}

/// Returns `true` when [`html_encode`] would return `input` unchanged.
#[must_use]
pub fn is_html_safe(input: &str) -> bool {
    input.chars().all(passes_through)
}

/// HTML-encode `input` for inclusion in either text or attribute context.
///
/// `<`, `>`, `&` and `"` use their named entities; any other character outside the
/// allow-list becomes `&#xHEX;` (upper-case hex, no padding). Input that is already
/// safe is borrowed back without allocating.
#[must_use]
pub fn html_encode(input: &str) -> Cow<'_, str> {
    let Some(first) = input.find(|c: char| !passes_through(c)) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len() + 16);
    out.push_str(&input[..first]);
    for c in input[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c if passes_through(c) => out.push(c),
            c => out.push_str(&format!("&#x{:X};", u32::from(c))),
        }
    }
    Cow::Owned(out)
}

/// Owned variant of [`html_encode`]; safe input is returned without reallocating.
#[must_use]
pub fn encode_owned(value: String) -> String {
    if is_html_safe(&value) {
        value
    } else {
        html_encode(&value).into_owned()
    }
}
