//! Markup escaping for attribute values.
use std::borrow::Cow;

/// Escape the five XML-reserved characters (`& < > " '`) plus line feeds,
/// carriage returns and tabs.
///
/// Every attribute value written by [`crate::DocumentSerializer`] passes
/// through this function. Parsers normalise literal whitespace in attribute
/// values to spaces, so the three whitespace characters are written as
/// character references. Values without any of these characters are
/// borrowed.
///
/// # Examples
/// ```
/// use osm_export_core::escape_markup;
///
/// assert_eq!(escape_markup("Fish & Chips"), "Fish &amp; Chips");
/// assert_eq!(escape_markup("O'Neill's"), "O&apos;Neill&apos;s");
/// assert_eq!(escape_markup("line\nbreak"), "line&#10;break");
/// ```
pub fn escape_markup(raw: &str) -> Cow<'_, str> {
    let escaped = quick_xml::escape::escape(raw);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut owned = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            '\n' => owned.push_str("&#10;"),
            '\r' => owned.push_str("&#13;"),
            '\t' => owned.push_str("&#9;"),
            other => owned.push(other),
        }
    }
    Cow::Owned(owned)
}
