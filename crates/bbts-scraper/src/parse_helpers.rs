//! Text normalisation primitives shared by the extractor.

/// Joins an element's text nodes into one line: each node is trimmed, blank
/// nodes are dropped, and the rest are separated by a single space.
///
/// `"\n  Iron Man\n  <span> Mark 50 </span>"` becomes `"Iron Man Mark 50"`.
pub(crate) fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Combines the split price layout (`<span>24</span><span>99</span>`) into a
/// single monetary string.
///
/// - A trailing `.` on the whole part is dropped (`"24."` → `"24"`).
/// - A whole part that already carries cents (`"24.99"`) supplies them when
///   the fraction element is absent; an explicit fraction wins otherwise.
/// - Only the first two digits of the fraction are used; a missing or
///   one-digit fraction is right-padded with zeros.
/// - `$` is prefixed unless the whole part already starts with a currency
///   symbol.
pub(crate) fn format_price(whole: &str, fraction: Option<&str>) -> String {
    let whole = whole.trim();
    let (whole, embedded) = match whole.split_once('.') {
        Some((units, cents)) => (units, Some(cents).filter(|c| !c.is_empty())),
        None => (whole, None),
    };

    let mut cents: String = fraction
        .or(embedded)
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_digit)
        .take(2)
        .collect();
    while cents.len() < 2 {
        cents.push('0');
    }

    let symbol = if whole.starts_with(|c: char| c.is_ascii_digit()) {
        "$"
    } else {
        ""
    };

    format!("{symbol}{whole}.{cents}")
}
