//! Request path → metric label normalization
//!
//! Request paths are attacker-controlled, so they are never used verbatim as
//! label values. Dynamic segments collapse to placeholders and everything
//! outside `[a-zA-Z0-9_:/]` is replaced, which keeps label cardinality bounded.

/// Placeholder for a run of digits right after a `/`.
pub const ID_PLACEHOLDER: &str = ":id";

/// Placeholder for a canonical (lowercase, hyphenated) UUID right after a `/`.
pub const UUID_PLACEHOLDER: &str = ":uuid";

/// Replace every run of ASCII digits that directly follows a `/` with `:id`.
///
/// The match is anchored on the separator: `/42` and `/42.json` become
/// `/:id` and `/:id.json`, while the digits in `/item42` are left alone.
pub fn normalize_path(path: &str) -> String {
    replace_segment_prefix(path, digit_prefix_len, ID_PLACEHOLDER)
}

/// Turn an arbitrary request path into a safe, low-cardinality label value.
///
/// - a UUID directly after a `/` becomes `:uuid`
/// - characters outside `[a-zA-Z0-9_:/]` become `_`, one per `char`
/// - underscore runs collapse to a single `_`
/// - leading/trailing underscores are trimmed
/// - a digit run directly after a `/` becomes `:id`
///
/// The numeric pass runs last so trimming can never uncover a new `/`+digit
/// match, which makes the function idempotent. UUID detection has to run
/// before the whitelist pass since it needs the hyphens.
pub fn sanitize_label(path: &str) -> String {
    let value = replace_segment_prefix(path, uuid_prefix_len, UUID_PLACEHOLDER);

    let value: String = value
        .chars()
        .map(|c| if is_label_char(c) { c } else { '_' })
        .collect();

    let value = collapse_underscores(&value);

    normalize_path(value.trim_matches('_'))
}

/// Cap a sanitized label at `max_len` bytes.
///
/// Sanitized labels are pure ASCII, so any byte index is a char boundary.
/// Underscores exposed at the cut are trimmed again.
pub fn truncate_label(label: &str, max_len: usize) -> String {
    if label.len() <= max_len {
        return label.to_string();
    }
    let mut end = max_len;
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    label[..end].trim_end_matches('_').to_string()
}

/// Whitelist for label characters.
pub fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '/')
}

fn digit_prefix_len(seg: &str) -> usize {
    seg.bytes().take_while(u8::is_ascii_digit).count()
}

/// Only the 36-char hyphenated form in lowercase hex counts. Uppercase UUIDs
/// are not collapsed.
fn uuid_prefix_len(seg: &str) -> usize {
    match seg.get(..36) {
        Some(candidate)
            if !candidate.bytes().any(|b| b.is_ascii_uppercase())
                && uuid::Uuid::try_parse(candidate).is_ok() =>
        {
            candidate.len()
        }
        _ => 0,
    }
}

/// Replace the matched prefix of every segment that follows a `/`.
///
/// The text before the first `/` is never matched.
fn replace_segment_prefix(
    path: &str,
    prefix_len: impl Fn(&str) -> usize,
    placeholder: &str,
) -> String {
    let mut segments = path.split('/');
    let mut out = String::with_capacity(path.len());
    if let Some(first) = segments.next() {
        out.push_str(first);
    }
    for seg in segments {
        out.push('/');
        match prefix_len(seg) {
            0 => out.push_str(seg),
            n => {
                out.push_str(placeholder);
                out.push_str(&seg[n..]);
            }
        }
    }
    out
}

fn collapse_underscores(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_underscore = false;
    for c in value.chars() {
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(c);
    }
    out
}
