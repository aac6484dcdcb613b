//! Denylist sanitizer and HTML text escaping.

use std::sync::LazyLock;

use regex::Regex;

/// A `<` through the next `>`. A `<` with no later `>` is left alone.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static SCRIPT_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid regex"));

/// `on<word>` followed by optional whitespace and `=`; word chars are ASCII.
static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on[A-Za-z0-9_]+\s*=").expect("valid regex"));

/// Sanitize user input.
///
/// Steps, in order:
/// 1. strip control characters U+0000-U+0008, U+000B, U+000C, U+000E-U+001F
///    and U+007F (tab, newline and carriage return survive);
/// 2. trim surrounding whitespace;
/// 3. truncate to `max_len` code points;
/// 4. remove `<...>` tag shapes, `javascript:` and `on<word>=` handler
///    attributes (ASCII case-insensitive), repeating until none remain;
/// 5. trim again.
///
/// The result is a fixed point: sanitizing it again with the same or a larger
/// `max_len` returns it unchanged.
pub fn sanitize(input: &str, max_len: usize) -> String {
    let stripped: String = input.chars().filter(|c| !is_stripped_control(*c)).collect();
    let mut text: String = stripped.trim().chars().take(max_len).collect();

    loop {
        let next = strip_patterns(&text);
        if next == text {
            break;
        }
        text = next;
    }

    text.trim().to_string()
}

/// Escape text for insertion into HTML text content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// One removal pass: tags, then script schemes, then event handlers.
fn strip_patterns(text: &str) -> String {
    let text = TAG_RE.replace_all(text, "");
    let text = SCRIPT_SCHEME_RE.replace_all(&text, "");
    EVENT_HANDLER_RE.replace_all(&text, "").into_owned()
}
