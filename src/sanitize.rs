use scraper::Html;

/// Turns untrusted text into something that is safe to place inside HTML
/// element content or a quoted attribute value.
pub trait Sanitizer {
    fn sanitize(&self, text: &str) -> String;
}

/// Escapes the markup-significant characters and keeps everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlEscaper;

impl Sanitizer for HtmlEscaper {
    fn sanitize(&self, text: &str) -> String {
        escape_html(text)
    }
}

/// Keeps only the text content of `text` parsed as an HTML fragment, then
/// escapes it. Tags are dropped instead of shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripper;

impl Sanitizer for TagStripper {
    fn sanitize(&self, text: &str) -> String {
        let fragment = Html::parse_fragment(text);
        let content = fragment.root_element().text().collect::<String>();
        escape_html(&content)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
