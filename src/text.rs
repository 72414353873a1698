// src/text.rs
//! Filing body normalization: HTML to plain text with paragraph breaks kept,
//! so the negative filter can still see blank lines and headings.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Heuristic: does this body look like HTML markup?
pub fn looks_like_html(s: &str) -> bool {
    let head: String = s.chars().take(2048).collect::<String>().to_ascii_lowercase();
    head.contains("<html") || head.contains("<body") || head.contains("<div") || head.contains("<p")
}

/// Convert an HTML filing body to plain text.
pub fn html_to_text(s: &str) -> String {
    // 1) Drop script/style/head blocks entirely
    static RE_BLOCKS: OnceCell<Regex> = OnceCell::new();
    let re_blocks = RE_BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|head)\b.*?</(script|style|head)\s*>").expect("block regex")
    });
    let mut out = re_blocks.replace_all(s, " ").to_string();

    // 2) Block-level tags become paragraph breaks, <br> a line break
    static RE_BREAK: OnceCell<Regex> = OnceCell::new();
    let re_break = RE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("br regex"));
    out = re_break.replace_all(&out, "\n").to_string();

    static RE_PARA: OnceCell<Regex> = OnceCell::new();
    let re_para = RE_PARA.get_or_init(|| {
        Regex::new(r"(?i)</?(p|div|tr|table|li|ul|ol|h[1-6]|center|blockquote)\b[^>]*>")
            .expect("para regex")
    });
    out = re_para.replace_all(&out, "\n\n").to_string();

    // 3) Strip remaining tags, then decode entities
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();
    out = html_escape::decode_html_entities(&out).to_string();

    normalize_whitespace(&out)
}

/// Collapse runs of spaces/tabs, trim each line, keep at most one blank line.
pub fn normalize_whitespace(s: &str) -> String {
    static RE_SPACES: OnceCell<Regex> = OnceCell::new();
    let re_spaces =
        RE_SPACES.get_or_init(|| Regex::new(r"[ \t\u{00A0}\r\x0C]+").expect("space regex"));
    let collapsed = re_spaces.replace_all(s, " ");

    let lines: Vec<&str> = collapsed.split('\n').map(str::trim).collect();
    let mut out = String::with_capacity(collapsed.len());
    let mut blank_run = 0usize;
    for line in lines {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;
        out.push_str(line);
    }
    out
}

/// Plain text for a fetched body, converting HTML when needed.
pub fn filing_text(body: &str) -> String {
    if looks_like_html(body) {
        html_to_text(body)
    } else {
        normalize_whitespace(body)
    }
}

/// Shorten to at most `width` chars on a word boundary, ending in `…`.
pub fn shorten(s: &str, width: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let mut out = String::new();
    for word in collapsed.split(' ') {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() + 1 > width {
            break;
        }
        if extra == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push('…');
    out
}
