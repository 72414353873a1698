// src/negative.rs
//! Negative-context filter: a per-window veto for risk-factor boilerplate and
//! hypothetical phrasing.
//!
//! Context is the sentence enclosing the window, capped at
//! `CONTEXT_REACH_CHARS` on each side. A sentence ends at `.`/`!`/`?` followed
//! by whitespace (unless the period closes an abbreviation such as "U.S." or
//! "Inc.") or at a blank line. When the sentence starts right after a line
//! break, a short preceding line is treated as a section heading and checked
//! for header cues ("Item 1A. Risk Factors").

use crate::dictionary::{CueCategory, NegativeCue};
use crate::proximity::MatchWindow;

pub const CONTEXT_REACH_CHARS: usize = 200;
pub const HEADING_MAX_CHARS: usize = 80;

const ABBREVIATIONS: &[&str] = &[
    "inc", "corp", "co", "ltd", "llc", "no", "nos", "mr", "ms", "mrs", "dr", "st", "jr", "sr",
    "vs", "etc", "sec", "dept", "approx", "reg",
];

#[derive(Debug, Clone, Copy)]
pub struct NegativeContextFilter<'d> {
    cues: &'d [NegativeCue],
}

impl<'d> NegativeContextFilter<'d> {
    pub fn new(cues: &'d [NegativeCue]) -> Self {
        Self { cues }
    }

    pub fn is_disqualified(&self, text: &str, window: &MatchWindow<'_>) -> bool {
        self.find_cue(text, window).is_some()
    }

    /// First cue (dictionary order) found in the window's context, if any.
    pub fn find_cue(&self, text: &str, window: &MatchWindow<'_>) -> Option<&'d NegativeCue> {
        let (lo, hi) = sentence_bounds(text, window.start(), window.end(), CONTEXT_REACH_CHARS);
        let context = &text[lo..hi];
        if let Some(cue) = self.cues.iter().find(|c| occurs_in(c, context)) {
            return Some(cue);
        }

        let heading = preceding_heading(text, lo)?;
        self.cues
            .iter()
            .filter(|c| c.category() == CueCategory::SectionHeader)
            .find(|c| c.compiled().is_match(heading))
    }
}

fn occurs_in(cue: &NegativeCue, context: &str) -> bool {
    cue.compiled()
        .find_spans(context)
        .any(|(s, e)| !is_month_name(context, s, e))
}

/// "May" mid-sentence or before a day/year is the month, not the modal.
fn is_month_name(context: &str, start: usize, end: usize) -> bool {
    if &context[start..end] != "May" {
        return false;
    }
    let next_is_digit = context[end..]
        .trim_start()
        .starts_with(|c: char| c.is_ascii_digit());
    next_is_digit || start > 0
}

/// Byte range of the sentence around `start..end`, at most `reach` chars beyond it.
pub(crate) fn sentence_bounds(text: &str, start: usize, end: usize, reach: usize) -> (usize, usize) {
    let mut lo = start;
    for (i, c) in text[..start].char_indices().rev().take(reach) {
        if c.is_whitespace() && ends_sentence(text, i) {
            break;
        }
        lo = i;
    }

    let mut hi = end;
    for (off, c) in text[end..].char_indices().take(reach) {
        let i = end + off;
        if c.is_whitespace() && ends_sentence(text, i) {
            break;
        }
        hi = i + c.len_utf8();
    }
    (lo, hi)
}

/// Whether the whitespace at byte `ws` separates two sentences.
fn ends_sentence(text: &str, ws: usize) -> bool {
    let before = &text[..ws];
    if text[ws..].starts_with('\n') && before.trim_end_matches([' ', '\t', '\r']).ends_with('\n') {
        return true; // blank line
    }
    match before.chars().last() {
        Some('!') | Some('?') => true,
        Some('.') => !closes_abbreviation(before),
        _ => false,
    }
}

/// `before` ends with '.'; true when that period belongs to an abbreviation.
fn closes_abbreviation(before: &str) -> bool {
    let stem = &before[..before.len() - 1];
    let word = stem
        .rsplit(|c: char| c.is_whitespace() || matches!(c, '(' | '"' | '\''))
        .next()
        .unwrap_or("");
    if word.is_empty() {
        return false;
    }
    if word.contains('.') {
        // U.S. / e.g. / N.A., but not $8.9 or 1.01
        return word
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(char::is_alphabetic));
    }
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_alphabetic(); // initials
    }
    let lower = word.to_ascii_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

/// The line right above a sentence that starts after a line break, if short.
fn preceding_heading(text: &str, lo: usize) -> Option<&str> {
    let before = &text[..lo];
    if !before.trim_end_matches([' ', '\t', '\r']).ends_with('\n') {
        return None;
    }
    let line = before.trim_end().rsplit('\n').next()?.trim();
    (!line.is_empty() && line.chars().count() <= HEADING_MAX_CHARS).then_some(line)
}
