// src/proximity.rs
//! Proximity matcher: pairs every entity occurrence with every investment
//! occurrence whose start lies within `window_chars` characters of it.
//!
//! Occurrence rules:
//! - matching is case-insensitive and whole-phrase (see `dictionary::Phrase`);
//! - an occurrence nested inside a longer one of the same kind is dropped
//!   ("investment" inside "investment agreement");
//! - an investment occurrence overlapping an entity occurrence is dropped
//!   ("Investment" inside "Committee on Foreign Investment").
//!
//! Distances are measured in characters between occurrence starts, so the
//! bound is inclusive: exactly `window_chars` apart is still proximate.

use crate::dictionary::{EntityTerm, InvestmentTerm, Term};

/// A term occurrence: byte span plus character offset of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub char_start: usize,
}

/// An entity occurrence and an investment occurrence within the window.
#[derive(Debug, Clone, Copy)]
pub struct MatchWindow<'d> {
    pub entity: &'d EntityTerm,
    pub investment: &'d InvestmentTerm,
    pub entity_span: Span,
    pub investment_span: Span,
}

impl<'d> MatchWindow<'d> {
    /// Byte offset where the window begins.
    pub fn start(&self) -> usize {
        self.entity_span.start.min(self.investment_span.start)
    }

    /// Byte offset where the window ends.
    pub fn end(&self) -> usize {
        self.entity_span.end.max(self.investment_span.end)
    }

    /// Key used to count a phrase pair once.
    pub fn pair_key(&self) -> (&'d str, &'d str) {
        (self.entity.phrase(), self.investment.phrase())
    }
}

#[derive(Debug, Clone, Copy)]
struct Occurrence<'d, C> {
    term: &'d Term<C>,
    start: usize,
    end: usize,
}

fn collect_occurrences<'d, C: Copy>(text: &str, terms: &'d [Term<C>]) -> Vec<Occurrence<'d, C>> {
    let mut occ: Vec<Occurrence<'d, C>> = Vec::new();
    for term in terms {
        for (start, end) in term.compiled().find_spans(text) {
            occ.push(Occurrence { term, start, end });
        }
    }
    // Start ascending, longer first; the sort is stable so dictionary order breaks ties.
    occ.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Occurrence<'d, C>> = Vec::with_capacity(occ.len());
    let mut max_end = 0usize;
    for o in occ {
        if !kept.is_empty() && o.end <= max_end {
            continue; // nested in an earlier, longer occurrence
        }
        max_end = max_end.max(o.end);
        kept.push(o);
    }
    kept
}

/// Kept entity occurrences are sorted and non-nested, so their ends increase
/// with their starts: only the last one starting before `end` can overlap.
fn overlaps_any<C>(sorted: &[Occurrence<'_, C>], start: usize, end: usize) -> bool {
    let idx = sorted.partition_point(|o| o.start < end);
    idx > 0 && sorted[idx - 1].end > start
}

/// Character offsets for sorted, deduplicated byte offsets (all on char boundaries).
fn char_offsets(text: &str, sorted_bytes: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(sorted_bytes.len());
    let mut chars = 0usize;
    let mut pos = 0usize;
    for &b in sorted_bytes {
        chars += text[pos..b].chars().count();
        pos = b;
        out.push(chars);
    }
    out
}

/// Find all match windows in `text`. Pure; order is entity position, then
/// investment position.
pub fn find_windows<'d>(
    text: &str,
    entities: &'d [EntityTerm],
    investments: &'d [InvestmentTerm],
    window_chars: usize,
) -> Vec<MatchWindow<'d>> {
    let ents = collect_occurrences(text, entities);
    if ents.is_empty() {
        return Vec::new();
    }
    let invs: Vec<_> = collect_occurrences(text, investments)
        .into_iter()
        .filter(|o| !overlaps_any(&ents, o.start, o.end))
        .collect();
    if invs.is_empty() {
        return Vec::new();
    }

    let mut starts: Vec<usize> = ents
        .iter()
        .map(|o| o.start)
        .chain(invs.iter().map(|o| o.start))
        .collect();
    starts.sort_unstable();
    starts.dedup();
    let offsets = char_offsets(text, &starts);
    let char_at = |byte: usize| -> usize {
        match starts.binary_search(&byte) {
            Ok(i) => offsets[i],
            Err(_) => text[..byte].chars().count(),
        }
    };

    let inv_spans: Vec<(&'d InvestmentTerm, Span)> = invs
        .iter()
        .map(|o| {
            (
                o.term,
                Span {
                    start: o.start,
                    end: o.end,
                    char_start: char_at(o.start),
                },
            )
        })
        .collect();

    let mut out = Vec::new();
    for e in &ents {
        let entity_span = Span {
            start: e.start,
            end: e.end,
            char_start: char_at(e.start),
        };
        let lo = entity_span.char_start.saturating_sub(window_chars);
        let hi = entity_span.char_start.saturating_add(window_chars);

        let first = inv_spans.partition_point(|(_, s)| s.char_start < lo);
        for (investment, investment_span) in inv_spans[first..].iter().copied() {
            if investment_span.char_start > hi {
                break;
            }
            out.push(MatchWindow {
                entity: e.term,
                investment,
                entity_span,
                investment_span,
            });
        }
    }
    out
}

/// Byte range covering `start..end` widened by up to `chars` characters on each side.
pub(crate) fn widen(text: &str, start: usize, end: usize, chars: usize) -> (usize, usize) {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let hi = text[end..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    (lo, hi)
}
