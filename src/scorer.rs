// src/scorer.rs
//! Confidence scorer: turns the windows that survived the negative filter into
//! a `Verdict`.
//!
//! Stacking rule:
//! - each distinct (entity phrase, investment phrase) pair adds
//!   `entity_weight + investment_weight` once, however often it recurs;
//! - every bonus is a fixed amount, applied at most once per document, and
//!   bonuses sum with each other;
//! - the total is rounded to 4 decimals and clamped to <0.0..=1.0>.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::config::ClassifierConfig;
use crate::dictionary::{EntityCategory, InvestmentCategory, Phrase};
use crate::document::Document;
use crate::proximity::{widen, MatchWindow};
use crate::verdict::{SignalCategory, Verdict};

pub const DOLLAR_BONUS: f64 = 0.15;
pub const CLOSING_BONUS: f64 = 0.15;
pub const NAMED_PROGRAM_BONUS: f64 = 0.15;
pub const MATERIAL_ITEM_BONUS: f64 = 0.10;
pub const EARLY_DISCLOSURE_BONUS: f64 = 0.10;

/// Characters of context kept on each side of the excerpt window.
pub const EXCERPT_CONTEXT_CHARS: usize = 120;

static DOLLAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s?\d[\d,]*(\.\d+)?(\s*(million|billion|thousand))?")
        .expect("dollar regex")
});

// 8-K items for material definitive agreements and unregistered equity sales
static MATERIAL_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bitem\s+(1\.01|3\.02)\b").expect("item regex"));

pub fn entity_weight(category: EntityCategory) -> f64 {
    match category {
        EntityCategory::Agency | EntityCategory::Program | EntityCategory::Statute => 0.20,
        EntityCategory::Generic => 0.05,
    }
}

pub fn investment_weight(category: InvestmentCategory) -> f64 {
    match category {
        InvestmentCategory::EquityNoun => 0.25,
        InvestmentCategory::AgreementVerb => 0.20,
        InvestmentCategory::InstrumentNoun => 0.15,
        InvestmentCategory::Generic => 0.05,
    }
}

fn window_weight(w: &MatchWindow<'_>) -> f64 {
    entity_weight(w.entity.category()) + investment_weight(w.investment.category())
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub struct Scorer<'a> {
    closing_terms: &'a [Phrase],
    config: &'a ClassifierConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(closing_terms: &'a [Phrase], config: &'a ClassifierConfig) -> Self {
        Self {
            closing_terms,
            config,
        }
    }

    /// Score the surviving windows of `document`. Windows are expected in
    /// `find_windows` order.
    pub fn score(&self, document: &Document, windows: &[MatchWindow<'_>]) -> Verdict {
        if windows.is_empty() {
            return Verdict::none();
        }
        let text = document.text();
        let bonuses = self.config.bonuses();

        let mut categories = BTreeSet::new();
        let mut reasons = Vec::new();
        let mut total = 0.0f64;

        // 1) Distinct pairs, first occurrence order
        let mut seen = HashSet::new();
        for w in windows {
            if !seen.insert(w.pair_key()) {
                continue;
            }
            let weight = window_weight(w);
            total += weight;
            categories.insert(w.entity.category().signal());
            categories.insert(w.investment.category().signal());
            reasons.push(format!(
                "pair:{}+{}(+{:.2})",
                w.entity.phrase(),
                w.investment.phrase(),
                weight
            ));
        }

        // 2) Bonuses, once each
        let mut bonus = |on: bool, hit: bool, amount: f64, signal: SignalCategory, name: &str| {
            if on && hit {
                total += amount;
                categories.insert(signal);
                reasons.push(format!("bonus:{name}(+{amount:.2})"));
            }
        };

        let reach = self.config.window_chars();
        let regions: Vec<(usize, usize)> = windows
            .iter()
            .map(|w| widen(text, w.start(), w.end(), reach))
            .collect();

        let has_dollar = bonuses.dollar_amount
            && touches_any(
                DOLLAR_RE.find_iter(text).map(|m| (m.start(), m.end())),
                &regions,
            );
        bonus(
            bonuses.dollar_amount,
            has_dollar,
            DOLLAR_BONUS,
            SignalCategory::DollarAmount,
            "dollar_amount",
        );

        let has_closing = bonuses.transaction_closing
            && self
                .closing_terms
                .iter()
                .any(|p| touches_any(p.find_spans(text), &regions));
        bonus(
            bonuses.transaction_closing,
            has_closing,
            CLOSING_BONUS,
            SignalCategory::TransactionClosing,
            "transaction_closing",
        );

        let has_named = windows
            .iter()
            .any(|w| w.entity.category().is_named_program());
        bonus(
            bonuses.named_program,
            has_named,
            NAMED_PROGRAM_BONUS,
            SignalCategory::NamedProgram,
            "named_program",
        );

        bonus(
            bonuses.material_agreement_item,
            MATERIAL_ITEM_RE.is_match(text),
            MATERIAL_ITEM_BONUS,
            SignalCategory::MaterialAgreementItem,
            "material_agreement_item",
        );

        let first_start = windows.iter().map(|w| w.start()).min().unwrap_or(0);
        let early = text[..first_start].chars().count() * 2 < text.chars().count();
        bonus(
            bonuses.early_disclosure,
            early,
            EARLY_DISCLOSURE_BONUS,
            SignalCategory::EarlyDisclosure,
            "early_disclosure",
        );

        // 3) Clamp + tier
        let score = round4(total).clamp(0.0, 1.0) as f32;
        let tier = self.config.thresholds().tier_for(score);

        Verdict {
            matched: true,
            score,
            tier,
            categories,
            excerpt: Some(excerpt_for(text, strongest(windows))),
            reasons,
        }
    }
}

fn touches_any(mut spans: impl Iterator<Item = (usize, usize)>, regions: &[(usize, usize)]) -> bool {
    spans.any(|(s, e)| regions.iter().any(|&(lo, hi)| s < hi && e > lo))
}

/// Highest-weighted window; the earliest start wins ties.
fn strongest<'w, 'd>(windows: &'w [MatchWindow<'d>]) -> &'w MatchWindow<'d> {
    let mut best = &windows[0];
    for w in &windows[1..] {
        let (bw, ww) = (window_weight(best), window_weight(w));
        if ww > bw || (ww == bw && w.start() < best.start()) {
            best = w;
        }
    }
    best
}

/// Window text plus `EXCERPT_CONTEXT_CHARS` each side, cut back to whole
/// words, whitespace collapsed.
pub(crate) fn excerpt(text: &str, start: usize, end: usize) -> String {
    let (mut lo, mut hi) = widen(text, start, end, EXCERPT_CONTEXT_CHARS);

    let mid_word_lo = text[..lo]
        .chars()
        .next_back()
        .is_some_and(|c| !c.is_whitespace());
    if mid_word_lo {
        lo = text[lo..start]
            .find(char::is_whitespace)
            .map_or(start, |off| lo + off);
    }

    let mid_word_hi = text[hi..].chars().next().is_some_and(|c| !c.is_whitespace());
    if mid_word_hi {
        hi = text[end..hi]
            .rfind(char::is_whitespace)
            .map_or(end, |off| end + off);
    }

    text[lo..hi].split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt_for(text: &str, w: &MatchWindow<'_>) -> String {
    excerpt(text, w.start(), w.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BonusToggles;
    use crate::dictionary::Dictionary;
    use crate::proximity::find_windows;
    use crate::verdict::Tier;

    fn run(text: &str, config: &ClassifierConfig) -> Verdict {
        let d = Dictionary::builtin();
        let doc = Document::new("0000000000-25-000001", text);
        let windows = find_windows(text, d.entities(), d.investments(), config.window_chars());
        Scorer::new(d.closing_terms(), config).score(&doc, &windows)
    }

    #[test]
    fn no_windows_is_none() {
        let v = run("Quarterly results were in line.", &ClassifierConfig::default());
        assert_eq!(v, Verdict::none());
    }

    #[test]
    fn agency_equity_pair_is_medium() {
        let v = run(
            "The Department of Defense made an equity investment in the Company.",
            &ClassifierConfig::default(),
        );
        assert!(v.matched);
        assert!((v.score - 0.55).abs() < 1e-6, "score {}", v.score);
        assert_eq!(v.tier, Tier::Medium);
        assert!(v.categories.contains(&SignalCategory::EntityAgency));
        assert!(v.categories.contains(&SignalCategory::InvestmentEquity));
        assert!(v.categories.contains(&SignalCategory::EarlyDisclosure));
        assert_eq!(v.reasons[0], "pair:Department of Defense+equity investment(+0.45)");
    }

    #[test]
    fn bonuses_stack_and_clamp() {
        let v = run(
            "Item 1.01. Under the CHIPS Act the Company signed a definitive agreement for \
             $50 million, with closing of the first tranche expected in June.",
            &ClassifierConfig::default(),
        );
        assert_eq!(v.tier, Tier::High);
        assert!((v.score - 1.0).abs() < 1e-6);
        for c in [
            SignalCategory::DollarAmount,
            SignalCategory::TransactionClosing,
            SignalCategory::NamedProgram,
            SignalCategory::MaterialAgreementItem,
        ] {
            assert!(v.categories.contains(&c), "missing {c:?}");
        }
    }

    #[test]
    fn disabled_bonuses_do_not_apply() {
        let cfg = ClassifierConfig::default().with_bonuses(BonusToggles::none());
        let v = run(
            "Under the CHIPS Act the Company signed a definitive agreement for $50 million.",
            &cfg,
        );
        assert!((v.score - 0.40).abs() < 1e-6, "score {}", v.score);
        assert!(v.reasons.iter().all(|r| !r.starts_with("bonus:")));
    }

    #[test]
    fn repeated_pair_counts_once() {
        let once = run(
            "The Department of Energy took an equity stake.",
            &ClassifierConfig::default().with_bonuses(BonusToggles::none()),
        );
        let thrice = run(
            "The Department of Energy took an equity stake. The Department of Energy \
             equity stake was noted. The Department of Energy equity stake again.",
            &ClassifierConfig::default().with_bonuses(BonusToggles::none()),
        );
        assert_eq!(once.score, thrice.score);
    }

    #[test]
    fn dollar_amount_must_be_near() {
        let cfg = ClassifierConfig::default().with_bonuses(BonusToggles {
            dollar_amount: true,
            ..BonusToggles::none()
        });
        let far = format!(
            "The Department of Defense made an equity investment. {} Revenue was $3 million.",
            "filler ".repeat(60)
        );
        let v = run(&far, &cfg);
        assert!(!v.categories.contains(&SignalCategory::DollarAmount));

        let v = run(
            "The Department of Defense made a $25 million equity investment.",
            &cfg,
        );
        assert!(v.categories.contains(&SignalCategory::DollarAmount));
    }

    #[test]
    fn late_disclosure_gets_no_early_bonus() {
        let text = format!(
            "{} The Department of Defense made an equity investment.",
            "Unrelated operating update. ".repeat(20)
        );
        let v = run(&text, &ClassifierConfig::default());
        assert!(!v.categories.contains(&SignalCategory::EarlyDisclosure));
        assert!((v.score - 0.45).abs() < 1e-6);
    }

    #[test]
    fn excerpt_trims_to_words() {
        let text = format!(
            "{}The Department of Defense made an equity investment.{}",
            "alpha beta ".repeat(30),
            " gamma delta".repeat(30)
        );
        let start = text.find("The Department").unwrap();
        let end = text.find("investment").unwrap() + "investment".len();
        let ex = excerpt(&text, start, end);
        assert!(ex.contains("Department of Defense made an equity investment"));
        for word in ex.split(' ') {
            assert!(
                ["alpha", "beta", "gamma", "delta", "The", "Department", "of", "Defense", "made", "an", "equity", "investment."]
                    .contains(&word),
                "partial word {word:?}"
            );
        }
        assert!(ex.chars().count() <= end - start + 2 * EXCERPT_CONTEXT_CHARS);
    }

    #[test]
    fn strongest_window_drives_excerpt() {
        let text = format!(
            "The government provided funding. {} The Department of Commerce took an equity stake.",
            "Other news. ".repeat(40)
        );
        let v = run(&text, &ClassifierConfig::default());
        let ex = v.excerpt.unwrap();
        assert!(ex.contains("Department of Commerce took an equity stake"));
    }
}
