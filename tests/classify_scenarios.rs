// tests/classify_scenarios.rs
//
// End-to-end verdicts for hand-written filing snippets through the public
// `classify(document, config)` entry point.

use gov_equity_notifier::{
    classify, BonusToggles, ClassifierConfig, Document, SignalCategory, Tier, Verdict,
};

fn run(text: &str) -> Verdict {
    classify(&Document::new("0000000000-25-000001", text), &ClassifierConfig::default())
}

#[test]
fn agency_with_equity_investment_alerts() {
    let v = run("The Department of Defense announced an equity investment in the Company.");
    assert!(v.matched);
    assert!(v.tier >= Tier::Medium, "tier {:?} score {}", v.tier, v.score);
    assert!(v.categories.contains(&SignalCategory::EntityAgency));
    assert!(v.categories.contains(&SignalCategory::InvestmentEquity));
    let ex = v.excerpt.expect("excerpt");
    assert!(ex.contains("Department of Defense announced an equity investment"));
}

#[test]
fn risk_factor_hypothetical_is_disqualified() {
    let v = run(
        "Risk Factors: the Department of Defense could make an equity investment in issuers like us",
    );
    assert!(!v.matched);
    assert_eq!(v.score, 0.0);
    assert_eq!(v.tier, Tier::None);
    assert!(v.excerpt.is_none());
}

#[test]
fn chips_act_deal_with_amount_and_closing_is_high() {
    let v = run(
        "The Company entered into a definitive agreement under the CHIPS Act for \
         $50 million, with closing expected next quarter.",
    );
    assert!(v.matched);
    assert_eq!(v.tier, Tier::High, "score {}", v.score);
    assert!(v.score >= 0.7 && v.score <= 1.0);
    for c in [
        SignalCategory::EntityStatute,
        SignalCategory::InvestmentAgreement,
        SignalCategory::DollarAmount,
        SignalCategory::TransactionClosing,
        SignalCategory::NamedProgram,
    ] {
        assert!(v.categories.contains(&c), "missing {c:?}");
    }
}

#[test]
fn generic_government_funding_stays_below_medium() {
    let v = run("Last year the government provided funding to local schools.");
    assert!(v.score < 0.4, "score {}", v.score);
    assert_eq!(v.tier, Tier::None);
}

#[test]
fn repeated_agency_mentions_do_not_inflate() {
    let core = "The Department of Energy made an equity investment in the Company. ";
    let filler = "Operations continued in the ordinary course of business. ".repeat(4);

    let once = format!("{core}{filler}{filler}{filler}");
    let thrice = format!("{core}{filler}{core}{filler}{core}{filler}");

    let a = run(&once);
    let b = run(&thrice);
    assert!(a.matched && b.matched);
    assert_eq!(a.score, b.score);
    assert_eq!(a.tier, b.tier);
    assert_eq!(a.categories, b.categories);
}

#[test]
fn window_boundary_is_inclusive() {
    // 21 chars of entity + 1 space + filler + 1 space
    let at = format!("Department of Defense {} equity investment", "z".repeat(127));
    let over = format!("Department of Defense {} equity investment", "z".repeat(128));
    assert!(run(&at).matched);
    assert!(!run(&over).matched);

    let narrow = ClassifierConfig::default().with_window_chars(149).unwrap();
    assert!(!classify(&Document::new("x", at.as_str()), &narrow).matched);
}

#[test]
fn adding_a_cue_never_raises_the_score() {
    let clean = "The Department of Defense announced an equity investment in the Company.";
    let hedged = "The Department of Defense could announce an equity investment in the Company.";
    let a = run(clean);
    let b = run(hedged);
    assert!(b.score <= a.score);
    assert_eq!(b.tier, Tier::None);

    let two = "Under the CHIPS Act the Department of Commerce signed a definitive agreement. \
               Separately, the Department of Energy took an equity stake in the Company.";
    let two_hedged = "Under the CHIPS Act the Department of Commerce signed a definitive agreement. \
               Separately, the Department of Energy might take an equity stake in the Company.";
    assert!(run(two_hedged).score <= run(two).score);
}

#[test]
fn classification_is_byte_identical_across_calls() {
    let text = "Item 1.01 Entry into a Material Definitive Agreement.\n\n\
                On August 14, 2025 the Company and the U.S. Department of Commerce entered into \
                an investment agreement under which the Department of Commerce will purchase \
                preferred stock for $8.9 billion.";
    let doc = Document::new("0000050863-25-000044", text);
    let cfg = ClassifierConfig::default();
    let a = serde_json::to_string(&classify(&doc, &cfg)).unwrap();
    let b = serde_json::to_string(&classify(&doc, &cfg)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn disabling_bonuses_only_lowers_the_score() {
    let text = "The Company entered into a definitive agreement under the CHIPS Act for \
                $50 million, with closing expected next quarter.";
    let doc = Document::new("x", text);
    let full = classify(&doc, &ClassifierConfig::default());
    let bare = classify(
        &doc,
        &ClassifierConfig::default().with_bonuses(BonusToggles::none()),
    );
    assert!(bare.score <= full.score);
    assert!(bare.reasons.iter().all(|r| r.starts_with("pair:")));
}

#[test]
fn empty_text_is_not_matched() {
    assert_eq!(run(""), Verdict::none());
    assert_eq!(run("   \n  "), Verdict::none());
}

#[test]
fn conditional_and_modal_hedges_do_not_alert() {
    for text in [
        "If the Department of Defense makes an equity investment in the Company, \
         the Company will issue preferred stock.",
        "The Department of Energy would acquire an equity stake in the Company.",
        "The Department of Commerce may take an equity stake in the Company.",
        "Should the Department of Defense acquire an equity stake, the board will convene.",
        "Subject to appropriations, the Department of Energy will make an equity investment.",
    ] {
        let v = run(text);
        assert!(!v.matched, "{text}");
        assert_eq!(v.tier, Tier::None, "{text}");
        assert!(v.reasons.iter().any(|r| r.starts_with("veto:")), "{text}");
    }

    // the month is not a hedge
    let v = run("On May 14, 2025 the Department of Defense made an equity investment in the Company.");
    assert!(v.tier.is_alert(), "score {}", v.score);
}

#[test]
fn very_long_filing_is_classified() {
    let filler = "Operations continued in the ordinary course of business. ";
    let core = "The Department of Energy made an equity investment in the Company. ";
    let mut text = filler.repeat(4_000);
    text.push_str(core);
    text.push_str(&filler.repeat(13_000));
    assert!(text.len() > 900_000);

    let v = run(&text);
    assert!(v.matched);
    assert!(v.tier.is_alert(), "score {}", v.score);
    assert!(v
        .excerpt
        .as_deref()
        .is_some_and(|ex| ex.contains("Department of Energy made an equity investment")));
}
