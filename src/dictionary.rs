// src/dictionary.rs
//! Category-tagged phrase tables: government entities, investment terms,
//! transaction-closing terms and negative-context cues.
//!
//! Phrases are compiled once into case-insensitive whole-phrase regexes
//! (`\b` at word-character edges, inner whitespace matches any whitespace run).
//! The built-in tables are compiled lazily on first use and shared for the
//! lifetime of the process. A TOML file can replace them:
//!
//! ```toml
//! closing_terms = ["closing", "first tranche"]
//!
//! [entities]
//! "Department of Defense" = "agency"
//! "CHIPS Act" = "statute"
//!
//! [investments]
//! "equity investment" = "equity_noun"
//!
//! [negative_cues]
//! "risk factors" = "section_header"
//! ```
//!
//! Omitting `closing_terms` or `[negative_cues]` keeps the built-in lists.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::verdict::SignalCategory;

pub const ENV_DICTIONARY_PATH: &str = "GOVEQ_DICTIONARY_PATH";

/* ----------------------------
Categories
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Agency,
    Program,
    Statute,
    /// Unspecific references ("the government").
    Generic,
}

impl EntityCategory {
    /// Named program or statute (CHIPS Act, Defense Production Act, CFIUS).
    pub fn is_named_program(self) -> bool {
        matches!(self, Self::Program | Self::Statute)
    }

    pub fn signal(self) -> SignalCategory {
        match self {
            Self::Agency => SignalCategory::EntityAgency,
            Self::Program => SignalCategory::EntityProgram,
            Self::Statute => SignalCategory::EntityStatute,
            Self::Generic => SignalCategory::EntityGeneric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentCategory {
    EquityNoun,
    InstrumentNoun,
    AgreementVerb,
    /// "funding", "investment" and similar.
    Generic,
}

impl InvestmentCategory {
    pub fn signal(self) -> SignalCategory {
        match self {
            Self::EquityNoun => SignalCategory::InvestmentEquity,
            Self::InstrumentNoun => SignalCategory::InvestmentInstrument,
            Self::AgreementVerb => SignalCategory::InvestmentAgreement,
            Self::Generic => SignalCategory::InvestmentGeneric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueCategory {
    /// Risk-factor / forward-looking-statement section boilerplate.
    SectionHeader,
    /// Conditional or modal-hedge phrasing.
    Hypothetical,
    /// Disclosure topics that discuss government exposure without a deal.
    Boilerplate,
}

/* ----------------------------
Built-in tables
---------------------------- */

const ENTITY_TABLE: &[(&str, EntityCategory)] = &[
    ("U.S. Government", EntityCategory::Agency),
    ("United States Government", EntityCategory::Agency),
    ("Department of Commerce", EntityCategory::Agency),
    ("Department of Defense", EntityCategory::Agency),
    ("DoD", EntityCategory::Agency),
    ("Department of Energy", EntityCategory::Agency),
    ("Department of the Treasury", EntityCategory::Agency),
    ("Treasury Department", EntityCategory::Agency),
    ("U.S. Treasury", EntityCategory::Agency),
    ("Office of Strategic Capital", EntityCategory::Program),
    ("CHIPS Program Office", EntityCategory::Program),
    ("Committee on Foreign Investment", EntityCategory::Program),
    ("CFIUS", EntityCategory::Program),
    ("CHIPS and Science Act", EntityCategory::Statute),
    ("CHIPS Act", EntityCategory::Statute),
    ("Defense Production Act", EntityCategory::Statute),
    ("Inflation Reduction Act", EntityCategory::Statute),
    ("the government", EntityCategory::Generic),
    ("federal government", EntityCategory::Generic),
    ("government agency", EntityCategory::Generic),
    ("governmental authority", EntityCategory::Generic),
];

const INVESTMENT_TABLE: &[(&str, InvestmentCategory)] = &[
    ("equity investment", InvestmentCategory::EquityNoun),
    ("equity stake", InvestmentCategory::EquityNoun),
    ("equity position", InvestmentCategory::EquityNoun),
    ("equity interest", InvestmentCategory::EquityNoun),
    ("ownership stake", InvestmentCategory::EquityNoun),
    ("preferred shares", InvestmentCategory::EquityNoun),
    ("preferred stock", InvestmentCategory::EquityNoun),
    ("preferred stock investment", InvestmentCategory::EquityNoun),
    ("convertible preferred", InvestmentCategory::EquityNoun),
    ("stock purchase", InvestmentCategory::InstrumentNoun),
    ("share purchase", InvestmentCategory::InstrumentNoun),
    ("warrant issuance", InvestmentCategory::InstrumentNoun),
    ("warrants to purchase", InvestmentCategory::InstrumentNoun),
    ("capital investment", InvestmentCategory::InstrumentNoun),
    ("investment agreement", InvestmentCategory::AgreementVerb),
    ("purchase agreement", InvestmentCategory::AgreementVerb),
    ("securities purchase agreement", InvestmentCategory::AgreementVerb),
    ("subscription agreement", InvestmentCategory::AgreementVerb),
    ("funding agreement", InvestmentCategory::AgreementVerb),
    ("warrant agreement", InvestmentCategory::AgreementVerb),
    ("definitive agreement", InvestmentCategory::AgreementVerb),
    ("funding", InvestmentCategory::Generic),
    ("investment", InvestmentCategory::Generic),
    ("financial assistance", InvestmentCategory::Generic),
];

const CLOSING_TABLE: &[&str] = &[
    "closing",
    "closed",
    "completion",
    "completed",
    "consummation",
    "consummated",
    "tranche",
    "funded",
];

const NEGATIVE_CUE_TABLE: &[(&str, CueCategory)] = &[
    ("risk factors", CueCategory::SectionHeader),
    ("risk factor", CueCategory::SectionHeader),
    ("forward-looking statements", CueCategory::SectionHeader),
    ("forward looking statements", CueCategory::SectionHeader),
    ("cautionary note", CueCategory::SectionHeader),
    ("safe harbor", CueCategory::SectionHeader),
    ("could", CueCategory::Hypothetical),
    ("might", CueCategory::Hypothetical),
    ("may in the future", CueCategory::Hypothetical),
    ("may be subject to", CueCategory::Hypothetical),
    ("if we were to", CueCategory::Hypothetical),
    ("in the event that", CueCategory::Hypothetical),
    ("potential future", CueCategory::Hypothetical),
    ("hypothetical", CueCategory::Hypothetical),
    ("no assurance", CueCategory::Hypothetical),
    ("for example", CueCategory::Hypothetical),
    ("illustration", CueCategory::Hypothetical),
    ("upon approval of", CueCategory::Hypothetical),
    ("subject to", CueCategory::Hypothetical),
    ("would", CueCategory::Hypothetical),
    ("should", CueCategory::Hypothetical),
    ("may", CueCategory::Hypothetical),
    ("if", CueCategory::Hypothetical),
    ("material weakness", CueCategory::Boilerplate),
    ("legal proceedings", CueCategory::Boilerplate),
    ("general economic conditions", CueCategory::Boilerplate),
    ("regulatory environment", CueCategory::Boilerplate),
    ("bond market", CueCategory::Boilerplate),
    ("debt securities", CueCategory::Boilerplate),
    ("credit facility", CueCategory::Boilerplate),
];

static BUILTIN: Lazy<Dictionary> = Lazy::new(|| {
    Dictionary::from_tables(
        ENTITY_TABLE.iter().map(|(p, c)| (p.to_string(), *c)),
        INVESTMENT_TABLE.iter().map(|(p, c)| (p.to_string(), *c)),
        NEGATIVE_CUE_TABLE.iter().map(|(p, c)| (p.to_string(), *c)),
        CLOSING_TABLE.iter().map(|p| p.to_string()),
    )
    .expect("built-in dictionary tables compile")
});

/* ----------------------------
Compiled phrases
---------------------------- */

/// A phrase compiled for case-insensitive whole-phrase search.
#[derive(Debug, Clone)]
pub struct Phrase {
    text: String,
    re: Regex,
}

impl Phrase {
    pub fn compile(table: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(ConfigError::EmptyPhrase { table });
        }
        let re = phrase_regex(text).map_err(|source| ConfigError::Pattern {
            table,
            phrase: text.to_string(),
            source,
        })?;
        Ok(Self {
            text: text.to_string(),
            re,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.re.is_match(haystack)
    }

    /// Byte spans of every non-overlapping occurrence.
    pub fn find_spans<'t>(&'t self, haystack: &'t str) -> impl Iterator<Item = (usize, usize)> + 't {
        self.re.find_iter(haystack).map(|m| (m.start(), m.end()))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Build the whole-phrase regex. `\b` is only added at edges that are word
/// characters, otherwise a phrase like `$` or `Inc.` could never match.
pub(crate) fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let lead = if phrase.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let tail = if phrase.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    Regex::new(&format!("(?i){lead}{body}{tail}"))
}

/// A phrase with its category tag.
#[derive(Debug, Clone)]
pub struct Term<C> {
    phrase: Phrase,
    category: C,
}

impl<C: Copy> Term<C> {
    pub fn phrase(&self) -> &str {
        self.phrase.as_str()
    }

    pub fn category(&self) -> C {
        self.category
    }

    pub fn compiled(&self) -> &Phrase {
        &self.phrase
    }
}

pub type EntityTerm = Term<EntityCategory>;
pub type InvestmentTerm = Term<InvestmentCategory>;
pub type NegativeCue = Term<CueCategory>;

fn compile_table<C>(
    table: &'static str,
    rows: impl IntoIterator<Item = (String, C)>,
) -> Result<Vec<Term<C>>, ConfigError> {
    rows.into_iter()
        .map(|(raw, category)| {
            Ok(Term {
                phrase: Phrase::compile(table, &raw)?,
                category,
            })
        })
        .collect()
}

/* ----------------------------
Dictionary
---------------------------- */

#[derive(Debug, Clone)]
pub struct Dictionary {
    entities: Vec<EntityTerm>,
    investments: Vec<InvestmentTerm>,
    negative_cues: Vec<NegativeCue>,
    closing_terms: Vec<Phrase>,
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    closing_terms: Option<Vec<String>>,
    entities: BTreeMap<String, EntityCategory>,
    investments: BTreeMap<String, InvestmentCategory>,
    #[serde(default)]
    negative_cues: Option<BTreeMap<String, CueCategory>>,
}

impl Dictionary {
    /// The built-in tables, compiled once per process.
    pub fn builtin() -> &'static Dictionary {
        &BUILTIN
    }

    /// Compile tables, rejecting empty phrases and empty entity/investment tables.
    pub fn from_tables(
        entities: impl IntoIterator<Item = (String, EntityCategory)>,
        investments: impl IntoIterator<Item = (String, InvestmentCategory)>,
        negative_cues: impl IntoIterator<Item = (String, CueCategory)>,
        closing_terms: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConfigError> {
        let entities = compile_table("entities", entities)?;
        if entities.is_empty() {
            return Err(ConfigError::EmptyTable { table: "entities" });
        }
        let investments = compile_table("investments", investments)?;
        if investments.is_empty() {
            return Err(ConfigError::EmptyTable {
                table: "investments",
            });
        }
        let negative_cues = compile_table("negative_cues", negative_cues)?;
        let closing_terms = closing_terms
            .into_iter()
            .map(|raw| Phrase::compile("closing_terms", &raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entities,
            investments,
            negative_cues,
            closing_terms,
        })
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: DictionaryFile = toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
            what: "dictionary",
            source,
        })?;

        let builtin = Self::builtin();
        let negative_cues: Vec<(String, CueCategory)> = match file.negative_cues {
            Some(map) => map.into_iter().collect(),
            None => builtin
                .negative_cues
                .iter()
                .map(|c| (c.phrase().to_string(), c.category()))
                .collect(),
        };
        let closing_terms: Vec<String> = match file.closing_terms {
            Some(v) => v,
            None => builtin
                .closing_terms
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        };

        Self::from_tables(file.entities, file.investments, negative_cues, closing_terms)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `$GOVEQ_DICTIONARY_PATH` if set, otherwise the built-in tables.
    pub fn load_default() -> Result<Self, ConfigError> {
        match std::env::var(ENV_DICTIONARY_PATH) {
            Ok(p) if !p.trim().is_empty() => Self::from_path(&PathBuf::from(p)),
            _ => Ok(Self::builtin().clone()),
        }
    }

    pub fn entities(&self) -> &[EntityTerm] {
        &self.entities
    }

    pub fn investments(&self) -> &[InvestmentTerm] {
        &self.investments
    }

    pub fn negative_cues(&self) -> &[NegativeCue] {
        &self.negative_cues
    }

    pub fn closing_terms(&self) -> &[Phrase] {
        &self.closing_terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_compile() {
        let d = Dictionary::builtin();
        assert_eq!(d.entities().len(), ENTITY_TABLE.len());
        assert_eq!(d.investments().len(), INVESTMENT_TABLE.len());
        assert_eq!(d.negative_cues().len(), NEGATIVE_CUE_TABLE.len());
        assert!(!d.closing_terms().is_empty());
    }

    #[test]
    fn phrase_is_whole_word_and_case_insensitive() {
        let p = Phrase::compile("entities", "CFIUS").unwrap();
        assert!(p.is_match("a cfius review"));
        assert!(!p.is_match("XCFIUSX"));

        let p = Phrase::compile("entities", "U.S. Government").unwrap();
        assert!(p.is_match("the u.s.   government said"));
        assert!(!p.is_match("U.S. Governments"));
        assert!(p.is_match("the U.S.\nGovernment"));
    }

    #[test]
    fn empty_phrase_is_rejected() {
        let err = Dictionary::from_tables(
            vec![("   ".to_string(), EntityCategory::Agency)],
            vec![("equity stake".to_string(), InvestmentCategory::EquityNoun)],
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPhrase { table: "entities" }));
    }

    #[test]
    fn empty_entity_table_is_rejected() {
        let err = Dictionary::from_tables(
            Vec::new(),
            vec![("equity stake".to_string(), InvestmentCategory::EquityNoun)],
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTable { table: "entities" }));
    }

    #[test]
    fn toml_replaces_tables_and_keeps_builtin_cues() {
        let d = Dictionary::from_toml_str(
            r#"
[entities]
"Department of Energy" = "agency"

[investments]
"equity stake" = "equity_noun"
"#,
        )
        .unwrap();
        assert_eq!(d.entities().len(), 1);
        assert_eq!(d.entities()[0].category(), EntityCategory::Agency);
        assert_eq!(d.negative_cues().len(), NEGATIVE_CUE_TABLE.len());
        assert_eq!(d.closing_terms().len(), CLOSING_TABLE.len());
    }

    #[test]
    fn toml_empty_key_fails_fast() {
        let err = Dictionary::from_toml_str(
            r#"
[entities]
"" = "agency"

[investments]
"equity stake" = "equity_noun"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPhrase { .. }));
    }

    #[test]
    fn toml_unknown_category_is_a_parse_error() {
        let err = Dictionary::from_toml_str(
            r#"
[entities]
"Department of Energy" = "ministry"

[investments]
"equity stake" = "equity_noun"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
