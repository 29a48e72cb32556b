//! Value-shape detectors.
//!
//! Each detector answers "does this cell look like a value of this kind?".
//! The mapper samples a column and scores the fraction of matching cells.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid")
});

static GRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:grade|gr|year|yr)\.?\s*)?(k|jk|sk|pk|kg|pre-?k|kindergarten|0?[0-9]|1[0-2])(?:st|nd|rd|th)?$")
        .expect("grade pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,31}$").expect("identifier pattern is valid")
});

const BOOLEAN_TOKENS: &[&str] = &[
    "y", "yes", "n", "no", "true", "false", "t", "f", "1", "0", "✓", "✔", "x", "✗",
];

const GENDER_TOKENS: &[&str] = &[
    "m",
    "f",
    "male",
    "female",
    "boy",
    "girl",
    "man",
    "woman",
    "x",
    "nb",
    "non-binary",
    "nonbinary",
    "non binary",
    "enby",
    "other",
    "u",
    "unknown",
];

const PRONOUN_TOKENS: &[&str] = &[
    "he", "him", "his", "she", "her", "hers", "they", "them", "their", "theirs", "xe", "xem",
    "xyr", "ze", "zir", "hir", "any", "all",
];

const RELATIONSHIP_TOKENS: &[&str] = &[
    "mother",
    "father",
    "mom",
    "mum",
    "dad",
    "parent",
    "guardian",
    "legal guardian",
    "stepmother",
    "stepfather",
    "step-mother",
    "step-father",
    "step mother",
    "step father",
    "grandmother",
    "grandfather",
    "grandparent",
    "aunt",
    "uncle",
    "sister",
    "brother",
    "sibling",
    "foster parent",
    "caregiver",
    "other",
];

/// The kind of value a target field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDetector {
    /// Alphabetic personal name.
    PersonName,
    /// Compact code with at least one digit.
    Identifier,
    /// K/JK/SK/PK or 0-12, optionally prefixed ("Grade 7") or ordinal ("7th").
    Grade,
    Email,
    Phone,
    Gender,
    /// Slash or comma separated pronoun set.
    Pronouns,
    Boolean,
    Relationship,
}

impl ValueDetector {
    /// Returns true when `value` (already trimmed and non-empty) has this shape.
    pub fn matches(self, value: &str) -> bool {
        match self {
            Self::PersonName => looks_like_name(value),
            Self::Identifier => IDENTIFIER.is_match(value) && value.chars().any(|c| c.is_ascii_digit()),
            Self::Grade => GRADE.is_match(&value.to_lowercase()),
            Self::Email => EMAIL.is_match(value),
            Self::Phone => looks_like_phone(value),
            Self::Gender => contains_token(GENDER_TOKENS, value),
            Self::Pronouns => looks_like_pronouns(value),
            Self::Boolean => contains_token(BOOLEAN_TOKENS, value),
            Self::Relationship => contains_token(RELATIONSHIP_TOKENS, value),
        }
    }

    /// Fraction of `samples` matching this detector, or `None` without samples.
    pub fn match_ratio<'a>(self, samples: impl IntoIterator<Item = &'a str>) -> Option<f32> {
        let mut total = 0usize;
        let mut hits = 0usize;
        for value in samples {
            total += 1;
            if self.matches(value) {
                hits += 1;
            }
        }
        (total > 0).then(|| hits as f32 / total as f32)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PersonName => "name-like",
            Self::Identifier => "identifier-like",
            Self::Grade => "grade-like",
            Self::Email => "email-like",
            Self::Phone => "phone-like",
            Self::Gender => "gender-like",
            Self::Pronouns => "pronoun-like",
            Self::Boolean => "yes/no-like",
            Self::Relationship => "relationship-like",
        }
    }
}

fn contains_token(tokens: &[&str], value: &str) -> bool {
    let lowered = value.to_lowercase();
    tokens.contains(&lowered.as_str())
}

fn looks_like_name(value: &str) -> bool {
    value.chars().count() <= 60
        && value.chars().any(char::is_alphabetic)
        && value
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.' | ',' | '’'))
}

fn looks_like_phone(value: &str) -> bool {
    let lowered = value.to_lowercase().replace("ext.", "x").replace("ext", "x");
    // Extensions do not count toward the number itself.
    let number = lowered.split(['x', '#']).next().unwrap_or_default();
    let digits = number.chars().filter(char::is_ascii_digit).count();
    (10..=15).contains(&digits)
        && number
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
}

fn looks_like_pronouns(value: &str) -> bool {
    let lowered = value.to_lowercase();
    let mut tokens = lowered
        .split(['/', ',', ' '])
        .filter(|t| !t.is_empty())
        .peekable();
    tokens.peek().is_some() && tokens.all(|t| PRONOUN_TOKENS.contains(&t))
}
