//! Named encoding tables mapping textual survey answers to ordinal codes.
//!
//! Every table is a closed set: answers outside the listed labels (including
//! `NO RESPONSE`) have no code and are treated as missing by the recoder.
//! Reverse-coded tables are derived from their forward counterpart so the
//! codes for a shared label always sum to `points + 1`.

use std::{borrow::Cow, fmt, str::FromStr, sync::OnceLock};

use anyhow::{Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NO_RESPONSE: &str = "NO RESPONSE";

const AGREEMENT_7: &[&str] = &[
    "Strongly Disagree",
    "Disagree",
    "Slightly Disagree",
    "Neither Agree nor Disagree",
    "Slightly Agree",
    "Agree",
    "Strongly Agree",
];

const IDEOLOGY_7: &[&str] = &[
    "Very Liberal",
    "Liberal",
    "Slightly Liberal",
    "Neither Liberal nor Conservative",
    "Slightly Conservative",
    "Conservative",
    "Very Conservative",
];

// No neutral option on the message items.
const AGREEMENT_4: &[&str] = &["Strongly Disagree", "Disagree", "Agree", "Strongly Agree"];

const INTEREST: &[(&str, i64)] = &[
    ("1", 1),
    ("2", 2),
    ("-2", 2),
    ("3", 3),
    ("-3", 3),
    ("4", 4),
];

const VOTE: &[(&str, i64)] = &[
    ("Will definitely NOT vote 1", 1),
    ("1", 1),
    ("2", 2),
    ("-2", 2),
    ("3", 3),
    ("-3", 3),
    ("Will definitely vote 4", 4),
    ("4", 4),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    #[serde(rename = "forward-7")]
    Forward7,
    #[serde(rename = "reverse-7")]
    Reverse7,
    #[serde(rename = "ideology-7")]
    Ideology7,
    #[serde(rename = "trust-7")]
    Trust7,
    #[serde(rename = "message-4")]
    Message4,
    #[serde(rename = "candidate-7")]
    Candidate7,
    #[serde(rename = "candidate-7-reverse")]
    Candidate7Reverse,
    #[serde(rename = "interest")]
    Interest,
    #[serde(rename = "vote")]
    Vote,
}

impl Scale {
    pub const ALL: [Scale; 9] = [
        Scale::Forward7,
        Scale::Reverse7,
        Scale::Ideology7,
        Scale::Trust7,
        Scale::Message4,
        Scale::Candidate7,
        Scale::Candidate7Reverse,
        Scale::Interest,
        Scale::Vote,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scale::Forward7 => "forward-7",
            Scale::Reverse7 => "reverse-7",
            Scale::Ideology7 => "ideology-7",
            Scale::Trust7 => "trust-7",
            Scale::Message4 => "message-4",
            Scale::Candidate7 => "candidate-7",
            Scale::Candidate7Reverse => "candidate-7-reverse",
            Scale::Interest => "interest",
            Scale::Vote => "vote",
        }
    }

    /// Number of ordinal points on the scale.
    pub fn points(self) -> i64 {
        match self {
            Scale::Message4 | Scale::Interest | Scale::Vote => 4,
            _ => 7,
        }
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, Scale::Reverse7 | Scale::Candidate7Reverse)
    }

    /// Mirror of a forward code on this scale: `points + 1 - code`.
    fn flip(self, code: i64) -> i64 {
        self.points() + 1 - code
    }

    /// The forward table this scale flips, if it is reverse-coded.
    pub fn forward(self) -> Scale {
        match self {
            Scale::Reverse7 => Scale::Forward7,
            Scale::Candidate7Reverse => Scale::Candidate7,
            other => other,
        }
    }

    /// Ordinal code for `raw`, or `None` when the answer is outside the table.
    pub fn code(self, raw: &str) -> Option<i64> {
        let text = self.normalize(raw);
        let text = text.as_ref();
        if text == NO_RESPONSE {
            return None;
        }
        if self.is_reversed() {
            return self.forward().code(text).map(|code| self.flip(code));
        }
        match self {
            Scale::Forward7
            | Scale::Reverse7
            | Scale::Trust7
            | Scale::Candidate7
            | Scale::Candidate7Reverse => position(AGREEMENT_7, text),
            Scale::Ideology7 => position(IDEOLOGY_7, text),
            Scale::Message4 => position(AGREEMENT_4, text),
            Scale::Interest => lookup(INTEREST, text),
            Scale::Vote => lookup(VOTE, text),
        }
    }

    /// Labels accepted by the table paired with their codes, in code order.
    pub fn domain(self) -> Vec<(&'static str, i64)> {
        let mut entries = match self {
            _ if self.is_reversed() => self
                .forward()
                .domain()
                .into_iter()
                .map(|(label, code)| (label, self.flip(code)))
                .collect(),
            Scale::Forward7
            | Scale::Reverse7
            | Scale::Trust7
            | Scale::Candidate7
            | Scale::Candidate7Reverse => enumerate(AGREEMENT_7),
            Scale::Ideology7 => enumerate(IDEOLOGY_7),
            Scale::Message4 => enumerate(AGREEMENT_4),
            Scale::Interest => INTEREST.to_vec(),
            Scale::Vote => VOTE.to_vec(),
        };
        entries.sort_by_key(|(_, code)| *code);
        entries
    }

    fn normalize(self, raw: &str) -> Cow<'_, str> {
        match self {
            Scale::Interest => {
                let stripped = parens().replace_all(raw.trim(), "");
                let anchored = interest_anchor().replace_all(&stripped, "");
                Cow::Owned(anchored.trim().to_string())
            }
            Scale::Vote => Cow::Owned(parens().replace_all(raw.trim(), "").trim().to_string()),
            _ => Cow::Borrowed(raw.trim()),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim();
        Scale::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow!("Unknown scale '{value}'"))
    }
}

fn position(labels: &[&str], text: &str) -> Option<i64> {
    labels
        .iter()
        .position(|label| *label == text)
        .map(|idx| idx as i64 + 1)
}

fn lookup(table: &[(&str, i64)], text: &str) -> Option<i64> {
    table
        .iter()
        .find(|(label, _)| *label == text)
        .map(|(_, code)| *code)
}

fn enumerate(labels: &'static [&'static str]) -> Vec<(&'static str, i64)> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (*label, idx as i64 + 1))
        .collect()
}

fn parens() -> &'static Regex {
    static PARENS: OnceLock<Regex> = OnceLock::new();
    PARENS.get_or_init(|| Regex::new(r"[()]").expect("static regex"))
}

fn interest_anchor() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| Regex::new(r"(Highest|Lowest) Interest ").expect("static regex"))
}
