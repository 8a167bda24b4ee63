use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokens the survey export uses for an unanswered cell.
const PLACEHOLDER_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Ordinal(i64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Ordinal(i) => i.to_string(),
        }
    }

    pub fn as_ordinal(&self) -> Option<i64> {
        match self {
            Value::Ordinal(i) => Some(*i),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Raw export cells are text; blanks and placeholder tokens are missing.
pub fn parse_cell(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || PLACEHOLDER_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(Value::Text(raw.to_string()))
    }
}

pub fn render_cell(cell: Option<&Value>) -> String {
    cell.map(Value::as_display).unwrap_or_default()
}
