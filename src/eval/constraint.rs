//! Metadata constraints that decide whether a protein takes part in a benchmark.

use crate::error::BenchError;
use crate::io::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied as `metadata[key] <op> threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    /// The predicate for this comparison.
    pub fn predicate(self) -> fn(f64, f64) -> bool {
        match self {
            Comparison::Greater => |a: f64, b: f64| a > b,
            Comparison::Less => |a: f64, b: f64| a < b,
            Comparison::GreaterEqual => |a: f64, b: f64| a >= b,
            Comparison::LessEqual => |a: f64, b: f64| a <= b,
            Comparison::Equal => |a: f64, b: f64| a == b,
            Comparison::NotEqual => |a: f64, b: f64| a != b,
        }
    }

    pub fn apply(self, value: f64, threshold: f64) -> bool {
        (self.predicate())(value, threshold)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Greater => "greater",
            Comparison::Less => "less",
            Comparison::GreaterEqual => "greater_equal",
            Comparison::LessEqual => "less_equal",
            Comparison::Equal => "equal",
            Comparison::NotEqual => "not_equal",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparison {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater" => Ok(Comparison::Greater),
            "less" => Ok(Comparison::Less),
            "greater_equal" => Ok(Comparison::GreaterEqual),
            "less_equal" => Ok(Comparison::LessEqual),
            "equal" => Ok(Comparison::Equal),
            "not_equal" => Ok(Comparison::NotEqual),
            other => Err(BenchError::InvalidInput(format!(
                "unknown comparison operator: {}",
                other
            ))),
        }
    }
}

/// A (metadata key, comparison, threshold) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub key: String,
    #[serde(rename = "operator")]
    pub comparison: Comparison,
    #[serde(rename = "value")]
    pub threshold: f64,
}

impl Constraint {
    pub fn new(key: impl Into<String>, threshold: f64, comparison: Comparison) -> Self {
        Self {
            key: key.into(),
            comparison,
            threshold,
        }
    }

    /// Check the constraint against one matrix's metadata.
    ///
    /// Returns the observed value on failure; `None` inside the error means the
    /// key is absent or not numeric, which always fails.
    pub fn check(&self, metadata: &Metadata) -> Result<(), Option<f64>> {
        match metadata.find_f64(&self.key) {
            Some(observed) if self.comparison.apply(observed, self.threshold) => Ok(()),
            Some(observed) => Err(Some(observed)),
            None => Err(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comparisons() {
        assert!(Comparison::Greater.apply(1.0, 0.0));
        assert!(!Comparison::Greater.apply(0.0, 0.0));
        assert!(Comparison::Less.apply(-1.0, 0.0));
        assert!(Comparison::GreaterEqual.apply(0.0, 0.0));
        assert!(!Comparison::GreaterEqual.apply(-1.0, 0.0));
        assert!(Comparison::LessEqual.apply(0.0, 0.0));
        assert!(Comparison::Equal.apply(2.0, 2.0));
        assert!(Comparison::NotEqual.apply(2.0, 3.0));
        assert!(!Comparison::NotEqual.apply(3.0, 3.0));
    }

    #[test]
    fn test_parse_round_trip_names() {
        for name in ["greater", "less", "greater_equal", "less_equal", "equal", "not_equal"] {
            let parsed: Comparison = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert!("gte".parse::<Comparison>().is_err());
    }

    #[test]
    fn test_constraint_check() {
        let meta = Metadata::new(json!({"results": {"opt_code": -1}}));
        let ok = Constraint::new("opt_code", -1.0, Comparison::Equal);
        assert_eq!(ok.check(&meta), Ok(()));

        let fails = Constraint::new("opt_code", 0.0, Comparison::GreaterEqual);
        assert_eq!(fails.check(&meta), Err(Some(-1.0)));

        let absent = Constraint::new("runtime", 0.0, Comparison::Greater);
        assert_eq!(absent.check(&meta), Err(None));
    }

    #[test]
    fn test_constraint_deserialize() {
        let c: Constraint =
            toml::from_str("key = \"opt_code\"\noperator = \"greater_equal\"\nvalue = 0\n").unwrap();
        assert_eq!(c, Constraint::new("opt_code", 0.0, Comparison::GreaterEqual));
    }
}
