//! Rule domain entity
//!
//! A rule grants `tag` to every commit touching a path that matches one of
//! its patterns. Patterns are compiled once when the rule set is loaded, so
//! a loaded [`RuleSet`] is immutable and can be shared across requests.

use regex::Regex;
use serde::Deserialize;

use super::commit::Commit;
use crate::error::RuleError;

/// A rule record as written in the rules file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleSpec {
    #[serde(alias = "paths")]
    pub patterns: Vec<String>,
    pub tag: String,
    #[serde(alias = "xp")]
    pub amount: f64,
}

/// A rule with compiled patterns
#[derive(Debug, Clone)]
pub struct Rule {
    patterns: Vec<Regex>,
    tag: String,
    amount: f64,
}

impl Rule {
    /// Compile a rule spec. Fails on a malformed pattern, an empty tag, or a
    /// negative / non-finite amount.
    pub fn compile(spec: RuleSpec, index: usize) -> Result<Self, RuleError> {
        if spec.tag.trim().is_empty() {
            return Err(RuleError::EmptyTag { index });
        }
        if !spec.amount.is_finite() || spec.amount < 0.0 {
            return Err(RuleError::InvalidAmount {
                tag: spec.tag,
                amount: spec.amount,
            });
        }

        let patterns = spec
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
                    tag: spec.tag.clone(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            tag: spec.tag,
            amount: spec.amount,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether any pattern matches the path (unanchored search)
    pub fn matches_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    /// Whether any pattern matches any added or modified path of the commit
    pub fn matches(&self, commit: &Commit) -> bool {
        commit.touched_paths().any(|path| self.matches_path(path))
    }
}

/// An ordered, compiled rule set
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile specs in order, failing on the first invalid one
    pub fn compile(specs: Vec<RuleSpec>) -> Result<Self, RuleError> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Rule::compile(spec, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Parse and compile a YAML sequence of rule records.
    /// An empty document yields an empty rule set.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RuleError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let specs: Vec<RuleSpec> = serde_yaml::from_str(yaml)?;
        Self::compile(specs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
