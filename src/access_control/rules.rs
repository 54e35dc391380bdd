//! Rule matching for access control
//!
//! A rule names an author (`user1`), a repository (`user1/repo1`), or a
//! repository under any author (`*/repo1`).

use crate::error::ConfigError;
use std::fmt;

/// Segment value matching any author in a two-segment rule
pub const WILDCARD: &str = "*";

/// A single parsed access rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    segments: Vec<String>,
}

impl Rule {
    /// Parse a rule from its configuration form
    ///
    /// Trailing `#` comments and surrounding whitespace are ignored.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let text = source.split('#').next().unwrap_or_default().trim();

        if text.is_empty() {
            return Err(ConfigError::invalid_rule(source, "rule is empty"));
        }

        let segments: Vec<String> = text.split('/').map(|s| s.trim().to_string()).collect();

        if segments.len() > 2 {
            return Err(ConfigError::invalid_rule(
                source,
                "expected 'user' or 'user/repo'",
            ));
        }

        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::invalid_rule(source, "empty path segment"));
        }

        if segments.len() == 1 && segments[0] == WILDCARD {
            return Err(ConfigError::invalid_rule(
                source,
                "a wildcard needs a repository, e.g. '*/repo'",
            ));
        }

        Ok(Self { segments })
    }

    /// Check the rule against the groups captured from a URL
    ///
    /// Matches when the rule equals the leading groups exactly, or when the
    /// rule is `*/repo` and the URL captured exactly `(author, repo)`.
    pub fn matches(&self, groups: &[String]) -> bool {
        let len = self.segments.len();
        if groups.len() >= len && groups[..len] == self.segments[..] {
            return true;
        }

        len == 2 && self.segments[0] == WILDCARD && groups.len() == 2 && groups[1] == self.segments[1]
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Ordered list of rules
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse a list of rules from configuration
    pub fn new(sources: &[String]) -> Result<Self, ConfigError> {
        let rules = sources
            .iter()
            .map(|s| Rule::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First rule matching the groups, in configuration order
    pub fn find_match(&self, groups: &[String]) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(groups))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
