//! Access control resolver
//!
//! Evaluates the captured `(author, repo)` groups against three rule lists
//! in a fixed order:
//! 1. Whitelist (only when non-empty; absence denies)
//! 2. Blacklist (a hit denies)
//! 3. Pass list (a hit forces a client redirect)
//!
//! A pass-list entry can never resurrect a blacklisted one.

use crate::access_control::rules::RuleSet;
use crate::config::AccessControlConfig;
use crate::error::ConfigError;
use tracing::{debug, trace};

/// Body returned when a non-empty whitelist has no matching entry
pub const FORBIDDEN_BY_WHITELIST: &str = "Forbidden by white list.";

/// Body returned on a blacklist hit
pub const FORBIDDEN_BY_BLACKLIST: &str = "Forbidden by black list.";

/// Access control resolver
///
/// Built once at startup from configuration and shared read-only.
#[derive(Debug, Default)]
pub struct AccessResolver {
    whitelist: RuleSet,
    blacklist: RuleSet,
    pass_list: RuleSet,
}

/// Result of access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the request normally
    Allowed,
    /// Whitelist is non-empty and nothing in it matched
    DeniedByWhitelistAbsence,
    /// A blacklist entry matched
    DeniedByBlacklist,
    /// A pass-list entry matched; redirect instead of proxying
    PassThrough,
}

impl AccessDecision {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, AccessDecision::PassThrough)
    }

    /// Human-readable 403 body for denials
    pub fn denial_message(&self) -> Option<&'static str> {
        match self {
            AccessDecision::DeniedByWhitelistAbsence => Some(FORBIDDEN_BY_WHITELIST),
            AccessDecision::DeniedByBlacklist => Some(FORBIDDEN_BY_BLACKLIST),
            AccessDecision::Allowed | AccessDecision::PassThrough => None,
        }
    }
}

impl AccessResolver {
    /// Create a new resolver from configuration
    pub fn new(config: &AccessControlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            whitelist: RuleSet::new(&config.whitelist)?,
            blacklist: RuleSet::new(&config.blacklist)?,
            pass_list: RuleSet::new(&config.pass_list)?,
        })
    }

    /// Decide what to do with a request whose URL captured `groups`
    pub fn evaluate(&self, groups: &[String]) -> AccessDecision {
        debug!(groups = ?groups, "Checking access");

        if !self.whitelist.is_empty() {
            match self.whitelist.find_match(groups) {
                Some(rule) => trace!(rule = %rule, "Matched whitelist"),
                None => return AccessDecision::DeniedByWhitelistAbsence,
            }
        }

        if let Some(rule) = self.blacklist.find_match(groups) {
            debug!(rule = %rule, "Matched blacklist");
            return AccessDecision::DeniedByBlacklist;
        }

        if let Some(rule) = self.pass_list.find_match(groups) {
            debug!(rule = %rule, "Matched pass list");
            return AccessDecision::PassThrough;
        }

        AccessDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn resolver(white: &[&str], black: &[&str], pass: &[&str]) -> AccessResolver {
        let to_vec = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        AccessResolver::new(&AccessControlConfig {
            whitelist: to_vec(white),
            blacklist: to_vec(black),
            pass_list: to_vec(pass),
        })
        .unwrap()
    }

    #[test]
    fn test_empty_lists_allow() {
        let resolver = AccessResolver::default();
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "widgets"])),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_whitelist_absence_denies() {
        let resolver = resolver(&["acme"], &[], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["other", "widgets"])),
            AccessDecision::DeniedByWhitelistAbsence
        );
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "widgets"])),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_blacklist_beats_pass_list() {
        let resolver = resolver(&["acme"], &["acme/widgets"], &["acme/widgets"]);
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "widgets"])),
            AccessDecision::DeniedByBlacklist
        );
    }

    #[test]
    fn test_decision_messages() {
        assert_eq!(
            AccessDecision::DeniedByWhitelistAbsence.denial_message(),
            Some("Forbidden by white list.")
        );
        assert_eq!(
            AccessDecision::DeniedByBlacklist.denial_message(),
            Some("Forbidden by black list.")
        );
        assert_eq!(AccessDecision::Allowed.denial_message(), None);
        assert_eq!(AccessDecision::PassThrough.denial_message(), None);
        assert!(AccessDecision::PassThrough.is_pass_through());
        assert!(!AccessDecision::Allowed.is_pass_through());
    }
}
