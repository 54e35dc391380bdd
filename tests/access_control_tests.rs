//! Access control integration tests
//!
//! Covers the evaluation order (whitelist → blacklist → pass list), rule
//! forms (`user`, `user/repo`, `*/repo`) and their interaction with the
//! groups captured by the classifier.

use gh_relay::access_control::{AccessDecision, AccessResolver};
use gh_relay::classifier::classify;
use gh_relay::config::AccessControlConfig;
use rstest::rstest;

// =============================================================================
// Test Helpers
// =============================================================================

fn list(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn resolver(white: &[&str], black: &[&str], pass: &[&str]) -> AccessResolver {
    AccessResolver::new(&AccessControlConfig {
        whitelist: list(white),
        blacklist: list(black),
        pass_list: list(pass),
    })
    .unwrap()
}

fn groups(values: &[&str]) -> Vec<String> {
    list(values)
}

// =============================================================================
// 1. Evaluation order
// =============================================================================

mod evaluation_order {
    use super::*;

    #[test]
    fn test_all_lists_empty_allows() {
        let resolver = resolver(&[], &[], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "widgets"])),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_whitelist_absence_denies_before_blacklist() {
        let resolver = resolver(&["acme"], &["other"], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["other", "repo"])),
            AccessDecision::DeniedByWhitelistAbsence
        );
    }

    #[test]
    fn test_whitelisted_but_blacklisted() {
        let resolver = resolver(&["acme"], &["acme/secret"], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "secret"])),
            AccessDecision::DeniedByBlacklist
        );
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "public"])),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_blacklist_wins_over_pass_list() {
        let resolver = resolver(&["u"], &["u/r"], &["u/r"]);
        assert_eq!(
            resolver.evaluate(&groups(&["u", "r"])),
            AccessDecision::DeniedByBlacklist
        );
    }

    #[test]
    fn test_whitelist_absence_wins_over_pass_list() {
        let resolver = resolver(&["acme"], &[], &["u/r"]);
        assert_eq!(
            resolver.evaluate(&groups(&["u", "r"])),
            AccessDecision::DeniedByWhitelistAbsence
        );
    }

    #[test]
    fn test_pass_list_after_whitelist() {
        let resolver = resolver(&["acme"], &[], &["acme/docs"]);
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "docs"])),
            AccessDecision::PassThrough
        );
        assert_eq!(
            resolver.evaluate(&groups(&["acme", "code"])),
            AccessDecision::Allowed
        );
    }
}

// =============================================================================
// 2. Rule forms
// =============================================================================

mod rule_forms {
    use super::*;

    #[rstest]
    #[case(&["anyUser", "repoX"], AccessDecision::DeniedByBlacklist)]
    #[case(&["someone", "repoX"], AccessDecision::DeniedByBlacklist)]
    #[case(&["anyUser", "repoY"], AccessDecision::Allowed)]
    #[case(&["repoX"], AccessDecision::Allowed)]
    fn test_wildcard_blacklist(#[case] captured: &[&str], #[case] expected: AccessDecision) {
        let resolver = resolver(&[], &["*/repoX"], &[]);
        assert_eq!(resolver.evaluate(&groups(captured)), expected);
    }

    #[rstest]
    #[case(&["user1", "repo1"], AccessDecision::DeniedByBlacklist)]
    #[case(&["user1", "anything"], AccessDecision::DeniedByBlacklist)]
    #[case(&["user1"], AccessDecision::DeniedByBlacklist)]
    #[case(&["user2", "repo1"], AccessDecision::Allowed)]
    fn test_author_blacklist(#[case] captured: &[&str], #[case] expected: AccessDecision) {
        let resolver = resolver(&[], &["user1"], &[]);
        assert_eq!(resolver.evaluate(&groups(captured)), expected);
    }

    #[test]
    fn test_wildcard_whitelist() {
        let resolver = resolver(&["*/awesome"], &[], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["x", "awesome"])),
            AccessDecision::Allowed
        );
        assert_eq!(
            resolver.evaluate(&groups(&["x", "boring"])),
            AccessDecision::DeniedByWhitelistAbsence
        );
    }

    #[test]
    fn test_repo_rule_does_not_match_gist_author_only() {
        let resolver = resolver(&[], &["octo/abc"], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["octo"])),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_comments_in_rules() {
        let resolver = resolver(&[], &["user1 # block every repo of user1"], &[]);
        assert_eq!(
            resolver.evaluate(&groups(&["user1", "repo"])),
            AccessDecision::DeniedByBlacklist
        );
    }

    #[test]
    fn test_malformed_rule_rejected() {
        let result = AccessResolver::new(&AccessControlConfig {
            blacklist: list(&["a/b/c"]),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}

// =============================================================================
// 3. With classifier output
// =============================================================================

mod with_classifier {
    use super::*;

    #[test]
    fn test_gist_author_blacklisted() {
        let resolver = resolver(&[], &["octo"], &[]);
        let matched = classify("https://gist.githubusercontent.com/octo/abc/raw/f.txt").unwrap();
        assert_eq!(
            resolver.evaluate(matched.groups()),
            AccessDecision::DeniedByBlacklist
        );
    }

    #[test]
    fn test_git_endpoint_repo_includes_suffix() {
        let resolver = resolver(&[], &["acme/widgets.git"], &[]);
        let matched =
            classify("https://github.com/acme/widgets.git/info/refs?service=git-upload-pack")
                .unwrap();
        assert_eq!(
            resolver.evaluate(matched.groups()),
            AccessDecision::DeniedByBlacklist
        );
    }
}
