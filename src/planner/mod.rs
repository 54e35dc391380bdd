//! Redirect planning
//!
//! Decides, for a classified request, whether the client is answered with a
//! 403, redirected (to the jsDelivr mirror or straight to the upstream), or
//! handed to the streaming forwarder.

pub mod rewrite;

use crate::access_control::AccessDecision;
use crate::classifier::{MatchResult, UrlShape};
use tracing::debug;

pub use rewrite::{
    JSDELIVR_GH, blob_to_raw, escape_location, escape_url, jsdelivr_from_blob, jsdelivr_from_raw,
};

/// Body returned when the target matches no supported shape
pub const INVALID_INPUT: &str = "Invalid input.";

/// Outcome of planning a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Answer with 403 and the given body
    Forbidden(&'static str),
    /// Redirect the client to the URL
    Redirect(String),
    /// Stream the URL through the gateway
    Proceed(String),
}

impl Plan {
    pub fn invalid_input() -> Self {
        Plan::Forbidden(INVALID_INPUT)
    }
}

/// Redirect planner
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectPlanner {
    jsdelivr: bool,
}

impl RedirectPlanner {
    /// Create a planner; `jsdelivr` enables CDN mirror redirects for files
    pub fn new(jsdelivr: bool) -> Self {
        Self { jsdelivr }
    }

    /// Plan the response for a normalized target URL
    ///
    /// `query` is the client's query string, appended to direct and proxied
    /// upstream URLs.
    pub fn plan(
        &self,
        url: &str,
        matched: &MatchResult,
        decision: AccessDecision,
        query: Option<&str>,
    ) -> Plan {
        if let Some(message) = decision.denial_message() {
            return Plan::Forbidden(message);
        }

        let pass_through = decision.is_pass_through();
        let mirror = self.jsdelivr || pass_through;
        let shape = matched.shape();

        if mirror && shape == UrlShape::Blob && UrlShape::Blob.matches(url) {
            let target = escape_location(&jsdelivr_from_blob(url));
            debug!(%target, "Redirecting blob to CDN mirror");
            return Plan::Redirect(target);
        }

        if mirror && shape == UrlShape::RawContent && UrlShape::RawContent.matches(url) {
            let target = escape_location(&jsdelivr_from_raw(url));
            debug!(%target, "Redirecting raw file to CDN mirror");
            return Plan::Redirect(target);
        }

        let url = if shape == UrlShape::Blob {
            blob_to_raw(url)
        } else {
            url.to_string()
        };

        if pass_through {
            let target = with_query(escape_location(&url), query);
            debug!(%target, "Redirecting pass-listed request upstream");
            return Plan::Redirect(target);
        }

        Plan::Proceed(with_query(escape_url(&url), query))
    }
}

fn with_query(url: String, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", url, q),
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn plan(planner: RedirectPlanner, url: &str, decision: AccessDecision) -> Plan {
        let matched = classify(url).unwrap();
        planner.plan(url, &matched, decision, None)
    }

    #[test]
    fn test_denials_forbidden() {
        let planner = RedirectPlanner::new(true);
        let url = "https://github.com/acme/widgets/blob/main/README.md";
        assert_eq!(
            plan(planner, url, AccessDecision::DeniedByBlacklist),
            Plan::Forbidden("Forbidden by black list.")
        );
        assert_eq!(
            plan(planner, url, AccessDecision::DeniedByWhitelistAbsence),
            Plan::Forbidden("Forbidden by white list.")
        );
    }

    #[test]
    fn test_blob_proceeds_as_raw() {
        let planner = RedirectPlanner::new(false);
        assert_eq!(
            plan(
                planner,
                "https://github.com/acme/widgets/blob/main/README.md",
                AccessDecision::Allowed
            ),
            Plan::Proceed("https://github.com/acme/widgets/raw/main/README.md".to_string())
        );
    }

    #[test]
    fn test_query_appended_unescaped() {
        let planner = RedirectPlanner::new(false);
        let url = "https://github.com/acme/widgets.git/info/refs";
        let matched = classify(url).unwrap();
        assert_eq!(
            planner.plan(
                url,
                &matched,
                AccessDecision::Allowed,
                Some("service=git-upload-pack")
            ),
            Plan::Proceed(
                "https://github.com/acme/widgets.git/info/refs?service=git-upload-pack"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_mirror_redirect_escaped() {
        let planner = RedirectPlanner::new(true);
        assert_eq!(
            plan(
                planner,
                "https://github.com/acme/widgets/blob/main/a b.md",
                AccessDecision::Allowed
            ),
            Plan::Redirect("https://cdn.jsdelivr.net/gh/acme/widgets@main/a%20b.md".to_string())
        );
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(Plan::invalid_input(), Plan::Forbidden("Invalid input."));
    }
}
