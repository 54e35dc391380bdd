//! Access control module
//!
//! Decides whether a classified request is served, denied, or redirected
//! straight to its upstream.
//!
//! ## Evaluation Order
//!
//! ```text
//! whitelist (if non-empty) → blacklist → pass list → allowed
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [access_control]
//! whitelist = []
//! blacklist = [
//!     "user1",        # every repository of user1
//!     "user1/repo1",  # one repository
//!     "*/repo1",      # every repository named repo1
//! ]
//! pass_list = ["acme/docs"]
//! ```

pub mod resolver;
pub mod rules;

pub use resolver::{AccessDecision, AccessResolver, FORBIDDEN_BY_BLACKLIST, FORBIDDEN_BY_WHITELIST};
pub use rules::{Rule, RuleSet, WILDCARD};
