//! URL classification
//!
//! Normalizes the target URL taken from the gateway's request path and
//! matches it against the five supported upstream shapes:
//!
//! | # | Shape         | Example                                               |
//! |---|---------------|-------------------------------------------------------|
//! | 1 | release       | `github.com/acme/widgets/archive/refs/heads/main.zip`  |
//! | 2 | blob          | `github.com/acme/widgets/blob/main/README.md`          |
//! | 3 | git           | `github.com/acme/widgets/info/refs?service=...`        |
//! | 4 | raw           | `raw.githubusercontent.com/acme/widgets/main/a.txt`    |
//! | 5 | gist          | `gist.githubusercontent.com/octo/abc123/raw/file.txt`  |

pub mod normalize;
pub mod shapes;

pub use normalize::{normalize_target, repair_scheme};
pub use shapes::{MatchResult, UrlShape, classify};
