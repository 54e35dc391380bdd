//! gh-relay
//!
//! A forwarding gateway for GitHub release archives, raw files, git smart-HTTP
//! endpoints and gists.
//!
//! ## Features
//!
//! - **Five URL shapes** accepted, everything else answered with 403
//! - **White/black/pass lists** per author or repository, `*/repo` wildcards
//! - **jsDelivr mirror** redirects for blob and raw-host files
//! - **Streaming** in fixed-size chunks with a size ceiling and no content decoding
//! - **Bounded redirect resolution** for upstream `Location` chains
//!
//! ## Request Flow
//!
//! ```text
//! path → normalize → classify → access control → plan → redirect | forward
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [proxy]
//! jsdelivr = 1                    # mirror blob/raw files on jsDelivr
//! size_limit = 1072668082176      # redirect anything larger than 999 GiB
//!
//! [access_control]
//! blacklist = ["user1", "*/repo1"]
//! ```

pub mod access_control;
pub mod classifier;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod planner;
pub mod server;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use server::{Gateway, HttpConfig, router, run_gateway};
