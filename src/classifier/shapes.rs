//! Supported upstream URL shapes
//!
//! Each shape is a regex anchored at the start of the URL (scheme optional)
//! with named captures `author` and, except for gists, `repo`. Shapes are
//! tried in [`UrlShape::all`] order and the first match wins.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// URL shape accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlShape {
    /// `github.com/{author}/{repo}/(releases|archive)/...`
    Release,
    /// `github.com/{author}/{repo}/(blob|raw)/...`
    Blob,
    /// `github.com/{author}/{repo}/(info|git-)...`
    GitProtocol,
    /// `raw.githubusercontent.com/{author}/{repo}/{ref}/{path}`
    RawContent,
    /// `gist.githubusercontent.com/{author}/{id}/...`
    Gist,
}

static PATTERNS: LazyLock<Vec<(UrlShape, Regex)>> = LazyLock::new(|| {
    UrlShape::all()
        .iter()
        .map(|shape| {
            let regex = Regex::new(shape.pattern()).expect("built-in URL pattern is valid");
            (*shape, regex)
        })
        .collect()
});

impl UrlShape {
    /// Position of the shape in match order, starting at 1
    pub const fn index(&self) -> usize {
        match self {
            UrlShape::Release => 1,
            UrlShape::Blob => 2,
            UrlShape::GitProtocol => 3,
            UrlShape::RawContent => 4,
            UrlShape::Gist => 5,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            UrlShape::Release => "release",
            UrlShape::Blob => "blob",
            UrlShape::GitProtocol => "git",
            UrlShape::RawContent => "raw",
            UrlShape::Gist => "gist",
        }
    }

    /// All shapes in match order
    pub fn all() -> &'static [UrlShape] {
        &[
            UrlShape::Release,
            UrlShape::Blob,
            UrlShape::GitProtocol,
            UrlShape::RawContent,
            UrlShape::Gist,
        ]
    }

    const fn pattern(&self) -> &'static str {
        match self {
            UrlShape::Release => {
                r"^(?:https?://)?github\.com/(?P<author>.+?)/(?P<repo>.+?)/(?:releases|archive)/.*$"
            }
            UrlShape::Blob => {
                r"^(?:https?://)?github\.com/(?P<author>.+?)/(?P<repo>.+?)/(?:blob|raw)/.*$"
            }
            UrlShape::GitProtocol => {
                r"^(?:https?://)?github\.com/(?P<author>.+?)/(?P<repo>.+?)/(?:info|git-).*$"
            }
            UrlShape::RawContent => {
                r"^(?:https?://)?raw\.(?:githubusercontent|github)\.com/(?P<author>.+?)/(?P<repo>.+?)/.+?/.+$"
            }
            UrlShape::Gist => {
                r"^(?:https?://)?gist\.(?:githubusercontent|github)\.com/(?P<author>.+?)/.+?/.+$"
            }
        }
    }

    fn regex(&self) -> &'static Regex {
        &PATTERNS[self.index() - 1].1
    }

    /// Check whether the URL has this shape
    pub fn matches(&self, url: &str) -> bool {
        self.regex().is_match(url)
    }
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape and captured groups of a classified URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    shape: UrlShape,
    groups: Vec<String>,
}

impl MatchResult {
    pub fn shape(&self) -> UrlShape {
        self.shape
    }

    /// `[author, repo]`, or `[author]` for gists
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn author(&self) -> &str {
        &self.groups[0]
    }

    pub fn repo(&self) -> Option<&str> {
        self.groups.get(1).map(String::as_str)
    }
}

/// Classify a URL against the supported shapes
///
/// Returns `None` when no shape matches.
pub fn classify(url: &str) -> Option<MatchResult> {
    PATTERNS.iter().find_map(|(shape, regex)| {
        let caps = regex.captures(url)?;
        let groups = ["author", "repo"]
            .iter()
            .filter_map(|name| caps.name(name))
            .map(|m| m.as_str().to_string())
            .collect();
        Some(MatchResult {
            shape: *shape,
            groups,
        })
    })
}
