//! URL rewrites applied before redirecting or forwarding

use regex::Regex;
use std::sync::LazyLock;

/// Host prefix of the jsDelivr GitHub mirror
pub const JSDELIVR_GH: &str = "cdn.jsdelivr.net/gh";

/// `{host}.com/{author}/{repo}` followed by the `{ref}/` segment
static RAW_REF_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.com/.*?/.+?)/(.+?/)").expect("built-in rewrite pattern is valid")
});

/// `github.com/a/r/blob/ref/path` → `cdn.jsdelivr.net/gh/a/r@ref/path`
pub fn jsdelivr_from_blob(url: &str) -> String {
    url.replacen("/blob/", "@", 1)
        .replacen("github.com", JSDELIVR_GH, 1)
}

/// `raw.githubusercontent.com/a/r/ref/path` → `cdn.jsdelivr.net/gh/a/r@ref/path`
pub fn jsdelivr_from_raw(url: &str) -> String {
    let pinned = RAW_REF_BOUNDARY.replace(url, "${1}@${2}");
    let mirrored = pinned.replacen("raw.githubusercontent.com", JSDELIVR_GH, 1);
    if mirrored == pinned {
        pinned.replacen("raw.github.com", JSDELIVR_GH, 1)
    } else {
        mirrored
    }
}

/// Point a blob page at its raw bytes
pub fn blob_to_raw(url: &str) -> String {
    url.replacen("/blob/", "/raw/", 1)
}

/// Reserved characters left intact in redirect targets
const LOCATION_SAFE: &str = ":/%#?=@[]!$&'()*+,;";

/// Percent-escape everything except unreserved characters, `/` and `:`
pub fn escape_url(url: &str) -> String {
    escape_except(url, "/:")
}

/// Percent-escape a redirect target, keeping reserved URL delimiters
///
/// Existing `%` escapes are left alone; spaces and non-ASCII bytes are
/// encoded so the result is a valid `Location` value.
pub fn escape_location(url: &str) -> String {
    escape_except(url, LOCATION_SAFE)
}

/// Encode every run between `keep` characters with `urlencoding`
fn escape_except(url: &str, keep: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(pos) = rest.find(|c: char| keep.contains(c)) {
        escaped.push_str(&urlencoding::encode(&rest[..pos]));
        // every kept character is ASCII
        escaped.push_str(&rest[pos..=pos]);
        rest = &rest[pos + 1..];
    }
    escaped.push_str(&urlencoding::encode(rest));
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsdelivr_from_blob() {
        assert_eq!(
            jsdelivr_from_blob("https://github.com/acme/widgets/blob/main/README.md"),
            "https://cdn.jsdelivr.net/gh/acme/widgets@main/README.md"
        );
    }

    #[test]
    fn test_jsdelivr_from_raw_githubusercontent() {
        assert_eq!(
            jsdelivr_from_raw("https://raw.githubusercontent.com/acme/widgets/main/src/lib.rs"),
            "https://cdn.jsdelivr.net/gh/acme/widgets@main/src/lib.rs"
        );
    }

    #[test]
    fn test_jsdelivr_from_raw_github() {
        assert_eq!(
            jsdelivr_from_raw("https://raw.github.com/acme/widgets/v1.0/a.txt"),
            "https://cdn.jsdelivr.net/gh/acme/widgets@v1.0/a.txt"
        );
    }

    #[test]
    fn test_blob_to_raw_is_idempotent() {
        let once = blob_to_raw("https://github.com/acme/widgets/blob/main/README.md");
        assert_eq!(once, "https://github.com/acme/widgets/raw/main/README.md");
        assert_eq!(blob_to_raw(&once), once);
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(
            escape_url("https://github.com/acme/widgets/raw/main/a b.txt"),
            "https://github.com/acme/widgets/raw/main/a%20b.txt"
        );
        assert_eq!(
            escape_url("https://github.com/a/r/raw/main/x~y_z-1.0"),
            "https://github.com/a/r/raw/main/x~y_z-1.0"
        );
        assert_eq!(
            escape_url("https://github.com/a/r/raw/main/%E4"),
            "https://github.com/a/r/raw/main/%25E4"
        );
        assert_eq!(
            escape_url("https://github.com/a/r/raw/main/c++/ü"),
            "https://github.com/a/r/raw/main/c%2B%2B/%C3%BC"
        );
    }

    #[test]
    fn test_escape_location_keeps_reserved() {
        assert_eq!(
            escape_location("https://cdn.jsdelivr.net/gh/acme/widgets@main/a bü.md"),
            "https://cdn.jsdelivr.net/gh/acme/widgets@main/a%20b%C3%BC.md"
        );
        assert_eq!(
            escape_location("https://github.com/a/r/archive/v1+rc,2;x=(y)!*'$&.zip#top"),
            "https://github.com/a/r/archive/v1+rc,2;x=(y)!*'$&.zip#top"
        );
        assert_eq!(
            escape_location("https://github.com/a/r/raw/main/100%25 done"),
            "https://github.com/a/r/raw/main/100%25%20done"
        );
    }
}
