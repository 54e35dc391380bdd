//! Target URL normalization
//!
//! The target arrives as the gateway's request path. Clients may omit the
//! scheme, and some proxies collapse `https://` into `https:/`.

const SCHEMES: &[&str] = &["https:", "http:"];

/// Turn a request path into an absolute target URL
pub fn normalize_target(path: &str) -> String {
    let path = path.trim_start_matches('/');

    if SCHEMES.iter().any(|scheme| path.starts_with(scheme)) {
        repair_scheme(path)
    } else {
        format!("https://{}", path)
    }
}

/// Restore `scheme://` when a single slash follows the scheme
pub fn repair_scheme(url: &str) -> String {
    for scheme in SCHEMES {
        if let Some(rest) = url.strip_prefix(scheme)
            && let Some(tail) = rest.strip_prefix('/')
            && !tail.starts_with('/')
        {
            return format!("{}//{}", scheme, tail);
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_scheme() {
        assert_eq!(
            normalize_target("/github.com/acme/widgets/archive/v1.zip"),
            "https://github.com/acme/widgets/archive/v1.zip"
        );
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(
            normalize_target("/https://github.com/acme/widgets"),
            "https://github.com/acme/widgets"
        );
        assert_eq!(
            normalize_target("http://github.com/acme/widgets"),
            "http://github.com/acme/widgets"
        );
    }

    #[test]
    fn test_repairs_collapsed_slashes() {
        assert_eq!(
            normalize_target("/https:/github.com/acme/widgets"),
            "https://github.com/acme/widgets"
        );
        assert_eq!(
            repair_scheme("http:/raw.github.com/a/b/c/d"),
            "http://raw.github.com/a/b/c/d"
        );
    }

    #[test]
    fn test_repair_leaves_other_urls() {
        assert_eq!(
            repair_scheme("https://github.com/acme"),
            "https://github.com/acme"
        );
        assert_eq!(repair_scheme("ftp:/host/x"), "ftp:/host/x");
    }

    #[test]
    fn test_host_starting_with_http_gets_scheme() {
        assert_eq!(
            normalize_target("httpbin.org/get"),
            "https://httpbin.org/get"
        );
    }
}
