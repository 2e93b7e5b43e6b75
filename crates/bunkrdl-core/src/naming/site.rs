//! Target-site matching for download URLs.

use url::{Origin, Url};

/// True if the host of `url` contains `pattern`, ignoring case.
///
/// The host is taken from the URL's origin, so a `blob:` URL is matched on
/// the page that created it. Unparseable URLs, opaque origins, and an empty
/// pattern never match.
pub fn matches_site(url: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Origin::Tuple(_, host, _) = parsed.origin() else {
        return false;
    };
    host.to_string()
        .to_ascii_lowercase()
        .contains(&pattern.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_subdomains_and_tlds() {
        assert!(matches_site("https://bunkr.cr/f/abc", "bunkr"));
        assert!(matches_site("https://get.bunkrr.su/file/123", "bunkr"));
        assert!(matches_site("https://CDN9.Bunkr.ru/x.mp4?n=1", "bunkr"));
    }

    #[test]
    fn ignores_other_hosts_and_paths() {
        assert!(!matches_site("https://example.com/bunkr/file.zip", "bunkr"));
        assert!(!matches_site("https://site.test/f/AAA", "bunkr"));
    }

    #[test]
    fn blob_urls_match_on_their_creating_page() {
        assert!(matches_site("blob:https://bunkr.cr/1234-uuid", "bunkr"));
        assert!(!matches_site("blob:https://example.com/1234-uuid", "bunkr"));
    }

    #[test]
    fn rejects_unparseable_or_hostless() {
        assert!(!matches_site("", "bunkr"));
        assert!(!matches_site("not a url bunkr", "bunkr"));
        assert!(!matches_site("data:text/plain,bunkr", "bunkr"));
        assert!(!matches_site("https://bunkr.cr/", ""));
    }
}
