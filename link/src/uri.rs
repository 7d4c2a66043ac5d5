//! Minimal split of `scheme://path?query#fragment`.
//!
//! Deep-link URIs put the first route segment where a URL would put the
//! host (`app://profile/42`), so they are split by hand rather than parsed
//! as URLs. Only the query string goes through `form_urlencoded`.

use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkUri {
    /// Lower-cased scheme, `None` for bare paths.
    pub scheme: Option<String>,
    /// Path with surrounding `/` removed, still percent-encoded.
    pub path: String,
    /// Decoded query pairs in order of appearance.
    pub query: Vec<(String, String)>,
}

impl DeepLinkUri {
    pub fn parse(uri: &str) -> Self {
        let uri = uri.trim();
        let without_fragment = uri.split_once('#').map_or(uri, |(head, _)| head);
        let (head, query) = match without_fragment.split_once('?') {
            Some((head, query)) => (head, query),
            None => (without_fragment, ""),
        };
        let (scheme, path) = match head.split_once("://") {
            Some((scheme, path)) => (Some(scheme.to_ascii_lowercase()), path),
            None => (None, head),
        };

        let query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            scheme,
            path: path.trim_matches('/').to_string(),
            query,
        }
    }

    /// First value for `name`; later duplicates are ignored.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Join a rendered path and query pairs back into a URI.
pub(crate) fn format_uri<'a>(
    scheme: &str,
    path: &str,
    query: impl IntoIterator<Item = (&'a str, String)>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    for (name, value) in query {
        serializer.append_pair(name, &value);
        has_query = true;
    }
    let mut uri = format!("{scheme}://{path}");
    if has_query {
        uri.push('?');
        uri.push_str(&serializer.finish());
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let uri = DeepLinkUri::parse("App://profile/42/?tab=posts&q=a+b#top");
        assert_eq!(uri.scheme.as_deref(), Some("app"));
        assert_eq!(uri.path, "profile/42");
        assert_eq!(uri.query_value("tab"), Some("posts"));
        assert_eq!(uri.query_value("q"), Some("a b"));
    }

    #[test]
    fn test_parse_bare_path() {
        let uri = DeepLinkUri::parse("/home");
        assert_eq!(uri.scheme, None);
        assert_eq!(uri.path, "home");
        assert!(uri.query.is_empty());
    }

    #[test]
    fn test_first_duplicate_query_value_wins() {
        let uri = DeepLinkUri::parse("app://x?a=1&a=2");
        assert_eq!(uri.query_value("a"), Some("1"));
    }

    #[test]
    fn test_format_uri() {
        assert_eq!(format_uri("app", "home", Vec::<(&str, String)>::new()), "app://home");
        assert_eq!(
            format_uri("app", "search", [("q", "a b".to_string())]),
            "app://search?q=a+b"
        );
    }
}
