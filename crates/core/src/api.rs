/// WordPress REST route for posts, relative to the content origin
pub const POSTS_ROUTE: &str = "/wp-json/wp/v2/posts";

/// Query flag that inlines author and featured media into each post
pub const EMBED_QUERY: &str = "_embed=1";

/// Trim whitespace and trailing slashes from a content origin
pub fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// Whether `origin` looks like an absolute http(s) URL with a host
pub fn is_valid_origin(origin: &str) -> bool {
    let origin = normalize_origin(origin);
    ["https://", "http://"].iter().any(|scheme| {
        origin
            .strip_prefix(scheme)
            .is_some_and(|host| !host.is_empty() && !host.starts_with('/'))
    })
}

/// URL of the full post collection with embedded relations
pub fn posts_url(origin: &str) -> String {
    format!("{}{POSTS_ROUTE}?{EMBED_QUERY}", normalize_origin(origin))
}

/// URL of a single post with embedded relations
pub fn post_url(origin: &str, id: u64) -> String {
    format!("{}{POSTS_ROUTE}/{id}?{EMBED_QUERY}", normalize_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_url() {
        assert_eq!(
            posts_url("https://host.example"),
            "https://host.example/wp-json/wp/v2/posts?_embed=1"
        );
    }

    #[test]
    fn test_post_url_trailing_slash() {
        assert_eq!(
            post_url("https://host.example/", 123),
            "https://host.example/wp-json/wp/v2/posts/123?_embed=1"
        );
    }

    #[test]
    fn test_is_valid_origin() {
        assert!(is_valid_origin("https://host.example"));
        assert!(is_valid_origin("http://127.0.0.1:8080/"));
        assert!(!is_valid_origin("host.example"));
        assert!(!is_valid_origin("https://"));
        assert!(!is_valid_origin("ftp://host.example"));
    }
}
