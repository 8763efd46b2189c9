//! Table-of-contents anchor rewriting
//!
//! Post bodies authored in WordPress link their table of contents with
//! absolute URLs on the content host (`https://host/post-slug/#section`).
//! Rendered anywhere else those links leave the page, so they are rewritten
//! to same-page fragments (`#section`).

use regex::Regex;

/// Rewrites absolute content-host links up to their first `#` into `#`
#[derive(Debug, Clone)]
pub struct AnchorRewriter {
    pattern: Regex,
}

impl AnchorRewriter {
    /// Build a rewriter bound to `origin` (e.g. `https://host.example`)
    ///
    /// Either scheme matches; the host (and any base path) must match
    /// literally.
    pub fn new(origin: &str) -> Result<Self, regex::Error> {
        let host = origin_host(origin);
        let pattern = Regex::new(&format!(r"https?://{}/[^#]*#", regex::escape(host)))?;

        Ok(Self { pattern })
    }

    pub fn rewrite(&self, html: &str) -> String {
        self.pattern.replace_all(html, "#").into_owned()
    }
}

/// Strip the scheme and trailing slashes from an origin
fn origin_host(origin: &str) -> &str {
    let origin = origin.trim();
    let host = origin
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(origin);

    host.trim_end_matches('/')
}

/// Rewrite every absolute `origin` link in `html` into a same-page anchor
///
/// Applying it twice gives the same result as applying it once.
pub fn fix_anchors(html: &str, origin: &str) -> Result<String, regex::Error> {
    Ok(AnchorRewriter::new(origin)?.rewrite(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://host.example";

    fn fix(html: &str) -> String {
        fix_anchors(html, ORIGIN).unwrap()
    }

    #[test]
    fn test_fix_anchors_single_link() {
        let html = r#"<a href="https://host.example/path/to/page#section-1">x</a>"#;
        assert_eq!(fix(html), r##"<a href="#section-1">x</a>"##);
    }

    #[test]
    fn test_fix_anchors_multiple_links() {
        let html = concat!(
            r#"<li><a href="https://host.example/post/#intro">Intro</a></li>"#,
            r#"<li><a href="http://host.example/post/#usage">Usage</a></li>"#,
        );

        assert_eq!(
            fix(html),
            concat!(
                r##"<li><a href="#intro">Intro</a></li>"##,
                r##"<li><a href="#usage">Usage</a></li>"##,
            )
        );
    }

    #[test]
    fn test_fix_anchors_other_host_untouched() {
        let html = r#"<a href="https://elsewhere.example/page#frag">x</a>"#;
        assert_eq!(fix(html), html);
    }

    #[test]
    fn test_fix_anchors_host_is_literal() {
        // The dot in the host must not match arbitrary characters
        let html = r#"<a href="https://hostXexample/page#frag">x</a>"#;
        assert_eq!(fix(html), html);
    }

    #[test]
    fn test_fix_anchors_link_without_fragment_untouched() {
        let html = r#"<a href="https://host.example/about/">About</a>"#;
        assert_eq!(fix(html), html);
    }

    #[test]
    fn test_fix_anchors_stops_at_first_hash() {
        let html = "https://host.example/a#b#c";
        assert_eq!(fix(html), "#b#c");
    }

    #[test]
    fn test_fix_anchors_idempotent() {
        let inputs = [
            r#"<a href="https://host.example/path/to/page#section-1">x</a>"#,
            "https://host.example/https://host.example/x#y#",
            "hhttps://host.example/a#https://host.example/b#c",
            r#"<p>No links here</p>"#,
            "https://host.example/no-fragment",
            "",
        ];

        for input in inputs {
            let once = fix(input);
            assert_eq!(fix(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_fix_anchors_origin_with_trailing_slash() {
        let html = r#"<a href="https://host.example/page#top">x</a>"#;
        let fixed = fix_anchors(html, "https://host.example/").unwrap();
        assert_eq!(fixed, r##"<a href="#top">x</a>"##);
    }

    #[test]
    fn test_fix_anchors_origin_with_base_path() {
        let rewriter = AnchorRewriter::new("https://host.example/blog").unwrap();

        assert_eq!(
            rewriter.rewrite(r#"<a href="https://host.example/blog/post#a">x</a>"#),
            r##"<a href="#a">x</a>"##
        );
        assert_eq!(
            rewriter.rewrite(r#"<a href="https://host.example/shop/item#a">x</a>"#),
            r#"<a href="https://host.example/shop/item#a">x</a>"#
        );
    }

    #[test]
    fn test_origin_host() {
        assert_eq!(origin_host("https://host.example"), "host.example");
        assert_eq!(origin_host("http://host.example//"), "host.example");
        assert_eq!(origin_host("host.example"), "host.example");
    }
}
