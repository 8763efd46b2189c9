use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pagination::{PaginationInfo, Paginator};

/// Author name used when a post carries no usable embedded author.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A `{ "rendered": "..." }` field from the WordPress REST API
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// WordPress post as returned by `/wp-json/wp/v2/posts?_embed=1`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<WpEmbedded>,
}

/// Relations inlined by the `_embed` flag
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WpEmbedded {
    #[serde(default)]
    pub author: Vec<WpAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<WpMedia>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WpAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WpMedia {
    #[serde(default)]
    pub source_url: Option<String>,
}

/// A blog post with its embedded relations resolved
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub date: String,
    pub link: Option<String>,
    pub featured_media_url: Option<String>,
    pub author_name: String,
}

/// One card of the post list
#[derive(Debug, Serialize, Clone)]
pub struct ListItem {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub date: String,
    pub excerpt: String,
    pub featured_media_url: Option<String>,
    pub read_command: String,
}

/// A page of the post list with pagination metadata
#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub items: Vec<ListItem>,
    pub pagination: PaginationInfo,
}

/// A single post ready for display
#[derive(Debug, Serialize, Clone)]
pub struct PostOutput {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub date: String,
    pub link: Option<String>,
    pub featured_media_url: Option<String>,
    /// Post body as HTML, with table-of-contents anchors already rewritten
    pub content: String,
}

impl WpPost {
    /// Name of the first embedded author, if any
    pub fn author_name(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .author
            .first()?
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Source URL of the first embedded featured media, if any
    pub fn featured_media_url(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()?
            .source_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// Resolve a raw API post into a [`Post`]
///
/// A missing author falls back to [`UNKNOWN_AUTHOR`]. A missing featured
/// image stays `None`; no placeholder is substituted.
pub fn transform_post(post: WpPost) -> Post {
    let author_name = post
        .author_name()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let featured_media_url = post.featured_media_url().map(str::to_string);

    Post {
        id: post.id,
        title: post.title.rendered,
        content: post.content.rendered,
        excerpt: post.excerpt.rendered,
        date: post.date,
        link: post.link,
        featured_media_url,
        author_name,
    }
}

/// Resolve a collection of raw posts, preserving the API order
pub fn transform_posts(posts: Vec<WpPost>) -> Vec<Post> {
    posts.into_iter().map(transform_post).collect()
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").expect("tag pattern is valid"));

/// Strip HTML tags and decode HTML entities from text
pub fn strip_html(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

/// Format a WordPress date for display
///
/// WordPress sends site-local timestamps without an offset
/// (`2024-05-01T10:30:00`); offset-qualified RFC 3339 dates are accepted
/// too. Anything else is returned verbatim.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return dt.format("%Y-%m-%d").to_string();
    }

    date.to_string()
}

/// Convert post HTML to Markdown for terminal display
pub fn html_to_markdown(html: &str) -> String {
    html2md::parse_html(html).trim().to_string()
}

/// Build one list card from a post
pub fn to_list_item(post: &Post) -> ListItem {
    ListItem {
        id: post.id,
        title: strip_html(&post.title),
        author: post.author_name.clone(),
        date: format_date(&post.date),
        excerpt: strip_html(&post.excerpt),
        featured_media_url: post.featured_media_url.clone(),
        read_command: format!("wpblog read {}", post.id),
    }
}

/// Slice the loaded posts into the requested page and attach pagination data
///
/// `page` is expected to be in range; callers clamp it with
/// [`Paginator::clamp_page`] first.
pub fn build_list_output(posts: &[Post], paginator: &Paginator, page: usize) -> ListOutput {
    let window = paginator.window(posts.len(), page);

    ListOutput {
        items: posts[window.range()].iter().map(to_list_item).collect(),
        pagination: paginator.info(posts.len(), page),
    }
}

/// Build the single-post output
pub fn build_post_output(post: Post) -> PostOutput {
    PostOutput {
        id: post.id,
        title: strip_html(&post.title),
        author: post.author_name,
        date: format_date(&post.date),
        link: post.link,
        featured_media_url: post.featured_media_url,
        content: post.content,
    }
}
