use std::sync::Arc;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use wpblog_core::anchors::AnchorRewriter;
use wpblog_core::api::post_url;
use wpblog_core::post::{build_post_output, html_to_markdown, PostOutput};

use super::{into_loaded, BlogConfig, ContentApi, PostDetailFetcher, WpClient};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReadOptions {
    /// WordPress post ID (e.g., "123")
    #[clap(env = "WPBLOG_POST")]
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ReadOptions, global: crate::Global) -> Result<()> {
    let config = BlogConfig::from_global(&global)?;

    if global.verbose {
        eprintln!("Content origin: {}", config.origin);
        eprintln!("Fetching {}", post_url(&config.origin, options.id));
    }

    let post = read_post_data(&config, options.id).await?;

    if options.json {
        output_json(&post)?;
    } else {
        print!("{}", format_post_text(&post));
    }

    Ok(())
}

/// Fetches one post and returns it as a structured PostOutput
pub async fn read_post_data(config: &BlogConfig, id: u64) -> Result<PostOutput> {
    let client = WpClient::new(config)?;
    let rewriter = AnchorRewriter::new(&config.origin)
        .map_err(|e| eyre!("Failed to build anchor pattern for {}: {}", config.origin, e))?;

    read_post_with(Arc::new(client), rewriter, id).await
}

/// Same as [`read_post_data`] against any content API
pub async fn read_post_with<A: ContentApi>(
    api: Arc<A>,
    rewriter: AnchorRewriter,
    id: u64,
) -> Result<PostOutput> {
    let fetcher = PostDetailFetcher::new(api, rewriter);
    let post = into_loaded(fetcher.activate(id).settled().await)?;

    Ok(build_post_output(post))
}

/// Build JSON string for a post
fn format_post_json(post: &PostOutput) -> Result<String> {
    serde_json::to_string_pretty(post).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn output_json(post: &PostOutput) -> Result<()> {
    let json = format_post_json(post)?;
    println!("{}", json);
    Ok(())
}

/// Convert a post to formatted text with colors
fn format_post_text(post: &PostOutput) -> String {
    let mut result = String::new();
    let title = if post.title.is_empty() {
        "(No title)"
    } else {
        post.title.as_str()
    };

    // Post header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!(
        "{} {} • {}\n",
        "By".green(),
        post.author.bright_white(),
        post.date.bright_black()
    ));

    if let Some(url) = &post.featured_media_url {
        result.push_str(&format!(
            "{}: {}\n",
            "Image".green(),
            url.cyan().underline()
        ));
    }

    if let Some(link) = &post.link {
        result.push_str(&format!("{}: {}\n", "Link".green(), link.cyan()));
    }

    result.push_str(&format!("{}: {}\n", "ID".green(), post.id));

    let content = html_to_markdown(&post.content);
    if content.is_empty() {
        result.push_str(&format!("\n{}\n", "This post has no content.".yellow()));
    } else {
        result.push_str(&format!("\n{content}\n"));
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!("\n{}:\n", "Back to Blog".bright_white().bold()));
    result.push_str(&format!("  {}\n", "wpblog list".cyan()));

    result.push_str(&format!(
        "\n{}:\n",
        "To get JSON output".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("wpblog read {} --json", post.id).cyan()
    ));

    result.push('\n');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpblog_core::fetch::FetchError;
    use wpblog_core::post::WpPost;

    const ORIGIN: &str = "https://host.example";

    struct SinglePostApi(WpPost);

    impl ContentApi for SinglePostApi {
        async fn fetch_posts(&self) -> Result<Vec<WpPost>, FetchError> {
            Ok(vec![self.0.clone()])
        }

        async fn fetch_post(&self, id: u64) -> Result<WpPost, FetchError> {
            if id == self.0.id {
                Ok(self.0.clone())
            } else {
                Err(FetchError::NotFound)
            }
        }
    }

    fn api() -> Arc<SinglePostApi> {
        let post = serde_json::from_value(serde_json::json!({
            "id": 12,
            "date": "2024-05-01T10:30:00",
            "title": { "rendered": "Campaign &amp; Strategy" },
            "content": {
                "rendered": concat!(
                    r#"<ul><li><a href="https://host.example/campaign/#plan">Plan</a></li></ul>"#,
                    r#"<h2 id="plan">Plan</h2><p>Details</p>"#
                )
            },
            "_embedded": {
                "author": [{ "name": "Jane Doe" }],
                "wp:featuredmedia": [{ "source_url": "https://host.example/cover.jpg" }]
            }
        }))
        .unwrap();

        Arc::new(SinglePostApi(post))
    }

    fn rewriter() -> AnchorRewriter {
        AnchorRewriter::new(ORIGIN).unwrap()
    }

    fn create_test_post() -> PostOutput {
        PostOutput {
            id: 12,
            title: "Campaign & Strategy".to_string(),
            author: "Jane Doe".to_string(),
            date: "2024-05-01".to_string(),
            link: None,
            featured_media_url: None,
            content: "<p>Hello <strong>world</strong></p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_post_with_fixes_anchors() {
        let post = read_post_with(api(), rewriter(), 12).await.unwrap();

        assert_eq!(post.title, "Campaign & Strategy");
        assert_eq!(post.author, "Jane Doe");
        assert_eq!(post.date, "2024-05-01");
        assert!(post.content.contains(r##"<a href="#plan">Plan</a>"##));
        assert!(!post.content.contains("https://host.example/campaign/"));
        assert_eq!(
            post.featured_media_url,
            Some("https://host.example/cover.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_read_post_with_not_found() {
        let err = read_post_with(api(), rewriter(), 404).await.unwrap_err();

        assert_eq!(err.to_string(), "Post not found");
    }

    #[test]
    fn test_format_post_json() {
        let json = format_post_json(&create_test_post()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["id"], 12);
        assert_eq!(parsed["author"], "Jane Doe");
        assert!(parsed["featured_media_url"].is_null());
    }

    #[test]
    fn test_format_post_text() {
        let formatted = format_post_text(&create_test_post());

        assert!(formatted.contains("Campaign & Strategy"));
        assert!(formatted.contains("Jane Doe"));
        assert!(formatted.contains("2024-05-01"));
        assert!(formatted.contains("world"));
        assert!(!formatted.contains("<strong>"));
        assert!(formatted.contains("wpblog read 12 --json"));
    }

    #[test]
    fn test_format_post_text_without_media() {
        let formatted = format_post_text(&create_test_post());

        assert!(!formatted.contains("Image"));
    }

    #[test]
    fn test_format_post_text_with_media() {
        let mut post = create_test_post();
        post.featured_media_url = Some("https://host.example/cover.jpg".to_string());

        let formatted = format_post_text(&post);

        assert!(formatted.contains("https://host.example/cover.jpg"));
    }

    #[test]
    fn test_format_post_text_empty_content() {
        let mut post = create_test_post();
        post.content = String::new();

        let formatted = format_post_text(&post);

        assert!(formatted.contains("This post has no content."));
    }
}
