use std::sync::Arc;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use wpblog_core::api::posts_url;
use wpblog_core::pagination::{Paginator, POSTS_PER_PAGE};
use wpblog_core::post::{build_list_output, ListItem, ListOutput};

use super::{into_loaded, BlogConfig, ContentApi, PostListFetcher, WpClient};

const EXCERPT_MAX_CHARS: usize = 300;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Number of posts per page
    #[arg(short, long, env = "WPBLOG_LIMIT", default_value_t = POSTS_PER_PAGE)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let config = BlogConfig::from_global(&global)?;

    if global.verbose {
        eprintln!("Content origin: {}", config.origin);
        eprintln!("Fetching {}", posts_url(&config.origin));
    }

    let list_output = list_posts_data(&config, options.page, options.limit).await?;

    if global.verbose {
        eprintln!(
            "Loaded {} posts, showing page {} of {}",
            list_output.pagination.total_items,
            list_output.pagination.current_page,
            list_output.pagination.total_pages
        );
    }

    if options.json {
        output_json(&list_output)?;
    } else {
        print!("{}", format_list_text(&list_output));
    }

    Ok(())
}

/// Fetches every post and returns the requested page as a structured ListOutput
pub async fn list_posts_data(config: &BlogConfig, page: usize, limit: usize) -> Result<ListOutput> {
    let client = WpClient::new(config)?;
    list_posts_with(Arc::new(client), page, limit).await
}

/// Same as [`list_posts_data`] against any content API
pub async fn list_posts_with<A: ContentApi>(
    api: Arc<A>,
    page: usize,
    limit: usize,
) -> Result<ListOutput> {
    let paginator = Paginator::new(limit)?;
    let fetcher = PostListFetcher::new(api);

    let posts = into_loaded(fetcher.activate().settled().await)?;
    let page = paginator.clamp_page(posts.len(), page);

    Ok(build_list_output(&posts, &paginator, page))
}

/// Convert list output to JSON string
fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn output_json(output: &ListOutput) -> Result<()> {
    let json = format_list_json(output)?;
    println!("{}", json);
    Ok(())
}

/// Shorten `text` to at most `max_chars` characters, on a char boundary
fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn format_item(result: &mut String, number: usize, item: &ListItem) {
    let title = if item.title.is_empty() {
        "(No title)"
    } else {
        item.title.as_str()
    };

    result.push_str(&format!(
        "\n{} {}\n",
        format!("[{number}]").yellow().bold(),
        title.white().bold()
    ));

    result.push_str(&format!(
        "    {} {} • {}\n",
        "By".green(),
        item.author.bright_white(),
        item.date.bright_black()
    ));

    if let Some(url) = &item.featured_media_url {
        result.push_str(&format!(
            "    {}: {}\n",
            "Image".green(),
            url.cyan().underline()
        ));
    }

    if !item.excerpt.is_empty() {
        result.push_str(&format!(
            "    {}\n",
            truncate_text(&item.excerpt, EXCERPT_MAX_CHARS)
        ));
    }

    result.push_str(&format!(
        "    {}: {} | {}: {}\n",
        "ID".green(),
        item.id.to_string().bright_white(),
        "Read More".green(),
        item.read_command.cyan()
    ));
}

/// Convert list output to formatted text with colors
fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();
    let pagination = &output.pagination;

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "BLOG POSTS (Page {} of {})",
            pagination.current_page, pagination.total_pages
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.items.is_empty() {
        result.push_str(&format!("\n{}\n", "No posts on this page.".yellow()));
    } else {
        let first_number = (pagination.current_page - 1) * pagination.limit + 1;
        for (idx, item) in output.items.iter().enumerate() {
            format_item(&mut result, first_number + idx, item);
        }
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
        pagination.total_items.to_string().bright_cyan().bold(),
        "total posts".bright_white()
    ));

    if pagination.next_page_command.is_some() || pagination.prev_page_command.is_some() {
        result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    }
    if let Some(next) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }
    if let Some(prev) = &pagination.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }
    if pagination.next_page_command.is_none() && pagination.current_page > 1 {
        result.push_str(&format!(
            "  {}: {}\n",
            "First page".green(),
            "wpblog list --page 1".cyan()
        ));
    }

    result.push_str(&format!("\n{}:\n", "To read a post".bright_white().bold()));
    result.push_str(&format!("  {}\n", "wpblog read <id>".cyan()));
    if let Some(first) = output.items.first() {
        result.push_str(&format!(
            "  {}: {}\n",
            "Example".green(),
            first.read_command.cyan()
        ));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To get JSON output".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("wpblog list --page {} --json", pagination.current_page).cyan()
    ));

    result.push('\n');
    result
}
