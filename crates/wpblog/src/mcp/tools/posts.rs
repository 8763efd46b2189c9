use crate::posts::list::list_posts_data;
use crate::posts::read::read_post_data;
use crate::posts::BlogConfig;
use crate::prelude::{eprintln, *};
use serde::{Deserialize, Serialize};
use wpblog_core::pagination::POSTS_PER_PAGE;

use super::{CallToolResult, JsonRpcError};

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    // Tools called without arguments behave like an empty object
    let arguments = match arguments {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };

    serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))
}

fn config(global: &crate::Global) -> Result<BlogConfig, JsonRpcError> {
    BlogConfig::from_global(global)
        .map_err(|e| JsonRpcError::internal(format!("Configuration error: {e}")))
}

/// Wrap tool output (or a fetch failure) in the MCP result envelope
fn tool_result<T: Serialize>(outcome: Result<T>) -> Result<serde_json::Value, JsonRpcError> {
    let result = match outcome {
        Ok(data) => {
            let json_string = serde_json::to_string_pretty(&data)
                .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;
            CallToolResult::text(json_string)
        }
        Err(e) => CallToolResult::error(e.to_string()),
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_blog_list_posts(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct BlogListPostsArgs {
        page: Option<usize>,
        limit: Option<usize>,
    }

    let args: BlogListPostsArgs = parse_args(arguments)?;

    if args.limit == Some(0) {
        return Err(JsonRpcError::invalid_params("limit must be at least 1"));
    }

    if global.verbose {
        eprintln!(
            "Calling blog_list_posts: page={:?}, limit={:?}",
            args.page, args.limit
        );
    }

    let config = config(global)?;
    let outcome = list_posts_data(
        &config,
        args.page.unwrap_or(1),
        args.limit.unwrap_or(POSTS_PER_PAGE),
    )
    .await;

    tool_result(outcome)
}

pub async fn handle_blog_read_post(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct BlogReadPostArgs {
        id: u64,
    }

    let args: BlogReadPostArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!("Calling blog_read_post: id={}", args.id);
    }

    let config = config(global)?;
    let outcome = read_post_data(&config, args.id).await;

    tool_result(outcome)
}
