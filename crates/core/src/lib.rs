//! Core library for wpblog
//!
//! This crate implements the **Functional Core** of the wpblog application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`wpblog_core`** (this crate): Pure transformation functions with zero I/O
//! - **`wpblog`**: HTTP requests, fetch activation and rendering (the Imperative Shell)
//!
//! Everything here is deterministic and testable with fixture data; no HTTP
//! mocking is required.
//!
//! # Module Organization
//!
//! - [`api`]: Content API endpoint URLs
//! - [`anchors`]: Rewriting of absolute table-of-contents links into in-page anchors
//! - [`fetch`]: Fetch states, error taxonomy and the stale-response guard
//! - [`pagination`]: Client-side page slicing over a loaded list
//! - [`post`]: WordPress post payloads and their display models
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use wpblog_core::pagination::Paginator;
//! use wpblog_core::post::{build_list_output, transform_posts, WpPost};
//!
//! let raw: Vec<WpPost> = serde_json::from_str(payload)?;
//! let posts = transform_posts(raw);
//!
//! let output = build_list_output(&posts, &Paginator::default(), 1);
//! assert!(output.items.len() <= 4);
//! ```

pub mod anchors;
pub mod api;
pub mod fetch;
pub mod pagination;
pub mod post;
