//! Fetch lifecycle shared by the list and detail views
//!
//! Every activation moves a view through `Idle -> Loading -> {Failed, Loaded}`.
//! Activations are re-entrant: a new one returns to `Loading` whatever the
//! previous terminal state was. [`ActivationGuard`] numbers activations so a
//! response that arrives after a newer activation has started is dropped
//! instead of overwriting fresher state.

use serde::Serialize;

/// Failures of a content API request
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network-level failure (DNS, refused connection, timeout)
    #[error("{0}")]
    Transport(String),

    /// The response body was not the expected JSON
    #[error("{0}")]
    Decode(String),

    /// Non-success status on the single-post endpoint
    #[error("Post not found")]
    NotFound,

    /// Non-success status on the post list endpoint
    #[error("Failed to load posts")]
    RequestFailed,
}

/// Display state of one fetch
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> FetchState<T> {
    /// Terminal state for a finished request
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => FetchState::Loaded(data),
            Err(err) => FetchState::Failed(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// `Failed` or `Loaded`
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Failed(_) | FetchState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            FetchState::Idle => FetchState::Idle,
            FetchState::Loading => FetchState::Loading,
            FetchState::Failed(message) => FetchState::Failed(message),
            FetchState::Loaded(data) => FetchState::Loaded(f(data)),
        }
    }
}

/// Sequence number of one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Tracks which activation is current
///
/// A response is only applied when the generation it was issued under is
/// still the latest one.
#[derive(Debug, Default)]
pub struct ActivationGuard {
    current: u64,
}

impl ActivationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new activation, superseding every earlier one
    pub fn begin(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Supersede the current activation without starting another one
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }

    /// Terminal state for `result`, or `None` when `generation` is stale
    pub fn settle<T>(
        &self,
        generation: Generation,
        result: Result<T, FetchError>,
    ) -> Option<FetchState<T>> {
        self.is_current(generation)
            .then(|| FetchState::from_result(result))
    }
}
