//! Fetch activation for the post views
//!
//! A [`Fetcher`] owns the display state of one view and publishes it over a
//! `watch` channel. Each call to `activate` starts one request, moves the
//! state to `Loading` and hands back an [`Activation`]. When the request
//! finishes its result is published only if no newer activation (or
//! cancellation) happened in the meantime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use wpblog_core::anchors::AnchorRewriter;
use wpblog_core::fetch::{ActivationGuard, FetchError, FetchState, Generation};
use wpblog_core::post::{transform_post, transform_posts, Post};

use super::ContentApi;

struct Shared<T> {
    guard: Mutex<ActivationGuard>,
    state: watch::Sender<FetchState<T>>,
}

impl<T> Shared<T> {
    fn lock_guard(&self) -> MutexGuard<'_, ActivationGuard> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `result` if `generation` is still the current activation
    fn settle(&self, generation: Generation, result: Result<T, FetchError>) -> bool {
        // The guard stays locked while publishing so a concurrent activation
        // cannot slip in between the check and the send.
        let guard = self.lock_guard();
        match guard.settle(generation, result) {
            Some(state) => {
                self.state.send_replace(state);
                true
            }
            None => false,
        }
    }

    /// Drop the in-flight activation (only `generation`, when given)
    fn cancel(&self, generation: Option<Generation>) {
        let mut guard = self.lock_guard();
        if let Some(generation) = generation {
            if !guard.is_current(generation) {
                return;
            }
        }

        guard.invalidate();
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = FetchState::Idle;
                true
            } else {
                false
            }
        });
    }
}

/// Display state of one view plus the activations feeding it
pub struct Fetcher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Fetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(FetchState::Idle);

        Self {
            shared: Arc::new(Shared {
                guard: Mutex::new(ActivationGuard::new()),
                state,
            }),
        }
    }

    pub fn state(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Stream of state transitions
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    /// Start `request`, superseding any activation still in flight
    pub fn activate<F>(&self, request: F) -> Activation<T>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let generation = {
            let mut guard = self.shared.lock_guard();
            let generation = guard.begin();
            self.shared.state.send_replace(FetchState::Loading);
            generation
        };

        let receiver = self.shared.state.subscribe();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let result = request.await;
            shared.settle(generation, result);
        });

        Activation {
            generation,
            shared: Arc::clone(&self.shared),
            receiver,
            task,
        }
    }

    /// Discard the in-flight activation; a `Loading` view returns to `Idle`
    pub fn cancel(&self) {
        self.shared.cancel(None);
    }
}

impl<T> Default for Fetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Fetcher<T> {
    fn drop(&mut self) {
        self.shared.cancel(None);
    }
}

/// Handle to one activation of a [`Fetcher`]
pub struct Activation<T> {
    generation: Generation,
    shared: Arc<Shared<T>>,
    receiver: watch::Receiver<FetchState<T>>,
    task: JoinHandle<()>,
}

impl<T> Activation<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether no newer activation or cancellation has happened since this one
    pub fn is_current(&self) -> bool {
        self.shared.lock_guard().is_current(self.generation)
    }

    /// Current state of the view
    pub fn state(&self) -> FetchState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state transition
    pub async fn changed(&mut self) -> Option<FetchState<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the view leaves `Loading`
    ///
    /// The returned state is the view's, so for a superseded activation it
    /// reflects whichever activation settled the view.
    pub async fn settled(mut self) -> FetchState<T> {
        match self.receiver.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => FetchState::Idle,
        }
    }

    /// Abort the request; if this activation is still current the view returns to `Idle`
    pub fn cancel(self) {
        self.task.abort();
        self.shared.cancel(Some(self.generation));
    }
}

/// Loads every post for the list view
pub struct PostListFetcher<A> {
    api: Arc<A>,
    fetcher: Fetcher<Vec<Post>>,
}

impl<A: ContentApi> PostListFetcher<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            fetcher: Fetcher::new(),
        }
    }

    pub fn activate(&self) -> Activation<Vec<Post>> {
        let api = Arc::clone(&self.api);
        self.fetcher
            .activate(async move { api.fetch_posts().await.map(transform_posts) })
    }

    pub fn state(&self) -> FetchState<Vec<Post>> {
        self.fetcher.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Post>>> {
        self.fetcher.subscribe()
    }

    pub fn cancel(&self) {
        self.fetcher.cancel();
    }
}

/// Loads one post for the detail view, with its table-of-contents links fixed
pub struct PostDetailFetcher<A> {
    api: Arc<A>,
    rewriter: AnchorRewriter,
    fetcher: Fetcher<Post>,
}

impl<A: ContentApi> PostDetailFetcher<A> {
    pub fn new(api: Arc<A>, rewriter: AnchorRewriter) -> Self {
        Self {
            api,
            rewriter,
            fetcher: Fetcher::new(),
        }
    }

    pub fn activate(&self, id: u64) -> Activation<Post> {
        let api = Arc::clone(&self.api);
        let rewriter = self.rewriter.clone();

        self.fetcher.activate(async move {
            let mut post = transform_post(api.fetch_post(id).await?);
            post.content = rewriter.rewrite(&post.content);
            Ok(post)
        })
    }

    pub fn state(&self) -> FetchState<Post> {
        self.fetcher.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Post>> {
        self.fetcher.subscribe()
    }

    pub fn cancel(&self) {
        self.fetcher.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::oneshot;
    use wpblog_core::post::WpPost;

    const ORIGIN: &str = "https://host.example";

    /// In-memory content API; requests for gated ids wait until released
    #[derive(Default)]
    struct FakeApi {
        posts: Vec<WpPost>,
        list_error: Option<FetchError>,
        gates: Mutex<HashMap<u64, oneshot::Receiver<()>>>,
    }

    impl FakeApi {
        fn with_posts(ids: &[u64]) -> Self {
            let posts = ids.iter().map(|id| fake_post(*id)).collect();
            Self {
                posts,
                ..Default::default()
            }
        }

        fn gate(&self, id: u64) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(id, rx);
            tx
        }
    }

    impl ContentApi for FakeApi {
        async fn fetch_posts(&self) -> Result<Vec<WpPost>, FetchError> {
            match &self.list_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.posts.clone()),
            }
        }

        async fn fetch_post(&self, id: u64) -> Result<WpPost, FetchError> {
            let gate = self.gates.lock().unwrap().remove(&id);
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            self.posts
                .iter()
                .find(|post| post.id == id)
                .cloned()
                .ok_or(FetchError::NotFound)
        }
    }

    fn fake_post(id: u64) -> WpPost {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": { "rendered": format!("Post {id}") },
            "content": {
                "rendered": format!(r#"<a href="{ORIGIN}/post-{id}/#intro">Intro</a>"#)
            }
        }))
        .unwrap()
    }

    fn detail_fetcher(api: FakeApi) -> PostDetailFetcher<FakeApi> {
        PostDetailFetcher::new(Arc::new(api), AnchorRewriter::new(ORIGIN).unwrap())
    }

    #[tokio::test]
    async fn test_list_fetcher_loads_posts_in_order() {
        let fetcher = PostListFetcher::new(Arc::new(FakeApi::with_posts(&[3, 1, 2])));
        assert_eq!(fetcher.state(), FetchState::Idle);

        let activation = fetcher.activate();
        let state = activation.settled().await;

        let ids: Vec<u64> = state.data().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(fetcher.state(), state);
    }

    #[tokio::test]
    async fn test_list_fetcher_failure() {
        let api = FakeApi {
            list_error: Some(FetchError::RequestFailed),
            ..Default::default()
        };
        let fetcher = PostListFetcher::new(Arc::new(api));

        let state = fetcher.activate().settled().await;

        assert_eq!(state, FetchState::Failed("Failed to load posts".to_string()));
    }

    #[tokio::test]
    async fn test_list_fetcher_reactivation_returns_to_loading() {
        let api = FakeApi {
            list_error: Some(FetchError::Transport("connection refused".to_string())),
            ..Default::default()
        };
        let fetcher = PostListFetcher::new(Arc::new(api));

        let first = fetcher.activate().settled().await;
        assert_eq!(first.error(), Some("connection refused"));

        let second = fetcher.activate();
        assert_eq!(second.state(), FetchState::Loading);
        assert_eq!(second.settled().await.error(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_activation_starts_in_loading() {
        let api = FakeApi::with_posts(&[1]);
        let release = api.gate(1);
        let fetcher = detail_fetcher(api);

        let activation = fetcher.activate(1);
        assert_eq!(activation.state(), FetchState::Loading);
        assert_eq!(fetcher.state(), FetchState::Loading);

        release.send(()).unwrap();
        assert!(activation.settled().await.data().is_some());
    }

    #[tokio::test]
    async fn test_detail_fetcher_fixes_anchors() {
        let fetcher = detail_fetcher(FakeApi::with_posts(&[7]));

        let post = fetcher.activate(7).settled().await.data().cloned().unwrap();

        assert_eq!(post.id, 7);
        assert_eq!(post.content, r##"<a href="#intro">Intro</a>"##);
        assert_eq!(post.author_name, "Unknown Author");
        assert!(post.featured_media_url.is_none());
    }

    #[tokio::test]
    async fn test_detail_fetcher_not_found() {
        let fetcher = detail_fetcher(FakeApi::with_posts(&[7]));

        let state = fetcher.activate(99).settled().await;

        assert_eq!(state, FetchState::Failed("Post not found".to_string()));
    }

    #[tokio::test]
    async fn test_stale_success_does_not_overwrite_newer_state() {
        let api = FakeApi::with_posts(&[1, 2]);
        let release_first = api.gate(1);
        let fetcher = detail_fetcher(api);

        let first = fetcher.activate(1);
        let second = fetcher.activate(2);
        assert!(!first.is_current());
        assert!(second.is_current());

        let state = second.settled().await;
        assert_eq!(state.data().map(|p| p.id), Some(2));

        release_first.send(()).unwrap();
        first.task.await.unwrap();

        assert_eq!(fetcher.state().data().map(|p| p.id), Some(2));
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_overwrite_newer_state() {
        let api = FakeApi::with_posts(&[2]);
        // Post 1 does not exist, so the late response is a failure
        let release_missing = api.gate(1);
        let fetcher = detail_fetcher(api);

        let first = fetcher.activate(1);
        let second = fetcher.activate(2);
        assert_eq!(second.settled().await.data().map(|p| p.id), Some(2));

        release_missing.send(()).unwrap();
        first.task.await.unwrap();

        assert_eq!(fetcher.state().data().map(|p| p.id), Some(2));
        assert!(fetcher.state().error().is_none());
    }

    #[tokio::test]
    async fn test_newer_activation_wins_even_if_it_settles_first() {
        let api = FakeApi::with_posts(&[1, 2]);
        let release_second = api.gate(2);
        let fetcher = detail_fetcher(api);

        let mut states = fetcher.subscribe();
        let first = fetcher.activate(1);
        let second = fetcher.activate(2);

        // The first request resolves immediately but is already superseded
        first.task.await.unwrap();
        assert_eq!(fetcher.state(), FetchState::Loading);

        release_second.send(()).unwrap();
        second.task.await.unwrap();

        assert!(states.has_changed().unwrap());
        let state = states.borrow_and_update().clone();
        assert_eq!(state.data().map(|p| p.id), Some(2));
    }

    #[tokio::test]
    async fn test_cancel_discards_late_response() {
        let api = FakeApi::with_posts(&[1]);
        let release = api.gate(1);
        let fetcher = detail_fetcher(api);

        let activation = fetcher.activate(1);
        fetcher.cancel();
        assert_eq!(fetcher.state(), FetchState::Idle);

        let _ = release.send(());
        activation.task.await.unwrap();

        assert_eq!(fetcher.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_activation_cancel_aborts_request() {
        let api = FakeApi::with_posts(&[1]);
        let _release = api.gate(1);
        let fetcher = detail_fetcher(api);

        let activation = fetcher.activate(1);
        activation.cancel();

        assert_eq!(fetcher.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_cancelling_superseded_activation_keeps_newer_state() {
        let api = FakeApi::with_posts(&[1, 2]);
        let _release_first = api.gate(1);
        let fetcher = detail_fetcher(api);

        let first = fetcher.activate(1);
        let second = fetcher.activate(2);
        let state = second.settled().await;

        first.cancel();

        assert_eq!(fetcher.state(), state);
        assert_eq!(state.data().map(|p| p.id), Some(2));
    }

    #[tokio::test]
    async fn test_changed_reports_transitions() {
        let api = FakeApi::with_posts(&[1]);
        let release = api.gate(1);
        let fetcher = detail_fetcher(api);

        let mut activation = fetcher.activate(1);
        release.send(()).unwrap();

        let next = activation.changed().await.unwrap();
        assert_eq!(next.data().map(|p| p.id), Some(1));
    }
}
