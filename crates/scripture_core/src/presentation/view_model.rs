//! Corpus browsing view model.
//!
//! # Responsibility
//! - Expose one request operation per use case.
//! - Publish an immutable [`RequestState`] snapshot per request type through a
//!   `tokio::sync::watch` channel.
//!
//! # Invariants
//! - A request sets `loading = true` and clears `error` in one publish before
//!   any I/O starts.
//! - Use cases run on the blocking pool; the calling thread never waits on
//!   storage.
//! - `loading` returns to `false` once the latest request of a type finishes,
//!   including when its worker panics.
//! - On failure `items` keeps its previous value and `error` holds a
//!   descriptive message.
//! - Requests are not cancelled. When requests of one type overlap, only the
//!   most recently issued one publishes; earlier outcomes are discarded.

use crate::model::corpus::{Book, BookId, Translation, Verse};
use crate::repo::bible_repo::{BibleRepository, RepoResult};
use crate::service::corpus_use_cases::CorpusUseCases;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Snapshot of one request type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState<T> {
    /// Latest successful result; empty until the first success.
    pub items: Vec<T>,
    /// Whether a request of this type is in flight.
    pub loading: bool,
    /// Message of the latest failure, cleared when a new request starts.
    pub error: Option<String>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

struct RequestChannel<T> {
    sender: watch::Sender<RequestState<T>>,
    /// Id of the latest issued request; only read or bumped inside the
    /// sender's write lock.
    generation: AtomicU64,
}

type StateChannel<T> = Arc<RequestChannel<T>>;

/// State holder for translation, book, chapter and search requests.
pub struct CorpusViewModel<R: BibleRepository + 'static> {
    use_cases: Arc<CorpusUseCases<R>>,
    runtime: Handle,
    translations: StateChannel<Translation>,
    books: StateChannel<Book>,
    verses: StateChannel<Verse>,
    search_results: StateChannel<Verse>,
}

impl<R: BibleRepository + 'static> CorpusViewModel<R> {
    /// Creates an idle view model dispatching work onto `runtime`.
    pub fn new(use_cases: CorpusUseCases<R>, runtime: Handle) -> Self {
        Self {
            use_cases: Arc::new(use_cases),
            runtime,
            translations: new_channel(),
            books: new_channel(),
            verses: new_channel(),
            search_results: new_channel(),
        }
    }

    /// Creates a view model and immediately requests the translation list.
    pub fn start(use_cases: CorpusUseCases<R>, runtime: Handle) -> Self {
        let view_model = Self::new(use_cases, runtime);
        // Completion is observed through the translations channel.
        drop(view_model.load_translations());
        view_model
    }

    pub fn translations(&self) -> RequestState<Translation> {
        self.translations.sender.borrow().clone()
    }

    pub fn books(&self) -> RequestState<Book> {
        self.books.sender.borrow().clone()
    }

    pub fn verses(&self) -> RequestState<Verse> {
        self.verses.sender.borrow().clone()
    }

    pub fn search_results(&self) -> RequestState<Verse> {
        self.search_results.sender.borrow().clone()
    }

    pub fn subscribe_translations(&self) -> watch::Receiver<RequestState<Translation>> {
        self.translations.sender.subscribe()
    }

    pub fn subscribe_books(&self) -> watch::Receiver<RequestState<Book>> {
        self.books.sender.subscribe()
    }

    pub fn subscribe_verses(&self) -> watch::Receiver<RequestState<Verse>> {
        self.verses.sender.subscribe()
    }

    pub fn subscribe_search_results(&self) -> watch::Receiver<RequestState<Verse>> {
        self.search_results.sender.subscribe()
    }

    /// Requests the translation list.
    pub fn load_translations(&self) -> JoinHandle<()> {
        self.dispatch(
            &self.translations,
            "load_translations",
            "Failed to load translations",
            |use_cases| use_cases.get_translations.execute(),
        )
    }

    /// Requests the books of `translation_code`.
    pub fn load_books(&self, translation_code: impl Into<String>) -> JoinHandle<()> {
        let translation_code = translation_code.into();
        self.dispatch(
            &self.books,
            "load_books",
            "Failed to load books",
            move |use_cases| use_cases.get_books.execute(&translation_code),
        )
    }

    /// Requests the verses of one chapter.
    pub fn load_verses(&self, book_id: BookId, chapter: u32) -> JoinHandle<()> {
        self.dispatch(
            &self.verses,
            "load_verses",
            "Failed to load verses",
            move |use_cases| use_cases.get_verses.execute(book_id, chapter),
        )
    }

    /// Requests verses containing `query_text`.
    pub fn search_verses(&self, query_text: impl Into<String>) -> JoinHandle<()> {
        let query_text = query_text.into();
        self.dispatch(
            &self.search_results,
            "search_verses",
            "Failed to search verses",
            move |use_cases| use_cases.search_verses.execute(&query_text),
        )
    }

    fn dispatch<T, F>(
        &self,
        channel: &StateChannel<T>,
        op: &'static str,
        failure_prefix: &'static str,
        call: F,
    ) -> JoinHandle<()>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&CorpusUseCases<R>) -> RepoResult<Vec<T>> + Send + 'static,
    {
        let mut generation = 0;
        channel.sender.send_modify(|state| {
            generation = channel.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.error = None;
        });

        let channel = Arc::clone(channel);
        let use_cases = Arc::clone(&self.use_cases);
        self.runtime.spawn(async move {
            let started_at = Instant::now();
            let outcome = tokio::task::spawn_blocking(move || call(use_cases.as_ref())).await;
            let duration_ms = started_at.elapsed().as_millis();

            let outcome = match outcome {
                Ok(Ok(items)) => Ok(items),
                Ok(Err(err)) => Err(format!("{failure_prefix}: {err}")),
                Err(join_err) => Err(format!(
                    "{failure_prefix}: worker stopped unexpectedly ({join_err})"
                )),
            };

            let rows = outcome.as_ref().ok().map(Vec::len);
            let published = channel.sender.send_if_modified(|state| {
                if channel.generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                match outcome {
                    Ok(items) => state.items = items,
                    Err(message) => state.error = Some(message),
                }
                state.loading = false;
                true
            });

            match rows {
                _ if !published => debug!(
                    "event=view_request module=presentation op={op} status=superseded duration_ms={duration_ms}"
                ),
                Some(rows) => info!(
                    "event=view_request module=presentation op={op} status=ok rows={rows} duration_ms={duration_ms}"
                ),
                None => warn!(
                    "event=view_request module=presentation op={op} status=error duration_ms={duration_ms}"
                ),
            }
        })
    }
}

fn new_channel<T>() -> StateChannel<T> {
    let (sender, _receiver) = watch::channel(RequestState::default());
    Arc::new(RequestChannel {
        sender,
        generation: AtomicU64::new(0),
    })
}

#[cfg(test)]
mod tests {
    use super::{CorpusViewModel, RequestState};
    use crate::db::DbError;
    use crate::model::corpus::{Book, BookId, Translation, Verse};
    use crate::repo::bible_repo::{BibleRepository, RepoError, RepoResult};
    use crate::service::corpus_use_cases::CorpusUseCases;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use tokio::runtime::Handle;

    struct FakeRepository {
        fail: AtomicBool,
        gate: Option<(Barrier, Barrier)>,
    }

    impl FakeRepository {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                gate: None,
            }
        }

        fn gated() -> Self {
            Self {
                fail: AtomicBool::new(false),
                gate: Some((Barrier::new(2), Barrier::new(2))),
            }
        }

        fn check(&self) -> RepoResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery)));
            }
            Ok(())
        }
    }

    impl BibleRepository for FakeRepository {
        fn list_translations(&self) -> RepoResult<Vec<Translation>> {
            self.check()?;
            Ok(vec![Translation {
                short_name: "kjv".to_string(),
                name: "King James Version".to_string(),
                language: "en".to_string(),
                size: 1000,
            }])
        }

        fn list_books(&self, translation_code: &str) -> RepoResult<Vec<Book>> {
            let gate = self.gate.as_ref().filter(|_| translation_code == "slow");
            if let Some((entered, release)) = gate {
                entered.wait();
                release.wait();
            }
            self.check()?;
            Ok(vec![Book {
                id: 1,
                name: format!("Genesis ({translation_code})"),
                short_name: "Gen".to_string(),
            }])
        }

        fn list_verses(&self, book_id: BookId, chapter: u32) -> RepoResult<Vec<Verse>> {
            self.check()?;
            Ok(vec![Verse {
                book_id,
                chapter,
                verse: 1,
                text: "In the beginning...".to_string(),
            }])
        }

        fn search_verses(&self, _query_text: &str) -> RepoResult<Vec<Verse>> {
            panic!("search backend crashed");
        }
    }

    fn view_model(repo: Arc<FakeRepository>) -> CorpusViewModel<FakeRepository> {
        CorpusViewModel::new(CorpusUseCases::new(repo), Handle::current())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn initial_state_is_empty_and_idle() {
        let vm = view_model(Arc::new(FakeRepository::new()));
        assert_eq!(vm.translations(), RequestState::default());
        assert_eq!(vm.search_results(), RequestState::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn successful_request_publishes_items() {
        let vm = view_model(Arc::new(FakeRepository::new()));
        vm.load_verses(7, 3).await.unwrap();

        let state = vm.verses();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].book_id, 7);
        assert_eq!(state.items[0].chapter, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failure_keeps_previous_items_and_clears_loading() {
        let repo = Arc::new(FakeRepository::new());
        let vm = view_model(Arc::clone(&repo));
        vm.load_translations().await.unwrap();
        let before = vm.translations().items;

        repo.fail.store(true, Ordering::SeqCst);
        vm.load_translations().await.unwrap();

        let state = vm.translations();
        assert!(!state.loading);
        assert_eq!(state.items, before);
        let message = state.error.expect("failure should publish an error");
        assert!(message.contains("Failed to load translations"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn new_request_clears_previous_error() {
        let repo = Arc::new(FakeRepository::new());
        let vm = view_model(Arc::clone(&repo));
        repo.fail.store(true, Ordering::SeqCst);
        vm.load_verses(1, 1).await.unwrap();
        assert!(vm.verses().error.is_some());

        repo.fail.store(false, Ordering::SeqCst);
        vm.load_verses(1, 1).await.unwrap();
        assert_eq!(vm.verses().error, None);
        assert_eq!(vm.verses().items.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn loading_is_visible_while_request_is_in_flight() {
        let repo = Arc::new(FakeRepository::gated());
        let vm = view_model(Arc::clone(&repo));
        let mut updates = vm.subscribe_books();

        let request = vm.load_books("slow");
        assert!(vm.books().loading);
        assert!(updates.borrow_and_update().loading);

        pass_gate(&repo).await;
        request.await.unwrap();

        updates.changed().await.unwrap();
        let state = updates.borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.items[0].name, "Genesis (slow)");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn older_request_finishing_last_does_not_overwrite_newer_result() {
        let repo = Arc::new(FakeRepository::gated());
        let vm = view_model(Arc::clone(&repo));

        let older = vm.load_books("slow");
        let gate_repo = Arc::clone(&repo);
        tokio::task::spawn_blocking(move || gate_repo.gate.as_ref().unwrap().0.wait())
            .await
            .unwrap();

        vm.load_books("fast").await.unwrap();
        let state = vm.books();
        assert!(!state.loading);
        assert_eq!(state.items[0].name, "Genesis (fast)");

        let gate_repo = Arc::clone(&repo);
        tokio::task::spawn_blocking(move || gate_repo.gate.as_ref().unwrap().1.wait())
            .await
            .unwrap();
        older.await.unwrap();

        let state = vm.books();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.items[0].name, "Genesis (fast)");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn older_request_finishing_first_keeps_loading_for_newer_one() {
        let repo = Arc::new(FakeRepository::gated());
        let vm = view_model(Arc::clone(&repo));

        let older = vm.load_books("fast");
        let newer = vm.load_books("slow");
        older.await.unwrap();

        let state = vm.books();
        assert!(state.loading);
        assert!(state.items.is_empty());

        pass_gate(&repo).await;
        newer.await.unwrap();

        let state = vm.books();
        assert!(!state.loading);
        assert_eq!(state.items[0].name, "Genesis (slow)");
    }

    async fn pass_gate(repo: &Arc<FakeRepository>) {
        let gate_repo = Arc::clone(repo);
        tokio::task::spawn_blocking(move || {
            let (entered, release) = gate_repo.gate.as_ref().unwrap();
            entered.wait();
            release.wait();
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_worker_still_releases_loading() {
        let vm = view_model(Arc::new(FakeRepository::new()));
        vm.search_verses("anything").await.unwrap();

        let state = vm.search_results();
        assert!(!state.loading);
        assert!(state.items.is_empty());
        assert!(state
            .error
            .expect("panic should surface as error")
            .starts_with("Failed to search verses"));
    }
}
