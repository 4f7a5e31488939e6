//! Search controller: state ownership and request sequencing
//!
//! Searches overlap whenever the user types faster than the network answers.
//! Correctness is last-request-wins: every issued request carries a
//! monotonically increasing token, and a response is applied only if its
//! token is still the latest one handed out. Anything else is discarded
//! silently at application time; the underlying call is never aborted.

use crate::state::{Action, SearchState, Transition};
use crate::url::{criteria_from_query_params, criteria_to_query_params};
use async_trait::async_trait;
use lexhub_common::search::{SearchCriteria, SearchMode, SearchOutcome, SearchPage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Token identifying one issued search request
pub type RequestToken = u64;

/// The async seam to the server's search endpoint
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        mode: SearchMode,
        page: u64,
    ) -> anyhow::Result<SearchOutcome>;
}

/// Snapshot of editor filters persisted between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedFilters {
    criteria: SearchCriteria,
    page: u64,
}

/// Owns the canonical search state for one mounted search surface.
///
/// Created on mount, dropped on unmount; no state survives it except the
/// saved-filter snapshot the editor surface asks for explicitly.
pub struct SearchController {
    mode: SearchMode,
    state: SearchState,
    backend: Arc<dyn SearchBackend>,
    /// Suspended while programmatically restoring state, re-enabled by
    /// clear-all
    auto_search: bool,
    /// Highest token handed out; only this one may apply its response
    latest_token: RequestToken,
}

impl SearchController {
    pub fn new(mode: SearchMode, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            mode,
            state: SearchState::default(),
            backend,
            auto_search: true,
            latest_token: 0,
        }
    }

    /// Public surface: derive the initial state from the address bar.
    ///
    /// Auto-search stays suspended during restoration so N parameters do not
    /// fire N queries; the caller issues the single initial search itself.
    pub fn from_query_params(
        backend: Arc<dyn SearchBackend>,
        params: &[(String, String)],
    ) -> Self {
        let (criteria, page) = criteria_from_query_params(params);
        let mut controller = Self::new(SearchMode::Public, backend);
        controller.auto_search = false;
        controller.state.criteria = criteria.sanitized(SearchMode::Public).normalized();
        controller.state.draft = controller.state.criteria.clone();
        controller.state.page = page;
        controller
    }

    /// Editor surface: derive the initial state from a saved snapshot.
    ///
    /// A snapshot that does not parse is treated as absent.
    pub fn from_saved_filters(backend: Arc<dyn SearchBackend>, snapshot: &str) -> Self {
        let mut controller = Self::new(SearchMode::Editor, backend);
        controller.auto_search = false;
        if let Ok(saved) = serde_json::from_str::<SavedFilters>(snapshot) {
            controller.state.criteria = saved.criteria.normalized();
            controller.state.draft = controller.state.criteria.clone();
            controller.state.page = saved.page.max(1);
        }
        controller
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Serialize the committed filters for persistence
    pub fn saved_filters_json(&self) -> String {
        serde_json::to_string(&SavedFilters {
            criteria: self.state.criteria.clone(),
            page: self.state.page,
        })
        .unwrap_or_else(|_| "{}".to_string())
    }

    /// The committed criteria as address-bar parameters
    pub fn url_params(&self) -> Vec<(String, String)> {
        criteria_to_query_params(&self.state.criteria, self.state.page)
    }

    /// Dispatch a user action through the reducer
    pub fn apply(&mut self, action: Action) -> Transition {
        let clearing = action == Action::ClearAll;
        let transition = self.state.apply(action, self.mode, self.auto_search);

        if clearing && matches!(transition, Transition::Changed { .. }) {
            // A cleared surface must not be repainted by a straggler; bump
            // the token so in-flight responses go stale
            self.latest_token += 1;
            self.auto_search = true;
        }

        transition
    }

    /// Issue a new request token for the committed criteria.
    ///
    /// Issuing supersedes every earlier token immediately, before any
    /// response arrives.
    pub fn begin_search(&mut self) -> (RequestToken, SearchCriteria, u64) {
        self.latest_token += 1;
        (
            self.latest_token,
            self.state.criteria.clone(),
            self.state.page,
        )
    }

    /// Apply a response if its token is still the latest; returns whether it
    /// was applied
    pub fn apply_response(&mut self, token: RequestToken, outcome: SearchOutcome) -> bool {
        if token != self.latest_token {
            tracing::debug!(token, latest = self.latest_token, "Discarding stale search response");
            return false;
        }
        self.state.outcome = Some(outcome);
        true
    }

    /// One full search cycle: issue, await, apply.
    ///
    /// Backend failures degrade to an empty page with zero total; no error
    /// ever reaches the UI from here. A new user action is the only retry.
    pub async fn run_search(&mut self) -> bool {
        let (token, criteria, page) = self.begin_search();

        let outcome = if criteria.is_empty() {
            SearchOutcome::NoCriteria
        } else {
            match self.backend.search(&criteria, self.mode, page).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "Search failed; degrading to empty results");
                    SearchOutcome::Page(SearchPage::empty(page))
                }
            }
        };

        self.apply_response(token, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Effect;
    use lexhub_common::search::{Pagination, WordHit, PAGE_SIZE};
    use uuid::Uuid;

    struct StaticBackend {
        fail: bool,
    }

    #[async_trait]
    impl SearchBackend for StaticBackend {
        async fn search(
            &self,
            criteria: &SearchCriteria,
            _mode: SearchMode,
            page: u64,
        ) -> anyhow::Result<SearchOutcome> {
            if self.fail {
                anyhow::bail!("backend unavailable");
            }
            Ok(SearchOutcome::Page(page_for(&criteria.query, page)))
        }
    }

    fn page_for(query: &str, page: u64) -> SearchPage {
        SearchPage {
            results: vec![WordHit {
                id: Uuid::new_v4(),
                lemma: query.to_string(),
                status: "published".to_string(),
                snippet: None,
            }],
            pagination: Pagination::from_total(1, page, PAGE_SIZE),
        }
    }

    fn controller(mode: SearchMode) -> SearchController {
        SearchController::new(mode, Arc::new(StaticBackend { fail: false }))
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut c = controller(SearchMode::Public);
        c.apply(Action::SetQuery("a".into()));
        let (token_a, ..) = c.begin_search();

        c.apply(Action::SetQuery("b".into()));
        let (token_b, ..) = c.begin_search();

        // B answers first, then A's late response arrives
        assert!(c.apply_response(token_b, SearchOutcome::Page(page_for("b", 1))));
        assert!(!c.apply_response(token_a, SearchOutcome::Page(page_for("a", 1))));

        match c.state().outcome {
            Some(SearchOutcome::Page(ref page)) => assert_eq!(page.results[0].lemma, "b"),
            ref other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_latest_response_wins_regardless_of_arrival_order() {
        let mut c = controller(SearchMode::Public);
        c.apply(Action::SetQuery("a".into()));
        let (token_a, ..) = c.begin_search();
        c.apply(Action::SetQuery("b".into()));
        let (token_b, ..) = c.begin_search();

        // In-order arrival: A is already superseded when it lands
        assert!(!c.apply_response(token_a, SearchOutcome::Page(page_for("a", 1))));
        assert!(c.apply_response(token_b, SearchOutcome::Page(page_for("b", 1))));

        match c.state().outcome {
            Some(SearchOutcome::Page(ref page)) => assert_eq!(page.results[0].lemma, "b"),
            ref other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_clear_all_invalidates_in_flight_requests() {
        let mut c = controller(SearchMode::Public);
        c.apply(Action::SetQuery("a".into()));
        let (token, ..) = c.begin_search();

        c.apply(Action::ClearAll);

        assert!(!c.apply_response(token, SearchOutcome::Page(page_for("a", 1))));
        assert_eq!(c.state().outcome, None);
        assert_eq!(*c.state(), SearchState::default());
    }

    #[tokio::test]
    async fn test_run_search_applies_results() {
        let mut c = controller(SearchMode::Public);
        c.apply(Action::SetQuery("casa".into()));
        assert!(c.run_search().await);

        match c.state().outcome {
            Some(SearchOutcome::Page(ref page)) => assert_eq!(page.results[0].lemma, "casa"),
            ref other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_criteria_reports_no_criteria() {
        let mut c = controller(SearchMode::Public);
        assert!(c.run_search().await);
        assert_eq!(c.state().outcome, Some(SearchOutcome::NoCriteria));
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_empty_page() {
        let mut c = SearchController::new(
            SearchMode::Public,
            Arc::new(StaticBackend { fail: true }),
        );
        c.apply(Action::SetQuery("casa".into()));
        assert!(c.run_search().await);

        match c.state().outcome {
            Some(SearchOutcome::Page(ref page)) => {
                assert!(page.results.is_empty());
                assert_eq!(page.pagination.total, 0);
            }
            ref other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_restoration_suspends_auto_search_until_clear() {
        let params = vec![("q".to_string(), "casa".to_string())];
        let mut c =
            SearchController::from_query_params(Arc::new(StaticBackend { fail: false }), &params);
        assert_eq!(c.state().criteria.query, "casa");

        // Edits while restored do not auto-fire
        let t = c.apply(Action::SetQuery("perro".into()));
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::SyncUrl]
            }
        );

        // Clear-all re-enables the live triggers
        c.apply(Action::ClearAll);
        let t = c.apply(Action::SetQuery("gato".into()));
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::RunSearch, Effect::SyncUrl]
            }
        );
    }

    #[test]
    fn test_saved_filters_roundtrip() {
        let backend: Arc<dyn SearchBackend> = Arc::new(StaticBackend { fail: false });
        let mut c = SearchController::new(SearchMode::Editor, backend.clone());
        c.apply(Action::SetQuery("casa".into()));
        c.apply(Action::SetLetters(vec!["c".into()]));
        c.apply(Action::Submit);

        let snapshot = c.saved_filters_json();
        let restored = SearchController::from_saved_filters(backend, &snapshot);

        assert_eq!(restored.state().criteria, c.state().criteria);
    }

    #[test]
    fn test_garbage_snapshot_is_treated_as_absent() {
        let backend: Arc<dyn SearchBackend> = Arc::new(StaticBackend { fail: false });
        let c = SearchController::from_saved_filters(backend, "not json");
        assert_eq!(*c.state(), SearchState::default());
    }
}
