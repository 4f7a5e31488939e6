//! Canonical search state and its reducer
//!
//! The state is explicit and controller-owned; there is no ambient current
//! search. Every widget interaction becomes an [`Action`], and the reducer
//! decides whether anything actually changed. Transitions that leave the
//! committed query text and filter contents structurally identical collapse
//! to [`Transition::Unchanged`] so the UI never re-renders or re-queries for
//! free.

use lexhub_common::search::{SearchCriteria, SearchMode, SearchOutcome, WordStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the seven usage-marker filter groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKey {
    SocialValuation,
    SocialStratum,
    Style,
    Intentionality,
    Geography,
    Chronology,
    Frequency,
}

/// A user interaction with the search surface
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetQuery(String),
    SetCategories(Vec<String>),
    SetOrigins(Vec<String>),
    SetLetters(Vec<String>),
    SetDictionaries(Vec<String>),
    SetMarker(MarkerKey, Vec<String>),
    /// Editor mode only; stripped for public searches
    SetStatus(Option<WordStatus>),
    /// Editor mode only; stripped for public searches
    SetAssignees(Vec<Uuid>),
    SetPage(u64),
    /// Editor mode: commit the draft and execute it
    Submit,
    /// Reset query, filters, status, assignees, results, and page in one step
    ClearAll,
}

/// What the UI layer must do after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Issue a search for the committed criteria
    RunSearch,
    /// Mirror the committed criteria into the address bar
    SyncUrl,
}

/// Reducer outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Structurally identical state; skip renders and requests
    Unchanged,
    Changed { effects: Vec<Effect> },
}

/// The canonical search state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Committed criteria the current results correspond to
    pub criteria: SearchCriteria,

    /// Editor-mode widget state; commits on submit. In public mode draft and
    /// committed criteria move together.
    pub draft: SearchCriteria,

    /// Current 1-based page
    pub page: u64,

    /// Latest applied outcome; `None` before the first search and after a
    /// clear
    #[serde(skip)]
    pub outcome: Option<SearchOutcome>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            criteria: SearchCriteria::default(),
            draft: SearchCriteria::default(),
            page: 1,
            outcome: None,
        }
    }
}

impl SearchState {
    /// Apply an action for the given mode.
    ///
    /// Public mode commits every edit immediately and keeps the address bar
    /// in sync; editor mode parks edits in the draft until an explicit
    /// submit.
    pub fn apply(&mut self, action: Action, mode: SearchMode, auto_search: bool) -> Transition {
        match action {
            Action::Submit => self.commit(mode, true),
            Action::ClearAll => self.clear_all(mode),
            Action::SetPage(page) => self.set_page(page.max(1), mode),
            other => {
                let draft = apply_to_criteria(self.draft.clone(), other);
                let draft = draft.sanitized(mode).normalized();
                if draft == self.draft {
                    return Transition::Unchanged;
                }
                self.draft = draft;

                match mode {
                    // Live sync: keystrokes commit and execute immediately
                    SearchMode::Public => self.commit(mode, auto_search),
                    // Widgets update visually; the executed query waits for
                    // an explicit submit
                    SearchMode::Editor => Transition::Changed {
                        effects: Vec::new(),
                    },
                }
            }
        }
    }

    fn commit(&mut self, mode: SearchMode, run: bool) -> Transition {
        let committed = self.draft.clone().sanitized(mode).normalized();
        if committed == self.criteria && self.page == 1 {
            return Transition::Unchanged;
        }

        self.criteria = committed;
        self.page = 1;

        let mut effects = Vec::new();
        if run {
            effects.push(Effect::RunSearch);
        }
        if mode == SearchMode::Public {
            effects.push(Effect::SyncUrl);
        }
        Transition::Changed { effects }
    }

    fn set_page(&mut self, page: u64, mode: SearchMode) -> Transition {
        if page == self.page {
            return Transition::Unchanged;
        }
        self.page = page;

        let mut effects = vec![Effect::RunSearch];
        if mode == SearchMode::Public {
            effects.push(Effect::SyncUrl);
        }
        Transition::Changed { effects }
    }

    fn clear_all(&mut self, mode: SearchMode) -> Transition {
        let cleared = Self::default();
        if *self == cleared {
            return Transition::Unchanged;
        }
        *self = cleared;

        let effects = if mode == SearchMode::Public {
            vec![Effect::SyncUrl]
        } else {
            Vec::new()
        };
        Transition::Changed { effects }
    }
}

fn apply_to_criteria(mut criteria: SearchCriteria, action: Action) -> SearchCriteria {
    match action {
        Action::SetQuery(query) => criteria.query = query,
        Action::SetCategories(values) => criteria.categories = values,
        Action::SetOrigins(values) => criteria.origins = values,
        Action::SetLetters(values) => criteria.letters = values,
        Action::SetDictionaries(values) => criteria.dictionaries = values,
        Action::SetMarker(key, values) => {
            let slot = match key {
                MarkerKey::SocialValuation => &mut criteria.markers.social_valuation,
                MarkerKey::SocialStratum => &mut criteria.markers.social_stratum,
                MarkerKey::Style => &mut criteria.markers.style,
                MarkerKey::Intentionality => &mut criteria.markers.intentionality,
                MarkerKey::Geography => &mut criteria.markers.geography,
                MarkerKey::Chronology => &mut criteria.markers.chronology,
                MarkerKey::Frequency => &mut criteria.markers.frequency,
            };
            *slot = values;
        }
        Action::SetStatus(status) => criteria.status = status,
        Action::SetAssignees(assignees) => criteria.assigned_to = assignees,
        Action::Submit | Action::ClearAll | Action::SetPage(_) => {}
    }
    criteria
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_query_change_runs_and_syncs() {
        let mut state = SearchState::default();
        let t = state.apply(
            Action::SetQuery("casa".into()),
            SearchMode::Public,
            true,
        );
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::RunSearch, Effect::SyncUrl]
            }
        );
        assert_eq!(state.criteria.query, "casa");
    }

    #[test]
    fn test_identical_value_collapses_to_noop() {
        let mut state = SearchState::default();
        state.apply(Action::SetQuery("casa".into()), SearchMode::Public, true);
        let t = state.apply(Action::SetQuery(" casa ".into()), SearchMode::Public, true);
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_filter_equality_is_structural() {
        let mut state = SearchState::default();
        state.apply(
            Action::SetLetters(vec!["b".into(), "a".into()]),
            SearchMode::Public,
            true,
        );
        // Same contents, different order and duplicates
        let t = state.apply(
            Action::SetLetters(vec!["a".into(), "b".into(), "a".into()]),
            SearchMode::Public,
            true,
        );
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_editor_keystrokes_stay_in_draft() {
        let mut state = SearchState::default();
        let t = state.apply(Action::SetQuery("casa".into()), SearchMode::Editor, true);
        assert_eq!(t, Transition::Changed { effects: vec![] });
        assert_eq!(state.draft.query, "casa");
        assert_eq!(state.criteria.query, "");
    }

    #[test]
    fn test_editor_submit_commits_and_runs() {
        let mut state = SearchState::default();
        state.apply(Action::SetQuery("casa".into()), SearchMode::Editor, true);
        let t = state.apply(Action::Submit, SearchMode::Editor, true);
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::RunSearch]
            }
        );
        assert_eq!(state.criteria.query, "casa");
    }

    #[test]
    fn test_editor_resubmit_without_edits_is_noop() {
        let mut state = SearchState::default();
        state.apply(Action::SetQuery("casa".into()), SearchMode::Editor, true);
        state.apply(Action::Submit, SearchMode::Editor, true);
        let t = state.apply(Action::Submit, SearchMode::Editor, true);
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_public_mode_strips_workflow_filters() {
        let mut state = SearchState::default();
        let t = state.apply(
            Action::SetStatus(Some(WordStatus::Draft)),
            SearchMode::Public,
            true,
        );
        // Sanitization removes the only change, so nothing happened
        assert_eq!(t, Transition::Unchanged);
        assert_eq!(state.criteria.status, None);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let mut state = SearchState::default();
        state.apply(Action::SetQuery("casa".into()), SearchMode::Public, true);
        state.apply(Action::SetPage(3), SearchMode::Public, true);
        assert_eq!(state.page, 3);

        state.apply(Action::SetQuery("perro".into()), SearchMode::Public, true);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_clear_all_resets_everything() {
        let mut state = SearchState::default();
        state.apply(Action::SetQuery("casa".into()), SearchMode::Public, true);
        state.apply(Action::SetLetters(vec!["c".into()]), SearchMode::Public, true);
        state.apply(Action::SetPage(2), SearchMode::Public, true);
        state.outcome = Some(SearchOutcome::NoCriteria);

        let t = state.apply(Action::ClearAll, SearchMode::Public, true);
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::SyncUrl]
            }
        );
        assert_eq!(state, SearchState::default());
    }

    #[test]
    fn test_clear_all_when_already_clear_is_noop() {
        let mut state = SearchState::default();
        let t = state.apply(Action::ClearAll, SearchMode::Public, true);
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_suspended_auto_search_skips_run_effect() {
        let mut state = SearchState::default();
        let t = state.apply(Action::SetQuery("casa".into()), SearchMode::Public, false);
        assert_eq!(
            t,
            Transition::Changed {
                effects: vec![Effect::SyncUrl]
            }
        );
    }

    #[test]
    fn test_marker_action_targets_its_group() {
        let mut state = SearchState::default();
        state.apply(
            Action::SetMarker(MarkerKey::Geography, vec!["andino".into()]),
            SearchMode::Public,
            true,
        );
        assert_eq!(state.criteria.markers.geography, vec!["andino".to_string()]);
        assert!(state.criteria.markers.style.is_empty());
    }
}
