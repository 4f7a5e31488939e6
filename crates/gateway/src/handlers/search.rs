//! Search handlers
//!
//! Multi-select filters arrive as comma-separated query parameters. The
//! public surface ignores workflow filters entirely; the editor surface
//! accepts them after role verification.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use crate::AppState;
use lexhub_common::{
    auth::AuthContext,
    db::models::Role,
    db::Repository,
    errors::{AppError, Result},
    metrics,
    search::{MarkerFilters, SearchCriteria, SearchMode, SearchOutcome, WordStatus},
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Free text matched against lemma and meaning text
    #[serde(default)]
    pub q: Option<String>,

    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub origins: Option<String>,
    #[serde(default)]
    pub letters: Option<String>,
    #[serde(default)]
    pub dictionaries: Option<String>,

    #[serde(default)]
    pub social_valuation: Option<String>,
    #[serde(default)]
    pub social_stratum: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub intentionality: Option<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub chronology: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,

    /// Editor mode only
    #[serde(default)]
    pub status: Option<String>,
    /// Editor mode only
    #[serde(default)]
    pub assigned_to: Option<String>,

    #[serde(default = "default_page")]
    pub page: u64,
}

fn default_page() -> u64 {
    1
}

fn csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl SearchParams {
    fn criteria(&self) -> Result<SearchCriteria> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(WordStatus::parse(raw).ok_or_else(|| AppError::Validation {
                message: format!("unknown status: {}", raw),
                field: Some("status".to_string()),
            })?),
        };

        let assigned_to = csv(&self.assigned_to)
            .into_iter()
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| AppError::Validation {
                    message: format!("invalid assignee id: {}", raw),
                    field: Some("assigned_to".to_string()),
                })
            })
            .collect::<Result<Vec<Uuid>>>()?;

        Ok(SearchCriteria {
            query: self.q.clone().unwrap_or_default(),
            categories: csv(&self.categories),
            origins: csv(&self.origins),
            letters: csv(&self.letters),
            dictionaries: csv(&self.dictionaries),
            markers: MarkerFilters {
                social_valuation: csv(&self.social_valuation),
                social_stratum: csv(&self.social_stratum),
                style: csv(&self.style),
                intentionality: csv(&self.intentionality),
                geography: csv(&self.geography),
                chronology: csv(&self.chronology),
                frequency: csv(&self.frequency),
            },
            status,
            assigned_to,
        })
    }
}

/// Search response
#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub processing_time_ms: u64,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

async fn run_search(
    state: &AppState,
    params: SearchParams,
    mode: SearchMode,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();
    let criteria = params.criteria()?;
    let query = criteria.query.trim().to_string();

    let repo = Repository::new(state.db.clone());
    let outcome = repo.search_words(criteria, mode, params.page).await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let mode_label = match mode {
        SearchMode::Public => "public",
        SearchMode::Editor => "editor",
    };
    let result_count = match &outcome {
        SearchOutcome::Page(page) => page.results.len(),
        SearchOutcome::NoCriteria => 0,
    };

    metrics::record_search(
        processing_time_ms as f64 / 1000.0,
        mode_label,
        result_count,
    );

    tracing::info!(
        query = %query,
        mode = mode_label,
        results = result_count,
        latency_ms = processing_time_ms,
        "Search completed"
    );

    Ok(Json(SearchResponse {
        query,
        processing_time_ms,
        outcome,
    }))
}

/// Public search: published words only, no workflow filters
pub async fn public_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    run_search(&state, params, SearchMode::Public).await
}

/// Editor search: all statuses, status/assignee filters allowed
pub async fn editor_search(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let repo = Repository::new(state.db.clone());
    auth.authorize(&repo, Role::Lexicographer).await?;

    run_search(&state, params, SearchMode::Editor).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_splitting() {
        assert_eq!(
            csv(&Some("a, b ,,c".to_string())),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(csv(&None).is_empty());
        assert!(csv(&Some("".to_string())).is_empty());
    }

    #[test]
    fn test_criteria_rejects_unknown_status() {
        let params = SearchParams {
            status: Some("bogus".to_string()),
            ..Default::default()
        };
        assert!(params.criteria().is_err());
    }

    #[test]
    fn test_criteria_parses_assignees() {
        let id = Uuid::new_v4();
        let params = SearchParams {
            assigned_to: Some(id.to_string()),
            ..Default::default()
        };
        let criteria = params.criteria().unwrap();
        assert_eq!(criteria.assigned_to, vec![id]);
    }

    #[test]
    fn test_criteria_rejects_bad_assignee() {
        let params = SearchParams {
            assigned_to: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(params.criteria().is_err());
    }
}
