//! Search domain types shared by the gateway and the console
//!
//! The criteria struct is the single wire contract between the UI state
//! controller, the HTTP layer, and the repository's query builder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed result page size
pub const PAGE_SIZE: u64 = 50;

/// Editorial workflow status of a word
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    Draft,
    InReview,
    Reviewed,
    Rejected,
    Published,
    Imported,
    Included,
    Preredacted,
    Redacted,
    Archaic,
    Quarantined,
}

impl WordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::Draft => "draft",
            WordStatus::InReview => "in_review",
            WordStatus::Reviewed => "reviewed",
            WordStatus::Rejected => "rejected",
            WordStatus::Published => "published",
            WordStatus::Imported => "imported",
            WordStatus::Included => "included",
            WordStatus::Preredacted => "preredacted",
            WordStatus::Redacted => "redacted",
            WordStatus::Archaic => "archaic",
            WordStatus::Quarantined => "quarantined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(WordStatus::Draft),
            "in_review" => Some(WordStatus::InReview),
            "reviewed" => Some(WordStatus::Reviewed),
            "rejected" => Some(WordStatus::Rejected),
            "published" => Some(WordStatus::Published),
            "imported" => Some(WordStatus::Imported),
            "included" => Some(WordStatus::Included),
            "preredacted" => Some(WordStatus::Preredacted),
            "redacted" => Some(WordStatus::Redacted),
            "archaic" => Some(WordStatus::Archaic),
            "quarantined" => Some(WordStatus::Quarantined),
            _ => None,
        }
    }
}

impl From<WordStatus> for String {
    fn from(status: WordStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Which query surface is asking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Anonymous surface: only published words, no workflow filters
    Public,
    /// Editorial surface: all statuses, status/assignee filters allowed
    Editor,
}

/// Multi-select filters over the seven usage-marker fields of a meaning
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerFilters {
    #[serde(default)]
    pub social_valuation: Vec<String>,
    #[serde(default)]
    pub social_stratum: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub intentionality: Vec<String>,
    #[serde(default)]
    pub geography: Vec<String>,
    #[serde(default)]
    pub chronology: Vec<String>,
    #[serde(default)]
    pub frequency: Vec<String>,
}

impl MarkerFilters {
    pub fn is_empty(&self) -> bool {
        self.social_valuation.is_empty()
            && self.social_stratum.is_empty()
            && self.style.is_empty()
            && self.intentionality.is_empty()
            && self.geography.is_empty()
            && self.chronology.is_empty()
            && self.frequency.is_empty()
    }

    /// Marker columns paired with their selected values, skipping empty sets
    pub fn active(&self) -> Vec<(&'static str, &[String])> {
        let pairs: [(&'static str, &Vec<String>); 7] = [
            ("social_valuation", &self.social_valuation),
            ("social_stratum", &self.social_stratum),
            ("style", &self.style),
            ("intentionality", &self.intentionality),
            ("geography", &self.geography),
            ("chronology", &self.chronology),
            ("frequency", &self.frequency),
        ];
        pairs
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k, v.as_slice()))
            .collect()
    }

    fn normalize(&mut self) {
        for list in [
            &mut self.social_valuation,
            &mut self.social_stratum,
            &mut self.style,
            &mut self.intentionality,
            &mut self.geography,
            &mut self.chronology,
            &mut self.frequency,
        ] {
            normalize_values(list);
        }
    }
}

/// Canonical search input
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Free text matched against lemma and meaning text
    #[serde(default)]
    pub query: String,

    /// Grammar categories
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub origins: Vec<String>,

    #[serde(default)]
    pub letters: Vec<String>,

    #[serde(default)]
    pub dictionaries: Vec<String>,

    #[serde(default)]
    pub markers: MarkerFilters,

    /// Editor mode only; ignored for public searches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WordStatus>,

    /// Editor mode only; ignored for public searches
    #[serde(default)]
    pub assigned_to: Vec<Uuid>,
}

impl SearchCriteria {
    /// True when nothing at all constrains the search.
    ///
    /// An empty-criteria search is a distinct outcome (`NoCriteria`), not a
    /// query for everything.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.categories.is_empty()
            && self.origins.is_empty()
            && self.letters.is_empty()
            && self.dictionaries.is_empty()
            && self.markers.is_empty()
            && self.status.is_none()
            && self.assigned_to.is_empty()
    }

    /// Canonical form: trimmed query, each filter list sorted and deduplicated.
    ///
    /// Structural equality of two normalized criteria is set equality per
    /// filter category, which is what transition collapsing relies on.
    pub fn normalized(mut self) -> Self {
        self.query = self.query.trim().to_string();
        normalize_values(&mut self.categories);
        normalize_values(&mut self.origins);
        normalize_values(&mut self.letters);
        normalize_values(&mut self.dictionaries);
        self.markers.normalize();
        self.assigned_to.sort();
        self.assigned_to.dedup();
        self
    }

    /// Strip fields the given mode is not allowed to use
    pub fn sanitized(mut self, mode: SearchMode) -> Self {
        if mode == SearchMode::Public {
            self.status = None;
            self.assigned_to.clear();
        }
        self
    }
}

fn normalize_values(values: &mut Vec<String>) {
    values.retain(|v| !v.trim().is_empty());
    for v in values.iter_mut() {
        *v = v.trim().to_string();
    }
    values.sort();
    values.dedup();
}

/// One row of a search result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordHit {
    pub id: Uuid,
    pub lemma: String,
    pub status: String,
    /// First matching meaning text, if any
    pub snippet: Option<String>,
}

/// Pagination metadata for a result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u64,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Compute metadata for a 1-based page over `total` results
    pub fn from_total(total: u64, page: u64, page_size: u64) -> Self {
        let total_pages = total.div_ceil(page_size);
        let page = page.max(1);
        Self {
            total,
            total_pages,
            page,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }

    pub fn empty(page: u64) -> Self {
        Self::from_total(0, page, PAGE_SIZE)
    }
}

/// A fetched page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<WordHit>,
    pub pagination: Pagination,
}

impl SearchPage {
    /// The degraded form search failures collapse into
    pub fn empty(page: u64) -> Self {
        Self {
            results: Vec::new(),
            pagination: Pagination::empty(page),
        }
    }
}

/// Outcome of a search invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Nothing to search for; distinct from a page with zero results
    NoCriteria,
    Page(SearchPage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            WordStatus::Draft,
            WordStatus::InReview,
            WordStatus::Preredacted,
            WordStatus::Quarantined,
        ] {
            assert_eq!(WordStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WordStatus::parse("bogus"), None);
    }

    #[test]
    fn test_empty_criteria() {
        let criteria = SearchCriteria::default();
        assert!(criteria.is_empty());

        let criteria = SearchCriteria {
            query: "   ".into(),
            ..Default::default()
        };
        assert!(criteria.is_empty());

        let criteria = SearchCriteria {
            letters: vec!["a".into()],
            ..Default::default()
        };
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_normalization_is_set_equality() {
        let a = SearchCriteria {
            query: " casa ".into(),
            categories: vec!["sustantivo".into(), "verbo".into(), "sustantivo".into()],
            ..Default::default()
        }
        .normalized();

        let b = SearchCriteria {
            query: "casa".into(),
            categories: vec!["verbo".into(), "sustantivo".into()],
            ..Default::default()
        }
        .normalized();

        assert_eq!(a, b);
    }

    #[test]
    fn test_public_sanitization_strips_workflow_filters() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            status: Some(WordStatus::Draft),
            assigned_to: vec![Uuid::new_v4()],
            ..Default::default()
        };

        let public = criteria.clone().sanitized(SearchMode::Public);
        assert_eq!(public.status, None);
        assert!(public.assigned_to.is_empty());

        let editor = criteria.sanitized(SearchMode::Editor);
        assert_eq!(editor.status, Some(WordStatus::Draft));
        assert_eq!(editor.assigned_to.len(), 1);
    }

    #[test]
    fn test_pagination_boundaries() {
        let first = Pagination::from_total(120, 1, PAGE_SIZE);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let middle = Pagination::from_total(120, 2, PAGE_SIZE);
        assert!(middle.has_next);
        assert!(middle.has_prev);

        let last = Pagination::from_total(120, 3, PAGE_SIZE);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let p = Pagination::from_total(100, 2, PAGE_SIZE);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_pagination_zero_total() {
        let p = Pagination::from_total(0, 1, PAGE_SIZE);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn test_marker_active_pairs() {
        let markers = MarkerFilters {
            geography: vec!["andino".into()],
            frequency: vec!["raro".into(), "frecuente".into()],
            ..Default::default()
        };
        let active = markers.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].0, "geography");
        assert_eq!(active[1].0, "frequency");
    }
}
