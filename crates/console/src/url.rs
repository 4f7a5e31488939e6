//! Address-bar synchronization for the public surface
//!
//! The committed criteria and the URL query string are two views of the same
//! state: multi-select filters serialize as comma-separated parameters, and
//! absent parameters mean empty selections. Round-tripping through these two
//! functions is lossless for normalized criteria, which is what makes
//! back/forward navigation restore exact result sets.

use lexhub_common::search::{MarkerFilters, SearchCriteria, WordStatus};
use uuid::Uuid;

/// Serialize criteria into query parameters, skipping empty fields
pub fn criteria_to_query_params(criteria: &SearchCriteria, page: u64) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let query = criteria.query.trim();
    if !query.is_empty() {
        params.push(("q".to_string(), query.to_string()));
    }

    push_csv(&mut params, "categories", &criteria.categories);
    push_csv(&mut params, "origins", &criteria.origins);
    push_csv(&mut params, "letters", &criteria.letters);
    push_csv(&mut params, "dictionaries", &criteria.dictionaries);

    push_csv(&mut params, "social_valuation", &criteria.markers.social_valuation);
    push_csv(&mut params, "social_stratum", &criteria.markers.social_stratum);
    push_csv(&mut params, "style", &criteria.markers.style);
    push_csv(&mut params, "intentionality", &criteria.markers.intentionality);
    push_csv(&mut params, "geography", &criteria.markers.geography);
    push_csv(&mut params, "chronology", &criteria.markers.chronology);
    push_csv(&mut params, "frequency", &criteria.markers.frequency);

    if let Some(status) = criteria.status {
        params.push(("status".to_string(), status.as_str().to_string()));
    }
    if !criteria.assigned_to.is_empty() {
        let ids: Vec<String> = criteria.assigned_to.iter().map(Uuid::to_string).collect();
        params.push(("assigned_to".to_string(), ids.join(",")));
    }

    if page > 1 {
        params.push(("page".to_string(), page.to_string()));
    }

    params
}

/// Parse query parameters back into criteria and a page number.
///
/// Unknown parameters and malformed values are ignored rather than rejected;
/// a shared URL should never error out of the search page.
pub fn criteria_from_query_params(params: &[(String, String)]) -> (SearchCriteria, u64) {
    let mut criteria = SearchCriteria::default();
    let mut page = 1;

    for (key, value) in params {
        match key.as_str() {
            "q" => criteria.query = value.clone(),
            "categories" => criteria.categories = split_csv(value),
            "origins" => criteria.origins = split_csv(value),
            "letters" => criteria.letters = split_csv(value),
            "dictionaries" => criteria.dictionaries = split_csv(value),
            "social_valuation" => criteria.markers.social_valuation = split_csv(value),
            "social_stratum" => criteria.markers.social_stratum = split_csv(value),
            "style" => criteria.markers.style = split_csv(value),
            "intentionality" => criteria.markers.intentionality = split_csv(value),
            "geography" => criteria.markers.geography = split_csv(value),
            "chronology" => criteria.markers.chronology = split_csv(value),
            "frequency" => criteria.markers.frequency = split_csv(value),
            "status" => criteria.status = WordStatus::parse(value),
            "assigned_to" => {
                criteria.assigned_to = split_csv(value)
                    .iter()
                    .filter_map(|raw| Uuid::parse_str(raw).ok())
                    .collect();
            }
            "page" => page = value.parse().unwrap_or(1),
            _ => {}
        }
    }

    (criteria.normalized(), page.max(1))
}

fn push_csv(params: &mut Vec<(String, String)>, key: &str, values: &[String]) {
    if !values.is_empty() {
        params.push((key.to_string(), values.join(",")));
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_criteria() -> SearchCriteria {
        SearchCriteria {
            query: "casa".into(),
            categories: vec!["sustantivo".into()],
            letters: vec!["a".into(), "c".into()],
            markers: MarkerFilters {
                geography: vec!["andino".into(), "costa".into()],
                ..Default::default()
            },
            ..Default::default()
        }
        .normalized()
    }

    #[test]
    fn test_roundtrip_is_lossless() {
        let criteria = sample_criteria();
        let params = criteria_to_query_params(&criteria, 2);
        let (restored, page) = criteria_from_query_params(&params);
        assert_eq!(restored, criteria);
        assert_eq!(page, 2);
    }

    #[test]
    fn test_empty_criteria_serialize_to_nothing() {
        let params = criteria_to_query_params(&SearchCriteria::default(), 1);
        assert!(params.is_empty());
    }

    #[test]
    fn test_page_one_is_implicit() {
        let params = criteria_to_query_params(&sample_criteria(), 1);
        assert!(params.iter().all(|(k, _)| k.as_str() != "page"));
    }

    #[test]
    fn test_unknown_and_malformed_params_are_ignored() {
        let params = vec![
            ("utm_source".to_string(), "mail".to_string()),
            ("page".to_string(), "abc".to_string()),
            ("status".to_string(), "bogus".to_string()),
            ("q".to_string(), "casa".to_string()),
        ];
        let (criteria, page) = criteria_from_query_params(&params);
        assert_eq!(criteria.query, "casa");
        assert_eq!(criteria.status, None);
        assert_eq!(page, 1);
    }

    #[test]
    fn test_status_roundtrips_when_present() {
        let criteria = SearchCriteria {
            status: Some(WordStatus::Redacted),
            ..Default::default()
        };
        let params = criteria_to_query_params(&criteria, 1);
        let (restored, _) = criteria_from_query_params(&params);
        assert_eq!(restored.status, Some(WordStatus::Redacted));
    }
}
