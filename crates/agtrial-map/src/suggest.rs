//! Fuzzy field suggestions for headers that did not resolve.

use std::cmp::Ordering;

use agtrial_model::ColumnMapConfig;
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

/// Scores below this are not offered to the reviewer.
const MIN_SCORE: f64 = 0.75;
const MAX_SUGGESTIONS: usize = 3;

/// A candidate canonical field for an unmapped header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSuggestion {
    pub field: String,
    /// Jaro-Winkler similarity in `[0, 1]`.
    pub score: f64,
    /// The field name or alias that produced the best score.
    pub matched: String,
}

/// Ranks bindable fields of `config` by similarity to `header`.
///
/// Each field is scored against its own name and all of its aliases; the best
/// score counts. Ties break on field name so output is stable.
pub fn suggest_fields(header: &str, config: &ColumnMapConfig) -> Vec<FieldSuggestion> {
    let target = normalize(header);
    if target.is_empty() {
        return Vec::new();
    }

    let mut suggestions: Vec<FieldSuggestion> = config
        .bindable_columns()
        .filter_map(|spec| {
            std::iter::once(spec.field)
                .chain(spec.aliases.iter().copied())
                .map(|candidate| {
                    let score =
                        jaro_winkler::similarity(target.chars(), normalize(candidate).chars());
                    (score, candidate)
                })
                .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
                .filter(|(score, _)| *score >= MIN_SCORE)
                .map(|(score, candidate)| FieldSuggestion {
                    field: spec.field.to_string(),
                    score,
                    matched: candidate.to_string(),
                })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.field.cmp(&b.field))
    });
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Lowercases and folds separators to single spaces.
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use agtrial_model::DataType;

    use super::*;
    use crate::registry::config_for;

    #[test]
    fn suggests_close_alias() {
        let config = config_for(DataType::PlotData);
        let suggestions = suggest_fields("Plant Cnt", config);
        assert_eq!(suggestions[0].field, "plant_count");
    }

    #[test]
    fn separators_do_not_hurt_matching() {
        let config = config_for(DataType::PlotData);
        let suggestions = suggest_fields("YIELD_T-HA", config);
        assert_eq!(suggestions[0].field, "yield_t_ha");
        assert!(suggestions[0].score > 0.99);
    }

    #[test]
    fn unrelated_header_gets_nothing() {
        let config = config_for(DataType::PlotData);
        assert!(suggest_fields("zzzz", config).is_empty());
        assert!(suggest_fields("   ", config).is_empty());
    }

    #[test]
    fn output_is_bounded_and_sorted() {
        let config = config_for(DataType::TrialSummary);
        let suggestions = suggest_fields("treatment", config);
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
        assert!(suggestions.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
