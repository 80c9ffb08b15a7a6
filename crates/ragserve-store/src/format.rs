//! Human-readable rendering of query results

use ragserve_core::{DistanceMetric, Metadata, QueryHit};

const PREVIEW_MAX_CHARS: usize = 300;

/// Render query results as a numbered listing for the agent and the UI.
///
/// `None` means the knowledge base holds no documents at all; an empty
/// slice means the query simply had no matches.
pub fn format_query_results(results: Option<&[QueryHit]>, metric: DistanceMetric) -> String {
    let Some(results) = results else {
        return "The knowledge base is empty.".to_string();
    };
    if results.is_empty() {
        return "No matching results found.".to_string();
    }

    let blocks: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(index, hit)| {
            let source = resolve_source_label(&hit.metadata);
            let score = hit
                .distance
                .map(|d| metric.relevance_score(d))
                .unwrap_or(0.0);
            format!(
                "[{}] Source: {} | Score≈{:.3}\n{}",
                index + 1,
                source,
                score,
                preview(&hit.document)
            )
        })
        .collect();

    blocks.join("\n\n")
}

/// First non-empty of the `source`, `entity` and `type` metadata fields
fn resolve_source_label(metadata: &Metadata) -> &str {
    ["source", "entity", "type"]
        .iter()
        .find_map(|key| {
            metadata
                .get(*key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or("unknown")
}

/// Collapse whitespace and truncate to the preview budget, marker included
fn preview(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= PREVIEW_MAX_CHARS {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(PREVIEW_MAX_CHARS - 2).collect();
    format!("{} …", cut.trim_end())
}
