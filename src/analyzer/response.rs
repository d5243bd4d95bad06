use crate::analyzer::{AnalysisResponse, AnalyzerError, AnalyzerResult};
use crate::navigation::{NavCollector, MAX_NAV_DEPTH};
use crate::state::{DictionaryEntry, PageInfo, TaxonomyNode};
use serde_json::Value;
use url::Url;

/// Parses the analyzer's answer
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
/// Missing keys default to empty collections and individual malformed
/// entries are skipped; only an answer that is not a JSON object at all
/// is an error. Navigation URLs are resolved against `base_url` and
/// cross-domain items are dropped, as in the HTML waterfall.
pub fn parse_analysis_response(text: &str, base_url: &Url) -> AnalyzerResult<AnalysisResponse> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AnalyzerError::Malformed(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(AnalyzerError::Malformed("expected a JSON object".to_string()));
    };

    let mut collector = NavCollector::new(base_url);
    let navigation = array(object.get("navigation"))
        .iter()
        .filter_map(|item| navigation_node(item, 1, &mut collector))
        .collect();

    let dictionary = array(object.get("dictionary"))
        .iter()
        .filter_map(dictionary_entry)
        .collect();

    let taxonomy = array(object.get("taxonomy"))
        .iter()
        .filter_map(|item| serde_json::from_value::<TaxonomyNode>(item.clone()).ok())
        .filter(|node| !node.name.trim().is_empty())
        .collect();

    let metadata = match object.remove("metadata") {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    Ok(AnalysisResponse {
        navigation,
        dictionary,
        taxonomy,
        metadata,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn string_field<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| item.get(*key).and_then(Value::as_str))
}

fn navigation_node(item: &Value, depth: u32, collector: &mut NavCollector<'_>) -> Option<PageInfo> {
    let title = string_field(item, &["title", "name", "label"])?;
    let href = string_field(item, &["url", "href", "link"]);
    let mut page = collector.accept(href, title, depth)?;

    if depth < MAX_NAV_DEPTH {
        let parent_url = page.has_url().then(|| page.url.clone());
        page.children = array(item.get("children"))
            .iter()
            .filter_map(|child| navigation_node(child, depth + 1, collector))
            .map(|mut child| {
                child.parent_url = parent_url.clone();
                child
            })
            .collect();
    }

    Some(page)
}

/// Category names are matched case-insensitively
fn dictionary_entry(item: &Value) -> Option<DictionaryEntry> {
    let mut item = item.clone();
    let category = item.get("category")?.as_str()?.trim().to_lowercase();
    item["category"] = Value::String(category);

    let entry: DictionaryEntry = serde_json::from_value(item).ok()?;
    (!entry.term.trim().is_empty()).then_some(entry)
}
