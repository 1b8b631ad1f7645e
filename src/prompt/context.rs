// src/prompt/context.rs
// Flattened view of a change plus its page context, and heuristics over it

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{AnalysisContext, ChangeInput, ChangeState, ChangeType};

pub const DEFAULT_DESIGN_SYSTEM: &str = "unknown";
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;

/// Properties whose change tends to reflow the layout
const HIGH_IMPACT_PROPERTIES: [&str; 6] = ["display", "position", "width", "height", "grid", "flex"];

/// Everything a prompt template can reference for one change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    pub change_id: String,
    pub change_type: ChangeType,
    pub element_tag: String,
    pub xpath: String,
    pub selector: String,

    pub original: ChangeState,
    pub modified: ChangeState,

    pub page_url: String,
    #[serde(rename = "surroundingHTML")]
    pub surrounding_html: String,
    pub design_system: String,
    pub existing_classes: Vec<String>,
    pub viewport_width: u32,

    pub is_text_change: bool,
    pub is_style_change: bool,
    pub style_change_count: usize,
    pub changed_style_properties: Vec<String>,
}

impl PromptContext {
    /// Build the template context, applying page-context defaults
    pub fn build(change: &ChangeInput, context: &AnalysisContext) -> Self {
        let changed_style_properties =
            changed_style_properties(change.original.styles.as_ref(), change.modified.styles.as_ref());

        Self {
            change_id: change.id.clone(),
            change_type: change.change_type,
            element_tag: change.element_tag.clone(),
            xpath: change.xpath.clone(),
            selector: change.selector.clone(),
            original: change.original.clone(),
            modified: change.modified.clone(),
            page_url: context.page_url.clone(),
            surrounding_html: context.surrounding_html.clone().unwrap_or_default(),
            design_system: context
                .design_system
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESIGN_SYSTEM.to_string()),
            existing_classes: context.existing_classes.clone(),
            viewport_width: context
                .viewport_width
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_VIEWPORT_WIDTH),
            is_text_change: change.change_type == ChangeType::Text,
            is_style_change: change.change_type == ChangeType::Style,
            style_change_count: changed_style_properties.len(),
            changed_style_properties,
        }
    }
}

/// Keys present in either map whose values differ, sorted.
///
/// A side without a style map counts as empty, so every key on the other side is changed.
pub fn changed_style_properties(
    original: Option<&BTreeMap<String, String>>,
    modified: Option<&BTreeMap<String, String>>,
) -> Vec<String> {
    let empty = BTreeMap::new();
    let original = original.unwrap_or(&empty);
    let modified = modified.unwrap_or(&empty);

    let mut changed: Vec<String> = original
        .keys()
        .chain(modified.keys())
        .filter(|key| original.get(*key) != modified.get(*key))
        .cloned()
        .collect();
    changed.sort();
    changed.dedup();
    changed
}

/// Rough difficulty of a change in [0, 1]
pub fn estimate_change_complexity(change: &ChangeInput) -> f64 {
    match change.change_type {
        ChangeType::Text => {
            let len = |s: &ChangeState| s.text_content.as_deref().map_or(0, |t| t.chars().count());
            let diff = len(&change.modified).abs_diff(len(&change.original));
            (diff as f64 / 100.0).min(0.5)
        }
        ChangeType::Style => {
            let changed = changed_style_properties(
                change.original.styles.as_ref(),
                change.modified.styles.as_ref(),
            );
            let mut complexity = (changed.len() as f64 / 10.0).min(0.7);

            let high_impact = changed.iter().any(|prop| {
                let prop = prop.to_lowercase();
                HIGH_IMPACT_PROPERTIES.iter().any(|hip| prop.contains(hip))
            });
            if high_impact {
                complexity = (complexity + 0.2).min(1.0);
            }
            complexity
        }
    }
}

/// How much page context the model gets to work with, in [0, 1]
pub fn estimate_context_quality(context: &AnalysisContext) -> f64 {
    let mut quality: f64 = 0.3;

    if context
        .surrounding_html
        .as_deref()
        .is_some_and(|html| html.chars().count() > 100)
    {
        quality += 0.3;
    }
    if context
        .design_system
        .as_deref()
        .is_some_and(|d| !d.is_empty() && d != DEFAULT_DESIGN_SYSTEM)
    {
        quality += 0.2;
    }
    if !context.existing_classes.is_empty() {
        quality += 0.1;
    }
    if context.viewport_width.is_some_and(|w| w > 0) {
        quality += 0.1;
    }

    quality.min(1.0)
}
