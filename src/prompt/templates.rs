// src/prompt/templates.rs
// Built-in prompt templates rendered from a PromptContext

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::context::PromptContext;

/// Named templates known to the prompt builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateName {
    System,
    Analysis,
    ComponentAnalysis,
    StyleReview,
    RiskAssessment,
    PrScoring,
}

impl TemplateName {
    pub const ALL: [TemplateName; 6] = [
        TemplateName::System,
        TemplateName::Analysis,
        TemplateName::ComponentAnalysis,
        TemplateName::StyleReview,
        TemplateName::RiskAssessment,
        TemplateName::PrScoring,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" => Some(Self::System),
            "analysis" => Some(Self::Analysis),
            "component-analysis" => Some(Self::ComponentAnalysis),
            "style-review" => Some(Self::StyleReview),
            "risk-assessment" => Some(Self::RiskAssessment),
            "pr-scoring" => Some(Self::PrScoring),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::Analysis => "analysis",
            Self::ComponentAnalysis => "component-analysis",
            Self::StyleReview => "style-review",
            Self::RiskAssessment => "risk-assessment",
            Self::PrScoring => "pr-scoring",
        };
        f.write_str(name)
    }
}

pub const SYSTEM_PROMPT: &str = r#"You are an expert frontend code reviewer and design system analyst. You analyze DOM changes made through a visual editor and provide detailed, actionable feedback.

Your expertise includes:
- CSS architecture and cascade effects
- Responsive design and breakpoints
- Design system consistency
- Accessibility best practices
- Code quality and maintainability
- Semantic HTML structure

You always provide structured JSON responses matching the specified schema. Your analysis is thorough but practical, focusing on real risks and actionable suggestions.

When analyzing changes:
1. Consider the broader context of the page and design system
2. Think about responsive behavior across breakpoints
3. Evaluate accessibility implications
4. Assess consistency with existing patterns
5. Identify potential cascade effects

Be direct and specific. Avoid vague warnings. When you identify a risk, explain exactly what could go wrong and how to mitigate it."#;

const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze this change and respond with a JSON object containing:
1. **affectedComponents**: Components impacted by this change
2. **risks**: Potential risks (cascade, responsive, accessibility, etc.)
3. **suggestions**: Improvement suggestions
4. **styleConsistency**: Style consistency review
5. **prScore**: Overall PR quality score with breakdown"#;

const RISK_CATEGORIES: &str = r#"Identify risks in these categories:
- **cascade**: CSS cascade effects on other elements
- **responsive**: Responsive design breakpoint issues
- **accessibility**: Accessibility concerns
- **performance**: Performance implications
- **semantic**: Semantic HTML structure
- **compatibility**: Browser compatibility
- **design-consistency**: Design system alignment

For each risk, provide:
- Severity (critical/high/medium/low)
- Clear description
- Specific mitigation steps

Respond with JSON array of Risk objects."#;

const SCORING_CRITERIA: &str = r#"## Scoring Criteria (0-100 each)

1. **Code Consistency**: Does this match surrounding code patterns and conventions?
2. **Reuse Score**: Does it leverage existing utilities or create redundant styles?
3. **AI Detection Risk**: Would a reviewer flag this as AI-generated? (lower score = higher risk)
4. **Cascade Risk**: Will CSS changes affect other elements unexpectedly? (lower score = higher risk)
5. **Responsive Score**: Are there responsive breakpoint considerations handled?
6. **Semantic Score**: Is semantic HTML structure preserved?
7. **Intent Alignment**: Does this match what the user likely intended?

## Also Consider
- Would you approve this PR?
- What flags would you raise for reviewers?
- Brief summary of change quality

Respond with a PRScore JSON object including overall score, breakdown, and flags."#;

// ============================================================================
// Helpers
// ============================================================================

/// Pretty-printed JSON, or `null` when the value cannot be serialized
pub fn json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

pub fn join(items: &[String], separator: &str) -> String {
    items.join(separator)
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn styles_block(styles: Option<&BTreeMap<String, String>>) -> String {
    format!("```json\n{}\n```", json_pretty(&styles))
}

fn state_section(out: &mut String, heading: &str, ctx: &PromptContext, modified: bool) {
    let state = if modified { &ctx.modified } else { &ctx.original };
    out.push_str(&format!("## {heading}\n"));
    if ctx.is_text_change {
        out.push_str(&format!(
            "**Text Content**: \"{}\"\n",
            state.text_content.as_deref().unwrap_or_default()
        ));
    }
    if ctx.is_style_change {
        out.push_str("**Styles**:\n");
        out.push_str(&styles_block(state.styles.as_ref()));
        out.push('\n');
    }
    out.push('\n');
}

// ============================================================================
// Renderers
// ============================================================================

/// Full review request, optionally embedding the output schema
pub fn render_analysis(ctx: &PromptContext, output_schema: Option<&Value>) -> String {
    let mut out = String::from("Analyze the following DOM change and provide a comprehensive review.\n\n");

    out.push_str("## Change Details\n");
    out.push_str(&format!("- **Type**: {} change\n", ctx.change_type));
    out.push_str(&format!("- **Element**: <{}>\n", ctx.element_tag));
    out.push_str(&format!("- **Selector**: `{}`\n", ctx.selector));
    out.push_str(&format!("- **Page URL**: {}\n\n", ctx.page_url));

    state_section(&mut out, "Original State", ctx, false);
    state_section(&mut out, "Modified State", ctx, true);

    if !ctx.surrounding_html.is_empty() {
        out.push_str(&format!(
            "## Surrounding Context\n```html\n{}\n```\n\n",
            ctx.surrounding_html
        ));
    }
    if !ctx.design_system.is_empty() {
        out.push_str(&format!("## Design System\nDetected: {}\n\n", ctx.design_system));
    }
    if !ctx.existing_classes.is_empty() {
        out.push_str(&format!(
            "## Existing CSS Classes on Page\n{}\n\n",
            join(&ctx.existing_classes, ", ")
        ));
    }
    out.push_str(&format!("## Viewport\nWidth: {}px\n\n---\n\n", ctx.viewport_width));
    out.push_str(ANALYSIS_INSTRUCTIONS);

    if let Some(schema) = output_schema {
        out.push_str("\n\nResponse must be valid JSON matching this schema:\n");
        out.push_str(&format!("```json\n{}\n```", json_pretty(schema)));
    }
    out
}

pub fn render_component_analysis(ctx: &PromptContext) -> String {
    let mut out = String::from("Analyze the component impact of this DOM change.\n\n");
    out.push_str(&format!(
        "## Change\n- Element: <{}>\n- Selector: {}\n- Change Type: {}\n\n## Context\n",
        ctx.element_tag, ctx.selector, ctx.change_type
    ));
    if !ctx.surrounding_html.is_empty() {
        out.push_str(&format!("```html\n{}\n```\n", ctx.surrounding_html));
    }
    out.push_str(
        "\nIdentify:\n\
         1. What component is this element part of?\n\
         2. Are there other instances of this component on the page?\n\
         3. What other pages might use this component?\n\
         4. What is the impact level (high/medium/low)?\n\n\
         Respond with JSON array of ComponentImpact objects.",
    );
    out
}

pub fn render_style_review(ctx: &PromptContext) -> String {
    let mut out = String::from("Review the style consistency of this change.\n\n");
    out.push_str("## Original Styles\n");
    out.push_str(&styles_block(ctx.original.styles.as_ref()));
    out.push_str("\n\n## Modified Styles\n");
    out.push_str(&styles_block(ctx.modified.styles.as_ref()));
    out.push_str(&format!(
        "\n\n## Changed Properties\n{}\n\n",
        join(&ctx.changed_style_properties, ", ")
    ));
    if !ctx.design_system.is_empty() {
        out.push_str(&format!("## Design System: {}\n\n", ctx.design_system));
    }
    out.push_str(
        "Evaluate:\n\
         1. Color consistency with the design system\n\
         2. Spacing/padding alignment with existing patterns\n\
         3. Typography consistency\n\
         4. Overall style coherence\n\n\
         Respond with a StyleReview JSON object.",
    );
    out
}

pub fn render_risk_assessment(ctx: &PromptContext) -> String {
    let mut out = String::from("Assess the risks of this DOM change.\n\n");
    out.push_str(&format!(
        "## Change Details\n- Element: <{}>\n- Type: {}\n- Selector: {}\n\n",
        ctx.element_tag, ctx.change_type, ctx.selector
    ));
    if ctx.is_style_change {
        out.push_str(&format!(
            "## Style Changes\nChanged properties: {}\n\nOriginal:\n{}\n\nModified:\n{}\n\n",
            join(&ctx.changed_style_properties, ", "),
            styles_block(ctx.original.styles.as_ref()),
            styles_block(ctx.modified.styles.as_ref()),
        ));
    }
    if ctx.is_text_change {
        out.push_str(&format!(
            "## Text Change\nOriginal: \"{}\"\nModified: \"{}\"\n\n",
            ctx.original.text_content.as_deref().unwrap_or_default(),
            ctx.modified.text_content.as_deref().unwrap_or_default(),
        ));
    }
    out.push_str(&format!("## Context\nViewport: {}px\n", ctx.viewport_width));
    if !ctx.surrounding_html.is_empty() {
        out.push_str("Surrounding HTML available for context\n");
    }
    out.push('\n');
    out.push_str(RISK_CATEGORIES);
    out
}

pub fn render_pr_scoring(ctx: &PromptContext) -> String {
    let mut out = String::from("Score this change as if reviewing a pull request.\n\n");
    out.push_str(&format!(
        "## Change Summary\n- Element: <{}>\n- Type: {} change\n- Selector: {}\n\n",
        ctx.element_tag,
        capitalize(&ctx.change_type.to_string()),
        ctx.selector
    ));
    if ctx.is_text_change {
        out.push_str(&format!(
            "Text changed from \"{}\" to \"{}\"\n\n",
            ctx.original.text_content.as_deref().unwrap_or_default(),
            ctx.modified.text_content.as_deref().unwrap_or_default(),
        ));
    }
    if ctx.is_style_change {
        out.push_str(&format!(
            "Style properties changed: {}\n\n",
            join(&ctx.changed_style_properties, ", ")
        ));
    }
    out.push_str(SCORING_CRITERIA);
    out
}

/// Substitute `{{field}}` placeholders in a custom template.
///
/// Scalars are inserted as-is, lists are comma-joined, objects become pretty JSON.
/// Unknown placeholders render empty.
pub fn substitute(template: &str, ctx: &PromptContext) -> String {
    let fields = match serde_json::to_value(ctx) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        out.push_str(&render_field(fields.get(key)));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn render_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(obj @ Value::Object(_)) => json_pretty(obj),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisContext, ChangeInput, ChangeState, ChangeType};

    fn style_ctx() -> PromptContext {
        let change = ChangeInput {
            id: "c1".into(),
            change_type: ChangeType::Style,
            element_tag: "button".into(),
            xpath: "/html/body/button".into(),
            selector: "button.cta".into(),
            original: ChangeState::styles([("color", "red"), ("display", "block")]),
            modified: ChangeState::styles([("color", "blue"), ("display", "block")]),
        };
        let context = AnalysisContext {
            existing_classes: vec!["btn".into(), "cta".into()],
            ..AnalysisContext::new("https://shop.example.com")
        };
        PromptContext::build(&change, &context)
    }

    fn text_ctx() -> PromptContext {
        let change = ChangeInput {
            id: "t1".into(),
            change_type: ChangeType::Text,
            element_tag: "h1".into(),
            xpath: "/html/body/h1".into(),
            selector: "h1.title".into(),
            original: ChangeState::text("Welcome"),
            modified: ChangeState::text("Welcome back"),
        };
        PromptContext::build(&change, &AnalysisContext::new("https://example.com"))
    }

    #[test]
    fn test_template_names_roundtrip() {
        for name in TemplateName::ALL {
            assert_eq!(TemplateName::from_str(&name.to_string()), Some(name));
        }
        assert_eq!(TemplateName::from_str("nope"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("style"), "Style");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_analysis_style_sections() {
        let prompt = render_analysis(&style_ctx(), None);
        assert!(prompt.contains("- **Type**: style change"));
        assert!(prompt.contains("- **Selector**: `button.cta`"));
        assert!(prompt.contains("\"color\": \"blue\""));
        assert!(prompt.contains("## Existing CSS Classes on Page\nbtn, cta"));
        assert!(prompt.contains("Width: 1920px"));
        assert!(!prompt.contains("**Text Content**"));
        assert!(!prompt.contains("## Surrounding Context"));
        assert!(!prompt.contains("Response must be valid JSON"));
    }

    #[test]
    fn test_analysis_text_sections_with_schema() {
        let schema = serde_json::json!({ "type": "object" });
        let prompt = render_analysis(&text_ctx(), Some(&schema));
        assert!(prompt.contains("**Text Content**: \"Welcome\""));
        assert!(prompt.contains("**Text Content**: \"Welcome back\""));
        assert!(!prompt.contains("**Styles**"));
        assert!(prompt.contains("Response must be valid JSON matching this schema"));
        assert!(prompt.contains("\"type\": \"object\""));
    }

    #[test]
    fn test_pr_scoring_capitalizes_type() {
        let prompt = render_pr_scoring(&style_ctx());
        assert!(prompt.contains("- Type: Style change"));
        assert!(prompt.contains("Style properties changed: color"));
    }

    #[test]
    fn test_risk_assessment_lists_categories() {
        let prompt = render_risk_assessment(&text_ctx());
        assert!(prompt.contains("Original: \"Welcome\""));
        assert!(prompt.contains("**design-consistency**"));
        assert!(!prompt.contains("## Style Changes"));
    }

    #[test]
    fn test_substitute_placeholders() {
        let ctx = style_ctx();
        let out = substitute(
            "Tag {{elementTag}} on {{ pageUrl }} changed {{changedStyleProperties}}{{missing}}.",
            &ctx,
        );
        assert_eq!(out, "Tag button on https://shop.example.com changed color.");
    }

    #[test]
    fn test_substitute_unterminated_placeholder() {
        let out = substitute("Hello {{elementTag", &style_ctx());
        assert_eq!(out, "Hello {{elementTag");
    }
}
