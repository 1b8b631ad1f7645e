// src/prompt/mod.rs
// Prompt construction for change analysis

pub mod context;
pub mod templates;

use std::collections::HashMap;

use crate::llm::Message;
use crate::parser::analysis_result_json_schema;

pub use context::{
    PromptContext, changed_style_properties, estimate_change_complexity, estimate_context_quality,
};
pub use templates::{SYSTEM_PROMPT, TemplateName};

/// Renders named templates, preferring registered overrides over built-ins
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    overrides: HashMap<TemplateName, String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a built-in template with a `{{placeholder}}` template
    pub fn with_template(mut self, name: TemplateName, template: impl Into<String>) -> Self {
        self.overrides.insert(name, template.into());
        self
    }

    pub fn has_override(&self, name: TemplateName) -> bool {
        self.overrides.contains_key(&name)
    }

    pub fn render(&self, name: TemplateName, ctx: &PromptContext) -> String {
        if let Some(custom) = self.overrides.get(&name) {
            return templates::substitute(custom, ctx);
        }
        match name {
            TemplateName::System => SYSTEM_PROMPT.to_string(),
            TemplateName::Analysis => templates::render_analysis(ctx, None),
            TemplateName::ComponentAnalysis => templates::render_component_analysis(ctx),
            TemplateName::StyleReview => templates::render_style_review(ctx),
            TemplateName::RiskAssessment => templates::render_risk_assessment(ctx),
            TemplateName::PrScoring => templates::render_pr_scoring(ctx),
        }
    }

    /// System plus analysis messages, with the output schema embedded
    pub fn build_messages(&self, ctx: &PromptContext) -> Vec<Message> {
        let system = self.render(TemplateName::System, ctx);
        let user = match self.overrides.get(&TemplateName::Analysis) {
            Some(custom) => templates::substitute(custom, ctx),
            None => templates::render_analysis(ctx, Some(&analysis_result_json_schema())),
        };
        vec![Message::system(system), Message::user(user)]
    }
}
