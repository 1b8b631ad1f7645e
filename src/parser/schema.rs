// src/parser/schema.rs
// JSON schema embedded in the analysis prompt

use serde_json::{Value, json};

fn unit_number() -> Value {
    json!({ "type": "number", "minimum": 0, "maximum": 1 })
}

fn score_number() -> Value {
    json!({ "type": "number", "minimum": 0, "maximum": 100 })
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

/// Schema describing the object the model must return
pub fn analysis_result_json_schema() -> Value {
    let breakdown_keys = [
        "codeConsistency",
        "reuseScore",
        "aiDetectionRisk",
        "cascadeRisk",
        "responsiveScore",
        "semanticScore",
        "intentAlignment",
    ];
    let breakdown_props: serde_json::Map<String, Value> = breakdown_keys
        .iter()
        .map(|k| (k.to_string(), score_number()))
        .collect();

    json!({
        "type": "object",
        "required": ["affectedComponents", "risks", "suggestions", "styleConsistency", "prScore"],
        "properties": {
            "affectedComponents": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["componentName", "impactLevel", "description", "otherPagesAffected", "confidence"],
                    "properties": {
                        "componentName": { "type": "string" },
                        "filePath": { "type": "string" },
                        "impactLevel": { "type": "string", "enum": ["high", "medium", "low"] },
                        "description": { "type": "string" },
                        "otherPagesAffected": string_array(),
                        "confidence": unit_number()
                    }
                }
            },
            "risks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "severity", "category", "title", "description", "confidence"],
                    "properties": {
                        "id": { "type": "string" },
                        "severity": { "type": "string", "enum": ["critical", "high", "medium", "low"] },
                        "category": {
                            "type": "string",
                            "enum": ["cascade", "responsive", "accessibility", "performance", "semantic", "compatibility", "design-consistency"]
                        },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "affectedBreakpoints": string_array(),
                        "mitigation": { "type": "string" },
                        "confidence": unit_number()
                    }
                }
            },
            "suggestions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "type", "priority", "title", "description", "rationale", "confidence"],
                    "properties": {
                        "id": { "type": "string" },
                        "type": { "type": "string", "enum": ["improvement", "alternative", "best-practice", "optimization"] },
                        "priority": { "type": "string", "enum": ["high", "medium", "low"] },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "codeExample": { "type": "string" },
                        "rationale": { "type": "string" },
                        "confidence": unit_number()
                    }
                }
            },
            "styleConsistency": {
                "type": "object",
                "required": [
                    "overallConsistency", "designSystemAlignment", "colorConsistency",
                    "spacingConsistency", "typographyConsistency", "issues", "confidence"
                ],
                "properties": {
                    "overallConsistency": score_number(),
                    "designSystemAlignment": score_number(),
                    "colorConsistency": score_number(),
                    "spacingConsistency": score_number(),
                    "typographyConsistency": score_number(),
                    "issues": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["property", "issue", "suggestion"],
                            "properties": {
                                "property": { "type": "string" },
                                "issue": { "type": "string" },
                                "suggestion": { "type": "string" }
                            }
                        }
                    },
                    "confidence": unit_number()
                }
            },
            "prScore": {
                "type": "object",
                "required": ["overall", "breakdown", "flags", "summary", "wouldApprove", "confidence"],
                "properties": {
                    "overall": score_number(),
                    "breakdown": {
                        "type": "object",
                        "required": breakdown_keys,
                        "properties": breakdown_props
                    },
                    "flags": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["type", "message", "confidence"],
                            "properties": {
                                "type": { "type": "string", "enum": ["warning", "suggestion", "info"] },
                                "message": { "type": "string" },
                                "details": { "type": "string" },
                                "confidence": unit_number()
                            }
                        }
                    },
                    "summary": { "type": "string" },
                    "wouldApprove": { "type": "boolean" },
                    "confidence": unit_number()
                }
            }
        }
    })
}
