//! Report presets.
//!
//! Each [`ReportKind`] bundles the document title, the model defaults and the
//! prompt template sent to the inference endpoint for every file.

/// Placeholder replaced by the file contents in a prompt template.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Type of report to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Structured debug report per file
    Debug,
    /// Documentation and commentary per file
    Documentation,
}

impl ReportKind {
    /// Returns the preset for this kind.
    #[must_use]
    pub fn preset(self) -> ReportPreset {
        ReportPreset::for_kind(self)
    }
}

/// Defaults and prompt for one report kind.
#[derive(Debug, Clone)]
pub struct ReportPreset {
    /// Report kind this preset belongs to
    pub kind: ReportKind,
    /// Title printed at the top of the document
    pub document_title: String,
    /// Base name of the default output file (without extension)
    pub output_stem: String,
    /// Model identifier sent to the endpoint
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output size requested from the model
    pub max_tokens: u32,
    /// Prompt template containing [`CODE_PLACEHOLDER`]
    pub prompt_template: String,
}

impl ReportPreset {
    /// Creates the preset for the given kind.
    #[must_use]
    pub fn for_kind(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Debug => Self::debug(),
            ReportKind::Documentation => Self::documentation(),
        }
    }

    fn debug() -> Self {
        Self {
            kind: ReportKind::Debug,
            document_title: "Debug Report".to_string(),
            output_stem: "debug_report".to_string(),
            model: "mistral:7b-instruct-v0.3-fp16".to_string(),
            temperature: 0.3,
            max_tokens: 8000,
            prompt_template: r"You are a senior software engineer acting as a meticulous debugger.
Provide a complete, detailed, and nicely formatted debug report for the code below.

Work through these steps:
1. Summarize what the code does.
2. Identify bugs, logic errors and unhandled edge cases.
3. Point out error handling gaps and resource leaks.
4. Note performance and security concerns.
5. Suggest concrete fixes, referencing the affected lines.

Code:

{code}"
                .to_string(),
        }
    }

    fn documentation() -> Self {
        Self {
            kind: ReportKind::Documentation,
            document_title: "Repository Documentation".to_string(),
            output_stem: "repository_documentation".to_string(),
            model: "llama3:8b".to_string(),
            temperature: 0.5,
            max_tokens: 1500,
            prompt_template:
                "Generate documentation and commentary for the following code:\n\n{code}"
                    .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_preset_defaults() {
        let preset = ReportKind::Debug.preset();
        assert_eq!(preset.model, "mistral:7b-instruct-v0.3-fp16");
        assert_eq!(preset.max_tokens, 8000);
        assert_eq!(preset.document_title, "Debug Report");
    }

    #[test]
    fn test_documentation_preset_defaults() {
        let preset = ReportKind::Documentation.preset();
        assert_eq!(preset.model, "llama3:8b");
        assert_eq!(preset.max_tokens, 1500);
        assert!((preset.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_templates_have_one_placeholder() {
        for kind in [ReportKind::Debug, ReportKind::Documentation] {
            let preset = kind.preset();
            assert_eq!(preset.kind, kind);
            assert_eq!(preset.prompt_template.matches(CODE_PLACEHOLDER).count(), 1);
        }
    }
}
