use crate::{
    config::OutputFormat,
    error::{Error, Result},
    report::Section,
};
use serde::Serialize;
use tera::{Context, Tera};

const PAGE_BREAK: &str = "\u{c}";

#[derive(Serialize)]
struct TemplateContext<'a> {
    title: &'a str,
    generated_at: String,
    total_sections: usize,
    page_break: &'static str,
    sections: &'a [Section],
}

/// Template engine for rendering the document in each output format.
pub(crate) struct TemplateEngine {
    tera: Tera,
    format: OutputFormat,
}

impl TemplateEngine {
    /// Creates a new template engine for the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to parse.
    pub(crate) fn new(format: OutputFormat) -> Result<Self> {
        let mut tera = Tera::default();
        Self::register_builtin_templates(&mut tera)?;

        Ok(Self { tera, format })
    }

    /// Registers built-in templates for each output format.
    fn register_builtin_templates(tera: &mut Tera) -> Result<()> {
        tera.add_raw_template("text", include_str!("../templates/text.tera"))
            .map_err(|e| Error::template("text", e))?;

        tera.add_raw_template("markdown", include_str!("../templates/markdown.tera"))
            .map_err(|e| Error::template("markdown", e))?;

        Ok(())
    }

    /// Renders the document title and sections.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render(&self, title: &str, sections: &[Section]) -> Result<String> {
        let template_name = self.format.template_name();

        let context = TemplateContext {
            title,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_sections: sections.len(),
            page_break: PAGE_BREAK,
            sections,
        };

        let mut tera_context = Context::new();
        tera_context.insert("ctx", &context);

        self.tera
            .render(template_name, &tera_context)
            .map_err(|e| Error::template(template_name, e))
    }
}
