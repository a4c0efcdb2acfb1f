pub mod policy;
pub mod scoring;
pub mod team;

use serde_json::Value;

use readiness_core::catalog::{QuestionCatalog, StaticCatalogSource};

use crate::input;

/// Load a question catalog file: either a JSON array of questions, or an
/// object of template id to question array (pick one with `--template`).
pub fn load_catalog(
    path: &str,
    template: Option<&str>,
) -> Result<QuestionCatalog, Box<dyn std::error::Error>> {
    match input::file::read_json_value(path)? {
        Value::Array(items) => {
            let questions = serde_json::from_value(Value::Array(items))?;
            Ok(QuestionCatalog::new(questions))
        }
        Value::Object(templates) => {
            let mut source = StaticCatalogSource::new();
            for (template_id, questions) in templates {
                source = source.with_template(template_id, serde_json::from_value(questions)?);
            }
            let template = template.ok_or("--template required for a multi-template catalog")?;
            Ok(QuestionCatalog::from_source(&source, template)?)
        }
        _ => Err(format!("Catalog '{}' must be an array or an object of arrays", path).into()),
    }
}
