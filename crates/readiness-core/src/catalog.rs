//! Question catalog: the ordered question definitions supplied by the
//! external catalog accessor, indexed for scoring.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::maturity::MaturityLevel;
use crate::types::Pillar;
use crate::ReadinessResult;

/// Dimension name used when a question carries no dimension metadata.
pub const UNKNOWN_DIMENSION: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    SingleChoice,
    MultiChoice,
    Scale,
    Text,
}

/// Free-form catalog metadata. Both tags may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pillar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub label: String,
    /// Maturity tag, e.g. `EMERGING`. Kept verbatim so unknown tags survive
    /// a round trip through the catalog.
    pub value: String,
    /// Points awarded when this option is selected.
    pub score: Decimal,
}

impl QuestionOption {
    pub fn level(&self) -> Option<MaturityLevel> {
        MaturityLevel::from_tag(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default)]
    pub metadata: QuestionMetadata,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn pillar(&self) -> Pillar {
        self.metadata
            .pillar
            .as_deref()
            .map(Pillar::from_tag)
            .unwrap_or(Pillar::Unknown)
    }

    pub fn dimension(&self) -> &str {
        match self.metadata.dimension.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => UNKNOWN_DIMENSION,
        }
    }

    /// Free-text questions carry no points.
    pub fn is_scored(&self) -> bool {
        self.kind != QuestionKind::Text
    }

    /// Options ordered Basic to World Class; untagged options go last,
    /// ordered by score.
    pub fn sorted_options(&self) -> Vec<&QuestionOption> {
        let mut options: Vec<&QuestionOption> = self.options.iter().collect();
        options.sort_by(|a, b| {
            let rank = |o: &QuestionOption| o.level().map(|l| l as u8).unwrap_or(u8::MAX);
            rank(a).cmp(&rank(b)).then(a.score.cmp(&b.score))
        });
        options
    }

    /// Find the option a response selected, by maturity tag or option id.
    pub fn option_for(&self, selected: &str) -> Option<&QuestionOption> {
        let level = MaturityLevel::from_tag(selected);
        self.options
            .iter()
            .find(|o| level.is_some() && o.level() == level)
            .or_else(|| self.options.iter().find(|o| o.id == selected))
    }
}

/// Port for the external catalog accessor.
pub trait CatalogSource {
    /// Ordered questions for one template (catalog) identifier.
    fn questions(&self, template_id: &str) -> ReadinessResult<Vec<Question>>;
}

/// Catalog held in memory, keyed by template id.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    templates: HashMap<String, Vec<Question>>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template_id: impl Into<String>, questions: Vec<Question>) -> Self {
        self.templates.insert(template_id.into(), questions);
        self
    }
}

impl CatalogSource for StaticCatalogSource {
    fn questions(&self, template_id: &str) -> ReadinessResult<Vec<Question>> {
        self.templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| crate::ReadinessError::NotFound {
                entity: "template".into(),
                id: template_id.into(),
            })
    }
}

/// Questions indexed by id, kept in catalog order.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl QuestionCatalog {
    /// Index `questions`. When an id repeats, the first definition wins.
    pub fn new(mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.order);
        let mut index = HashMap::with_capacity(questions.len());
        let mut kept = Vec::with_capacity(questions.len());
        for question in questions {
            if index.contains_key(&question.id) {
                tracing::warn!(question_id = %question.id, "duplicate question id in catalog, keeping first");
                continue;
            }
            index.insert(question.id.clone(), kept.len());
            kept.push(question);
        }
        QuestionCatalog {
            questions: kept,
            index,
        }
    }

    pub fn from_source(source: &dyn CatalogSource, template_id: &str) -> ReadinessResult<Self> {
        Ok(Self::new(source.questions(template_id)?))
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.index.get(question_id).map(|&i| &self.questions[i])
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Required questions the response set leaves unanswered.
    pub fn unanswered_required<'a>(
        &'a self,
        answered: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions
            .iter()
            .filter(move |q| q.required && !answered(&q.id))
    }
}

impl From<Vec<Question>> for QuestionCatalog {
    fn from(questions: Vec<Question>) -> Self {
        QuestionCatalog::new(questions)
    }
}
