//! Assessment repository port.
//!
//! Callers inject an implementation; the engine never keeps process-wide
//! state. The in-memory adapter backs the CLI and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::ReadinessError;
use crate::stored::StoredAssessment;
use crate::ReadinessResult;

/// Persistence port for stored assessments.
pub trait AssessmentRepository: Send + Sync {
    /// All assessments of a company, ordered by assessment id.
    fn list(&self, company_id: &str) -> ReadinessResult<Vec<StoredAssessment>>;

    /// Find an assessment by id. Returns `None` if absent.
    fn get(&self, assessment_id: &str) -> ReadinessResult<Option<StoredAssessment>>;

    /// Insert or replace an assessment.
    fn save(&self, assessment: StoredAssessment) -> ReadinessResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryAssessmentRepository {
    assessments: RwLock<BTreeMap<String, StoredAssessment>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assessments(assessments: impl IntoIterator<Item = StoredAssessment>) -> Self {
        let map = assessments
            .into_iter()
            .map(|a| (a.assessment_id.clone(), a))
            .collect();
        InMemoryAssessmentRepository {
            assessments: RwLock::new(map),
        }
    }
}

fn poisoned<T>(_: T) -> ReadinessError {
    ReadinessError::Repository("assessment store lock poisoned".into())
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn list(&self, company_id: &str) -> ReadinessResult<Vec<StoredAssessment>> {
        let guard = self.assessments.read().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect())
    }

    fn get(&self, assessment_id: &str) -> ReadinessResult<Option<StoredAssessment>> {
        let guard = self.assessments.read().map_err(poisoned)?;
        Ok(guard.get(assessment_id).cloned())
    }

    fn save(&self, assessment: StoredAssessment) -> ReadinessResult<()> {
        let mut guard = self.assessments.write().map_err(poisoned)?;
        guard.insert(assessment.assessment_id.clone(), assessment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(id: &str, company: &str) -> StoredAssessment {
        StoredAssessment {
            assessment_id: id.into(),
            company_id: company.into(),
            respondent: None,
            completed_at: None,
            score: None,
            responses: None,
        }
    }

    #[test]
    fn assessment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AssessmentRepository) {}
    }

    #[test]
    fn test_list_filters_by_company() {
        let repo = InMemoryAssessmentRepository::with_assessments([
            assessment("b", "acme"),
            assessment("a", "acme"),
            assessment("c", "globex"),
        ]);
        let ids: Vec<String> = repo
            .list("acme")
            .unwrap()
            .into_iter()
            .map(|a| a.assessment_id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(repo.list("initech").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_existing() {
        let repo = InMemoryAssessmentRepository::new();
        repo.save(assessment("a", "acme")).unwrap();
        let mut updated = assessment("a", "acme");
        updated.respondent = Some("ops lead".into());
        repo.save(updated).unwrap();

        let stored = repo.get("a").unwrap().unwrap();
        assert_eq!(stored.respondent.as_deref(), Some("ops lead"));
        assert_eq!(repo.list("acme").unwrap().len(), 1);
        assert!(repo.get("missing").unwrap().is_none());
    }
}
