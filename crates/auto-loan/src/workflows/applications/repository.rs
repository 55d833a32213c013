use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationForm, ApplicationId, ApplicationStatus};
use super::scoring::{AssessmentResult, RiskLevel};

/// Persisted application document: the submitted form plus review metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub form: ApplicationForm,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub readiness_score: Option<u8>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl ApplicationRecord {
    pub fn apply_assessment(&mut self, assessment: &AssessmentResult) {
        self.ai_summary = Some(assessment.summary.clone());
        self.readiness_score = Some(assessment.readiness_score);
        self.risk_level = Some(assessment.risk_level);
        self.insights = assessment.insights.clone();
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.label(),
            submitted_at: self.created_at,
        }
    }
}

/// Document store abstraction so the service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Records ordered by creation time, newest first.
    fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// What an applicant sees after submitting.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
}
