use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    AdminUpdate, ApplicationForm, ApplicationId, ApplicationStatus, DocumentCategory,
    DocumentDescriptor, StatusFilter,
};
use super::export::{export_file_name, write_applications_csv, CsvExport, ExportError};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
use super::scoring::{degraded_summary, ApplicationSnapshot, AssessmentResult, ScoringEngine};
use super::storage::{document_path, guess_content_type, BlobError, BlobObject, BlobStore};

/// Service composing intake validation, scoring, the document store, and blob storage.
pub struct LoanApplicationService<R, B> {
    guard: IntakeGuard,
    engine: ScoringEngine,
    repository: Arc<R>,
    blobs: Arc<B>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, B> LoanApplicationService<R, B>
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    pub fn new(repository: Arc<R>, blobs: Arc<B>) -> Self {
        Self::with_guard(IntakeGuard::default(), repository, blobs)
    }

    pub fn with_guard(guard: IntakeGuard, repository: Arc<R>, blobs: Arc<B>) -> Self {
        Self {
            guard,
            engine: ScoringEngine::new(),
            repository,
            blobs,
        }
    }

    pub fn assess(&self, snapshot: &ApplicationSnapshot) -> AssessmentResult {
        self.engine.assess(snapshot)
    }

    /// Store a single document and describe where it can be retrieved.
    pub fn upload_document(
        &self,
        category: DocumentCategory,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentDescriptor, ApplicationServiceError> {
        self.store_document(category, file_name, None, bytes)
    }

    /// Store several documents of one category, indexing them in upload order.
    pub fn upload_documents(
        &self,
        category: DocumentCategory,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<DocumentDescriptor>, ApplicationServiceError> {
        files
            .into_iter()
            .enumerate()
            .map(|(index, (file_name, bytes))| {
                self.store_document(category, &file_name, Some(index), bytes)
            })
            .collect()
    }

    fn store_document(
        &self,
        category: DocumentCategory,
        file_name: &str,
        batch_index: Option<usize>,
        bytes: Vec<u8>,
    ) -> Result<DocumentDescriptor, ApplicationServiceError> {
        if bytes.is_empty() {
            return Err(ApplicationServiceError::EmptyDocument(file_name.to_string()));
        }

        let storage_path = document_path(category, file_name, batch_index, Utc::now())?;
        let content_type = guess_content_type(file_name);
        let size = bytes.len();
        let url = self.blobs.put(&storage_path, bytes, &content_type)?;
        debug!(%storage_path, size, %content_type, "document stored");

        Ok(DocumentDescriptor {
            category,
            file_name: file_name.to_string(),
            storage_path,
            url,
        })
    }

    pub fn fetch_document(&self, path: &str) -> Result<BlobObject, ApplicationServiceError> {
        self.blobs
            .get(path)?
            .ok_or_else(|| ApplicationServiceError::DocumentNotFound(path.to_string()))
    }

    /// Validate, score, and persist a new application.
    pub fn submit(
        &self,
        form: ApplicationForm,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if let Err(violation) = self.guard.validate(&form) {
            warn!(%violation, "application rejected at intake");
            return Err(violation.into());
        }

        let assessment = self.engine.assess(&ApplicationSnapshot::from(&form));
        let mut record = ApplicationRecord {
            id: next_application_id(),
            form,
            status: ApplicationStatus::New,
            assigned_to: None,
            created_at: Utc::now(),
            ai_summary: None,
            readiness_score: None,
            risk_level: None,
            insights: Vec::new(),
        };
        record.apply_assessment(&assessment);

        let stored = self.repository.insert(record)?;
        info!(
            application_id = %stored.id,
            readiness_score = assessment.readiness_score,
            risk_level = assessment.risk_level.label(),
            "application submitted"
        );
        Ok(stored)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Newest first, restricted to the requested status tab.
    pub fn list(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let records = self.repository.list_recent()?;
        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record.status))
            .collect())
    }

    /// Apply a reviewer's status/assignment change. Records that were never
    /// scored receive the degraded income summary.
    pub fn update(
        &self,
        application_id: &ApplicationId,
        update: AdminUpdate,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(application_id)?;

        let previous = record.status;
        record.status = update.status;
        record.assigned_to = update
            .assigned_to
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if record.ai_summary.is_none() {
            record.ai_summary = Some(degraded_summary(record.form.employment.monthly_income));
        }

        self.repository.update(record.clone())?;
        info!(
            application_id = %record.id,
            from = previous.label(),
            to = record.status.label(),
            assigned_to = record.assigned_to.as_deref().unwrap_or("unassigned"),
            "application updated"
        );
        Ok(record)
    }

    pub fn export_csv(&self, filter: StatusFilter) -> Result<CsvExport, ApplicationServiceError> {
        let records = self.list(filter)?;
        let body = write_applications_csv(&records)?;
        Ok(CsvExport {
            file_name: export_file_name(Utc::now().date_naive()),
            body,
        })
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("uploaded document '{0}' is empty")]
    EmptyDocument(String),
    #[error("document '{0}' not found")]
    DocumentNotFound(String),
}
