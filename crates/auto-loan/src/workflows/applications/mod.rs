//! Auto loan application intake, readiness scoring, and admin review.

pub mod domain;
pub mod export;
pub mod intake;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sessions;
pub mod storage;

#[cfg(test)]
mod tests;

pub use domain::{
    AdminUpdate, ApplicationForm, ApplicationId, ApplicationStatus, DocumentCategory,
    DocumentDescriptor, EmploymentInfo, EmploymentLength, EmploymentStatus, PersonalInfo,
    StatusFilter, UnrecognizedValue, VehicleInfo,
};
pub use export::{CsvExport, ExportError};
pub use intake::{IntakeGuard, IntakeViolation};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
};
pub use router::{application_router, application_router_with_upload_limit, ApplicationApi};
pub use scoring::{
    ApplicationSnapshot, AssessmentResult, RiskLevel, ScoreComponent, ScoringEngine,
    ScoringFactor,
};
pub use service::{ApplicationServiceError, LoanApplicationService};
pub use sessions::{AdminSessions, StaticTokenSessions};
pub use storage::{
    BlobError, BlobObject, BlobStore, FilesystemBlobStore, InMemoryBlobStore,
    DEFAULT_MAX_UPLOAD_BYTES,
};
