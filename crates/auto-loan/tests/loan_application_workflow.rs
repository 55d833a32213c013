//! End-to-end behavior of the loan intake workflow through the public service facade and
//! HTTP router, backed by the filesystem blob store.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use auto_loan::workflows::applications::{
        ApplicationForm, ApplicationId, ApplicationRecord, ApplicationRepository,
        EmploymentInfo, EmploymentLength, EmploymentStatus, FilesystemBlobStore,
        LoanApplicationService, PersonalInfo, RepositoryError, VehicleInfo,
    };

    pub(super) const BASE_URL: &str = "https://loans.example.com";

    pub(super) fn form_without_documents() -> ApplicationForm {
        ApplicationForm {
            personal: PersonalInfo {
                full_name: "Casey Lindqvist".to_string(),
                email: "casey@example.com".to_string(),
                phone: "641-555-0110".to_string(),
                address: "9 Orchard Row".to_string(),
                city: "Ames".to_string(),
                state: "IA".to_string(),
                zip_code: "50010".to_string(),
            },
            employment: EmploymentInfo {
                employer: "Cyclone Bakery".to_string(),
                job_title: "Baker".to_string(),
                employment_status: Some(EmploymentStatus::PartTime),
                monthly_income: Some(2400.0),
                employment_length: Some(EmploymentLength::LessThanOneYear),
            },
            vehicle: VehicleInfo {
                has_selected_vehicle: true,
                vehicle_type: Some("Hatchback".to_string()),
                make: Some("Toyota".to_string()),
                model: Some("Corolla".to_string()),
                year: Some("2019".to_string()),
                price: Some(16_000.0),
                down_payment: Some(800.0),
            },
            documents: Vec::new(),
        }
    }

    #[derive(Default)]
    pub(super) struct InMemoryRepository {
        records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    }

    impl ApplicationRepository for InMemoryRepository {
        fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("mutex poisoned");
            if guard.contains_key(&record.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        }

        fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("mutex poisoned");
            if !guard.contains_key(&record.id) {
                return Err(RepositoryError::NotFound);
            }
            guard.insert(record.id.clone(), record);
            Ok(())
        }

        fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
            Ok(self.records.lock().expect("mutex poisoned").get(id).cloned())
        }

        fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
            let guard = self.records.lock().expect("mutex poisoned");
            let mut records: Vec<_> = guard.values().cloned().collect();
            records.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
            Ok(records)
        }
    }

    pub(super) fn service(
        upload_root: &std::path::Path,
    ) -> Arc<LoanApplicationService<InMemoryRepository, FilesystemBlobStore>> {
        Arc::new(LoanApplicationService::new(
            Arc::new(InMemoryRepository::default()),
            Arc::new(FilesystemBlobStore::new(upload_root, BASE_URL)),
        ))
    }
}

use std::sync::Arc;

use auto_loan::workflows::applications::{
    application_router, AdminSessions, AdminUpdate, ApplicationServiceError, ApplicationStatus,
    DocumentCategory, IntakeViolation, RiskLevel, StaticTokenSessions, StatusFilter,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use tower::ServiceExt;

#[test]
fn documents_are_written_under_category_folders() {
    let upload_root = tempfile::tempdir().expect("temp dir");
    let service = service(upload_root.path());

    let descriptors = service
        .upload_documents(
            DocumentCategory::BankStatement,
            vec![
                ("jan.pdf".to_string(), b"jan".to_vec()),
                ("feb.pdf".to_string(), b"feb".to_vec()),
            ],
        )
        .expect("uploads succeed");

    for descriptor in &descriptors {
        assert!(descriptor
            .storage_path
            .starts_with("applications/bankStatements/"));
        assert!(upload_root.path().join(&descriptor.storage_path).is_file());
        assert_eq!(
            descriptor.url,
            format!("{BASE_URL}/api/v1/documents/{}", descriptor.storage_path)
        );
    }
}

#[test]
fn risky_applicant_is_scored_and_reviewed() {
    let upload_root = tempfile::tempdir().expect("temp dir");
    let service = service(upload_root.path());

    let mut form = form_without_documents();
    match service.submit(form.clone()) {
        Err(ApplicationServiceError::Intake(IntakeViolation::MissingDocument(category))) => {
            assert_eq!(category, DocumentCategory::PayStub)
        }
        other => panic!("expected missing document, got {other:?}"),
    }

    for category in DocumentCategory::ALL {
        let descriptor = service
            .upload_document(category, "scan.pdf", b"%PDF".to_vec())
            .expect("upload succeeds");
        form.documents.push(descriptor);
    }

    let record = service.submit(form).expect("submission succeeds");
    // 5 - 1 (income below 3000) - 1 (under a year) + 0 (part-time) - 1 (5% down)
    assert_eq!(record.readiness_score, Some(2));
    assert_eq!(record.risk_level, Some(RiskLevel::High));
    assert_eq!(record.insights.len(), 4);

    let updated = service
        .update(
            &record.id,
            AdminUpdate {
                status: ApplicationStatus::Declined,
                assigned_to: Some("Morgan".to_string()),
            },
        )
        .expect("update succeeds");
    assert_eq!(updated.status, ApplicationStatus::Declined);

    let declined = service
        .list(StatusFilter::Only(ApplicationStatus::Declined))
        .expect("list succeeds");
    assert_eq!(declined.len(), 1);
    assert!(service
        .list(StatusFilter::Only(ApplicationStatus::New))
        .expect("list succeeds")
        .is_empty());
}

#[tokio::test]
async fn router_serves_uploaded_documents_from_disk() {
    let upload_root = tempfile::tempdir().expect("temp dir");
    let service = service(upload_root.path());
    let sessions: Arc<dyn AdminSessions> =
        Arc::new(StaticTokenSessions::new(Some("secret".to_string())));
    let router = application_router(service, sessions);

    let upload = router
        .clone()
        .oneshot(
            Request::post("/api/v1/uploads/government_id/license.png")
                .body(Body::from(vec![0x89, b'P', b'N', b'G']))
                .expect("request builds"),
        )
        .await
        .expect("upload executes");
    assert_eq!(upload.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(upload.into_body(), 64 * 1024)
        .await
        .expect("body");
    let descriptor: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    let storage_path = descriptor["storage_path"].as_str().expect("path");
    assert!(storage_path.starts_with("applications/ids/"));

    let download = router
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/documents/{storage_path}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("download executes");
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("image/png")
    );

    let missing = router
        .oneshot(
            Request::get("/api/v1/documents/applications/ids/missing.png")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("lookup executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
