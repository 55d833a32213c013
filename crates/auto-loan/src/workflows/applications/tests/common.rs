use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::applications::domain::{
    ApplicationForm, ApplicationId, DocumentCategory, DocumentDescriptor, EmploymentInfo,
    EmploymentLength, EmploymentStatus, PersonalInfo, VehicleInfo,
};
use crate::workflows::applications::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError,
};
use crate::workflows::applications::scoring::ApplicationSnapshot;
use crate::workflows::applications::sessions::{AdminSessions, StaticTokenSessions};
use crate::workflows::applications::storage::InMemoryBlobStore;
use crate::workflows::applications::{application_router, LoanApplicationService};

pub(super) const ADMIN_TOKEN: &str = "reviewer-token";
pub(super) const BASE_URL: &str = "http://localhost:3000";

pub(super) fn document(category: DocumentCategory, file_name: &str) -> DocumentDescriptor {
    let storage_path = format!("applications/{}/1_{file_name}", category.storage_folder());
    DocumentDescriptor {
        category,
        file_name: file_name.to_string(),
        url: format!("{BASE_URL}/api/v1/documents/{storage_path}"),
        storage_path,
    }
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        personal: PersonalInfo {
            full_name: "Jordan Avery".to_string(),
            email: "jordan.avery@example.com".to_string(),
            phone: "515-555-0142".to_string(),
            address: "1200 Grand Ave".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            zip_code: "50309".to_string(),
        },
        employment: EmploymentInfo {
            employer: "Hawkeye Logistics".to_string(),
            job_title: "Dispatcher".to_string(),
            employment_status: Some(EmploymentStatus::FullTime),
            monthly_income: Some(4200.0),
            employment_length: Some(EmploymentLength::ThreeToFiveYears),
        },
        vehicle: VehicleInfo {
            has_selected_vehicle: true,
            vehicle_type: Some("SUV".to_string()),
            make: Some("Subaru".to_string()),
            model: Some("Forester".to_string()),
            year: Some("2022".to_string()),
            price: Some(28_000.0),
            down_payment: Some(6_000.0),
        },
        documents: vec![
            document(DocumentCategory::PayStub, "stub-march.pdf"),
            document(DocumentCategory::BankStatement, "statement-q1.pdf"),
            document(DocumentCategory::GovernmentId, "license.png"),
        ],
    }
}

pub(super) fn snapshot() -> ApplicationSnapshot {
    ApplicationSnapshot::default()
}

pub(super) fn build_service() -> (
    LoanApplicationService<MemoryRepository, InMemoryBlobStore>,
    Arc<MemoryRepository>,
    Arc<InMemoryBlobStore>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::new(BASE_URL));
    let service = LoanApplicationService::new(repository.clone(), blobs.clone());
    (service, repository, blobs)
}

pub(super) fn sessions() -> Arc<dyn AdminSessions> {
    Arc::new(StaticTokenSessions::new(Some(ADMIN_TOKEN.to_string())))
}

pub(super) fn router_with_service(
    service: LoanApplicationService<MemoryRepository, InMemoryBlobStore>,
) -> axum::Router {
    application_router(Arc::new(service), sessions())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<ApplicationRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
