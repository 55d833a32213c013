use auto_loan::config::StorageConfig;
use auto_loan::workflows::applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, BlobError, BlobObject, BlobStore,
    FilesystemBlobStore, InMemoryBlobStore, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use mime::Mime;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ApplicationId, ApplicationRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let mut records: Vec<ApplicationRecord> = self.lock()?.values().cloned().collect();
        records.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(records)
    }
}

/// Blob store chosen at startup from `APP_UPLOAD_DIR`.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredBlobStore {
    Memory(InMemoryBlobStore),
    Filesystem(FilesystemBlobStore),
}

impl ConfiguredBlobStore {
    pub(crate) fn from_config(storage: &StorageConfig) -> Self {
        match &storage.upload_dir {
            Some(dir) => Self::Filesystem(FilesystemBlobStore::new(
                dir.clone(),
                storage.public_base_url.clone(),
            )),
            None => Self::Memory(InMemoryBlobStore::new(storage.public_base_url.clone())),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Filesystem(_) => "filesystem",
        }
    }
}

impl BlobStore for ConfiguredBlobStore {
    fn put(&self, path: &str, bytes: Vec<u8>, content_type: &Mime) -> Result<String, BlobError> {
        match self {
            Self::Memory(store) => store.put(path, bytes, content_type),
            Self::Filesystem(store) => store.put(path, bytes, content_type),
        }
    }

    fn get(&self, path: &str) -> Result<Option<BlobObject>, BlobError> {
        match self {
            Self::Memory(store) => store.get(path),
            Self::Filesystem(store) => store.get(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auto_loan::workflows::applications::{
        ApplicationForm, ApplicationStatus, EmploymentInfo, PersonalInfo, VehicleInfo,
        DEFAULT_MAX_UPLOAD_BYTES,
    };
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    fn record(id: &str, minutes_ago: i64) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId(id.to_string()),
            form: ApplicationForm {
                personal: PersonalInfo::default(),
                employment: EmploymentInfo::default(),
                vehicle: VehicleInfo::default(),
                documents: Vec::new(),
            },
            status: ApplicationStatus::New,
            assigned_to: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            ai_summary: None,
            readiness_score: None,
            risk_level: None,
            insights: Vec::new(),
        }
    }

    #[test]
    fn repository_lists_newest_first_and_rejects_duplicates() {
        let repository = InMemoryApplicationRepository::default();
        repository.insert(record("app-older", 30)).expect("insert older");
        repository.insert(record("app-newer", 5)).expect("insert newer");

        assert!(matches!(
            repository.insert(record("app-older", 1)),
            Err(RepositoryError::Conflict)
        ));

        let listed = repository.list_recent().expect("list");
        let ids: Vec<&str> = listed.iter().map(|record| record.id.0.as_str()).collect();
        assert_eq!(ids, vec!["app-newer", "app-older"]);
    }

    #[test]
    fn repository_update_requires_existing_record() {
        let repository = InMemoryApplicationRepository::default();
        assert!(matches!(
            repository.update(record("app-missing", 0)),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn blob_store_follows_upload_dir_setting() {
        let memory = ConfiguredBlobStore::from_config(&StorageConfig {
            upload_dir: None,
            public_base_url: "http://localhost:3000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        });
        assert_eq!(memory.kind(), "memory");

        let filesystem = ConfiguredBlobStore::from_config(&StorageConfig {
            upload_dir: Some(PathBuf::from("/tmp/auto-loan-uploads")),
            public_base_url: "http://localhost:3000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        });
        assert_eq!(filesystem.kind(), "filesystem");
    }

    #[test]
    fn memory_blob_store_round_trips_through_enum() {
        let store = ConfiguredBlobStore::from_config(&StorageConfig {
            upload_dir: None,
            public_base_url: "http://localhost:3000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        });

        let url = store
            .put("applications/ids/1_id.png", vec![1, 2], &mime::IMAGE_PNG)
            .expect("put succeeds");
        assert_eq!(
            url,
            "http://localhost:3000/api/v1/documents/applications/ids/1_id.png"
        );
        let object = store
            .get("applications/ids/1_id.png")
            .expect("get succeeds")
            .expect("object present");
        assert_eq!(object.bytes, vec![1, 2]);
    }
}
