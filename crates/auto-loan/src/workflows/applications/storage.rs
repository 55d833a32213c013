use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use mime::Mime;

use super::domain::DocumentCategory;

/// Route prefix under which stored documents are served back.
pub const DOCUMENT_ROUTE_PREFIX: &str = "/api/v1/documents";

/// Upload body cap used when no limit is configured. Scanned statements
/// routinely exceed axum's 2 MB default.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Stored document payload returned by a blob store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobObject {
    pub bytes: Vec<u8>,
    pub content_type: Mime,
}

/// Blob storage abstraction for uploaded application documents.
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` at `path` and returns a durable retrieval URL.
    fn put(&self, path: &str, bytes: Vec<u8>, content_type: &Mime) -> Result<String, BlobError>;
    fn get(&self, path: &str) -> Result<Option<BlobObject>, BlobError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("invalid document path '{0}'")]
    InvalidPath(String),
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for BlobError {
    fn from(value: std::io::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

/// Builds the storage path for an upload:
/// `applications/{folder}/{millis}[_{index}]_{file_name}`.
pub fn document_path(
    category: DocumentCategory,
    file_name: &str,
    batch_index: Option<usize>,
    uploaded_at: DateTime<Utc>,
) -> Result<String, BlobError> {
    let file_name = sanitize_file_name(file_name)?;
    let millis = uploaded_at.timestamp_millis();
    let path = match batch_index {
        Some(index) => format!(
            "applications/{}/{millis}_{index}_{file_name}",
            category.storage_folder()
        ),
        None => format!(
            "applications/{}/{millis}_{file_name}",
            category.storage_folder()
        ),
    };
    Ok(path)
}

fn sanitize_file_name(raw: &str) -> Result<String, BlobError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(BlobError::InvalidPath(raw.to_string()));
    }

    Ok(base
        .chars()
        .map(|ch| if ch.is_control() { '_' } else { ch })
        .collect())
}

/// Rejects absolute paths and parent traversal before touching storage.
pub fn validate_path(path: &str) -> Result<&str, BlobError> {
    let relative = Path::new(path);
    let safe = !path.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if safe {
        Ok(path)
    } else {
        Err(BlobError::InvalidPath(path.to_string()))
    }
}

/// Builds the download URL for a stored path. Each segment is
/// percent-encoded so names containing `#`, `?` or spaces stay addressable.
pub fn retrieval_url(public_base_url: &str, path: &str) -> String {
    let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!(
        "{}{}/{}",
        public_base_url.trim_end_matches('/'),
        DOCUMENT_ROUTE_PREFIX,
        encoded.join("/")
    )
}

pub fn guess_content_type(file_name: &str) -> Mime {
    mime_guess::from_path(file_name).first_or_octet_stream()
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Clone)]
pub struct InMemoryBlobStore {
    public_base_url: String,
    objects: Arc<Mutex<HashMap<String, BlobObject>>>,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> Result<usize, BlobError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BlobError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, BlobObject>>, BlobError> {
        self.objects
            .lock()
            .map_err(|_| BlobError::Unavailable("blob mutex poisoned".to_string()))
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, path: &str, bytes: Vec<u8>, content_type: &Mime) -> Result<String, BlobError> {
        let path = validate_path(path)?;
        let mut guard = self.lock()?;
        guard.insert(
            path.to_string(),
            BlobObject {
                bytes,
                content_type: content_type.clone(),
            },
        );
        Ok(retrieval_url(&self.public_base_url, path))
    }

    fn get(&self, path: &str) -> Result<Option<BlobObject>, BlobError> {
        let path = validate_path(path)?;
        Ok(self.lock()?.get(path).cloned())
    }
}

/// Writes documents beneath a root directory on local disk.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FilesystemBlobStore {
    fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &Mime) -> Result<String, BlobError> {
        let path = validate_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        Ok(retrieval_url(&self.public_base_url, path))
    }

    fn get(&self, path: &str) -> Result<Option<BlobObject>, BlobError> {
        let path = validate_path(path)?;
        match fs::read(self.root.join(path)) {
            Ok(bytes) => Ok(Some(BlobObject {
                bytes,
                content_type: guess_content_type(path),
            })),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
