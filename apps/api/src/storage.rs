//! Local persistence.
//!
//! The profile store holds one profile, saved and loaded whole. The
//! application store is an append-mostly history of submitted forms.
//! `JsonFileStore` backs both with JSON files under the data directory, each
//! written through a temp file in the same directory and renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ApplicationRecord, ApplicationStatus, CandidateProfile};

const PROFILE_FILE: &str = "profile.json";
const APPLICATIONS_FILE: &str = "application_records.json";

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save(&self, profile: &CandidateProfile) -> Result<(), AppError>;

    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<CandidateProfile>, AppError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn store_application(&self, record: &ApplicationRecord) -> Result<(), AppError>;

    /// Records applied within `[start, end]`, oldest first. Either bound may
    /// be open.
    async fn applications(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ApplicationRecord>, AppError>;

    /// `NotFound` when no record has this id.
    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, AppError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on the history file.
    history: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            history: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    pub fn applications_path(&self) -> PathBuf {
        self.dir.join(APPLICATIONS_FILE)
    }

    async fn write_json<T: serde::Serialize + ?Sized>(
        &self,
        target: PathBuf,
        value: &T,
    ) -> Result<(), AppError> {
        let contents = serde_json::to_vec_pretty(value)
            .map_err(|e| AppError::Storage(format!("serialize {}: {e}", target.display())))?;
        let dir = self.dir.clone();
        let shown = target.display().to_string();

        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &contents))
            .await
            .map_err(|e| AppError::Storage(format!("write task failed: {e}")))?
            .map_err(|e| AppError::Storage(format!("write {shown}: {e}")))
    }

    async fn read_records(&self) -> Result<Vec<ApplicationRecord>, AppError> {
        Ok(read_json(&self.applications_path()).await?.unwrap_or_default())
    }
}

fn write_atomically(dir: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// `Ok(None)` for a missing file; unreadable or malformed files are errors.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "nothing stored yet");
            return Ok(None);
        }
        Err(e) => {
            return Err(AppError::Storage(format!("read {}: {e}", path.display())));
        }
    };

    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|e| AppError::Storage(format!("parse {}: {e}", path.display())))
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn save(&self, profile: &CandidateProfile) -> Result<(), AppError> {
        self.write_json(self.path(), profile).await?;
        info!(path = %self.path().display(), "profile saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<CandidateProfile>, AppError> {
        read_json(&self.path()).await
    }
}

#[async_trait]
impl ApplicationStore for JsonFileStore {
    async fn store_application(&self, record: &ApplicationRecord) -> Result<(), AppError> {
        let _guard = self.history.lock().await;
        let mut records = self.read_records().await?;
        records.push(record.clone());
        self.write_json(self.applications_path(), &records).await?;
        info!(id = %record.id, url = %record.form_url, total = records.len(), "application recorded");
        Ok(())
    }

    async fn applications(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ApplicationRecord>, AppError> {
        let _guard = self.history.lock().await;
        let mut records: Vec<ApplicationRecord> = self
            .read_records()
            .await?
            .into_iter()
            .filter(|r| r.applied_between(start, end))
            .collect();
        records.sort_by_key(|r| r.applied_at);
        debug!(count = records.len(), "application records read");
        Ok(records)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, AppError> {
        let _guard = self.history.lock().await;
        let mut records = self.read_records().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("No application record with id {id}")))?;
        record.status = status;
        let updated = record.clone();

        self.write_json(self.applications_path(), &records).await?;
        info!(%id, status = ?status, "application status updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::profile::sample_profile;

    fn record(applied_at: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            form_url: "https://jobs.example.com/apply".to_string(),
            company_name: Some("TechCorp".to_string()),
            position_title: None,
            applied_at,
            status: ApplicationStatus::Submitted,
            verification_secs: 42.0,
            confidence_scores: HashMap::from([("#name".to_string(), 0.96)]),
            modifications_made: true,
            attachment: None,
        }
    }

    #[tokio::test]
    async fn test_load_before_save_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_returns_equal_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let profile = sample_profile();

        store.save(&profile).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(profile.clone()));

        let mut updated = profile;
        updated.full_name = "Janet Doe".to_string();
        store.save(&updated).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().full_name, "Janet Doe");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(matches!(store.load().await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_history_is_empty_before_first_application() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.applications(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_applications_filtered_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let march_3 = record(base + Duration::days(2));
        let march_1 = record(base);
        let march_9 = record(base + Duration::days(8));
        for r in [&march_3, &march_1, &march_9] {
            store.store_application(r).await.unwrap();
        }

        let all = store.applications(None, None).await.unwrap();
        assert_eq!(all, vec![march_1.clone(), march_3.clone(), march_9.clone()]);

        let window = store
            .applications(Some(base + Duration::days(1)), Some(base + Duration::days(8)))
            .await
            .unwrap();
        assert_eq!(window, vec![march_3, march_9.clone()]);

        let since = store
            .applications(Some(base + Duration::days(3)), None)
            .await
            .unwrap();
        assert_eq!(since, vec![march_9]);
    }

    #[tokio::test]
    async fn test_status_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let first = record(Utc::now());
        let second = record(Utc::now());
        store.store_application(&first).await.unwrap();
        store.store_application(&second).await.unwrap();

        let updated = store
            .update_application_status(second.id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Accepted);

        let reopened = JsonFileStore::new(dir.path());
        let records = reopened.applications(None, None).await.unwrap();
        let status_of = |id| records.iter().find(|r| r.id == id).unwrap().status;
        assert_eq!(status_of(first.id), ApplicationStatus::Submitted);
        assert_eq!(status_of(second.id), ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_status_update_for_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.store_application(&record(Utc::now())).await.unwrap();
        let err = store
            .update_application_status(Uuid::new_v4(), ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.spawn(async move { store.store_application(&record(Utc::now())).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }
        assert_eq!(store.applications(None, None).await.unwrap().len(), 8);
    }
}
