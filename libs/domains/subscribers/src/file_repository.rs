//! One YAML file per subscriber: `<chat_id>.yml`.

use async_trait::async_trait;
use domain_outages::{ChatId, User};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::error::{SubscriberError, SubscriberResult};
use crate::models::UserRecord;
use crate::repository::UserRepository;

const RECORD_EXTENSION: &str = "yml";
const LEGACY_EXTENSION: &str = "txt";
const TEMP_EXTENSION: &str = "tmp";

/// Temp files untouched for this long belong to a writer that died before its rename.
const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// File-backed subscriber store.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers never observe a half-written record.
#[derive(Debug)]
pub struct FileUserRepository {
    data_dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileUserRepository {
    /// Open (creating if needed) the store, sweep stale temp files and migrate
    /// legacy `*.txt` records.
    pub async fn open(data_dir: impl Into<PathBuf>) -> SubscriberResult<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| SubscriberError::io(&data_dir, e))?;

        let repo = Self {
            data_dir,
            write_seq: AtomicU64::new(0),
        };
        repo.sweep_stale_temp_files().await;
        repo.migrate_legacy().await;
        Ok(repo)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn record_path(&self, id: ChatId) -> PathBuf {
        self.data_dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self, id: ChatId) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.data_dir
            .join(format!("{id}.{RECORD_EXTENSION}.{}-{seq}.tmp", std::process::id()))
    }

    /// Files in the data directory with the given extension, sorted by name.
    async fn list(&self, extension: &str) -> SubscriberResult<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| SubscriberError::io(&self.data_dir, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SubscriberError::io(&self.data_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    async fn load(&self, path: &Path) -> SubscriberResult<User> {
        let id = chat_id_from_path(path)
            .ok_or_else(|| SubscriberError::invalid(path, "file name is not a chat id"))?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SubscriberError::io(path, e))?;
        let record: UserRecord = serde_yaml_ng::from_str(&content)
            .map_err(|e| SubscriberError::invalid(path, e.to_string()))?;

        record
            .into_user(id)
            .map_err(|reason| SubscriberError::invalid(path, reason))
    }

    /// Remove `<id>.yml.*.tmp` leftovers of interrupted saves. Recent temp files
    /// may belong to a concurrent writer and are left alone.
    async fn sweep_stale_temp_files(&self) {
        let temps = match self.list(TEMP_EXTENSION).await {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, "Failed to list temporary subscriber files");
                return;
            }
        };

        let now = SystemTime::now();
        for path in temps.into_iter().filter(|p| is_record_temp(p)) {
            let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to stat temporary subscriber file");
                    continue;
                }
            };
            if now.duration_since(modified).unwrap_or_default() < STALE_TEMP_AGE {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(file = %path.display(), "Removed stale temporary subscriber file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to remove stale temporary subscriber file");
                }
            }
        }
    }

    async fn migrate_legacy(&self) {
        let legacy = match self.list(LEGACY_EXTENSION).await {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, "Failed to list legacy subscriber files");
                return;
            }
        };

        for path in legacy {
            if let Err(e) = self.migrate_one(&path).await {
                warn!(file = %path.display(), error = %e, "Legacy subscriber migration failed");
            }
        }
    }

    async fn migrate_one(&self, legacy: &Path) -> SubscriberResult<()> {
        let target = legacy.with_extension(RECORD_EXTENSION);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            warn!(
                file = %legacy.display(),
                target = %target.display(),
                "Skipping legacy subscriber file, target already exists"
            );
            return Ok(());
        }

        let content = tokio::fs::read_to_string(legacy)
            .await
            .map_err(|e| SubscriberError::io(legacy, e))?;
        let record =
            UserRecord::parse_legacy(&content).map_err(|r| SubscriberError::invalid(legacy, r))?;
        let yaml = serde_yaml_ng::to_string(&record)?;

        tokio::fs::write(&target, yaml)
            .await
            .map_err(|e| SubscriberError::io(&target, e))?;
        tokio::fs::remove_file(legacy)
            .await
            .map_err(|e| SubscriberError::io(legacy, e))?;

        info!(file = %legacy.display(), target = %target.display(), "Migrated legacy subscriber file");
        Ok(())
    }
}

fn is_record_temp(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(&format!(".{RECORD_EXTENSION}.")))
}

fn chat_id_from_path(path: &Path) -> Option<ChatId> {
    path.file_stem()?.to_str()?.parse().ok()
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn find_all(&self) -> SubscriberResult<Vec<User>> {
        let paths = self.list(RECORD_EXTENSION).await?;

        let mut users = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load(&path).await {
                Ok(user) => users.push(user),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping malformed subscriber file");
                }
            }
        }
        Ok(users)
    }

    async fn find(&self, id: ChatId) -> SubscriberResult<Option<User>> {
        let path = self.record_path(id);
        match tokio::fs::metadata(&path).await {
            Ok(_) => self.load(&path).await.map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SubscriberError::io(path, e)),
        }
    }

    async fn save(&self, user: &User) -> SubscriberResult<()> {
        let yaml = serde_yaml_ng::to_string(&UserRecord::from(user))?;

        let target = self.record_path(user.id);
        let temp = self.temp_path(user.id);

        tokio::fs::write(&temp, yaml)
            .await
            .map_err(|e| SubscriberError::io(&temp, e))?;

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(SubscriberError::io(target, e));
        }

        Ok(())
    }

    async fn remove(&self, id: ChatId) -> SubscriberResult<bool> {
        let path = self.record_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SubscriberError::io(path, e)),
        }
    }
}
