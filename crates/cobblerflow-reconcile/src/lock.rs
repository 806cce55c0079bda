//! Locks serializing access to Cobbler
//!
//! - [`SystemLocks`]: at most one in-process task reconciles a given system name
//! - [`PassLock`]: at most one apply pass per project directory, via
//!   `.cobblerflow/lock.json`

use crate::error::{ReconcileError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};

const LOCK_DIR: &str = ".cobblerflow";
const LOCK_FILE: &str = "lock.json";

type LockMap = Arc<std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>>;

fn lock_map(map: &LockMap) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
    map.lock().unwrap_or_else(|e| e.into_inner())
}

/// Per-system-name mutex registry
///
/// Entries only live while some task holds or waits for the name.
#[derive(Debug, Clone, Default)]
pub struct SystemLocks {
    inner: LockMap,
}

impl SystemLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `name` is free and hold it until the guard drops
    pub async fn lock(&self, name: &str) -> SystemGuard {
        let mutex = lock_map(&self.inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        SystemGuard {
            guard: Some(guard),
            name: name.to_string(),
            registry: self.inner.clone(),
        }
    }

    /// Number of names currently held or waited for
    pub fn len(&self) -> usize {
        lock_map(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds one system name; prunes the registry entry on drop when unused
#[derive(Debug)]
pub struct SystemGuard {
    guard: Option<OwnedMutexGuard<()>>,
    name: String,
    registry: LockMap,
}

impl Drop for SystemGuard {
    fn drop(&mut self) {
        // release first so the guard's own Arc is not counted
        drop(self.guard.take());

        let mut map = lock_map(&self.registry);
        let unused = map
            .get(&self.name)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if unused {
            map.remove(&self.name);
        }
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the project-wide pass lock
#[derive(Debug)]
pub struct PassLock {
    lock_path: PathBuf,
    released: bool,
}

impl PassLock {
    /// Take the lock under `project_root`; locks older than one hour are stale
    pub async fn acquire(project_root: impl AsRef<Path>) -> Result<Self> {
        let dir = project_root.as_ref().join(LOCK_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created lock directory: {}", dir.display());
        }

        let lock_path = dir.join(LOCK_FILE);

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(info) => {
                    let age = Utc::now().signed_duration_since(info.acquired_at);
                    if age.num_hours() < 1 {
                        return Err(ReconcileError::LockError(format!(
                            "Another pass is running ({} pid {} since {})",
                            info.holder, info.pid, info.acquired_at
                        )));
                    }
                    tracing::warn!("Removing stale lock from {}", info.holder);
                }
                Err(e) => tracing::warn!("Replacing unreadable lock file: {}", e),
            }
        }

        let info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&info)?).await?;

        tracing::debug!("Acquired pass lock: {}", lock_path.display());
        Ok(Self {
            lock_path,
            released: false,
        })
    }

    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released pass lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
