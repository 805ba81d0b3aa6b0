//! Per-account plan persistence
//!
//! Each account owns one [`PlanStore`] whose mirror is a JSON file named
//! after the account id. Stores are opened lazily and cached for the life
//! of the process. File I/O runs on the blocking pool under a per-account
//! lock; no lock is held across an await.

use anyhow::Context;
use fitness_coach_shared::errors::StoreError;
use fitness_coach_shared::models::StoredPlan;
use fitness_coach_shared::store::{GenerationTicket, PlanMirror, PlanStore};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

/// Mirror backed by a single file
#[derive(Debug, Clone)]
pub struct FilePlanMirror {
    path: PathBuf,
}

impl FilePlanMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn mirror_error(action: &str, path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Mirror(format!("{} {}: {}", action, path.display(), err))
}

impl PlanMirror for FilePlanMirror {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(mirror_error("Failed to read", &self.path, e)),
        }
    }

    fn save(&mut self, value: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| mirror_error("Failed to create", parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| mirror_error("Failed to write", &tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| mirror_error("Failed to replace", &self.path, e))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(mirror_error("Failed to remove", &self.path, e)),
        }
    }
}

/// One account's store, opened on first use
type StoreSlot = Arc<Mutex<Option<PlanStore<FilePlanMirror>>>>;

/// Open a store, discarding a mirror that no longer parses
fn open_store(account: Uuid, mirror: FilePlanMirror) -> Result<PlanStore<FilePlanMirror>, StoreError> {
    match PlanStore::open(mirror.clone()) {
        Err(StoreError::Corrupt(reason)) => {
            warn!(account_id = %account, "Discarding corrupt stored plan: {}", reason);
            PlanStore::reset(mirror)
        }
        other => other,
    }
}

/// All plan stores of the process, keyed by account
pub struct PlanRegistry {
    dir: PathBuf,
    stores: Mutex<HashMap<Uuid, StoreSlot>>,
}

impl PlanRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn mirror_for(&self, account: Uuid) -> FilePlanMirror {
        FilePlanMirror::new(self.dir.join(format!("{}.json", account)))
    }

    fn slot(&self, account: Uuid) -> Result<StoreSlot, StoreError> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StoreError::Mirror("Plan registry lock poisoned".to_string()))?;
        Ok(stores.entry(account).or_default().clone())
    }

    /// Run `f` against the account's store on the blocking pool
    ///
    /// The registry lock only covers the slot lookup; file I/O happens under
    /// the account's own lock, so accounts never wait on each other.
    async fn with_store<R>(
        &self,
        account: Uuid,
        f: impl FnOnce(&mut PlanStore<FilePlanMirror>) -> Result<R, StoreError> + Send + 'static,
    ) -> Result<R, StoreError>
    where
        R: Send + 'static,
    {
        let slot = self.slot(account)?;
        let mirror = self.mirror_for(account);

        tokio::task::spawn_blocking(move || {
            let mut guard = slot
                .lock()
                .map_err(|_| StoreError::Mirror("Plan store lock poisoned".to_string()))?;
            if guard.is_none() {
                debug!(account_id = %account, "Opening plan store");
                *guard = Some(open_store(account, mirror)?);
            }
            match guard.as_mut() {
                Some(store) => f(store),
                None => Err(StoreError::Mirror("Plan store vanished".to_string())),
            }
        })
        .await
        .map_err(|e| StoreError::Mirror(format!("Plan store task failed: {}", e)))?
    }

    pub async fn current(&self, account: Uuid) -> Result<Option<StoredPlan>, StoreError> {
        self.with_store(account, |store| Ok(store.current().cloned())).await
    }

    pub async fn begin_generation(&self, account: Uuid) -> Result<GenerationTicket, StoreError> {
        self.with_store(account, |store| Ok(store.begin_generation())).await
    }

    /// Fails with `StaleGeneration` when a newer request or a clear happened
    pub async fn commit(
        &self,
        account: Uuid,
        ticket: GenerationTicket,
        plan: StoredPlan,
    ) -> Result<(), StoreError> {
        self.with_store(account, move |store| store.commit(ticket, plan)).await
    }

    pub async fn clear(&self, account: Uuid) -> Result<(), StoreError> {
        self.with_store(account, |store| store.set_plan(None)).await
    }

    /// Readiness probe: the plan directory exists or can be created
    pub fn health_check(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Plan directory {} is not writable", self.dir.display()))
    }
}
