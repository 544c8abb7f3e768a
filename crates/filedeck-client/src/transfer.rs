//! Sequential upload queue.
//!
//! Items move `pending → uploading → success | error`. [`TransferCoordinator::start`]
//! runs the items that were pending when it was called, strictly in
//! enqueue order and one at a time. A failed item does not stop the run.
//! Successful items drop out of the queue after a linger delay; failed
//! items stay until removed.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use filedeck_core::config::ClientConfig;
use filedeck_core::result::AppResult;

use crate::source::{ProgressFn, UploadSource};

/// Event channel capacity. Slow subscribers see `Lagged` rather than
/// blocking the queue.
const EVENT_CAPACITY: usize = 256;

/// Performs one upload.
#[async_trait]
pub trait Uploader: Send + Sync + 'static {
    /// Uploads `source` into `folder_id` (root level when `None`) and
    /// returns the id of the created file. `progress` should be called with
    /// a percentage as the content is consumed.
    async fn upload(
        &self,
        folder_id: Option<Uuid>,
        source: &UploadSource,
        progress: ProgressFn,
    ) -> AppResult<Uuid>;
}

/// Lifecycle state of a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

/// A queued upload as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferItem {
    /// `<name>-<unix millis>-<random suffix>`.
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: Option<String>,
    pub status: TransferStatus,
    /// 0 to 100.
    pub progress: u8,
    /// Failure message for `Error` items.
    pub error: Option<String>,
    /// Id of the created file for `Success` items.
    pub file_id: Option<Uuid>,
}

/// Status and progress changes broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Queued { id: String },
    Started { id: String },
    Progress { id: String, percent: u8 },
    Succeeded { id: String, file_id: Uuid },
    Failed { id: String, error: String },
    Evicted { id: String },
    Removed { id: String },
    Cleared,
    /// A run finished; no item is uploading.
    Idle,
}

/// Outcome of one [`TransferCoordinator::start`] run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    /// Ids of items that uploaded, in completion order.
    pub succeeded: Vec<String>,
    /// Ids and messages of items that failed, in completion order.
    pub failed: Vec<(String, String)>,
}

impl TransferReport {
    /// Whether the run processed nothing.
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Queue operations that are refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Transfer item {0} not found")]
    NotFound(String),
    #[error("Transfer item {0} is uploading and cannot be removed")]
    InFlight(String),
    #[error("Cannot clear the queue while a transfer is running")]
    Running,
}

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Folder every upload goes into; root level when `None`.
    pub target_folder_id: Option<Uuid>,
    /// How long a successful item stays in the queue.
    pub success_linger: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            target_folder_id: None,
            success_linger: Duration::from_secs(2),
        }
    }
}

impl TransferOptions {
    /// Reads the linger delay from client configuration.
    pub fn from_config(config: &ClientConfig, target_folder_id: Option<Uuid>) -> Self {
        Self {
            target_folder_id,
            success_linger: Duration::from_millis(config.success_linger_ms),
        }
    }
}

#[derive(Debug)]
struct Entry {
    item: TransferItem,
    source: Arc<UploadSource>,
}

#[derive(Debug, Default)]
struct Queue {
    entries: Vec<Entry>,
    running: bool,
}

impl Queue {
    fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.item.id == id)
    }
}

struct Inner {
    uploader: Arc<dyn Uploader>,
    options: TransferOptions,
    queue: Mutex<Queue>,
    events: broadcast::Sender<TransferEvent>,
}

impl Inner {
    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: TransferEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn report_progress(&self, id: &str, percent: u8) {
        let percent = percent.min(100);
        let changed = {
            let mut queue = self.queue();
            match queue.entry_mut(id) {
                Some(entry)
                    if entry.item.status == TransferStatus::Uploading
                        && percent > entry.item.progress =>
                {
                    entry.item.progress = percent;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.emit(TransferEvent::Progress {
                id: id.to_string(),
                percent,
            });
        }
    }

    fn evict(&self, id: &str) {
        let evicted = {
            let mut queue = self.queue();
            let before = queue.entries.len();
            queue
                .entries
                .retain(|e| !(e.item.id == id && e.item.status == TransferStatus::Success));
            queue.entries.len() != before
        };
        if evicted {
            debug!(id = %id, "Evicted finished upload");
            self.emit(TransferEvent::Evicted { id: id.to_string() });
        }
    }
}

/// Resets the running flag when a run ends, including when the `start`
/// future is dropped mid-upload.
struct RunGuard {
    inner: Arc<Inner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut queue = self.inner.queue();
        queue.running = false;
        for entry in &mut queue.entries {
            if entry.item.status == TransferStatus::Uploading {
                entry.item.status = TransferStatus::Error;
                entry.item.error = Some("Upload interrupted".to_string());
            }
        }
        drop(queue);
        self.inner.emit(TransferEvent::Idle);
    }
}

/// Client-side sequencer for pending uploads.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct TransferCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TransferCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferCoordinator")
            .field("options", &self.inner.options)
            .field("queue", &*self.inner.queue())
            .finish()
    }
}

impl TransferCoordinator {
    /// Creates an empty queue.
    pub fn new(uploader: Arc<dyn Uploader>, options: TransferOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                uploader,
                options,
                queue: Mutex::new(Queue::default()),
                events,
            }),
        }
    }

    /// Appends pending items and returns their ids.
    pub fn enqueue(&self, sources: impl IntoIterator<Item = UploadSource>) -> Vec<String> {
        let items: Vec<Entry> = sources
            .into_iter()
            .map(|source| Entry {
                item: TransferItem {
                    id: item_id(&source.name),
                    name: source.name.clone(),
                    size: source.size(),
                    mime_type: source.mime_type.clone(),
                    status: TransferStatus::Pending,
                    progress: 0,
                    error: None,
                    file_id: None,
                },
                source: Arc::new(source),
            })
            .collect();

        let ids: Vec<String> = items.iter().map(|e| e.item.id.clone()).collect();
        self.inner.queue().entries.extend(items);

        for id in &ids {
            self.inner.emit(TransferEvent::Queued { id: id.clone() });
        }
        ids
    }

    /// Uploads every item that is pending now, in enqueue order, one at a
    /// time.
    ///
    /// Returns an empty report without doing anything when a run is already
    /// in progress or nothing is pending.
    pub async fn start(&self) -> TransferReport {
        let pending: Vec<String> = {
            let mut queue = self.inner.queue();
            if queue.running {
                return TransferReport::default();
            }
            let pending: Vec<String> = queue
                .entries
                .iter()
                .filter(|e| e.item.status == TransferStatus::Pending)
                .map(|e| e.item.id.clone())
                .collect();
            if pending.is_empty() {
                return TransferReport::default();
            }
            queue.running = true;
            pending
        };

        let _guard = RunGuard {
            inner: Arc::clone(&self.inner),
        };
        let mut report = TransferReport::default();
        info!(count = pending.len(), "Starting upload run");

        for id in pending {
            // Items removed while waiting are skipped.
            let source = {
                let mut queue = self.inner.queue();
                match queue.entry_mut(&id) {
                    Some(entry) if entry.item.status == TransferStatus::Pending => {
                        entry.item.status = TransferStatus::Uploading;
                        entry.item.progress = 0;
                        Arc::clone(&entry.source)
                    }
                    _ => continue,
                }
            };
            self.inner.emit(TransferEvent::Started { id: id.clone() });

            let progress: ProgressFn = {
                let inner = Arc::downgrade(&self.inner);
                let id = id.clone();
                Arc::new(move |percent| {
                    if let Some(inner) = inner.upgrade() {
                        inner.report_progress(&id, percent);
                    }
                })
            };

            let result = self
                .inner
                .uploader
                .upload(self.inner.options.target_folder_id, &source, progress)
                .await;

            match result {
                Ok(file_id) => {
                    if let Some(entry) = self.inner.queue().entry_mut(&id) {
                        entry.item.status = TransferStatus::Success;
                        entry.item.progress = 100;
                        entry.item.file_id = Some(file_id);
                    }
                    debug!(id = %id, file_id = %file_id, "Upload succeeded");
                    self.inner.emit(TransferEvent::Succeeded {
                        id: id.clone(),
                        file_id,
                    });
                    self.schedule_eviction(id.clone());
                    report.succeeded.push(id);
                }
                Err(e) => {
                    let message = e.message.clone();
                    if let Some(entry) = self.inner.queue().entry_mut(&id) {
                        entry.item.status = TransferStatus::Error;
                        entry.item.error = Some(message.clone());
                    }
                    warn!(id = %id, error = %e, "Upload failed");
                    self.inner.emit(TransferEvent::Failed {
                        id: id.clone(),
                        error: message.clone(),
                    });
                    report.failed.push((id, message));
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Upload run finished"
        );
        report
    }

    fn schedule_eviction(&self, id: String) {
        let inner = Arc::downgrade(&self.inner);
        let linger = self.inner.options.success_linger;
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            if let Some(inner) = inner.upgrade() {
                inner.evict(&id);
            }
        });
    }

    /// Removes an item that is not uploading.
    pub fn remove(&self, id: &str) -> Result<TransferItem, TransferError> {
        let removed = {
            let mut queue = self.inner.queue();
            let index = queue
                .entries
                .iter()
                .position(|e| e.item.id == id)
                .ok_or_else(|| TransferError::NotFound(id.to_string()))?;
            if queue.entries[index].item.status == TransferStatus::Uploading {
                return Err(TransferError::InFlight(id.to_string()));
            }
            queue.entries.remove(index).item
        };
        self.inner.emit(TransferEvent::Removed { id: id.to_string() });
        Ok(removed)
    }

    /// Removes every item. Refused while a run is in progress.
    pub fn clear(&self) -> Result<usize, TransferError> {
        let count = {
            let mut queue = self.inner.queue();
            if queue.running {
                return Err(TransferError::Running);
            }
            let count = queue.entries.len();
            queue.entries.clear();
            count
        };
        self.inner.emit(TransferEvent::Cleared);
        Ok(count)
    }

    /// Current items in enqueue order.
    pub fn snapshot(&self) -> Vec<TransferItem> {
        self.inner
            .queue()
            .entries
            .iter()
            .map(|e| e.item.clone())
            .collect()
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.inner.queue().running
    }

    /// Subscribes to status and progress changes.
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.inner.events.subscribe()
    }

    /// Folder uploads go into.
    pub fn target_folder_id(&self) -> Option<Uuid> {
        self.inner.options.target_folder_id
    }
}

fn item_id(name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", name, Utc::now().timestamp_millis(), &suffix[..8])
}
