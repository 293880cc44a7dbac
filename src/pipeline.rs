//! The merge pipeline facade.
//!
//! [`MergePipeline`] is what an embedding host holds: it owns the ordered
//! collection, screens intake batches, exposes the observable session state,
//! and drives merges. One merge runs at a time per pipeline instance; a
//! second trigger, or any collection mutation, while a session is running
//! is refused with [`MergeError::MergeInProgress`], leaving the in-flight
//! session untouched.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::assembly::{DocumentAssembly, DocxAssembly, PdfAssembly};
use crate::collection::{FileId, OrderedCollection, PendingFile};
use crate::error::{MergeError, Result};
use crate::intake::{self, DocumentFamily, IntakeReport, RawFile};
use crate::merge::{MergeDriver, MergeOutcome};
use crate::session::{MergeSession, SessionState};

/// Pipeline over the page-based (PDF) family.
pub type PdfPipeline = MergePipeline<PdfAssembly>;

/// Pipeline over the section-based (Word) family.
pub type DocxPipeline = MergePipeline<DocxAssembly>;

/// One document family's merge pipeline.
pub struct MergePipeline<A: DocumentAssembly> {
    driver: MergeDriver<A>,
    collection: Mutex<OrderedCollection>,
    running: AtomicBool,
    state: Arc<watch::Sender<SessionState>>,
}

impl MergePipeline<PdfAssembly> {
    /// Create a PDF merge pipeline.
    pub fn pdf() -> Self {
        Self::new(PdfAssembly::new())
    }
}

impl MergePipeline<DocxAssembly> {
    /// Create a Word merge pipeline.
    pub fn docx() -> Self {
        Self::new(DocxAssembly::new())
    }
}

impl<A: DocumentAssembly> MergePipeline<A> {
    /// Create a pipeline over an assembly capability.
    pub fn new(assembly: A) -> Self {
        let (state, _) = watch::channel(SessionState::idle());
        Self {
            driver: MergeDriver::new(assembly),
            collection: Mutex::new(OrderedCollection::new()),
            running: AtomicBool::new(false),
            state: Arc::new(state),
        }
    }

    /// The document family this pipeline merges.
    pub fn family(&self) -> DocumentFamily {
        self.driver.assembly().family()
    }

    /// Screen a batch of raw inputs and append the accepted ones.
    ///
    /// Rejected entries are dropped and counted in the returned report; they
    /// never affect already-accepted files.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::MergeInProgress`] while a session is running.
    pub fn append(&self, files: Vec<RawFile>) -> Result<IntakeReport> {
        self.ensure_not_running()?;
        let (accepted, report) = intake::screen(self.family(), files);
        self.lock_collection().append(accepted);
        Ok(report)
    }

    /// Remove the entry with the given identity.
    ///
    /// An absent identity is a no-op (`Ok(false)`), not an error.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::MergeInProgress`] while a session is running.
    pub fn remove(&self, id: FileId) -> Result<bool> {
        self.ensure_not_running()?;
        Ok(self.lock_collection().remove(id))
    }

    /// Relocate the entry at `from` to position `to`.
    ///
    /// Stale or equal indices are no-ops (`Ok(false)`), not errors.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::MergeInProgress`] while a session is running.
    pub fn move_entry(&self, from: usize, to: usize) -> Result<bool> {
        self.ensure_not_running()?;
        Ok(self.lock_collection().move_entry(from, to))
    }

    /// Current entries, in merge order, for presentation.
    pub fn files(&self) -> Vec<PendingFile> {
        self.lock_collection().snapshot()
    }

    /// Number of pending files.
    pub fn len(&self) -> usize {
        self.lock_collection().len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.lock_collection().is_empty()
    }

    /// Subscribe to the observable session state.
    ///
    /// The channel carries the current (or most recent) session's phase and
    /// progress ratio; a new merge resets it to `Running` at 0.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Trigger a merge over a frozen snapshot of the collection.
    ///
    /// Synchronous trigger, asynchronous completion: the snapshot is taken
    /// immediately, then the driver runs to a terminal phase. Mutations to
    /// the live collection during the merge cannot affect the running
    /// session (they are refused anyway; see [`append`](Self::append)).
    ///
    /// # Errors
    ///
    /// - [`MergeError::MergeInProgress`] if a session is already running;
    ///   the in-flight session is unaffected.
    /// - [`MergeError::EmptyCollection`] if no files are pending; no state
    ///   change, no session is created.
    /// - Any fatal merge error; the session transitions to `Failed` and no
    ///   artifact is produced.
    pub async fn merge(&self) -> Result<MergeOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MergeError::MergeInProgress);
        }
        let result = self.run_session().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_session(&self) -> Result<MergeOutcome> {
        let snapshot = self.lock_collection().snapshot();
        if snapshot.is_empty() {
            return Err(MergeError::EmptyCollection);
        }

        let order = snapshot.iter().map(PendingFile::id).collect();
        let session = MergeSession::begin(Arc::clone(&self.state), order);

        match self.driver.run(&snapshot, &session).await {
            Ok(outcome) => {
                session.succeed();
                Ok(outcome)
            }
            Err(err) => {
                session.fail();
                Err(err)
            }
        }
    }

    fn ensure_not_running(&self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(MergeError::MergeInProgress);
        }
        Ok(())
    }

    fn lock_collection(&self) -> std::sync::MutexGuard<'_, OrderedCollection> {
        // The lock is never held across an await; a poisoned lock can only
        // come from a panicked test thread, so take the data as-is.
        self.collection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
