//! Session-scoped state — an explicit value object carried through the
//! pipeline stages instead of ambient globals.
//!
//! Lifecycle: created at unlock, filled by upload and automated rating,
//! cleared at submit (after the row append is confirmed) or explicit
//! discard. Each session is isolated; concurrent operators never share
//! mutable state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::rater::AutomatedRating;

/// Everything one operator session accumulates before submit.
#[derive(Debug, Clone, Default)]
pub struct EvaluationSession {
    /// Extracted CV text; `None` until a document is uploaded.
    pub cv_text: Option<String>,
    pub extraction_warnings: Vec<String>,
    /// Automated rating awaiting human confirmation.
    pub pending: Option<AutomatedRating>,
}

/// In-process session store keyed by the id handed out at unlock.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, EvaluationSession>>>,
}

impl SessionStore {
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, EvaluationSession::default());
        id
    }

    /// Snapshot of a session's current state.
    pub fn get(&self, id: &Uuid) -> Result<EvaluationSession, AppError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Applies `f` to the session under the lock.
    pub fn update<T>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut EvaluationSession) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    pub fn remove(&self, id: &Uuid) -> Result<(), AppError> {
        self.lock().remove(id).map(|_| ()).ok_or_else(|| not_found(id))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, EvaluationSession>> {
        self.inner.lock().expect("session store lock poisoned")
    }
}

fn not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found or already closed"))
}
