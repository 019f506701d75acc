pub mod archive;
pub mod rotation;
pub mod stats;
pub mod store;
pub mod types;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::config::MemoraConfig;
use crate::workspace::Workspace;
use archive::ArchiveStore;
use rotation::{RotationEngine, RotationPolicy, RotationReport};
use store::SessionStore;
use types::{Message, Role, Session};

/// Result of appending one message.
#[derive(Debug, Serialize)]
pub struct AppendOutcome {
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationReport>,
}

/// Append path: validate → load → append → rotate → save.
#[derive(Debug, Clone)]
pub struct SessionService {
    store: SessionStore,
    rotation: RotationEngine,
}

impl SessionService {
    pub fn new(store: SessionStore, rotation: RotationEngine) -> Self {
        Self { store, rotation }
    }

    pub fn from_config(config: &MemoraConfig, workspace: &Workspace) -> Self {
        Self::new(
            SessionStore::new(workspace),
            RotationEngine::new(
                RotationPolicy::from(&config.session),
                ArchiveStore::new(workspace),
            ),
        )
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    pub fn load(&self) -> Result<Session> {
        self.store.load()
    }

    pub fn init(&self, session_id: Option<&str>, overwrite: bool) -> Result<Session> {
        self.store.init(session_id, overwrite)
    }

    /// Append a message, rotating and persisting the session.
    ///
    /// An invalid role is rejected before anything is read or written; the
    /// error downcasts to [`types::InvalidRole`].
    pub fn add_message(&self, role: &str, content: &str) -> Result<AppendOutcome> {
        let role: Role = role.parse()?;

        let mut session = self.store.load()?;
        session.conversation.push(Message::new(role, content));
        let rotation = self.rotation.rotate(&mut session, Utc::now())?;
        self.store.save(&mut session)?;

        tracing::debug!(
            session_id = %session.session_id,
            role = %role,
            turns = session.conversation.len(),
            "appended message"
        );

        Ok(AppendOutcome { session, rotation })
    }
}
