//! The capability interface handlers use to reach the host.
//!
//! The engine never owns role data or the chat transport. It reads and
//! writes attribute records and emits messages only through [`Cpi`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::role::{RoleAbility, UserRole};

/// Who issued a command and where replies go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecProp {
    /// The role the user is speaking as.
    pub actor: UserRole,
    /// Message id to reply to, if the host threads replies.
    pub reply_to: Option<i64>,
}

impl ExecProp {
    /// Execution properties for `actor` with no reply threading.
    pub fn new(actor: UserRole) -> Self {
        Self {
            actor,
            reply_to: None,
        }
    }
}

/// Host services consumed by command handlers.
#[async_trait]
pub trait Cpi: Send + Sync {
    /// Load a role's attribute record. Unknown roles yield an empty record.
    async fn get_role_ability(&self, role_id: i64) -> Result<RoleAbility, StoreError>;

    /// Replace a role's attribute record.
    async fn set_role_ability(&self, role_id: i64, record: RoleAbility) -> Result<(), StoreError>;

    /// Deliver a message to the conversation.
    fn send_msg(&self, prop: &ExecProp, text: &str);

    /// Deliver a private notice to the issuing user.
    fn send_toast(&self, text: &str);
}

/// Something a handler sent through [`MemoryCpi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A conversation message.
    Message(String),
    /// A private notice.
    Toast(String),
}

impl Outgoing {
    /// The text, whichever channel it went to.
    pub fn text(&self) -> &str {
        match self {
            Self::Message(t) | Self::Toast(t) => t,
        }
    }
}

/// In-memory host: a role table plus a captured outbox.
#[derive(Debug, Default)]
pub struct MemoryCpi {
    roles: Mutex<HashMap<i64, RoleAbility>>,
    outbox: Mutex<Vec<Outgoing>>,
    writes: Mutex<usize>,
    read_only: bool,
    offline: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryCpi {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose writes are always rejected.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// A host whose store cannot be reached; every read and write fails.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Builder-style role seeding.
    pub fn with_role(self, role_id: i64, record: RoleAbility) -> Self {
        self.insert(role_id, record);
        self
    }

    /// Seed or replace a role record.
    pub fn insert(&self, role_id: i64, record: RoleAbility) {
        lock(&self.roles).insert(role_id, record);
    }

    /// Snapshot of one role record.
    pub fn role(&self, role_id: i64) -> Option<RoleAbility> {
        lock(&self.roles).get(&role_id).cloned()
    }

    /// Snapshot of every role record.
    pub fn roles(&self) -> HashMap<i64, RoleAbility> {
        lock(&self.roles).clone()
    }

    /// Everything sent so far.
    pub fn outbox(&self) -> Vec<Outgoing> {
        lock(&self.outbox).clone()
    }

    /// Drain everything sent so far.
    pub fn take_outbox(&self) -> Vec<Outgoing> {
        std::mem::take(&mut *lock(&self.outbox))
    }

    /// Conversation messages sent so far.
    pub fn messages(&self) -> Vec<String> {
        self.outbox()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Message(t) => Some(t),
                Outgoing::Toast(_) => None,
            })
            .collect()
    }

    /// Private notices sent so far.
    pub fn toasts(&self) -> Vec<String> {
        self.outbox()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Toast(t) => Some(t),
                Outgoing::Message(_) => None,
            })
            .collect()
    }

    /// Number of successful record writes.
    pub fn writes(&self) -> usize {
        *lock(&self.writes)
    }
}

#[async_trait]
impl Cpi for MemoryCpi {
    async fn get_role_ability(&self, role_id: i64) -> Result<RoleAbility, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("存储离线".to_string()));
        }
        Ok(lock(&self.roles).get(&role_id).cloned().unwrap_or_default())
    }

    async fn set_role_ability(&self, role_id: i64, record: RoleAbility) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("存储离线".to_string()));
        }
        if self.read_only {
            return Err(StoreError::Rejected {
                role_id,
                reason: "只读模式".to_string(),
            });
        }
        lock(&self.roles).insert(role_id, record);
        *lock(&self.writes) += 1;
        Ok(())
    }

    fn send_msg(&self, _prop: &ExecProp, text: &str) {
        lock(&self.outbox).push(Outgoing::Message(text.to_string()));
    }

    fn send_toast(&self, text: &str) {
        lock(&self.outbox).push(Outgoing::Toast(text.to_string()));
    }
}
