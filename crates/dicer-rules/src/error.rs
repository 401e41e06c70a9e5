//! Error types for the command engine.

/// Errors raised while assembling the command registry.
///
/// These are programmer errors in ruleset definitions and surface once, at
/// startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Two namespaces share an id, name, or alias.
    #[error("duplicate ruleset key: {0}")]
    DuplicateNamespace(String),

    /// A command name or alias is already registered in the namespace.
    #[error("duplicate command '{name}' in ruleset '{namespace}'")]
    DuplicateCommand {
        /// The namespace being extended.
        namespace: String,
        /// The colliding name or alias.
        name: String,
    },
}

/// Convenience result type for registry construction.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors reported by the host's attribute store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("角色数据暂时不可用：{0}")]
    Unavailable(String),

    /// The store refused a write.
    #[error("无法保存角色{role_id}的数据：{reason}")]
    Rejected {
        /// The role whose record was being written.
        role_id: i64,
        /// Why the write was refused.
        reason: String,
    },
}
