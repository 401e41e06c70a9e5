//! Ruleset command engine for Dicer.
//!
//! A [`CommandRegistry`] maps ruleset namespaces (`coc7`, `CofD`,
//! `宝可梦trpg`, plus the shared `通用` namespace) to named commands. Each
//! command is an async [`CommandHandler`] that reads and writes character
//! attributes through the host-provided [`Cpi`] capability interface, rolls
//! through a [`dicer_expr::Roller`], and reports its outcome as chat text.
//!
//! Handlers never fail past their boundary: validation problems are sent to
//! the user and the handler returns `false`.

pub mod config;
pub mod cpi;
pub mod error;
pub mod registry;
pub mod role;
pub mod rulesets;

pub use config::RulesConfig;
pub use cpi::{Cpi, ExecProp, MemoryCpi, Outgoing};
pub use error::{RuleError, RuleResult, StoreError};
pub use registry::{
    CommandContext, CommandExecutor, CommandHandler, CommandInput, CommandRegistry,
    DispatchOutcome, RuleNameSpace, split_command_line,
};
pub use role::{
    AbilityBucket, AttrValue, RoleAbility, UserRole, get_role_ability_int,
    get_role_ability_value, set_role_ability_value,
};
