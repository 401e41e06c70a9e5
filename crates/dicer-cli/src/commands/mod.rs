pub mod exec;
pub mod list;
pub mod range;
pub mod roles;
pub mod roll;

use dicer_rules::{CommandRegistry, RulesConfig};

/// The shipped rulesets, configured for this run.
fn registry(config: &RulesConfig) -> Result<CommandRegistry, String> {
    CommandRegistry::standard(config).map_err(|e| e.to_string())
}
