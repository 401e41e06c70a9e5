use std::path::Path;

use dicer_rules::{DispatchOutcome, ExecProp, MemoryCpi, Outgoing, RulesConfig, UserRole};

use super::roles::{self, RoleFile};

/// One `dicer exec` invocation.
pub struct ExecRequest<'a> {
    pub roles: &'a Path,
    pub actor: i64,
    pub mentions: &'a [i64],
    pub ruleset: &'a str,
    pub line: &'a str,
}

pub fn run(request: &ExecRequest<'_>, config: &RulesConfig) -> Result<(), String> {
    let mut table = roles::load(request.roles)?;
    let registry = super::registry(config)?;

    let cpi = table.iter().fold(MemoryCpi::new(), |cpi, (id, entry)| {
        cpi.with_role(*id, entry.ability.clone())
    });
    let prop = ExecProp::new(roles::user_role(&table, request.actor));
    let mentioned: Vec<UserRole> = request
        .mentions
        .iter()
        .map(|id| roles::user_role(&table, *id))
        .collect();
    let mut roller = config.roller();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("cannot start runtime: {e}"))?;
    let outcome = runtime.block_on(registry.dispatch_line(
        request.ruleset,
        request.line,
        mentioned,
        &cpi,
        &prop,
        &mut roller,
    ));

    for out in cpi.take_outbox() {
        match out {
            Outgoing::Message(text) => println!("{text}"),
            Outgoing::Toast(text) => println!("[私聊] {text}"),
        }
    }

    match outcome {
        DispatchOutcome::Handled(ok) => {
            tracing::debug!(ok, writes = cpi.writes(), "command finished");
            if cpi.writes() > 0 {
                write_back(&mut table, &cpi);
                roles::save(request.roles, &table)?;
            }
            Ok(())
        }
        other => Err(other.to_string()),
    }
}

fn write_back(table: &mut RoleFile, cpi: &MemoryCpi) {
    for (id, ability) in cpi.roles() {
        table.entry(id).or_default().ability = ability;
    }
}
