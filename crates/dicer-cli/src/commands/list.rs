use dicer_rules::RulesConfig;

pub fn run(ruleset: Option<&str>, command: Option<&str>) -> Result<(), String> {
    let registry = super::registry(&RulesConfig::default())?;

    let Some(ruleset) = ruleset else {
        for ns in registry.namespaces() {
            let aliases = if ns.aliases.is_empty() {
                String::new()
            } else {
                format!("（{}）", ns.aliases.join("/"))
            };
            println!("{:>2}  {}{}：{}", ns.rule_id, ns.rule_name, aliases, ns.description);
        }
        return Ok(());
    };

    match registry.help_text(ruleset, command) {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None if registry.namespace(ruleset).is_none() => Err(format!("unknown ruleset: {ruleset}")),
        None => Err(format!(
            "unknown command in {ruleset}: {}",
            command.unwrap_or_default()
        )),
    }
}
