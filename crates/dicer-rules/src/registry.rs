//! Ruleset namespaces, their commands, and dispatch.
//!
//! A [`CommandRegistry`] is built once from namespace definitions and is
//! read-only afterwards. Dispatch resolves the namespace by id, name or
//! alias, then the command by name or alias, and runs its handler with a
//! [`CommandContext`] carrying the arguments and host services.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dicer_expr::{DiceEvaluator, Evaluation, ExprResult, Range, Roller};

use crate::config::RulesConfig;
use crate::cpi::{Cpi, ExecProp};
use crate::error::{RuleError, RuleResult};
use crate::role::{RoleAbility, UserRole};
use crate::rulesets;

/// The business logic behind one command.
///
/// Returning `false` means validation failed and the user has already been
/// told why; callers must not retry.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command.
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool;
}

/// Everything a handler may touch while running.
pub struct CommandContext<'a> {
    /// Arguments after the command token.
    pub args: Vec<String>,
    /// Roles mentioned in the command line, in order.
    pub mentioned: Vec<UserRole>,
    /// Host services.
    pub cpi: &'a dyn Cpi,
    /// Who issued the command.
    pub prop: &'a ExecProp,
    /// Source of every die rolled.
    pub roller: &'a mut dyn Roller,
    /// Expression evaluator configured for this registry.
    pub evaluator: DiceEvaluator,
    /// Engine settings.
    pub config: &'a RulesConfig,
    /// The registry dispatching this command.
    pub registry: &'a CommandRegistry,
    /// Name of the namespace the command resolved in.
    pub namespace: &'a str,
}

impl CommandContext<'_> {
    /// The issuing role.
    pub fn actor(&self) -> &UserRole {
        &self.prop.actor
    }

    /// The first mentioned role, or the actor when nobody is mentioned.
    pub fn target(&self) -> &UserRole {
        self.mentioned.first().unwrap_or(&self.prop.actor)
    }

    /// Send a conversation message.
    pub fn reply(&self, text: &str) {
        self.cpi.send_msg(self.prop, text);
    }

    /// Send a private notice.
    pub fn toast(&self, text: &str) {
        self.cpi.send_toast(text);
    }

    /// Report a validation failure and return `false`.
    pub fn reject(&self, text: &str) -> bool {
        self.reply(text);
        false
    }

    /// Publish a result, privately when `hidden`.
    ///
    /// A hidden result still leaves a public trace that a roll happened.
    pub fn publish(&self, hidden: bool, text: &str) {
        if hidden {
            self.toast(text);
            self.reply(&format!("{}进行了一次暗骰", self.actor().role_name));
        } else {
            self.reply(text);
        }
    }

    /// Roll a single die.
    pub fn roll(&mut self, faces: u32) -> u32 {
        self.roller.roll(faces)
    }

    /// Evaluate a dice expression with this context's roller.
    pub fn evaluate(&mut self, expr: &str) -> ExprResult<Evaluation> {
        self.evaluator.parse(expr, &mut *self.roller)
    }

    /// Bounds of a dice expression.
    pub fn range(&self, expr: &str) -> ExprResult<Range> {
        self.evaluator.range(expr)
    }

    /// Load a role record, reporting store failures to the user.
    pub async fn load(&self, role_id: i64) -> Option<RoleAbility> {
        match self.cpi.get_role_ability(role_id).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(role_id, error = %e, "failed to load role");
                self.reply(&e.to_string());
                None
            }
        }
    }

    /// Persist a role record, reporting store failures to the user.
    pub async fn store(&self, role_id: i64, record: RoleAbility) -> bool {
        match self.cpi.set_role_ability(role_id, record).await {
            Ok(()) => {
                tracing::debug!(role_id, "role record persisted");
                true
            }
            Err(e) => {
                tracing::warn!(role_id, error = %e, "failed to persist role");
                self.reply(&e.to_string());
                false
            }
        }
    }
}

/// A named command with its metadata and handler.
#[derive(Clone)]
pub struct CommandExecutor {
    /// Primary name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// One-line description.
    pub description: String,
    /// Sample invocations.
    pub examples: Vec<String>,
    /// Argument synopsis.
    pub usage: String,
    handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

impl CommandExecutor {
    /// A command with no aliases, usage or examples yet.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            examples: Vec::new(),
            usage: String::new(),
            handler: Arc::new(handler),
        }
    }

    /// Set the aliases.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Set the usage synopsis.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Set the examples.
    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples = examples.iter().map(|e| e.to_string()).collect();
        self
    }

    /// The primary name followed by every alias.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Run the handler.
    pub async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        self.handler.execute(ctx).await
    }

    /// Multi-line help for this command.
    pub fn help(&self) -> String {
        let mut out = format!(".{}：{}", self.name, self.description);
        if !self.usage.is_empty() {
            out.push_str(&format!("\n用法：{}", self.usage));
        }
        if !self.aliases.is_empty() {
            out.push_str(&format!("\n别名：{}", self.aliases.join("、")));
        }
        if !self.examples.is_empty() {
            out.push_str("\n示例：");
            for example in &self.examples {
                out.push_str(&format!("\n  {example}"));
            }
        }
        out
    }
}

/// A ruleset: an id, a name, aliases, and its commands.
#[derive(Debug, Clone)]
pub struct RuleNameSpace {
    /// Numeric id.
    pub rule_id: u32,
    /// Display name, also a lookup key.
    pub rule_name: String,
    /// Alternative lookup keys.
    pub aliases: Vec<String>,
    /// One-line description.
    pub description: String,
    commands: BTreeMap<String, CommandExecutor>,
    index: HashMap<String, String>,
}

impl RuleNameSpace {
    /// An empty namespace.
    pub fn new(rule_id: u32, rule_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            rule_id,
            rule_name: rule_name.into(),
            aliases: Vec::new(),
            description: description.into(),
            commands: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Set the aliases.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Register a command under its name and every alias.
    ///
    /// Fails without modifying the namespace if any key is already taken.
    pub fn add_cmd(&mut self, executor: CommandExecutor) -> RuleResult<()> {
        let mut seen = HashSet::new();
        for key in executor.keys() {
            if self.index.contains_key(key) || !seen.insert(key) {
                return Err(RuleError::DuplicateCommand {
                    namespace: self.rule_name.clone(),
                    name: key.to_string(),
                });
            }
        }
        for key in executor.keys() {
            self.index.insert(key.to_string(), executor.name.clone());
        }
        self.commands.insert(executor.name.clone(), executor);
        Ok(())
    }

    /// Builder-style [`add_cmd`](Self::add_cmd).
    pub fn with_cmd(mut self, executor: CommandExecutor) -> RuleResult<Self> {
        self.add_cmd(executor)?;
        Ok(self)
    }

    /// Resolve a command by name or alias.
    pub fn find_cmd(&self, key: &str) -> Option<&CommandExecutor> {
        self.index.get(key).and_then(|name| self.commands.get(name))
    }

    /// Commands in name order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandExecutor> {
        self.commands.values()
    }

    /// Every key this namespace answers to.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = vec![self.rule_id.to_string(), self.rule_name.clone()];
        keys.extend(self.aliases.iter().cloned());
        keys
    }

    /// Returns true if `key` is this namespace's id, name or an alias.
    pub fn matches(&self, key: &str) -> bool {
        self.keys().iter().any(|k| k == key)
    }

    /// Resolve a token with arguments glued to the command, such as
    /// `rc侦查50`, by the longest matching command key.
    ///
    /// Returns the command and the remaining text.
    pub fn resolve_glued<'t>(&self, token: &'t str) -> Option<(&CommandExecutor, &'t str)> {
        token
            .char_indices()
            .rev()
            .map(|(i, _)| i)
            .filter(|&i| i > 0)
            .find_map(|split| {
                let (head, rest) = token.split_at(split);
                self.find_cmd(head).map(|cmd| (cmd, rest))
            })
    }

    /// Multi-line help listing every command.
    pub fn help(&self) -> String {
        let mut out = format!("【{}】{}", self.rule_name, self.description);
        for cmd in self.commands() {
            out.push_str(&format!("\n.{}：{}", cmd.name, cmd.description));
        }
        out
    }
}

/// A parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInput {
    /// Lowercased command token.
    pub command: String,
    /// Arguments, original case.
    pub args: Vec<String>,
    /// Roles the host resolved from mentions.
    pub mentioned: Vec<UserRole>,
}

impl CommandInput {
    /// Parse a raw line such as `.rc 侦查 50`.
    pub fn parse(line: &str) -> Option<Self> {
        split_command_line(line).map(|(command, args)| Self {
            command,
            args,
            mentioned: Vec::new(),
        })
    }

    /// Attach mentioned roles.
    pub fn with_mentioned(mut self, mentioned: Vec<UserRole>) -> Self {
        self.mentioned = mentioned;
        self
    }
}

/// Split a command line into a lowercased command token and its arguments.
///
/// A leading `.` or `。` is stripped. Returns `None` for blank input.
pub fn split_command_line(line: &str) -> Option<(String, Vec<String>)> {
    let line = line.trim();
    let line = line
        .strip_prefix('.')
        .or_else(|| line.strip_prefix('。'))
        .unwrap_or(line);
    let mut parts = line.split_whitespace();
    let command = parts.next()?.to_lowercase();
    Some((command, parts.map(str::to_string).collect()))
}

/// What happened to a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran and returned this value.
    Handled(bool),
    /// No namespace answers to this key.
    UnknownRuleset(String),
    /// The namespace has no such command.
    UnknownCommand(String),
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled(true) => write!(f, "指令已执行"),
            Self::Handled(false) => write!(f, "指令未完成"),
            Self::UnknownRuleset(key) => write!(f, "未知的规则：{key}"),
            Self::UnknownCommand(key) => write!(f, "未知的指令：{key}"),
        }
    }
}

/// Every namespace the engine knows, plus shared settings.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    namespaces: Vec<RuleNameSpace>,
    config: RulesConfig,
}

impl CommandRegistry {
    /// Build a registry, rejecting namespaces that share an id, name or alias.
    pub fn new(namespaces: Vec<RuleNameSpace>) -> RuleResult<Self> {
        let mut seen = HashSet::new();
        for ns in &namespaces {
            for key in ns.keys() {
                if !seen.insert(key.clone()) {
                    return Err(RuleError::DuplicateNamespace(key));
                }
            }
        }
        Ok(Self {
            namespaces,
            config: RulesConfig::default(),
        })
    }

    /// Replace the engine settings.
    pub fn with_config(mut self, config: RulesConfig) -> Self {
        self.config = config;
        self
    }

    /// The shipped rulesets: `通用`, `coc7`, `CofD` and `宝可梦trpg`.
    pub fn standard(config: &RulesConfig) -> RuleResult<Self> {
        Ok(Self::new(rulesets::builtin()?)?.with_config(config.clone()))
    }

    /// Engine settings.
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Namespaces in registration order.
    pub fn namespaces(&self) -> &[RuleNameSpace] {
        &self.namespaces
    }

    /// Resolve a namespace by id, name or alias (exact match).
    pub fn namespace(&self, key: &str) -> Option<&RuleNameSpace> {
        self.namespaces.iter().find(|ns| ns.matches(key))
    }

    fn common(&self) -> Option<&RuleNameSpace> {
        self.namespaces
            .iter()
            .find(|ns| ns.rule_id == rulesets::COMMON_ID)
    }

    /// Help for a namespace, or one of its commands.
    ///
    /// Commands missing from the namespace are looked up in `通用`.
    pub fn help_text(&self, namespace: &str, command: Option<&str>) -> Option<String> {
        let ns = self.namespace(namespace)?;
        match command {
            None => Some(ns.help()),
            Some(name) => ns
                .find_cmd(name)
                .or_else(|| self.common().and_then(|c| c.find_cmd(name)))
                .map(CommandExecutor::help),
        }
    }

    /// Resolve a command strictly within one namespace, then run it.
    pub async fn dispatch(
        &self,
        namespace: &str,
        input: CommandInput,
        cpi: &dyn Cpi,
        prop: &ExecProp,
        roller: &mut dyn Roller,
    ) -> DispatchOutcome {
        let Some(ns) = self.namespace(namespace) else {
            return DispatchOutcome::UnknownRuleset(namespace.to_string());
        };
        let CommandInput {
            command,
            args,
            mentioned,
        } = input;
        match ns.find_cmd(&command) {
            Some(cmd) => self.run(ns, cmd, args, mentioned, cpi, prop, roller).await,
            None => DispatchOutcome::UnknownCommand(command),
        }
    }

    /// Parse and run a raw line in a namespace.
    ///
    /// Unknown commands fall back to `通用`, and glued arguments such as
    /// `.rc侦查50` are split off the command token.
    pub async fn dispatch_line(
        &self,
        namespace: &str,
        line: &str,
        mentioned: Vec<UserRole>,
        cpi: &dyn Cpi,
        prop: &ExecProp,
        roller: &mut dyn Roller,
    ) -> DispatchOutcome {
        let Some(ns) = self.namespace(namespace) else {
            return DispatchOutcome::UnknownRuleset(namespace.to_string());
        };
        let Some(input) = CommandInput::parse(line) else {
            return DispatchOutcome::UnknownCommand(String::new());
        };

        let mut scopes = vec![ns];
        if let Some(common) = self.common().filter(|c| c.rule_id != ns.rule_id) {
            scopes.push(common);
        }

        for scope in &scopes {
            if let Some(cmd) = scope.find_cmd(&input.command) {
                return self
                    .run(ns, cmd, input.args, mentioned, cpi, prop, roller)
                    .await;
            }
        }
        for scope in &scopes {
            if let Some((cmd, rest)) = scope.resolve_glued(&input.command) {
                // The command token was lowercased; recover the original
                // spelling of the glued argument from the raw line.
                let rest = original_suffix(line, rest);
                let mut args = vec![rest];
                args.extend(input.args);
                return self.run(ns, cmd, args, mentioned, cpi, prop, roller).await;
            }
        }
        DispatchOutcome::UnknownCommand(input.command)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        ns: &RuleNameSpace,
        cmd: &CommandExecutor,
        args: Vec<String>,
        mentioned: Vec<UserRole>,
        cpi: &dyn Cpi,
        prop: &ExecProp,
        roller: &mut dyn Roller,
    ) -> DispatchOutcome {
        tracing::debug!(
            namespace = %ns.rule_name,
            command = %cmd.name,
            args = ?args,
            actor = prop.actor.role_id,
            "dispatching command"
        );
        let mut ctx = CommandContext {
            args,
            mentioned,
            cpi,
            prop,
            roller,
            evaluator: self.config.evaluator(),
            config: &self.config,
            registry: self,
            namespace: &ns.rule_name,
        };
        let handled = cmd.execute(&mut ctx).await;
        tracing::debug!(command = %cmd.name, handled, "command finished");
        DispatchOutcome::Handled(handled)
    }
}

/// The last `lowered.chars().count()` characters of the first word of `line`.
fn original_suffix(line: &str, lowered: &str) -> String {
    let (command, _) = split_first_word(line);
    let keep = lowered.chars().count();
    let total = command.chars().count();
    command.chars().skip(total.saturating_sub(keep)).collect()
}

fn split_first_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    let line = line
        .strip_prefix('.')
        .or_else(|| line.strip_prefix('。'))
        .unwrap_or(line);
    line.split_once(char::is_whitespace).unwrap_or((line, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::MemoryCpi;
    use dicer_expr::SequenceRoller;

    struct Echo;

    #[async_trait]
    impl CommandHandler for Echo {
        async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
            ctx.reply(&ctx.args.join("|"));
            true
        }
    }

    fn echo(name: &str, aliases: &[&str]) -> CommandExecutor {
        CommandExecutor::new(name, "回显", Echo).with_aliases(aliases)
    }

    #[test]
    fn split_strips_prefix_and_lowercases() {
        assert_eq!(
            split_command_line(".RC 侦查 50"),
            Some(("rc".to_string(), vec!["侦查".to_string(), "50".to_string()]))
        );
        assert_eq!(
            split_command_line("。st 力量70"),
            Some(("st".to_string(), vec!["力量70".to_string()]))
        );
        assert_eq!(split_command_line("   "), None);
        assert_eq!(split_command_line("."), None);
    }

    #[test]
    fn alias_resolves_to_same_command() {
        let ns = RuleNameSpace::new(9, "测试", "")
            .with_cmd(echo("roll", &["r"]))
            .unwrap();
        assert_eq!(ns.find_cmd("r").map(|c| c.name.as_str()), Some("roll"));
        assert_eq!(ns.find_cmd("roll").map(|c| c.name.as_str()), Some("roll"));
        assert!(ns.find_cmd("x").is_none());
    }

    #[test]
    fn colliding_alias_rejected() {
        let mut ns = RuleNameSpace::new(9, "测试", "");
        ns.add_cmd(echo("roll", &["r"])).unwrap();
        let err = ns.add_cmd(echo("rc", &["r"])).unwrap_err();
        assert_eq!(
            err,
            RuleError::DuplicateCommand {
                namespace: "测试".into(),
                name: "r".into()
            }
        );
        assert!(ns.find_cmd("rc").is_none());
    }

    #[test]
    fn duplicate_namespace_rejected() {
        let a = RuleNameSpace::new(1, "a", "").with_aliases(&["x"]);
        let b = RuleNameSpace::new(2, "b", "").with_aliases(&["x"]);
        let err = CommandRegistry::new(vec![a, b]).unwrap_err();
        assert_eq!(err, RuleError::DuplicateNamespace("x".into()));
    }

    #[test]
    fn namespace_lookup_by_id_name_alias() {
        let reg = CommandRegistry::new(vec![
            RuleNameSpace::new(1, "coc7", "").with_aliases(&["coc"]),
        ])
        .unwrap();
        assert!(reg.namespace("1").is_some());
        assert!(reg.namespace("coc7").is_some());
        assert!(reg.namespace("coc").is_some());
        assert!(reg.namespace("COC7").is_none());
    }

    #[test]
    fn glued_prefers_longest_key() {
        let ns = RuleNameSpace::new(9, "测试", "")
            .with_cmd(echo("r", &[]))
            .unwrap()
            .with_cmd(echo("rc", &[]))
            .unwrap();
        let (cmd, rest) = ns.resolve_glued("rc侦查50").unwrap();
        assert_eq!(cmd.name, "rc");
        assert_eq!(rest, "侦查50");
        let (cmd, rest) = ns.resolve_glued("rc").unwrap();
        assert_eq!(cmd.name, "r");
        assert_eq!(rest, "c");
        assert!(ns.resolve_glued("x侦查").is_none());
        assert!(ns.resolve_glued("r").is_none());
    }

    #[tokio::test]
    async fn dispatch_reports_unknowns() {
        let reg = CommandRegistry::new(vec![
            RuleNameSpace::new(1, "t", "").with_cmd(echo("e", &[])).unwrap(),
        ])
        .unwrap();
        let cpi = MemoryCpi::new();
        let prop = ExecProp::new(UserRole::new(1, "甲"));
        let mut roller = SequenceRoller::constant(1);
        let input = CommandInput::parse(".e a").unwrap();
        assert_eq!(
            reg.dispatch("nope", input.clone(), &cpi, &prop, &mut roller).await,
            DispatchOutcome::UnknownRuleset("nope".into())
        );
        let missing = CommandInput::parse(".zz").unwrap();
        assert_eq!(
            reg.dispatch("t", missing, &cpi, &prop, &mut roller).await,
            DispatchOutcome::UnknownCommand("zz".into())
        );
        assert_eq!(
            reg.dispatch("t", input, &cpi, &prop, &mut roller).await,
            DispatchOutcome::Handled(true)
        );
        assert_eq!(cpi.messages(), vec!["a"]);
    }

    #[tokio::test]
    async fn dispatch_line_keeps_glued_case() {
        let reg = CommandRegistry::new(vec![
            RuleNameSpace::new(1, "t", "").with_cmd(echo("e", &[])).unwrap(),
        ])
        .unwrap();
        let cpi = MemoryCpi::new();
        let prop = ExecProp::new(UserRole::new(1, "甲"));
        let mut roller = SequenceRoller::constant(1);
        let outcome = reg
            .dispatch_line("t", ".eABC x", Vec::new(), &cpi, &prop, &mut roller)
            .await;
        assert_eq!(outcome, DispatchOutcome::Handled(true));
        assert_eq!(cpi.messages(), vec!["ABC|x"]);
    }

    #[test]
    fn command_help_lists_metadata() {
        let cmd = echo("rc", &["ra"])
            .with_usage(".rc [技能名] [数值]")
            .with_examples(&[".rc 侦查 50"]);
        let help = cmd.help();
        assert!(help.contains("别名：ra"));
        assert!(help.contains("用法：.rc [技能名] [数值]"));
        assert!(help.contains(".rc 侦查 50"));
    }
}
