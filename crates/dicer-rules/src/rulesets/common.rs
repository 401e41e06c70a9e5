//! Commands available in every ruleset: `r` and `help`.

use async_trait::async_trait;

use super::{COMMON_ID, take_hidden};
use crate::error::RuleResult;
use crate::registry::{CommandContext, CommandExecutor, CommandHandler, RuleNameSpace};

/// The `通用` namespace.
pub fn namespace() -> RuleResult<RuleNameSpace> {
    RuleNameSpace::new(COMMON_ID, "通用", "所有规则共用的指令")
        .with_aliases(&["common"])
        .with_cmd(
            CommandExecutor::new("r", "掷骰", Roll)
                .with_aliases(&["roll"])
                .with_usage(".r [h] [表达式] [原因]")
                .with_examples(&[".r 3d6+2", ".r h d100 偷听", ".r 潜行"]),
        )?
        .with_cmd(
            CommandExecutor::new("help", "查看指令帮助", Help)
                .with_usage(".help [规则|指令]")
                .with_examples(&[".help", ".help rc", ".help CofD"]),
        )
}

/// Characters that may appear in a dice expression argument.
fn is_expr_char(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(
            c,
            'd' | 'D' | '%' | '+' | '-' | '*' | '/' | '(' | ')' | '（' | '）' | '＋' | '－'
                | '＊' | '×' | '／' | '÷' | '：' | '％' | 'ｄ' | 'Ｄ'
        )
}

/// Split arguments into the leading expression tokens and the reason text.
fn split_expression(args: &[String]) -> (String, String) {
    let n = args
        .iter()
        .take_while(|a| a.chars().all(is_expr_char))
        .count();
    (args[..n].concat(), args[n..].join(" "))
}

struct Roll;

#[async_trait]
impl CommandHandler for Roll {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let mut args = std::mem::take(&mut ctx.args);
        let hidden = take_hidden(&mut args);
        let (expr, reason) = split_expression(&args);
        let expr = if expr.is_empty() {
            "d".to_string()
        } else {
            expr
        };

        let evaluation = match ctx.evaluate(&expr) {
            Ok(e) => e,
            Err(e) => return ctx.reject(&format!("表达式错误：{e}")),
        };

        let name = &ctx.actor().role_name;
        let text = if reason.is_empty() {
            format!("{name}掷骰：{evaluation}")
        } else {
            format!("{name}因「{reason}」掷骰：{evaluation}")
        };
        ctx.publish(hidden, &text);
        true
    }
}

struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let registry = ctx.registry;
        let text = match ctx.args.first() {
            None => registry.help_text(ctx.namespace, None).map(|own| {
                match registry
                    .namespace(&COMMON_ID.to_string())
                    .filter(|c| c.rule_name != ctx.namespace)
                {
                    Some(common) => format!("{own}\n{}", common.help()),
                    None => own,
                }
            }),
            Some(key) => match registry.namespace(key) {
                Some(ns) => Some(ns.help()),
                None => registry.help_text(ctx.namespace, Some(&key.to_lowercase())),
            },
        };
        match text {
            Some(text) => {
                ctx.reply(&text);
                true
            }
            None => {
                let key = ctx.args.first().cloned().unwrap_or_default();
                ctx.reject(&format!("未找到指令：{key}"))
            }
        }
    }
}
