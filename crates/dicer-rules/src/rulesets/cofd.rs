//! Chronicles of Darkness: d10 dice pools with re-rolls.
//!
//! A pool of d10s is rolled; every face at or above the success threshold
//! counts, and every face at or above the "again" threshold adds one die to
//! the next round.

use async_trait::async_trait;
use dicer_expr::Roller;

use super::setter::{AttributeSetter, SetterProfile};
use super::{COFD_ID, parse_signed, take_hidden};
use crate::error::RuleResult;
use crate::registry::{CommandContext, CommandExecutor, CommandHandler, RuleNameSpace};
use crate::role::{AbilityBucket, get_role_ability_int};

/// Default re-roll threshold.
pub const DEFAULT_AGAIN: u32 = 10;
/// Default success threshold.
pub const DEFAULT_SUCCESS: u32 = 8;
/// Successes needed for an exceptional success.
pub const EXCEPTIONAL: u32 = 5;

/// Attribute naming for CofD sheets.
pub static COFD_PROFILE: SetterProfile = SetterProfile {
    aliases: &[
        ("int", "智力"),
        ("wits", "机敏"),
        ("res", "决心"),
        ("str", "力量"),
        ("dex", "敏捷"),
        ("sta", "耐力"),
        ("pre", "风度"),
        ("man", "操控"),
        ("com", "沉着"),
        ("init", "先攻"),
    ],
    characteristics: &[
        "智力", "机敏", "决心", "力量", "敏捷", "耐力", "风度", "操控", "沉着", "先攻",
    ],
    default_bucket: AbilityBucket::Skill,
};

/// Pool size and thresholds, as typed in `10a10k8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSpec {
    /// Dice in the first round; 0 when the text gave none.
    pub pool: u32,
    /// Faces at or above this add a die to the next round.
    pub again: u32,
    /// Faces at or above this count as successes.
    pub success: u32,
}

impl PoolSpec {
    /// A pool with default thresholds.
    pub fn new(pool: u32) -> Self {
        Self {
            pool,
            again: DEFAULT_AGAIN,
            success: DEFAULT_SUCCESS,
        }
    }

    /// Check the pool against `max_pool` and the thresholds against a d10.
    pub fn validate(&self, max_pool: u32) -> Result<(), String> {
        if self.pool == 0 || self.pool > max_pool {
            return Err(format!("骰池数量需在1到{max_pool}之间"));
        }
        if !(1..=10).contains(&self.success) {
            return Err("成功阈值需在1到10之间".to_string());
        }
        if !(2..=10).contains(&self.again) {
            return Err("加骰阈值需在2到10之间".to_string());
        }
        if self.again < self.success {
            return Err("加骰阈值不能小于成功阈值".to_string());
        }
        Ok(())
    }
}

fn take_digits(rest: &mut &str) -> Option<u32> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let (digits, tail) = rest.split_at(end);
    *rest = tail;
    digits.parse().ok()
}

/// Parse `[pool][a<again>][k<success>]`, case-insensitive.
pub fn parse_pool_spec(text: &str) -> Option<PoolSpec> {
    let lowered = text.trim().to_lowercase();
    let mut rest = lowered.as_str();
    if rest.is_empty() {
        return None;
    }
    let mut spec = PoolSpec::new(take_digits(&mut rest).unwrap_or(0));
    if let Some(tail) = rest.strip_prefix('a') {
        rest = tail;
        spec.again = take_digits(&mut rest)?;
    }
    if let Some(tail) = rest.strip_prefix('k') {
        rest = tail;
        spec.success = take_digits(&mut rest)?;
    }
    rest.is_empty().then_some(spec)
}

/// Every round of a pool roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CofdRoll {
    /// Faces rolled per round.
    pub rounds: Vec<Vec<u32>>,
    /// Faces at or above the success threshold, across all rounds.
    pub total_successes: u32,
    /// Re-rolls were still owed when the round cap was hit.
    pub truncated: bool,
}

impl CofdRoll {
    /// Number of rounds rolled.
    pub fn round(&self) -> usize {
        self.rounds.len()
    }

    /// Dice rolled across all rounds.
    pub fn dice_rolled(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Render the roll, listing faces only while at most `trace_limit` dice
    /// were rolled.
    pub fn render(&self, trace_limit: usize) -> String {
        let mut out = String::new();
        if self.dice_rolled() <= trace_limit {
            for (i, faces) in self.rounds.iter().enumerate() {
                let faces: Vec<String> = faces.iter().map(u32::to_string).collect();
                out.push_str(&format!("第{}轮：[{}]\n", i + 1, faces.join(" ")));
            }
        } else {
            out.push_str(&format!("共{}轮，掷骰{}次\n", self.round(), self.dice_rolled()));
        }
        if self.truncated {
            out.push_str("加骰轮数已达上限\n");
        }
        out.push_str(&format!("成功数：{}", self.total_successes));
        if self.total_successes >= EXCEPTIONAL {
            out.push_str(" 异常成功");
        } else if self.total_successes == 0 {
            out.push_str(" 失败");
        }
        out
    }
}

/// Roll a pool until no face earns another die, or `max_rounds` is hit.
pub fn roll_cofd_dice(roller: &mut dyn Roller, spec: PoolSpec, max_rounds: u32) -> CofdRoll {
    let mut rounds = Vec::new();
    let mut total_successes = 0;
    let mut pending = spec.pool;
    while pending > 0 && rounds.len() < max_rounds as usize {
        let faces = roller.roll_many(pending, 10);
        total_successes += faces.iter().filter(|&&f| f >= spec.success).count() as u32;
        pending = faces.iter().filter(|&&f| f >= spec.again).count() as u32;
        rounds.push(faces);
    }
    CofdRoll {
        rounds,
        total_successes,
        truncated: pending > 0,
    }
}

/// Sum `+`/`-` separated terms left to right; names go through `lookup`.
pub fn sum_attributes(
    expr: &str,
    lookup: impl Fn(&str) -> Option<i64>,
) -> Result<i64, String> {
    let expr = expr.replace('＋', "+").replace('－', "-");
    let mut total: i64 = 0;
    let mut sign = 1;
    let mut term = String::new();
    let mut terms = Vec::new();
    for c in expr.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '+' | '-' => {
                terms.push((sign, std::mem::take(&mut term)));
                sign = if c == '+' { 1 } else { -1 };
            }
            _ => term.push(c),
        }
    }
    terms.push((sign, term));

    for (i, (sign, term)) in terms.into_iter().enumerate() {
        if term.is_empty() {
            // a leading sign leaves an empty first term
            if i == 0 {
                continue;
            }
            return Err("属性表达式格式错误".to_string());
        }
        let value = match term.parse::<i64>() {
            Ok(n) => n,
            Err(_) => lookup(&term).ok_or_else(|| format!("未找到属性：{term}"))?,
        };
        total = value
            .checked_mul(sign)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| "属性之和超出范围".to_string())?;
    }
    Ok(total)
}

/// A threshold token such as `a9k7`, as opposed to part of the attribute
/// expression.
fn spec_token(token: &str) -> Option<PoolSpec> {
    if token.contains(['a', 'k', 'A', 'K']) {
        parse_pool_spec(token)
    } else {
        None
    }
}

fn roll_and_report(ctx: &mut CommandContext<'_>, spec: PoolSpec, label: &str, hidden: bool) -> bool {
    if let Err(msg) = spec.validate(ctx.config.cofd_max_pool) {
        return ctx.reject(&msg);
    }
    let roll = roll_cofd_dice(&mut *ctx.roller, spec, ctx.config.cofd_max_rounds);
    tracing::debug!(
        pool = spec.pool,
        rounds = roll.round(),
        successes = roll.total_successes,
        "cofd pool rolled"
    );
    let text = format!(
        "{}{}（{}a{}k{}）：\n{}",
        ctx.actor().role_name,
        label,
        spec.pool,
        spec.again,
        spec.success,
        roll.render(ctx.config.cofd_trace_limit)
    );
    ctx.publish(hidden, &text);
    true
}

struct PoolRoll;

#[async_trait]
impl CommandHandler for PoolRoll {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let mut args = std::mem::take(&mut ctx.args);
        let hidden = take_hidden(&mut args);
        let text = args.concat();
        let Some(spec) = parse_pool_spec(&text) else {
            return ctx.reject("格式错误，例如：.ww 10a10k8");
        };
        roll_and_report(ctx, spec, "掷骰池", hidden)
    }
}

struct AttributePool;

#[async_trait]
impl CommandHandler for AttributePool {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let mut args: Vec<String> = std::mem::take(&mut ctx.args)
            .into_iter()
            .filter(|a| !a.starts_with('@'))
            .collect();
        let hidden = take_hidden(&mut args);
        let mut spec = PoolSpec::new(0);
        let mut expr = String::new();
        for arg in &args {
            match spec_token(arg) {
                Some(s) => spec = s,
                None => expr.push_str(arg),
            }
        }
        if expr.is_empty() {
            return ctx.reject("请提供属性表达式，例如：.ra 力量+体质 a10k8");
        }

        let role = ctx.target().clone();
        let Some(record) = ctx.load(role.role_id).await else {
            return false;
        };
        let sum = match sum_attributes(&expr, |name| {
            get_role_ability_int(&record, &COFD_PROFILE.canonical(name))
        }) {
            Ok(sum) => sum,
            Err(msg) => return ctx.reject(&msg),
        };
        let Ok(pool) = u32::try_from(sum.saturating_add(i64::from(spec.pool))) else {
            return ctx.reject(&format!("骰池数量需在1到{}之间", ctx.config.cofd_max_pool));
        };
        spec.pool = pool;
        roll_and_report(ctx, spec, &format!("进行{expr}检定"), hidden)
    }
}

/// Result of an initiative roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Initiative {
    /// The d10.
    pub die: u32,
    /// Initiative modifier from the sheet.
    pub base: i64,
    /// Signed bonus from the command.
    pub bonus: i64,
}

impl Initiative {
    /// Die plus base plus bonus.
    pub fn total(&self) -> i64 {
        i64::from(self.die)
            .saturating_add(self.base)
            .saturating_add(self.bonus)
    }
}

/// Initiative modifier: `先攻`, or `敏捷 + 沉着` when absent.
pub fn initiative_base(lookup: impl Fn(&str) -> Option<i64>) -> Result<i64, String> {
    if let Some(init) = lookup("先攻") {
        return Ok(init);
    }
    let (Some(dex), Some(composure)) = (lookup("敏捷"), lookup("沉着")) else {
        return Err("未找到先攻，也未找到敏捷与沉着".to_string());
    };
    dex.checked_add(composure)
        .ok_or_else(|| "先攻数值超出范围".to_string())
}

struct InitiativeRoll;

#[async_trait]
impl CommandHandler for InitiativeRoll {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let mut bonus: i64 = 0;
        let mut base_override = None;
        for arg in ctx.args.iter().filter(|a| !a.starts_with('@')) {
            if let Some(n) = parse_signed(arg) {
                bonus = bonus.saturating_add(n);
            } else if let Ok(n) = arg.parse::<i64>() {
                base_override = Some(n);
            } else {
                return ctx.reject(&format!("无法识别的参数：{arg}"));
            }
        }

        let role = ctx.target().clone();
        let base = match base_override {
            Some(base) => base,
            None => {
                let Some(record) = ctx.load(role.role_id).await else {
                    return false;
                };
                match initiative_base(|name| get_role_ability_int(&record, name)) {
                    Ok(base) => base,
                    Err(msg) => return ctx.reject(&msg),
                }
            }
        };

        let init = Initiative {
            die: ctx.roll(10),
            base,
            bonus,
        };
        let bonus_text = if bonus == 0 {
            String::new()
        } else {
            format!("{bonus:+}")
        };
        ctx.reply(&format!(
            "{}的先攻：1D10={}+{}{}={}",
            role.role_name,
            init.die,
            base,
            bonus_text,
            init.total()
        ));
        true
    }
}

/// The `CofD` namespace.
pub fn namespace() -> RuleResult<RuleNameSpace> {
    RuleNameSpace::new(COFD_ID, "CofD", "黑暗编年史（暗黑世界）")
        .with_aliases(&["cofd", "wod", "nwod"])
        .with_cmd(
            CommandExecutor::new("ww", "掷d10骰池", PoolRoll)
                .with_usage(".ww [h] <骰池>[a<加骰阈值>][k<成功阈值>]")
                .with_examples(&[".ww 10", ".ww 10a10k8", ".ww 6a8"]),
        )?
        .with_cmd(
            CommandExecutor::new("ra", "以属性之和为骰池检定", AttributePool)
                .with_usage(".ra [h] <属性>+<属性>... [a<加骰阈值>][k<成功阈值>]")
                .with_examples(&[".ra 力量+体质", ".ra 智力+学识-1 a9k8"]),
        )?
        .with_cmd(
            CommandExecutor::new("ri", "先攻检定", InitiativeRoll)
                .with_usage(".ri [+/-修正]")
                .with_examples(&[".ri", ".ri +2"]),
        )?
        .with_cmd(
            CommandExecutor::new("st", "设置角色属性", AttributeSetter::new(&COFD_PROFILE))
                .with_usage(".st <属性名><数值>... [@角色]")
                .with_examples(&[".st 力量3敏捷2沉着2"]),
        )
}
