//! Percentile skill checks (`rc`/`ra`).

use std::fmt;

use async_trait::async_trait;
use dicer_expr::Roller;

use super::COC7_PROFILE;
use crate::registry::{CommandContext, CommandHandler};
use crate::role::get_role_ability_int;
use crate::rulesets::parse_signed;

/// Most bonus or penalty dice accepted on one check.
pub const MAX_BONUS_DICE: i32 = 10;

/// Degree of success of a percentile roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessLevel {
    /// Roll of 5 or less.
    Critical,
    /// At most a fifth of the target.
    Extreme,
    /// At most half of the target.
    Hard,
    /// At most the target.
    Regular,
    /// Above the target.
    Failure,
    /// Roll of 96 or more.
    Fumble,
}

impl SuccessLevel {
    /// Grade `roll` against `target`.
    pub fn judge(roll: i64, target: i64) -> Self {
        if roll <= 5 {
            Self::Critical
        } else if roll >= 96 {
            Self::Fumble
        } else if roll > target {
            Self::Failure
        } else if roll <= target / 5 {
            Self::Extreme
        } else if roll <= target / 2 {
            Self::Hard
        } else {
            Self::Regular
        }
    }

    /// Returns true for every passing grade.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failure | Self::Fumble)
    }
}

impl fmt::Display for SuccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "大成功",
            Self::Extreme => "极难成功",
            Self::Hard => "困难成功",
            Self::Regular => "成功",
            Self::Failure => "失败",
            Self::Fumble => "大失败",
        })
    }
}

/// A graded check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Skill or attribute checked.
    pub attr: String,
    /// The d100 result.
    pub roll: i64,
    /// Target value.
    pub value: i64,
    /// Grade.
    pub level: SuccessLevel,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}检定：D100={}/{} {}",
            self.attr, self.roll, self.value, self.level
        )
    }
}

/// Grade a roll against a target value.
pub fn build_check_result(attr: &str, roll: i64, value: i64) -> CheckResult {
    CheckResult {
        attr: attr.to_string(),
        roll,
        value,
        level: SuccessLevel::judge(roll, value),
    }
}

/// A d100 roll with optional bonus (`bp > 0`) or penalty (`bp < 0`) dice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileRoll {
    /// Final value in `1..=100`.
    pub result: i64,
    /// Tens digit kept.
    pub tens: u32,
    /// Ones digit.
    pub ones: u32,
    /// Extra tens digits rolled, in order.
    pub extra_tens: Vec<u32>,
    /// Bonus/penalty dice count.
    pub bp: i32,
}

impl PercentileRoll {
    /// Text listing the extra tens dice, empty without bonus or penalty.
    pub fn detail(&self) -> String {
        if self.bp == 0 {
            return String::new();
        }
        let kind = if self.bp > 0 { "奖励骰" } else { "惩罚骰" };
        let digits: Vec<String> = self.extra_tens.iter().map(u32::to_string).collect();
        format!("（{kind}：{}）", digits.join(" "))
    }
}

fn combine(tens: u32, ones: u32) -> i64 {
    match i64::from(tens * 10 + ones) {
        0 => 100,
        v => v,
    }
}

/// Roll d100 as a tens die and a ones die, then `|bp|` extra tens dice.
///
/// Each extra die replaces the kept tens die when that lowers the total
/// (bonus) or raises it (penalty). `00` reads as 100.
pub fn roll_percentile(roller: &mut dyn Roller, bp: i32) -> PercentileRoll {
    let base = roller.roll(100);
    let (mut tens, ones) = if base >= 100 {
        (0, 0)
    } else {
        (base / 10, base % 10)
    };
    let mut extra_tens = Vec::new();
    for _ in 0..bp.unsigned_abs() {
        let candidate = roller.roll(10) - 1;
        extra_tens.push(candidate);
        let old = combine(tens, ones);
        let new = combine(candidate, ones);
        if (bp > 0 && old > new) || (bp < 0 && old < new) {
            tens = candidate;
        }
    }
    PercentileRoll {
        result: combine(tens, ones),
        tens,
        ones,
        extra_tens,
        bp,
    }
}

/// The shape of one check argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckArg {
    /// `h`: hidden roll.
    Hidden,
    /// `b`, `2b`, `p`, `3p`: bonus (positive) or penalty (negative) dice.
    BonusPenalty(i32),
    /// `+10`, `-20`: modifier added to the target.
    Signed(i64),
    /// `50`: target override.
    Value(i64),
    /// Skill or attribute name.
    Name(String),
}

/// Classify one argument. Glued tokens like `侦查50` yield a name and a value.
pub fn classify(token: &str) -> Vec<CheckArg> {
    let lowered = token.to_lowercase();
    if lowered == "h" {
        return vec![CheckArg::Hidden];
    }
    if let Some(bp) = bonus_penalty(&lowered) {
        return vec![CheckArg::BonusPenalty(bp)];
    }
    if let Some(n) = parse_signed(token) {
        return vec![CheckArg::Signed(n)];
    }
    if let Ok(n) = token.parse::<i64>() {
        return vec![CheckArg::Value(n)];
    }

    let digits_at = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    if let Some(split) = digits_at {
        let (head, number) = token.split_at(split);
        let (name, signed) = match head.strip_suffix(['+', '-']) {
            Some(name) => (name, &token[name.len()..]),
            None => (head, number),
        };
        if !name.is_empty() {
            let arg = match parse_signed(signed) {
                Some(n) => Some(CheckArg::Signed(n)),
                None => signed.parse().ok().map(CheckArg::Value),
            };
            if let Some(arg) = arg {
                return vec![CheckArg::Name(name.to_string()), arg];
            }
        }
    }
    vec![CheckArg::Name(token.to_string())]
}

fn bonus_penalty(lowered: &str) -> Option<i32> {
    let (count, sign) = if let Some(count) = lowered.strip_suffix('b') {
        (count, 1)
    } else {
        (lowered.strip_suffix('p')?, -1)
    };
    if !count.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n = if count.is_empty() {
        1
    } else {
        count.parse().ok()?
    };
    Some(sign * n)
}

/// Folded check arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRequest {
    /// First name given.
    pub name: Option<String>,
    /// Target override (last bare number wins).
    pub target: Option<i64>,
    /// Sum of signed modifiers.
    pub modifier: i64,
    /// Net bonus/penalty dice.
    pub bp: i32,
    /// Hidden roll.
    pub hidden: bool,
}

/// Classify and fold every argument.
pub fn parse_check_args(args: &[String]) -> CheckRequest {
    args.iter()
        .filter(|a| !a.starts_with('@'))
        .flat_map(|a| classify(a))
        .fold(CheckRequest::default(), |mut req, arg| {
            match arg {
                CheckArg::Hidden => req.hidden = true,
                CheckArg::BonusPenalty(n) => req.bp = req.bp.saturating_add(n),
                CheckArg::Signed(n) => req.modifier = req.modifier.saturating_add(n),
                CheckArg::Value(n) => req.target = Some(n),
                CheckArg::Name(name) => {
                    req.name.get_or_insert(name);
                }
            }
            req
        })
}

pub(super) struct SkillCheck;

#[async_trait]
impl CommandHandler for SkillCheck {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let req = parse_check_args(&ctx.args);
        if req.bp.unsigned_abs() > MAX_BONUS_DICE.unsigned_abs() {
            return ctx.reject(&format!("奖励骰或惩罚骰最多{MAX_BONUS_DICE}个"));
        }
        let skill = req.name.as_deref().map(|n| COC7_PROFILE.canonical(n));
        let role = ctx.target().clone();

        let base = match (req.target, &skill) {
            (Some(value), _) => value,
            (None, Some(name)) => {
                let Some(record) = ctx.load(role.role_id).await else {
                    return false;
                };
                match get_role_ability_int(&record, name) {
                    Some(value) => value,
                    None => return ctx.reject(&format!("未找到技能或属性：{name}")),
                }
            }
            (None, None) => return ctx.reject("错误：缺少技能名称"),
        };
        let value = base.saturating_add(req.modifier).max(0);

        let roll = roll_percentile(&mut *ctx.roller, req.bp);
        let result = build_check_result(skill.as_deref().unwrap_or("技能"), roll.result, value);
        tracing::debug!(role = role.role_id, roll = roll.result, value, "percentile check");
        let text = format!("{}进行{}{}", role.role_name, result, roll.detail());
        ctx.publish(req.hidden, &text);
        true
    }
}
