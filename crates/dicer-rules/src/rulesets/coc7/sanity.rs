//! Sanity checks (`sc`).

use std::fmt;

use async_trait::async_trait;
use dicer_expr::{DiceEvaluator, ExprResult, Roller};

use super::check::roll_percentile;
use crate::registry::{CommandContext, CommandHandler};
use crate::role::{AbilityBucket, get_role_ability_int, set_role_ability_value};
use crate::rulesets::take_hidden;

/// Attribute holding current sanity.
pub const SANITY: &str = "理智";

/// Single loss at or above which temporary insanity may set in.
pub const TEMPORARY_INSANITY_LOSS: i64 = 5;

/// How the d100 against current sanity landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityRoll {
    /// 5 or less: the success loss at its minimum.
    Critical,
    /// At most current sanity.
    Success,
    /// Above current sanity.
    Failure,
    /// 96 or more: the failure loss at its maximum.
    Fumble,
}

impl SanityRoll {
    /// Grade a roll against current sanity.
    pub fn judge(roll: i64, san: i64) -> Self {
        if roll <= 5 {
            Self::Critical
        } else if roll >= 96 {
            Self::Fumble
        } else if roll <= san {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl fmt::Display for SanityRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "大成功",
            Self::Success => "成功",
            Self::Failure => "失败",
            Self::Fumble => "大失败",
        })
    }
}

/// Result of one sanity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityOutcome {
    /// The d100 result.
    pub roll: i64,
    /// Sanity before the check.
    pub san: i64,
    /// Grade.
    pub grade: SanityRoll,
    /// Sanity lost, never negative.
    pub loss: i64,
    /// How the loss was obtained.
    pub loss_trace: String,
    /// Sanity after the check, never negative.
    pub new_san: i64,
}

impl SanityOutcome {
    /// Sanity hit zero.
    pub fn indefinite(&self) -> bool {
        self.new_san == 0
    }

    /// The loss is large enough to risk temporary insanity.
    pub fn temporary_warning(&self) -> bool {
        self.loss >= TEMPORARY_INSANITY_LOSS
    }
}

/// Split `success/failure` into its two loss expressions.
pub fn parse_loss_pair(text: &str) -> Option<(String, String)> {
    let text = text.replace('／', "/");
    let (success, failure) = text.split_once('/')?;
    if success.trim().is_empty() || failure.trim().is_empty() {
        return None;
    }
    Some((success.trim().to_string(), failure.trim().to_string()))
}

/// Run a sanity check against `san`.
///
/// Both expressions are validated before anything is rolled.
pub fn sanity_check(
    evaluator: &DiceEvaluator,
    roller: &mut dyn Roller,
    san: i64,
    success_expr: &str,
    failure_expr: &str,
) -> ExprResult<SanityOutcome> {
    let success_range = evaluator.range(success_expr)?;
    let failure_range = evaluator.range(failure_expr)?;

    let roll = roll_percentile(&mut *roller, 0).result;
    let grade = SanityRoll::judge(roll, san);
    let (loss, loss_trace) = match grade {
        SanityRoll::Critical => (
            success_range.min,
            format!("{success_expr}最小值={}", success_range.min),
        ),
        SanityRoll::Fumble => (
            failure_range.max,
            format!("{failure_expr}最大值={}", failure_range.max),
        ),
        SanityRoll::Success => {
            let e = evaluator.parse(success_expr, roller)?;
            (e.result, e.to_string())
        }
        SanityRoll::Failure => {
            let e = evaluator.parse(failure_expr, roller)?;
            (e.result, e.to_string())
        }
    };
    let loss = loss.max(0);
    Ok(SanityOutcome {
        roll,
        san,
        grade,
        loss,
        loss_trace,
        new_san: san.saturating_sub(loss).max(0),
    })
}

pub(super) struct SanityCheck;

#[async_trait]
impl CommandHandler for SanityCheck {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let mut args: Vec<String> = std::mem::take(&mut ctx.args)
            .into_iter()
            .filter(|a| !a.starts_with('@'))
            .collect();
        let hidden = take_hidden(&mut args);

        let Some(pair_at) = args.iter().position(|a| a.contains(['/', '／'])) else {
            return ctx.reject("格式错误，例如：.sc 1/1d6");
        };
        let Some((success_expr, failure_expr)) = parse_loss_pair(&args[pair_at]) else {
            return ctx.reject("格式错误，例如：.sc 1/1d6");
        };
        let override_san = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pair_at)
            .find_map(|(_, a)| a.parse::<i64>().ok());

        let role = ctx.target().clone();
        let Some(mut record) = ctx.load(role.role_id).await else {
            return false;
        };
        let san = match override_san.or_else(|| get_role_ability_int(&record, SANITY)) {
            Some(san) => san,
            None => {
                return ctx.reject("未找到理智值，请先使用 .st 理智<数值> 设置");
            }
        };

        let outcome = match sanity_check(
            &ctx.evaluator,
            &mut *ctx.roller,
            san,
            &success_expr,
            &failure_expr,
        ) {
            Ok(outcome) => outcome,
            Err(e) => return ctx.reject(&format!("表达式错误：{e}")),
        };

        set_role_ability_value(
            &mut record,
            SANITY,
            outcome.new_san,
            AbilityBucket::Ability,
        );
        if !ctx.store(role.role_id, record).await {
            return false;
        }

        let mut text = format!(
            "{}的理智检定：D100={}/{} {}\n理智损失：{}\n理智：{}→{}",
            role.role_name,
            outcome.roll,
            outcome.san,
            outcome.grade,
            outcome.loss_trace,
            outcome.san,
            outcome.new_san
        );
        if outcome.indefinite() {
            text.push_str("\n理智归零，陷入永久性疯狂");
        } else if outcome.temporary_warning() {
            text.push_str("\n单次损失理智达到5点，请进行智力检定，成功则陷入临时性疯狂");
        }
        ctx.publish(hidden, &text);
        true
    }
}
