//! Skill growth (`en`).

use async_trait::async_trait;
use dicer_expr::Roller;

use super::COC7_PROFILE;
use super::check::parse_check_args;
use crate::registry::{CommandContext, CommandHandler};
use crate::role::{AbilityBucket, get_role_ability_int, set_role_ability_value};

/// Result of a growth roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growth {
    /// The d100 result.
    pub roll: i64,
    /// Skill value before.
    pub value: i64,
    /// 1D10 gained, if the roll succeeded.
    pub gain: Option<i64>,
}

impl Growth {
    /// Skill value after.
    pub fn new_value(&self) -> i64 {
        self.value.saturating_add(self.gain.unwrap_or(0))
    }
}

/// Roll d100; above the skill or above 95 grows it by 1D10.
pub fn roll_growth(roller: &mut dyn Roller, value: i64) -> Growth {
    let roll = i64::from(roller.roll(100));
    let gain = (roll > value || roll > 95).then(|| i64::from(roller.roll(10)));
    Growth { roll, value, gain }
}

pub(super) struct SkillGrowth;

#[async_trait]
impl CommandHandler for SkillGrowth {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let req = parse_check_args(&ctx.args);
        let Some(skill) = req.name.as_deref().map(|n| COC7_PROFILE.canonical(n)) else {
            return ctx.reject("错误：缺少技能名称");
        };
        let role = ctx.target().clone();
        let Some(mut record) = ctx.load(role.role_id).await else {
            return false;
        };
        let Some(value) = req.target.or_else(|| get_role_ability_int(&record, &skill)) else {
            return ctx.reject(&format!("未找到技能或属性：{skill}"));
        };

        let growth = roll_growth(&mut *ctx.roller, value);
        let text = match growth.gain {
            Some(gain) => {
                set_role_ability_value(
                    &mut record,
                    &skill,
                    growth.new_value(),
                    AbilityBucket::Skill,
                );
                if !ctx.store(role.role_id, record).await {
                    return false;
                }
                format!(
                    "{}的{}成长检定：D100={}/{} 成功\n增长：1D10={}，{}→{}",
                    role.role_name,
                    skill,
                    growth.roll,
                    value,
                    gain,
                    value,
                    growth.new_value()
                )
            }
            None => format!(
                "{}的{}成长检定：D100={}/{} 失败，技能没有成长",
                role.role_name, skill, growth.roll, value
            ),
        };
        ctx.reply(&text);
        true
    }
}
