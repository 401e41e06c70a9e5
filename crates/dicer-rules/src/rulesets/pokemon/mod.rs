//! A Pokémon tabletop ruleset: typed skills and stat-based damage.

pub mod battle;
pub mod data;

use async_trait::async_trait;

use super::POKEMON_ID;
use super::setter::{AttributeSetter, SetterProfile};
use crate::error::RuleResult;
use crate::registry::{CommandContext, CommandExecutor, CommandHandler, RuleNameSpace};
use crate::role::AbilityBucket;

pub use battle::{AttackOutcome, compute_damage, resolve_attack};
pub use data::{Category, PokeType, SKILLS, Skill, effectiveness, find_skill, total_effectiveness};

/// Attribute naming for Pokémon sheets.
pub static POKEMON_PROFILE: SetterProfile = SetterProfile {
    aliases: &[
        ("atk", "攻击"),
        ("def", "防御"),
        ("spa", "特攻"),
        ("satk", "特攻"),
        ("spd", "特防"),
        ("sdef", "特防"),
        ("hp", "生命值"),
        ("血量", "生命值"),
        ("spe", "速度"),
        ("speed", "速度"),
        ("lv", "等级"),
    ],
    characteristics: &["攻击", "防御", "特攻", "特防", "生命值", "速度", "等级"],
    default_bucket: AbilityBucket::Ability,
};

struct SkillInfo;

#[async_trait]
impl CommandHandler for SkillInfo {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let query = ctx.args.join(" ");
        match find_skill(&query) {
            Some(skill) => {
                ctx.reply(&skill.to_string());
                true
            }
            None => ctx.reject(&format!("未找到技能：{query}")),
        }
    }
}

/// The `宝可梦trpg` namespace.
pub fn namespace() -> RuleResult<RuleNameSpace> {
    RuleNameSpace::new(POKEMON_ID, "宝可梦trpg", "宝可梦跑团规则")
        .with_aliases(&["pokemon", "ptrpg"])
        .with_cmd(
            CommandExecutor::new("atk", "使用技能攻击目标", battle::Attack)
                .with_aliases(&["attack"])
                .with_usage(".atk <技能名> @目标")
                .with_examples(&[".atk 电击 @对手", ".atk thunderbolt @小火龙"]),
        )?
        .with_cmd(
            CommandExecutor::new("skill", "查看技能资料", SkillInfo)
                .with_usage(".skill <技能名>")
                .with_examples(&[".skill 十万伏特"]),
        )?
        .with_cmd(
            CommandExecutor::new("st", "设置宝可梦数值", AttributeSetter::new(&POKEMON_PROFILE))
                .with_usage(".st <数值名><数值>... [@宝可梦]")
                .with_examples(&[".st 攻击55防御40生命值35", ".st hp-10 @皮卡丘"]),
        )
}
