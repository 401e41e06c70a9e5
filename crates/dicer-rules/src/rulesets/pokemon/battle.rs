//! Damage calculation and the `atk` command.

use async_trait::async_trait;

use super::data::{Category, Skill, find_skill, parse_types, total_effectiveness};
use crate::registry::{CommandContext, CommandHandler};
use crate::role::{
    AbilityBucket, RoleAbility, get_role_ability_int, get_role_ability_value,
    set_role_ability_value,
};

/// Physical attack stat.
pub const ATTACK: &str = "攻击";
/// Physical defense stat.
pub const DEFENSE: &str = "防御";
/// Special attack stat.
pub const SP_ATTACK: &str = "特攻";
/// Special defense stat.
pub const SP_DEFENSE: &str = "特防";
/// Current hit points.
pub const HP: &str = "生命值";
/// Elemental types, e.g. `草/毒`.
pub const TYPES: &str = "属性";

/// Same-type attack bonus.
pub const STAB: f64 = 1.5;

/// `floor(attack * power / defense / 10)`, then STAB and type multipliers,
/// floored and never below 1.
pub fn compute_damage(attack: i64, power: u32, defense: i64, stab: bool, effectiveness: f64) -> i64 {
    let base = attack.max(0).saturating_mul(i64::from(power)) / defense.max(1) / 10;
    let mut damage = base as f64;
    if stab {
        damage *= STAB;
    }
    damage *= effectiveness;
    (damage.floor() as i64).max(1)
}

/// Result of one damaging attack.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    /// Damage dealt.
    pub damage: i64,
    /// Combined type multiplier.
    pub effectiveness: f64,
    /// Attacker shares the skill's type.
    pub stab: bool,
    /// Defender HP before.
    pub hp_before: i64,
    /// Defender HP after, never negative.
    pub hp_after: i64,
}

impl AttackOutcome {
    /// Chat line describing the type matchup, if notable.
    pub fn matchup_text(&self) -> Option<&'static str> {
        if self.effectiveness <= 0.0 {
            Some("似乎没有效果……")
        } else if self.effectiveness > 1.0 {
            Some("效果拔群！")
        } else if self.effectiveness < 1.0 {
            Some("效果不太好……")
        } else {
            None
        }
    }
}

fn stat_keys(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Special => (SP_ATTACK, SP_DEFENSE),
        Category::Physical | Category::Status => (ATTACK, DEFENSE),
    }
}

/// Resolve a damaging skill between two records.
///
/// Errors name the missing stat.
pub fn resolve_attack(
    skill: &Skill,
    attacker: &RoleAbility,
    defender: &RoleAbility,
) -> Result<AttackOutcome, String> {
    let (atk_key, def_key) = stat_keys(skill.category);
    let attack = get_role_ability_int(attacker, atk_key)
        .ok_or_else(|| format!("攻击方未设置{atk_key}"))?;
    let defense = get_role_ability_int(defender, def_key)
        .ok_or_else(|| format!("防守方未设置{def_key}"))?;
    let hp_before =
        get_role_ability_int(defender, HP).ok_or_else(|| format!("防守方未设置{HP}"))?;

    let stab = get_role_ability_value(attacker, TYPES)
        .is_some_and(|t| parse_types(&t).contains(&skill.kind));
    let defender_types = get_role_ability_value(defender, TYPES)
        .map(|t| parse_types(&t))
        .unwrap_or_default();
    let effectiveness = total_effectiveness(skill.kind, &defender_types);

    let damage = compute_damage(attack, skill.power, defense, stab, effectiveness);
    Ok(AttackOutcome {
        damage,
        effectiveness,
        stab,
        hp_before,
        hp_after: hp_before.saturating_sub(damage).max(0),
    })
}

pub(super) struct Attack;

#[async_trait]
impl CommandHandler for Attack {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let query: Vec<&str> = ctx
            .args
            .iter()
            .filter(|a| !a.starts_with('@'))
            .map(String::as_str)
            .collect();
        if query.is_empty() {
            return ctx.reject("请指定技能，例如：.atk 电击 @对手");
        }
        let query = query.join(" ");
        let Some(skill) = find_skill(&query) else {
            return ctx.reject(&format!("未找到技能：{query}"));
        };
        let Some(defender) = ctx.mentioned.first().cloned() else {
            return ctx.reject("请@攻击目标");
        };
        let attacker = ctx.actor().clone();

        if skill.category == Category::Status {
            ctx.reply(&format!(
                "{}对{}使用了{}！",
                attacker.role_name, defender.role_name, skill
            ));
            return true;
        }

        let Some(attacker_record) = ctx.load(attacker.role_id).await else {
            return false;
        };
        let Some(mut defender_record) = ctx.load(defender.role_id).await else {
            return false;
        };
        let outcome = match resolve_attack(skill, &attacker_record, &defender_record) {
            Ok(outcome) => outcome,
            Err(msg) => return ctx.reject(&msg),
        };

        set_role_ability_value(
            &mut defender_record,
            HP,
            outcome.hp_after,
            AbilityBucket::Ability,
        );
        if !ctx.store(defender.role_id, defender_record).await {
            return false;
        }
        tracing::debug!(
            skill = skill.name,
            damage = outcome.damage,
            defender = defender.role_id,
            "attack resolved"
        );

        let mut text = format!(
            "{}对{}使用了{}！",
            attacker.role_name, defender.role_name, skill
        );
        if let Some(line) = outcome.matchup_text() {
            text.push('\n');
            text.push_str(line);
        }
        text.push_str(&format!(
            "\n造成{}点伤害，{}的{}：{}→{}",
            outcome.damage, defender.role_name, HP, outcome.hp_before, outcome.hp_after
        ));
        if outcome.hp_after == 0 {
            text.push_str(&format!("\n{}倒下了！", defender.role_name));
        }
        ctx.reply(&text);
        true
    }
}
