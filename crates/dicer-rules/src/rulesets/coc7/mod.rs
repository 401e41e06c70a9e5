//! Call of Cthulhu 7th edition.

pub mod check;
pub mod growth;
pub mod madness;
pub mod sanity;

use super::COC7_ID;
use super::setter::{AttributeSetter, SetterProfile};
use crate::error::RuleResult;
use crate::registry::{CommandExecutor, RuleNameSpace};
use crate::role::AbilityBucket;

pub use check::{
    CheckArg, CheckRequest, CheckResult, PercentileRoll, SuccessLevel, build_check_result,
    classify, parse_check_args, roll_percentile,
};
pub use growth::{Growth, roll_growth};
pub use madness::{MadnessKind, MadnessRoll, roll_madness};
pub use sanity::{SanityOutcome, SanityRoll, parse_loss_pair, sanity_check};

/// Attribute naming for CoC7 sheets.
pub static COC7_PROFILE: SetterProfile = SetterProfile {
    aliases: &[
        ("str", "力量"),
        ("con", "体质"),
        ("siz", "体型"),
        ("dex", "敏捷"),
        ("app", "外貌"),
        ("int", "智力"),
        ("灵感", "智力"),
        ("pow", "意志"),
        ("edu", "教育"),
        ("知识", "教育"),
        ("luck", "幸运"),
        ("luc", "幸运"),
        ("运气", "幸运"),
        ("san", "理智"),
        ("san值", "理智"),
        ("理智值", "理智"),
        ("hp", "体力"),
        ("mp", "魔法"),
        ("mov", "移动力"),
        ("cm", "克苏鲁神话"),
        ("侦察", "侦查"),
        ("计算机", "计算机使用"),
        ("电脑", "计算机使用"),
        ("信用", "信用评级"),
        ("信誉", "信用评级"),
    ],
    characteristics: &[
        "力量", "体质", "体型", "敏捷", "外貌", "智力", "意志", "教育", "幸运", "理智", "体力",
        "魔法", "移动力",
    ],
    default_bucket: AbilityBucket::Skill,
};

/// The `coc7` namespace.
pub fn namespace() -> RuleResult<RuleNameSpace> {
    RuleNameSpace::new(COC7_ID, "coc7", "克苏鲁的呼唤第七版")
        .with_aliases(&["coc", "CoC7"])
        .with_cmd(
            CommandExecutor::new("rc", "技能或属性检定", check::SkillCheck)
                .with_aliases(&["ra"])
                .with_usage(".rc [h] [b|p|Nb|Np] <技能名> [数值] [+/-修正]")
                .with_examples(&[".rc 侦查", ".rc 侦查 50", ".rc p 手枪", ".rc h 聆听+10"]),
        )?
        .with_cmd(
            CommandExecutor::new("sc", "理智检定", sanity::SanityCheck)
                .with_usage(".sc [h] <成功损失>/<失败损失> [当前理智]")
                .with_examples(&[".sc 1/1d6", ".sc 0/1d10 60"]),
        )?
        .with_cmd(
            CommandExecutor::new("en", "技能成长检定", growth::SkillGrowth)
                .with_usage(".en <技能名> [数值]")
                .with_examples(&[".en 侦查", ".en 图书馆 40"]),
        )?
        .with_cmd(
            CommandExecutor::new(
                "ti",
                "疯狂发作-即时症状",
                madness::Madness(MadnessKind::Temporary),
            )
            .with_usage(".ti"),
        )?
        .with_cmd(
            CommandExecutor::new(
                "li",
                "疯狂发作-总结症状",
                madness::Madness(MadnessKind::LongTerm),
            )
            .with_usage(".li"),
        )?
        .with_cmd(
            CommandExecutor::new("st", "设置角色属性", AttributeSetter::new(&COC7_PROFILE))
                .with_usage(".st <属性名><数值>... [@角色]")
                .with_examples(&[".st 力量70", ".st 侦查+5 san-3", ".st 力量60 敏捷50 @张三"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(COC7_PROFILE.canonical("STR"), "力量");
        assert_eq!(COC7_PROFILE.canonical("San"), "理智");
        assert_eq!(COC7_PROFILE.canonical("侦查"), "侦查");
    }

    #[test]
    fn ra_is_rc() {
        let ns = namespace().unwrap();
        assert_eq!(ns.find_cmd("ra").map(|c| c.name.as_str()), Some("rc"));
        assert_eq!(ns.commands().count(), 6);
    }
}
