//! Bouts of madness (`ti`, `li`).

use std::fmt;

use async_trait::async_trait;
use dicer_expr::Roller;

use crate::registry::{CommandContext, CommandHandler};

/// Real-time symptoms, duration in rounds.
pub const TEMPORARY_SYMPTOMS: [&str; 10] = [
    "失忆：调查员会发现自己只记得最后身处的安全地点，却没有任何来到这里的记忆",
    "假性残疾：调查员陷入了心理性的失明、失聪或躯体缺失感中",
    "暴力倾向：调查员陷入了六亲不认的暴力行为中，对周围的敌人与友方进行着无差别的攻击",
    "偏执：调查员陷入了严重的偏执妄想之中，有人在暗中窥视着他们，同伴中有人背叛了他们",
    "人际依赖：调查员将他人误认为背景中的重要之人，并努力与其保持那种关系",
    "昏厥：调查员当场昏倒",
    "逃避行为：调查员会用任何手段试图逃离现在所处的位置，即使这意味着抛下同伴",
    "竭嘶底里：调查员表现出大笑、哭泣、嘶吼、害怕等极端情绪",
    "恐惧：调查员从恐惧症状表中获得一个恐惧源，即使那一事物并不在场",
    "躁狂：调查员从躁狂症状表中获得一个躁狂诱因",
];

/// Summary symptoms, duration in hours.
pub const LONG_TERM_SYMPTOMS: [&str; 10] = [
    "失忆：调查员回过神来，发现自己身处一个陌生的地方，并忘记了自己是谁",
    "被窃：调查员恢复清醒时发觉自己被盗，身体毫发无损",
    "遍体鳞伤：调查员恢复清醒时发现自己身上满是拳痕和瘀伤",
    "暴力倾向：调查员陷入强烈的暴力与破坏欲之中",
    "极端信念：调查员会以极端和疯狂的方式展示自己的思想信念之一",
    "重要之人：调查员将不顾一切地接近背景中的重要之人",
    "被收容：调查员在精神病院病房或警察局牢房中回过神来",
    "逃避行为：调查员恢复清醒时发现自己在很远的地方",
    "恐惧：调查员患上一个新的恐惧症",
    "躁狂：调查员患上一个新的躁狂症",
];

/// Which table to roll on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MadnessKind {
    /// `ti`: real-time bout.
    Temporary,
    /// `li`: summary bout.
    LongTerm,
}

impl MadnessKind {
    fn table(self) -> &'static [&'static str; 10] {
        match self {
            Self::Temporary => &TEMPORARY_SYMPTOMS,
            Self::LongTerm => &LONG_TERM_SYMPTOMS,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Temporary => "即时症状",
            Self::LongTerm => "总结症状",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Self::Temporary => "轮",
            Self::LongTerm => "小时",
        }
    }
}

/// A rolled bout of madness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MadnessRoll {
    /// Table used.
    pub kind: MadnessKind,
    /// 1D10 table entry.
    pub entry: u32,
    /// 1D10 duration.
    pub duration: u32,
    /// 1D100 phobia or mania number for entries 9 and 10.
    pub disorder: Option<u32>,
}

impl MadnessRoll {
    /// The symptom text.
    pub fn symptom(&self) -> &'static str {
        let index = (self.entry.clamp(1, 10) - 1) as usize;
        self.kind.table()[index]
    }
}

impl fmt::Display for MadnessRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "疯狂发作-{}：1D10={}\n{}\n持续时间：1D10={}{}",
            self.kind.title(),
            self.entry,
            self.symptom(),
            self.duration,
            self.kind.unit()
        )?;
        if let Some(n) = self.disorder {
            let table = if self.entry == 9 { "恐惧症" } else { "躁狂症" };
            write!(f, "\n{table}编号：1D100={n}")?;
        }
        Ok(())
    }
}

/// Roll a bout of madness on the chosen table.
pub fn roll_madness(kind: MadnessKind, roller: &mut dyn Roller) -> MadnessRoll {
    let entry = roller.roll(10);
    let duration = roller.roll(10);
    let disorder = (entry >= 9).then(|| roller.roll(100));
    MadnessRoll {
        kind,
        entry,
        duration,
        disorder,
    }
}

pub(super) struct Madness(pub(super) MadnessKind);

#[async_trait]
impl CommandHandler for Madness {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let roll = roll_madness(self.0, &mut *ctx.roller);
        let text = format!("{}的{}", ctx.target().role_name, roll);
        ctx.reply(&text);
        true
    }
}
