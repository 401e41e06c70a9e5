//! Static type chart and skill table.

use std::fmt;

/// The eighteen elemental types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokeType {
    /// 一般
    Normal,
    /// 火
    Fire,
    /// 水
    Water,
    /// 电
    Electric,
    /// 草
    Grass,
    /// 冰
    Ice,
    /// 格斗
    Fighting,
    /// 毒
    Poison,
    /// 地面
    Ground,
    /// 飞行
    Flying,
    /// 超能力
    Psychic,
    /// 虫
    Bug,
    /// 岩石
    Rock,
    /// 幽灵
    Ghost,
    /// 龙
    Dragon,
    /// 恶
    Dark,
    /// 钢
    Steel,
    /// 妖精
    Fairy,
}

impl PokeType {
    /// Every type.
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    /// Chinese name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "一般",
            Self::Fire => "火",
            Self::Water => "水",
            Self::Electric => "电",
            Self::Grass => "草",
            Self::Ice => "冰",
            Self::Fighting => "格斗",
            Self::Poison => "毒",
            Self::Ground => "地面",
            Self::Flying => "飞行",
            Self::Psychic => "超能力",
            Self::Bug => "虫",
            Self::Rock => "岩石",
            Self::Ghost => "幽灵",
            Self::Dragon => "龙",
            Self::Dark => "恶",
            Self::Steel => "钢",
            Self::Fairy => "妖精",
        }
    }

    /// Parse a Chinese name (with or without a trailing `系`) or an English
    /// name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_suffix('系').unwrap_or(s);
        let lowered = s.to_lowercase();
        Self::ALL.into_iter().find(|t| {
            t.name() == s || format!("{t:?}").to_lowercase() == lowered
        })
    }
}

impl fmt::Display for PokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a stored type list such as `草/毒` into types.
pub fn parse_types(text: &str) -> Vec<PokeType> {
    text.split(['/', '／', ',', '，', '、', ' '])
        .filter_map(PokeType::parse)
        .collect()
}

/// A non-neutral matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Matchup {
    Immune,
    Resisted,
    Super,
}

use Matchup::{Immune, Resisted, Super};
use PokeType::{
    Bug, Dark, Dragon, Electric, Fairy, Fighting, Fire, Flying, Ghost, Grass, Ground, Ice,
    Normal, Poison, Psychic, Rock, Steel, Water,
};

/// Attacker, defender, matchup. Unlisted pairs are neutral.
const CHART: &[(PokeType, PokeType, Matchup)] = &[
    (Normal, Rock, Resisted),
    (Normal, Ghost, Immune),
    (Normal, Steel, Resisted),
    (Fire, Fire, Resisted),
    (Fire, Water, Resisted),
    (Fire, Grass, Super),
    (Fire, Ice, Super),
    (Fire, Bug, Super),
    (Fire, Rock, Resisted),
    (Fire, Dragon, Resisted),
    (Fire, Steel, Super),
    (Water, Fire, Super),
    (Water, Water, Resisted),
    (Water, Grass, Resisted),
    (Water, Ground, Super),
    (Water, Rock, Super),
    (Water, Dragon, Resisted),
    (Electric, Water, Super),
    (Electric, Electric, Resisted),
    (Electric, Grass, Resisted),
    (Electric, Ground, Immune),
    (Electric, Flying, Super),
    (Electric, Dragon, Resisted),
    (Grass, Fire, Resisted),
    (Grass, Water, Super),
    (Grass, Grass, Resisted),
    (Grass, Poison, Resisted),
    (Grass, Ground, Super),
    (Grass, Flying, Resisted),
    (Grass, Bug, Resisted),
    (Grass, Rock, Super),
    (Grass, Dragon, Resisted),
    (Grass, Steel, Resisted),
    (Ice, Fire, Resisted),
    (Ice, Water, Resisted),
    (Ice, Grass, Super),
    (Ice, Ice, Resisted),
    (Ice, Ground, Super),
    (Ice, Flying, Super),
    (Ice, Dragon, Super),
    (Ice, Steel, Resisted),
    (Fighting, Normal, Super),
    (Fighting, Ice, Super),
    (Fighting, Poison, Resisted),
    (Fighting, Flying, Resisted),
    (Fighting, Psychic, Resisted),
    (Fighting, Bug, Resisted),
    (Fighting, Rock, Super),
    (Fighting, Ghost, Immune),
    (Fighting, Dark, Super),
    (Fighting, Steel, Super),
    (Fighting, Fairy, Resisted),
    (Poison, Grass, Super),
    (Poison, Poison, Resisted),
    (Poison, Ground, Resisted),
    (Poison, Rock, Resisted),
    (Poison, Ghost, Resisted),
    (Poison, Steel, Immune),
    (Poison, Fairy, Super),
    (Ground, Fire, Super),
    (Ground, Electric, Super),
    (Ground, Grass, Resisted),
    (Ground, Poison, Super),
    (Ground, Flying, Immune),
    (Ground, Bug, Resisted),
    (Ground, Rock, Super),
    (Ground, Steel, Super),
    (Flying, Electric, Resisted),
    (Flying, Grass, Super),
    (Flying, Fighting, Super),
    (Flying, Bug, Super),
    (Flying, Rock, Resisted),
    (Flying, Steel, Resisted),
    (Psychic, Fighting, Super),
    (Psychic, Poison, Super),
    (Psychic, Psychic, Resisted),
    (Psychic, Dark, Immune),
    (Psychic, Steel, Resisted),
    (Bug, Fire, Resisted),
    (Bug, Grass, Super),
    (Bug, Fighting, Resisted),
    (Bug, Poison, Resisted),
    (Bug, Flying, Resisted),
    (Bug, Psychic, Super),
    (Bug, Ghost, Resisted),
    (Bug, Dark, Super),
    (Bug, Steel, Resisted),
    (Bug, Fairy, Resisted),
    (Rock, Fire, Super),
    (Rock, Ice, Super),
    (Rock, Fighting, Resisted),
    (Rock, Ground, Resisted),
    (Rock, Flying, Super),
    (Rock, Bug, Super),
    (Rock, Steel, Resisted),
    (Ghost, Normal, Immune),
    (Ghost, Psychic, Super),
    (Ghost, Ghost, Super),
    (Ghost, Dark, Resisted),
    (Dragon, Dragon, Super),
    (Dragon, Steel, Resisted),
    (Dragon, Fairy, Immune),
    (Dark, Fighting, Resisted),
    (Dark, Psychic, Super),
    (Dark, Ghost, Super),
    (Dark, Dark, Resisted),
    (Dark, Fairy, Resisted),
    (Steel, Fire, Resisted),
    (Steel, Water, Resisted),
    (Steel, Electric, Resisted),
    (Steel, Ice, Super),
    (Steel, Rock, Super),
    (Steel, Steel, Resisted),
    (Steel, Fairy, Super),
    (Fairy, Fire, Resisted),
    (Fairy, Fighting, Super),
    (Fairy, Poison, Resisted),
    (Fairy, Dragon, Super),
    (Fairy, Dark, Super),
    (Fairy, Steel, Resisted),
];

/// Multiplier of `attack` against a single defending type.
pub fn effectiveness(attack: PokeType, defend: PokeType) -> f64 {
    CHART
        .iter()
        .find(|(a, d, _)| *a == attack && *d == defend)
        .map_or(1.0, |(_, _, m)| match m {
            Immune => 0.0,
            Resisted => 0.5,
            Super => 2.0,
        })
}

/// Multiplier of `attack` against every defending type combined.
pub fn total_effectiveness(attack: PokeType, defenders: &[PokeType]) -> f64 {
    defenders
        .iter()
        .map(|&d| effectiveness(attack, d))
        .product()
}

/// How a skill deals damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Uses 攻击 against 防御.
    Physical,
    /// Uses 特攻 against 特防.
    Special,
    /// Deals no damage.
    Status,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Physical => "物理",
            Self::Special => "特殊",
            Self::Status => "变化",
        })
    }
}

/// One entry of the skill table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    /// Chinese name.
    pub name: &'static str,
    /// English name.
    pub english: &'static str,
    /// Elemental type.
    pub kind: PokeType,
    /// Damage category.
    pub category: Category,
    /// Base power; 0 for status skills.
    pub power: u32,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}（{}/{}", self.name, self.kind, self.category)?;
        if self.power > 0 {
            write!(f, "/威力{}", self.power)?;
        }
        f.write_str("）")
    }
}

const fn skill(
    name: &'static str,
    english: &'static str,
    kind: PokeType,
    category: Category,
    power: u32,
) -> Skill {
    Skill {
        name,
        english,
        kind,
        category,
        power,
    }
}

use Category::{Physical, Special, Status};

/// Skills known to the `atk` command.
pub const SKILLS: &[Skill] = &[
    skill("撞击", "Tackle", Normal, Physical, 40),
    skill("电光一闪", "Quick Attack", Normal, Physical, 40),
    skill("破坏光线", "Hyper Beam", Normal, Special, 150),
    skill("电击", "Thunder Shock", Electric, Special, 40),
    skill("十万伏特", "Thunderbolt", Electric, Special, 90),
    skill("打雷", "Thunder", Electric, Special, 110),
    skill("火花", "Ember", Fire, Special, 40),
    skill("喷射火焰", "Flamethrower", Fire, Special, 90),
    skill("大字爆炎", "Fire Blast", Fire, Special, 110),
    skill("水枪", "Water Gun", Water, Special, 40),
    skill("冲浪", "Surf", Water, Special, 90),
    skill("水炮", "Hydro Pump", Water, Special, 110),
    skill("藤鞭", "Vine Whip", Grass, Physical, 45),
    skill("飞叶快刀", "Razor Leaf", Grass, Physical, 55),
    skill("日光束", "Solar Beam", Grass, Special, 120),
    skill("冰冻光束", "Ice Beam", Ice, Special, 90),
    skill("暴风雪", "Blizzard", Ice, Special, 110),
    skill("劈瓦", "Brick Break", Fighting, Physical, 75),
    skill("毒针", "Poison Sting", Poison, Physical, 15),
    skill("污泥炸弹", "Sludge Bomb", Poison, Special, 90),
    skill("地震", "Earthquake", Ground, Physical, 100),
    skill("翅膀攻击", "Wing Attack", Flying, Physical, 60),
    skill("精神强念", "Psychic", Psychic, Special, 90),
    skill("虫咬", "Bug Bite", Bug, Physical, 60),
    skill("岩崩", "Rock Slide", Rock, Physical, 75),
    skill("影子球", "Shadow Ball", Ghost, Special, 80),
    skill("龙爪", "Dragon Claw", Dragon, Physical, 80),
    skill("咬碎", "Crunch", Dark, Physical, 80),
    skill("铁尾", "Iron Tail", Steel, Physical, 100),
    skill("月亮之力", "Moonblast", Fairy, Special, 95),
    skill("叫声", "Growl", Normal, Status, 0),
    skill("剑舞", "Swords Dance", Normal, Status, 0),
    skill("电磁波", "Thunder Wave", Electric, Status, 0),
    skill("催眠粉", "Sleep Powder", Grass, Status, 0),
];

/// Find a skill: exact name first, then the first case-insensitive
/// substring match on either name.
pub fn find_skill(query: &str) -> Option<&'static Skill> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let lowered = query.to_lowercase();
    SKILLS
        .iter()
        .find(|s| s.name == query || s.english.to_lowercase() == lowered)
        .or_else(|| {
            SKILLS.iter().find(|s| {
                s.name.contains(query) || s.english.to_lowercase().contains(&lowered)
            })
        })
}
