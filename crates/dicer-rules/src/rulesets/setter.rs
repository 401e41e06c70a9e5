//! The `st` attribute setter shared by several rulesets.
//!
//! Input is a run of `<name><value>` pairs such as `力量70敏捷+5 san-3`.
//! A signed value adjusts the current value, an unsigned one replaces it.
//! All changes are written back in one store call.

use std::fmt;

use async_trait::async_trait;
use logos::Logos;

use crate::registry::{CommandContext, CommandHandler};
use crate::role::{AbilityBucket, RoleAbility, get_role_ability_int, set_role_ability_value};

/// How one ruleset names and files its attributes.
#[derive(Debug)]
pub struct SetterProfile {
    /// Lowercase short name to canonical name.
    pub aliases: &'static [(&'static str, &'static str)],
    /// Canonical names stored in the `ability` bucket.
    pub characteristics: &'static [&'static str],
    /// Bucket for every other new attribute.
    pub default_bucket: AbilityBucket,
}

impl SetterProfile {
    /// Map a typed name to its canonical form.
    pub fn canonical(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        self.aliases
            .iter()
            .find(|(short, _)| *short == lowered)
            .map_or_else(|| name.to_string(), |(_, full)| (*full).to_string())
    }

    /// Bucket a brand-new attribute is filed under.
    pub fn bucket_for(&self, name: &str) -> AbilityBucket {
        if self.characteristics.contains(&name) {
            AbilityBucket::Ability
        } else {
            self.default_bucket
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[\s:：=]+")]
enum StToken<'s> {
    #[regex(r"[+\-]?[0-9]+", |lex| lex.slice())]
    Value(&'s str),

    #[regex(r"[^0-9+\-\s:：=]+", |lex| lex.slice())]
    Name(&'s str),
}

/// One requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StChange {
    /// Replace the value.
    Set(i64),
    /// Add to the current value (negative to subtract).
    Adjust(i64),
}

/// A named change parsed from `st` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StEntry {
    /// Canonical attribute name.
    pub name: String,
    /// What to do with it.
    pub change: StChange,
}

/// Parse `st` arguments into changes, resolving aliases.
pub fn parse_st(text: &str, profile: &SetterProfile) -> Result<Vec<StEntry>, String> {
    let mut entries = Vec::new();
    let mut pending: Option<String> = None;
    let mut lexer = StToken::lexer(text);
    while let Some(token) = lexer.next() {
        match token {
            Ok(StToken::Name(name)) => {
                if let Some(prev) = pending.replace(profile.canonical(name)) {
                    return Err(format!("属性「{prev}」缺少数值"));
                }
            }
            Ok(StToken::Value(raw)) => {
                let Some(name) = pending.take() else {
                    return Err(format!("数值{raw}缺少属性名"));
                };
                let value: i64 = raw.parse().map_err(|_| format!("数值过大：{raw}"))?;
                let change = if raw.starts_with(['+', '-']) {
                    StChange::Adjust(value)
                } else {
                    StChange::Set(value)
                };
                entries.push(StEntry { name, change });
            }
            Err(()) => return Err(format!("无法解析：{}", lexer.slice())),
        }
    }
    if let Some(name) = pending {
        return Err(format!("属性「{name}」缺少数值"));
    }
    if entries.is_empty() {
        return Err("请提供要设置的属性，例如 .st 力量70".to_string());
    }
    Ok(entries)
}

/// The before and after of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrDiff {
    /// Canonical attribute name.
    pub name: String,
    /// Previous integer value, if any.
    pub old: Option<i64>,
    /// Value written.
    pub new: i64,
}

impl fmt::Display for AttrDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.old {
            Some(old) if old != self.new => {
                let delta = i128::from(self.new) - i128::from(old);
                write!(f, "{}：{}→{}（{:+}）", self.name, old, self.new, delta)
            }
            Some(old) => write!(f, "{}：{}→{}", self.name, old, self.new),
            None => write!(f, "{}：无→{}", self.name, self.new),
        }
    }
}

/// Apply changes to a record in order, returning one diff per change.
pub fn apply_changes(
    record: &mut RoleAbility,
    entries: &[StEntry],
    profile: &SetterProfile,
) -> Vec<AttrDiff> {
    entries
        .iter()
        .map(|entry| {
            let old = get_role_ability_int(record, &entry.name);
            let new = match entry.change {
                StChange::Set(v) => v,
                StChange::Adjust(delta) => old.unwrap_or(0).saturating_add(delta),
            };
            set_role_ability_value(
                record,
                &entry.name,
                new,
                profile.bucket_for(&entry.name),
            );
            AttrDiff {
                name: entry.name.clone(),
                old,
                new,
            }
        })
        .collect()
}

/// `st` handler bound to one ruleset's profile.
pub struct AttributeSetter {
    profile: &'static SetterProfile,
}

impl AttributeSetter {
    /// A setter using `profile`.
    pub fn new(profile: &'static SetterProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl CommandHandler for AttributeSetter {
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> bool {
        let text: String = ctx
            .args
            .iter()
            .filter(|a| !a.starts_with('@'))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let entries = match parse_st(&text, self.profile) {
            Ok(entries) => entries,
            Err(msg) => return ctx.reject(&msg),
        };

        let target = ctx.target().clone();
        let Some(mut record) = ctx.load(target.role_id).await else {
            return false;
        };
        let diffs = apply_changes(&mut record, &entries, self.profile);
        if !ctx.store(target.role_id, record).await {
            return false;
        }

        let mut text = format!("{}的属性已更新：", target.role_name);
        for diff in &diffs {
            text.push('\n');
            text.push_str(&diff.to_string());
        }
        ctx.reply(&text);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PROFILE: SetterProfile = SetterProfile {
        aliases: &[("str", "力量"), ("san", "理智")],
        characteristics: &["力量", "理智"],
        default_bucket: AbilityBucket::Skill,
    };

    #[test]
    fn parses_glued_pairs() {
        let entries = parse_st("力量70侦查 45 san-3", &PROFILE).unwrap();
        assert_eq!(
            entries,
            vec![
                StEntry {
                    name: "力量".into(),
                    change: StChange::Set(70)
                },
                StEntry {
                    name: "侦查".into(),
                    change: StChange::Set(45)
                },
                StEntry {
                    name: "理智".into(),
                    change: StChange::Adjust(-3)
                },
            ]
        );
    }

    #[test]
    fn separators_are_skipped() {
        let entries = parse_st("STR：60 图书馆=20", &PROFILE).unwrap();
        assert_eq!(entries[0].name, "力量");
        assert_eq!(entries[1].change, StChange::Set(20));
    }

    #[test]
    fn rejects_dangling_parts() {
        assert!(parse_st("力量", &PROFILE).is_err());
        assert!(parse_st("70", &PROFILE).is_err());
        assert!(parse_st("力量 侦查50", &PROFILE).is_err());
        assert!(parse_st("", &PROFILE).is_err());
    }

    #[test]
    fn apply_files_new_attributes() {
        let mut record = RoleAbility::default().with(AbilityBucket::Skill, "侦查", 40);
        let entries = parse_st("力量50侦查+5幸运-10", &PROFILE).unwrap();
        let diffs = apply_changes(&mut record, &entries, &PROFILE);
        assert_eq!(diffs[0].to_string(), "力量：无→50");
        assert_eq!(diffs[1].to_string(), "侦查：40→45（+5）");
        assert_eq!(diffs[2].new, -10);
        assert_eq!(
            record.find("力量").map(|(b, _)| b),
            Some(AbilityBucket::Ability)
        );
        assert_eq!(record.find("幸运").map(|(b, _)| b), Some(AbilityBucket::Skill));
    }

    #[test]
    fn diff_spans_full_range() {
        let diff = AttrDiff {
            name: "力量".to_string(),
            old: Some(-1),
            new: i64::MAX,
        };
        assert_eq!(
            diff.to_string(),
            "力量：-1→9223372036854775807（+9223372036854775808）"
        );
        let diff = AttrDiff {
            name: "力量".to_string(),
            old: Some(i64::MAX),
            new: i64::MIN,
        };
        assert!(diff.to_string().ends_with("（-18446744073709551615）"));
    }
}
