//! Role identities and their bucketed attribute records.
//!
//! The host owns the record format; handlers only look values up by name and
//! write them back through the capability interface. Every bucket is
//! optional so partially filled character sheets load without error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A role (character) taking part in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    /// Host-assigned role id.
    pub role_id: i64,
    /// Display name.
    pub role_name: String,
}

impl UserRole {
    /// Create a role.
    pub fn new(role_id: i64, role_name: impl Into<String>) -> Self {
        Self {
            role_id,
            role_name: role_name.into(),
        }
    }
}

/// A single attribute value: sheets mix numbers and free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Integer value.
    Int(i64),
    /// Fractional value, truncated when read as an integer.
    Float(f64),
    /// Free text, parsed when read as an integer.
    Text(String),
}

impl AttrValue {
    /// Read the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Named attribute map inside one bucket.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// The buckets of a role's attribute record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityBucket {
    /// Identity fields (name, occupation, type).
    Basic,
    /// Characteristics and derived stats.
    Ability,
    /// Trained skills.
    Skill,
    /// Actions and free-form extras.
    Act,
}

impl AbilityBucket {
    /// Lookup order used by [`get_role_ability_value`].
    pub const SEARCH_ORDER: [Self; 4] = [Self::Skill, Self::Ability, Self::Basic, Self::Act];
}

/// A role's attribute record, split into optional buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleAbility {
    /// Identity fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<AttrMap>,
    /// Characteristics and derived stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<AttrMap>,
    /// Trained skills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<AttrMap>,
    /// Actions and extras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act: Option<AttrMap>,
}

impl RoleAbility {
    /// Borrow a bucket, if present.
    pub fn bucket(&self, bucket: AbilityBucket) -> Option<&AttrMap> {
        match bucket {
            AbilityBucket::Basic => self.basic.as_ref(),
            AbilityBucket::Ability => self.ability.as_ref(),
            AbilityBucket::Skill => self.skill.as_ref(),
            AbilityBucket::Act => self.act.as_ref(),
        }
    }

    /// Borrow a bucket mutably, creating it when absent.
    pub fn bucket_mut(&mut self, bucket: AbilityBucket) -> &mut AttrMap {
        let slot = match bucket {
            AbilityBucket::Basic => &mut self.basic,
            AbilityBucket::Ability => &mut self.ability,
            AbilityBucket::Skill => &mut self.skill,
            AbilityBucket::Act => &mut self.act,
        };
        slot.get_or_insert_with(AttrMap::new)
    }

    /// Find a value and the bucket holding it.
    pub fn find(&self, name: &str) -> Option<(AbilityBucket, &AttrValue)> {
        AbilityBucket::SEARCH_ORDER.iter().find_map(|&bucket| {
            self.bucket(bucket)
                .and_then(|map| map.get(name))
                .map(|value| (bucket, value))
        })
    }

    /// Builder-style insert, used to seed records.
    pub fn with(mut self, bucket: AbilityBucket, name: &str, value: impl Into<AttrValue>) -> Self {
        self.bucket_mut(bucket)
            .insert(name.to_string(), value.into());
        self
    }
}

/// Look a value up across all buckets, rendered as text.
pub fn get_role_ability_value(record: &RoleAbility, name: &str) -> Option<String> {
    record.find(name).map(|(_, value)| value.to_string())
}

/// Look a value up across all buckets and read it as an integer.
pub fn get_role_ability_int(record: &RoleAbility, name: &str) -> Option<i64> {
    record.find(name).and_then(|(_, value)| value.as_i64())
}

/// Write a value into a record.
///
/// The value lands in whichever bucket already holds `name`, else in `bucket`.
pub fn set_role_ability_value(
    record: &mut RoleAbility,
    name: &str,
    value: impl Into<AttrValue>,
    bucket: AbilityBucket,
) {
    let target = record.find(name).map_or(bucket, |(found, _)| found);
    record
        .bucket_mut(target)
        .insert(name.to_string(), value.into());
}
