//! The JSON role file used by `dicer exec`.
//!
//! ```json
//! {
//!   "1": { "name": "调查员", "skill": { "侦查": 60 }, "ability": { "理智": 55 } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use dicer_rules::{RoleAbility, UserRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub ability: RoleAbility,
}

pub type RoleFile = BTreeMap<i64, RoleEntry>;

/// Read a role file. A missing file is an empty table.
pub fn load(path: &Path) -> Result<RoleFile, String> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| format!("invalid role file {}: {e}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(RoleFile::new()),
        Err(e) => Err(format!("cannot read {}: {e}", path.display())),
    }
}

pub fn save(path: &Path, roles: &RoleFile) -> Result<(), String> {
    let json = serde_json::to_string_pretty(roles).map_err(|e| e.to_string())?;
    fs::write(path, json + "\n").map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Display identity for a role id; unnamed roles are called `角色<id>`.
pub fn user_role(roles: &RoleFile, role_id: i64) -> UserRole {
    let name = roles
        .get(&role_id)
        .and_then(|entry| entry.name.clone())
        .unwrap_or_else(|| format!("角色{role_id}"));
    UserRole::new(role_id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicer_rules::get_role_ability_int;

    #[test]
    fn parses_flattened_buckets() {
        let roles: RoleFile =
            serde_json::from_str(r#"{"7": {"name": "甲", "skill": {"侦查": 60}}}"#).unwrap();
        let entry = &roles[&7];
        assert_eq!(entry.name.as_deref(), Some("甲"));
        assert_eq!(get_role_ability_int(&entry.ability, "侦查"), Some(60));
        assert_eq!(user_role(&roles, 7).role_name, "甲");
        assert_eq!(user_role(&roles, 8).role_name, "角色8");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let roles = load(&dir.path().join("none.json")).unwrap();
        assert!(roles.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        let mut roles = RoleFile::new();
        roles.insert(1, RoleEntry::default());
        save(&path, &roles).unwrap();
        assert_eq!(load(&path).unwrap().len(), 1);
    }
}
