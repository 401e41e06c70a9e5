//! Built-in rulesets.
//!
//! Each submodule exposes a `namespace()` constructor; [`builtin`] collects
//! them for [`CommandRegistry::standard`](crate::CommandRegistry::standard).

pub mod coc7;
pub mod cofd;
pub mod common;
pub mod pokemon;
pub mod setter;

use crate::error::RuleResult;
use crate::registry::RuleNameSpace;

/// Id of the shared `通用` namespace.
pub const COMMON_ID: u32 = 0;
/// Id of the Call of Cthulhu 7th edition namespace.
pub const COC7_ID: u32 = 1;
/// Id of the Chronicles of Darkness namespace.
pub const COFD_ID: u32 = 2;
/// Id of the Pokémon TRPG namespace.
pub const POKEMON_ID: u32 = 3;

/// Every shipped namespace.
pub fn builtin() -> RuleResult<Vec<RuleNameSpace>> {
    Ok(vec![
        common::namespace()?,
        coc7::namespace()?,
        cofd::namespace()?,
        pokemon::namespace()?,
    ])
}

/// Remove every standalone `h` argument, returning whether one was present.
pub(crate) fn take_hidden(args: &mut Vec<String>) -> bool {
    let before = args.len();
    args.retain(|a| !a.eq_ignore_ascii_case("h"));
    args.len() != before
}

/// Parse a signed integer argument such as `+10` or `-5`.
pub(crate) fn parse_signed(token: &str) -> Option<i64> {
    let token = token.trim();
    let sign = token.chars().next()?;
    if !matches!(sign, '+' | '-') {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_unique() {
        let namespaces = builtin().unwrap();
        let ids: Vec<u32> = namespaces.iter().map(|ns| ns.rule_id).collect();
        assert_eq!(ids, vec![COMMON_ID, COC7_ID, COFD_ID, POKEMON_ID]);
    }

    #[test]
    fn hidden_flag_removed() {
        let mut args = vec!["h".to_string(), "侦查".to_string(), "H".to_string()];
        assert!(take_hidden(&mut args));
        assert_eq!(args, vec!["侦查"]);
        assert!(!take_hidden(&mut args));
    }

    #[test]
    fn signed_numbers() {
        assert_eq!(parse_signed("+10"), Some(10));
        assert_eq!(parse_signed("-5"), Some(-5));
        assert_eq!(parse_signed("5"), None);
        assert_eq!(parse_signed("+"), None);
    }
}
