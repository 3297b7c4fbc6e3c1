use regex::Regex;

use crate::errors::BillDroidResult;
use crate::perception::patterns::PatternRegistry;
use crate::perception::types::{CapturedToken, ScreenDump};

/// First match of `re` in the dump, as its coordinate capture group.
///
/// Later matches are ignored: patterns are anchored tightly enough that a
/// second hit means the pattern needs fixing, not runtime disambiguation.
pub fn find(pattern: &str, re: &Regex, dump: &ScreenDump) -> Option<CapturedToken> {
    let caps = re.captures(dump.xml())?;
    let group = caps.get(1)?;
    Some(CapturedToken {
        pattern: pattern.to_string(),
        text: group.as_str().to_string(),
        generation: dump.generation(),
    })
}

/// Looks `name` up in the registry and applies it. `Ok(None)` means the
/// element is not on this screen; `Err` only for unknown or unusable patterns.
pub fn match_pattern(
    registry: &PatternRegistry,
    name: &str,
    args: &[&str],
    dump: &ScreenDump,
) -> BillDroidResult<Option<CapturedToken>> {
    let re = registry.regex(name, args)?;
    let token = find(name, &re, dump);
    if token.is_none() {
        tracing::debug!(pattern = %name, generation = dump.generation(), "no match on screen");
    }
    Ok(token)
}
