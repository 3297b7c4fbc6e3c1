// Coordinate token grammar: `[x,y]` or `[x1,y1][x2,y2]`, non-negative integers.
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{BillDroidError, BillDroidResult};
use crate::perception::types::{Bounds, CapturedToken, Coordinate};

fn token_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^\[(\d+),(\d+)\](?:\[(\d+),(\d+)\])?$").expect("token grammar is a valid regex")
    })
}

/// Parses a token strictly. Anything off-grammar is a layout change on the
/// device and must not be turned into a best-guess tap.
pub fn parse_bounds(token: &str) -> BillDroidResult<Bounds> {
    let malformed = || BillDroidError::MalformedToken(token.to_string());
    let caps = token_grammar().captures(token).ok_or_else(malformed)?;
    let num = |i: usize| -> BillDroidResult<i32> {
        caps.get(i)
            .ok_or_else(malformed)?
            .as_str()
            .parse::<i32>()
            .map_err(|_| malformed())
    };

    let (x1, y1) = (num(1)?, num(2)?);
    if caps.get(3).is_none() {
        return Ok(Bounds::Point { x: x1, y: y1 });
    }
    Ok(Bounds::Box {
        x1,
        y1,
        x2: num(3)?,
        y2: num(4)?,
    })
}

/// Turns a captured token into the point to tap, tied to the dump it came from.
pub fn resolve(token: &CapturedToken) -> BillDroidResult<Coordinate> {
    let bounds = parse_bounds(&token.text)?;
    let (x, y) = bounds.tap_point();
    tracing::debug!(pattern = %token.pattern, token = %token.text, x, y, "coordinate resolved");
    Ok(Coordinate {
        x,
        y,
        bounds,
        generation: token.generation,
    })
}
