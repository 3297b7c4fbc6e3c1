/// Registry of the UI elements the navigation flow knows how to find.
///
/// Each element is described by anchor text (regex fragments matched against
/// the raw dump) followed lazily by a coordinate token of a known shape. All
/// descriptors are compiled when the registry is built, so a broken pattern
/// fails at startup instead of halfway through a payment.
use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;

use crate::errors::{BillDroidError, BillDroidResult};

pub const PAY_SHORTCUT: &str = "pay-shortcut";
pub const SHORTCUT_ROW: &str = "shortcut-row";
pub const PAY_INVOICE: &str = "pay-invoice";
pub const INSERT_CODE: &str = "insert-code";
pub const CONTINUE: &str = "continue-button";
pub const DATE_BUTTON: &str = "date-button";
pub const DATE_CONTINUE: &str = "date-continue";
pub const DAY: &str = "day";
pub const DAY_IN_MONTH: &str = "day-in-month";

/// What the capture group of a pattern must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// `[x1,y1][x2,y2]`
    BoundingBox,
    /// `[x,y]`, the first corner of a bounds attribute.
    Corner,
}

impl TokenShape {
    fn capture(self) -> &'static str {
        match self {
            TokenShape::BoundingBox => r"(\[\d+,\d+\]\[\d+,\d+\])",
            TokenShape::Corner => r"(\[\d+,\d+\])",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Fixed(&'static str),
    /// Anchor text with runtime arguments spliced (regex-escaped) between
    /// consecutive parts, so `n` parts take `n - 1` arguments.
    Param(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub name: &'static str,
    pub anchor: Anchor,
    pub shape: TokenShape,
}

pub const BUILTIN_PATTERNS: &[PatternSpec] = &[
    PatternSpec {
        name: PAY_SHORTCUT,
        anchor: Anchor::Fixed(r#"text="Pagar""#),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: SHORTCUT_ROW,
        anchor: Anchor::Fixed(r#"text="(?:Pix|Transferir|Depositar)""#),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: PAY_INVOICE,
        anchor: Anchor::Fixed(r#""Contas de luz"#),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: INSERT_CODE,
        anchor: Anchor::Fixed(r#"text="INSERIR CÓDIGO"#),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: CONTINUE,
        anchor: Anchor::Fixed(r#"text="CONTINUAR"#),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: DATE_BUTTON,
        anchor: Anchor::Fixed(r"\d{2}/\d{2}/20\d{2}"),
        shape: TokenShape::BoundingBox,
    },
    PatternSpec {
        name: DATE_CONTINUE,
        anchor: Anchor::Fixed("CONTINUAR"),
        shape: TokenShape::Corner,
    },
    PatternSpec {
        name: DAY,
        anchor: Anchor::Param(&[r#"agendar.*?text=""#, r#"""#]),
        shape: TokenShape::BoundingBox,
    },
    // After a month swipe the previous month's tail can still be on screen,
    // so the day is searched only after the target month's label.
    PatternSpec {
        name: DAY_IN_MONTH,
        anchor: Anchor::Param(&[
            r#"agendar.*?text="[^"]*?(?i:"#,
            r#")[^"]*".*?text=""#,
            r#"""#,
        ]),
        shape: TokenShape::BoundingBox,
    },
];

enum Compiled {
    Fixed(Regex),
    Param {
        parts: &'static [&'static str],
        shape: TokenShape,
    },
}

pub struct PatternRegistry {
    patterns: HashMap<&'static str, Compiled>,
}

impl PatternRegistry {
    pub fn builtin() -> BillDroidResult<Self> {
        Self::new(BUILTIN_PATTERNS)
    }

    pub fn new(specs: &[PatternSpec]) -> BillDroidResult<Self> {
        let mut patterns = HashMap::with_capacity(specs.len());
        for spec in specs {
            let compiled = match spec.anchor {
                Anchor::Fixed(anchor) => Compiled::Fixed(compile(spec.name, anchor, spec.shape)?),
                Anchor::Param(parts) => {
                    if parts.len() < 2 {
                        return Err(invalid(spec.name, "parameterized anchor needs at least two parts"));
                    }
                    // Probe with sample arguments so grammar errors surface now.
                    let probe = vec!["0"; parts.len() - 1];
                    compile(spec.name, &splice(parts, &probe), spec.shape)?;
                    Compiled::Param {
                        parts,
                        shape: spec.shape,
                    }
                }
            };
            if patterns.insert(spec.name, compiled).is_some() {
                return Err(invalid(spec.name, "registered twice"));
            }
        }
        tracing::debug!(count = patterns.len(), "pattern registry validated");
        Ok(Self { patterns })
    }

    /// Regex for `name`, splicing `args` into parameterized anchors.
    pub fn regex(&self, name: &str, args: &[&str]) -> BillDroidResult<Cow<'_, Regex>> {
        match self.patterns.get(name) {
            None => Err(invalid(name, "not registered")),
            Some(Compiled::Fixed(re)) if args.is_empty() => Ok(Cow::Borrowed(re)),
            Some(Compiled::Fixed(_)) => Err(invalid(name, "takes no argument")),
            Some(Compiled::Param { parts, shape }) => {
                if args.len() != parts.len() - 1 {
                    return Err(invalid(
                        name,
                        &format!("expects {} argument(s), got {}", parts.len() - 1, args.len()),
                    ));
                }
                Ok(Cow::Owned(compile(name, &splice(parts, args), *shape)?))
            }
        }
    }
}

fn splice(parts: &[&str], args: &[&str]) -> String {
    let mut anchor = String::new();
    for (i, part) in parts.iter().enumerate() {
        anchor.push_str(part);
        if let Some(arg) = args.get(i) {
            anchor.push_str(&regex::escape(arg));
        }
    }
    anchor
}

fn compile(name: &str, anchor: &str, shape: TokenShape) -> BillDroidResult<Regex> {
    let re = Regex::new(&format!("{anchor}.*?{}", shape.capture()))
        .map_err(|e| invalid(name, &e.to_string()))?;
    // Group 0 plus exactly the coordinate group.
    if re.captures_len() != 2 {
        return Err(invalid(name, "anchor must not contain capture groups"));
    }
    Ok(re)
}

fn invalid(name: &str, reason: &str) -> BillDroidError {
    BillDroidError::InvalidPattern {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
