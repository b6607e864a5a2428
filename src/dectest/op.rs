use std::fmt;

use anyhow::{bail, Result};

/// An operation and its operands.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op<'a> {
    Abs(&'a str),
    Add(&'a str, &'a str),
    Apply(&'a str),
    Compare(&'a str, &'a str),
    Divide(&'a str, &'a str),
    Minus(&'a str),
    Multiply(&'a str, &'a str),
    Subtract(&'a str, &'a str),
}

impl<'a> Op<'a> {
    /// Parses an operation from its name and operands.
    pub fn parse(name: &str, args: &[&'a str]) -> Result<Self> {
        let op = match (name.to_ascii_lowercase().as_str(), args) {
            ("abs", &[x]) => Self::Abs(x),
            ("add", &[x, y]) => Self::Add(x, y),
            ("apply", &[x]) => Self::Apply(x),
            ("compare", &[x, y]) => Self::Compare(x, y),
            ("divide", &[x, y]) => Self::Divide(x, y),
            ("minus", &[x]) => Self::Minus(x),
            ("multiply", &[x, y]) => Self::Multiply(x, y),
            ("subtract", &[x, y]) => Self::Subtract(x, y),
            (name, args) => bail!("unknown op `{name}` with {} operands", args.len()),
        };
        Ok(op)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Abs(_) => "abs",
            Self::Add(..) => "add",
            Self::Apply(_) => "apply",
            Self::Compare(..) => "compare",
            Self::Divide(..) => "divide",
            Self::Minus(_) => "minus",
            Self::Multiply(..) => "multiply",
            Self::Subtract(..) => "subtract",
        }
    }
}

impl fmt::Display for Op<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::Abs(x) | Self::Apply(x) | Self::Minus(x) => write!(f, "{name} {x}"),
            Self::Add(x, y)
            | Self::Compare(x, y)
            | Self::Divide(x, y)
            | Self::Multiply(x, y)
            | Self::Subtract(x, y) => write!(f, "{name} {x} {y}"),
        }
    }
}
