use anyhow::{bail, Context as _, Result};

use super::{op::Op, Case};
use crate::ctx::{Condition, Context, Rounding};

/// Parses test cases.
pub fn parse(s: &str) -> Result<Vec<Case<'_>>> {
    let mut precision: u32 = 9;
    let mut rounding = Rounding::HalfUp;
    let mut max_exp: i32 = 999;
    let mut min_exp: i32 = -999;
    let mut clamp = 0;
    let mut cases = Vec::new();
    for (i, line) in s.lines().enumerate() {
        let line = match line.split_once("--") {
            // A comment.
            Some((line, _)) => line.trim(),
            None => line.trim(),
        };
        if line.is_empty() {
            continue;
        }

        if let Some((key, v)) = line.split_once(':') {
            let v = v.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "version" | "extended" => {}
                "precision" => {
                    precision = v
                        .parse()
                        .with_context(|| format!("#{i}: unable to parse precision: `{v}`"))?;
                }
                "rounding" => {
                    rounding = Rounding::try_from_str(v)
                        .with_context(|| format!("#{i}: invalid rounding mode: `{v}`"))?;
                }
                "maxexponent" => {
                    max_exp = v
                        .parse()
                        .with_context(|| format!("#{i}: unable to parse `maxExponent`: `{v}`"))?;
                }
                "minexponent" => {
                    min_exp = v
                        .parse()
                        .with_context(|| format!("#{i}: unable to parse `minExponent`: `{v}`"))?;
                }
                "clamp" => {
                    clamp = v
                        .parse()
                        .with_context(|| format!("#{i}: unable to parse `clamp`: `{v}`"))?;
                }
                key => bail!("#{i}: unknown directive: `{key}`"),
            }
            continue;
        }

        let (lhs, rhs) = line
            .split_once("->")
            .with_context(|| format!("#{i}: test case missing result: `{line}`"))?;
        let mut words = lhs.split_whitespace().map(unquote);
        let name = words
            .next()
            .with_context(|| format!("#{i}: test case missing name: `{line}`"))?;
        let op = words
            .next()
            .with_context(|| format!("#{i}: test case missing op: `{line}`"))?;
        let args: Vec<_> = words.collect();

        let mut words = rhs.split_whitespace().map(unquote);
        let result = words
            .next()
            .with_context(|| format!("#{i}: test case missing result: `{line}`"))?;
        let mut conditions = Condition::empty();
        for word in words {
            conditions |= Condition::try_from_name(word)
                .with_context(|| format!("#{i}: unknown condition: `{word}`"))?;
        }

        let ctx = Context::new(precision, rounding, min_exp, max_exp, clamp == 1)
            .with_context(|| format!("#{i}: invalid context"))?;
        cases.push(Case {
            ctx,
            name,
            op: Op::parse(op, &args).with_context(|| format!("#{i}: unable to parse op"))?,
            result,
            conditions,
        });
    }
    if cases.is_empty() {
        bail!("no test cases");
    }
    Ok(cases)
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let s = "
-- A comment.
version: 2.59
precision: 5
rounding: half_even
maxExponent: 99
minexponent: -99
clamp: 1

addx001 add 1 '2.0' -> 3.0
divx002 divide 1 0 -> Infinity Division_by_zero -- trailing comment
rounding: floor
minx003 minus 1.23456 -> -1.2346 Inexact Rounded
";
        let cases = parse(s).unwrap();
        assert_eq!(cases.len(), 3);

        let c = &cases[0];
        assert_eq!(c.name, "addx001");
        assert_eq!(c.op, Op::Add("1", "2.0"));
        assert_eq!(c.result, "3.0");
        assert_eq!(c.conditions, Condition::empty());
        assert_eq!(c.ctx.precision(), &crate::fastint::FastInt::from(5u32));
        assert_eq!(c.ctx.rounding(), Rounding::HalfEven);
        assert_eq!(c.ctx.emax(), &crate::fastint::FastInt::from(99));
        assert!(c.ctx.clamp_normal_exponents());

        assert_eq!(cases[1].op, Op::Divide("1", "0"));
        assert_eq!(cases[1].conditions, Condition::DIVIDE_BY_ZERO);

        assert_eq!(cases[2].ctx.rounding(), Rounding::Floor);
        assert_eq!(
            cases[2].conditions,
            Condition::INEXACT | Condition::ROUNDED
        );
    }

    #[test]
    fn test_parse_errors() {
        for s in [
            "",
            "precision: x",
            "rounding: sideways",
            "bogus: 1",
            "addx001 add 1 2",
            "addx001 frobnicate 1 2 -> 3",
            "addx001 add 1 -> 3",
            "addx001 add 1 2 -> 3 Sideways",
        ] {
            assert!(parse(s).is_err(), "`{s}`");
        }
    }
}
