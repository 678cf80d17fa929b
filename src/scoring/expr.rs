use anyhow::{bail, Result};

/// Linear interpolation weight expression: `scale(a,b)` contributes `a` at
/// the scale minimum, `b` at the maximum, linear in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExpr {
    pub at_min: f64,
    pub at_max: f64,
}

impl ScaleExpr {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(inner) = s.strip_prefix("scale(").and_then(|r| r.strip_suffix(')')) else {
            bail!("Weight must have the form scale(a,b): {}", s);
        };
        let Some((a, b)) = inner.split_once(',') else {
            bail!("Weight needs two comma-separated endpoints: {}", s);
        };
        let at_min: f64 = parse_endpoint(a)?;
        let at_max: f64 = parse_endpoint(b)?;
        Ok(ScaleExpr { at_min, at_max })
    }

    /// Interpolate over the declared answer range. A degenerate range
    /// (min == max) yields a non-finite value the accumulator discards.
    pub fn eval(&self, value: f64, min: f64, max: f64) -> f64 {
        self.at_min + (self.at_max - self.at_min) * (value - min) / (max - min)
    }
}

fn parse_endpoint(s: &str) -> Result<f64> {
    // f64::from_str already accepts a leading '-' but not '+', and config
    // authors write "scale(-1,+1)".
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    Ok(s.parse()?)
}
