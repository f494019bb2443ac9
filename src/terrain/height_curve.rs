use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One control point of a height remap curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub input: f32,
    pub output: f32,
}

/// Piecewise-linear monotonic remap applied to raw height samples before the
/// height multiplier. Plays the role the original editor curve asset had:
/// flattening water, steepening mountains, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightCurve {
    points: Vec<CurvePoint>,
}

impl HeightCurve {
    /// Identity curve.
    pub fn linear() -> HeightCurve {
        HeightCurve::from_points(&[(0.0, 0.0), (1.0, 1.0)])
    }

    pub fn from_points(points: &[(f32, f32)]) -> HeightCurve {
        HeightCurve {
            points: points
                .iter()
                .map(|&(input, output)| CurvePoint { input, output })
                .collect(),
        }
    }

    /// Evaluate the curve at `t`. Inputs outside the control-point range are
    /// clamped to the end points.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = match self.points.first() {
            Some(p) => p,
            None => return t,
        };
        let last = self.points[self.points.len() - 1];
        if t <= first.input {
            return first.output;
        }
        if t >= last.input {
            return last.output;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.input {
                let span = b.input - a.input;
                if span <= f32::EPSILON {
                    return b.output;
                }
                let frac = (t - a.input) / span;
                return a.output + (b.output - a.output) * frac;
            }
        }
        last.output
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points.len() < 2 {
            return Err(ConfigError::NonMonotonicCurve);
        }
        for pair in self.points.windows(2) {
            if pair[1].input <= pair[0].input || pair[1].output < pair[0].output {
                return Err(ConfigError::NonMonotonicCurve);
            }
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if first.input > 0.0 || last.input < 1.0 {
            return Err(ConfigError::CurveDomain);
        }
        Ok(())
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        HeightCurve::linear()
    }
}
