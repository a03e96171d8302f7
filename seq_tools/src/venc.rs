/*
    Velocity encoding moments.

    A bipolar gradient with lobe area A accrues a first moment of 2A for moving spins, so
    the lobe area needed for a given venc is half of m1 = pi/(gamma_bar*venc). Amplitude is
    fixed by the lobe duration. When that amplitude would exceed the hardware ceiling the
    duration is stretched; the area is never touched.
 */

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{GradientError, GradientResult};
use crate::grad_cal::GAMMA_BAR;
use crate::system_limits::SystemLimits;

// duration of the whole bipolar pulse
pub const DEFAULT_BIPOLAR_DURATION:f64 = 1E-3;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct GradientMomentSpec {
    pub area:f64,
    pub duration:f64,
    pub amplitude:f64,
}

impl GradientMomentSpec {
    /// opposite lobe. Area and amplitude flip sign, duration is shared.
    pub fn negated(&self) -> Self {
        Self {
            area:-self.area,
            duration:self.duration,
            amplitude:-self.amplitude,
        }
    }
    pub fn lobe_duration(&self) -> f64 {
        self.duration/2.0
    }
}

/// Leading and trailing lobe of a bipolar gradient. A negative polarity pair plays the
/// negative lobe first, which flips the sign of the encoded first moment.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct BipolarPair {
    pub leading:GradientMomentSpec,
    pub trailing:GradientMomentSpec,
}

impl BipolarPair {
    pub fn new(positive:GradientMomentSpec) -> Self {
        Self {
            leading:positive,
            trailing:positive.negated(),
        }
    }
    // relative to this pair: Negative swaps the lobes
    pub fn with_polarity(&self,polarity:Polarity) -> Self {
        match polarity {
            Polarity::Positive => *self,
            Polarity::Negative => Self {leading:self.trailing,trailing:self.leading}
        }
    }
    pub fn polarity(&self) -> Polarity {
        if self.leading.area < 0.0 {Polarity::Negative} else {Polarity::Positive}
    }
    pub fn duration(&self) -> f64 {
        self.leading.duration
    }
}

pub fn first_moment(venc:f64) -> GradientResult<f64> {
    if !(venc.is_finite() && venc > 0.0) {
        return Err(GradientError::Limit(format!("venc must be positive and finite, got {}",venc)));
    }
    Ok(PI/(GAMMA_BAR*venc))
}

pub fn solve(venc:f64,limits:&SystemLimits,nominal_duration:f64) -> GradientResult<GradientMomentSpec> {
    if !(nominal_duration.is_finite() && nominal_duration > 0.0) {
        return Err(GradientError::Limit(format!("bipolar duration must be positive, got {}",nominal_duration)));
    }
    if !(limits.max_grad.is_finite() && limits.max_grad > 0.0) {
        return Err(GradientError::Limit(format!("max_grad must be positive, got {}",limits.max_grad)));
    }
    let m1 = first_moment(venc)?;
    let area = m1/2.0;
    let amplitude = area/(nominal_duration/2.0);
    if amplitude > limits.max_grad {
        let duration = 2.0*area/limits.max_grad;
        debug!(venc,nominal_duration,duration,"bipolar stretched to respect max_grad");
        return Ok(GradientMomentSpec{area,duration,amplitude:limits.max_grad})
    }
    Ok(GradientMomentSpec{area,duration:nominal_duration,amplitude})
}

pub fn bipolar_pair(venc:f64,limits:&SystemLimits,nominal_duration:f64) -> GradientResult<BipolarPair> {
    Ok(BipolarPair::new(solve(venc,limits,nominal_duration)?))
}
