/*
    Hardware limits of the gradient and rf subsystems. The planning code only reads max_grad
    (and max_slew/raster times through the gradient designer). Everything else is passed
    through untouched to whoever assembles the timed blocks.
 */

use serde::{Deserialize, Serialize};
use crate::error::{GradientError, GradientResult};

pub const DEFAULT_MAX_GRAD:f64 = 40E-3; // T/m
pub const DEFAULT_MAX_SLEW:f64 = 130.0; // T/m/s
pub const DEFAULT_GRAD_RASTER_TIME:f64 = 10E-6;
pub const DEFAULT_RF_RASTER_TIME:f64 = 1E-6;
pub const DEFAULT_ADC_RASTER_TIME:f64 = 100E-9;
pub const DEFAULT_BLOCK_DURATION_RASTER:f64 = 10E-6;
pub const DEFAULT_RF_DEAD_TIME:f64 = 100E-6;
pub const DEFAULT_RF_RINGDOWN_TIME:f64 = 30E-6;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SystemLimits {
    pub max_grad:f64,
    pub max_slew:f64,
    pub grad_raster_time:f64,
    pub rf_raster_time:f64,
    pub adc_raster_time:f64,
    pub block_duration_raster:f64,
    pub rf_dead_time:f64,
    pub rf_ringdown_time:f64,
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            max_grad:DEFAULT_MAX_GRAD,
            max_slew:DEFAULT_MAX_SLEW,
            grad_raster_time:DEFAULT_GRAD_RASTER_TIME,
            rf_raster_time:DEFAULT_RF_RASTER_TIME,
            adc_raster_time:DEFAULT_ADC_RASTER_TIME,
            block_duration_raster:DEFAULT_BLOCK_DURATION_RASTER,
            rf_dead_time:DEFAULT_RF_DEAD_TIME,
            rf_ringdown_time:DEFAULT_RF_RINGDOWN_TIME,
        }
    }
}

impl SystemLimits {
    pub fn with_max_grad(mut self,max_grad:f64) -> Self {
        self.max_grad = max_grad;
        self
    }

    pub fn validate(&self) -> GradientResult<()> {
        let positive = [
            ("max_grad",self.max_grad),
            ("max_slew",self.max_slew),
            ("grad_raster_time",self.grad_raster_time),
            ("rf_raster_time",self.rf_raster_time),
            ("adc_raster_time",self.adc_raster_time),
            ("block_duration_raster",self.block_duration_raster),
        ];
        for (name,value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GradientError::Limit(format!("{} must be positive and finite, got {}",name,value)));
            }
        }
        for (name,value) in [("rf_dead_time",self.rf_dead_time),("rf_ringdown_time",self.rf_ringdown_time)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GradientError::Limit(format!("{} must be non-negative, got {}",name,value)));
            }
        }
        Ok(())
    }

    /// shortest ramp that reaches `amplitude` without exceeding the slew limit
    pub fn min_ramp_time(&self,amplitude:f64) -> f64 {
        amplitude.abs()/self.max_slew
    }
}
