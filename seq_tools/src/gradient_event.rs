/*
    The capability contract the planner uses to turn a moment requirement into something a
    scanner can play: "design a gradient of this area over this duration on this channel"
    and "how long does that event actually take". Anything that can shape waveforms can sit
    behind GradientDesigner; TrapezoidDesigner is the raster and slew aware implementation
    built on the pulse shapes in this crate.
 */

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{GradientError, GradientResult};
use crate::pulse::{Pulse, Trapezoid};
use crate::system_limits::SystemLimits;
use crate::utils::{ceil_to_raster, raster_periods};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize)]
pub enum Channel {
    #[serde(rename = "x")]
    Read,
    #[serde(rename = "y")]
    Phase,
    #[serde(rename = "z")]
    Slice,
}

impl Channel {
    pub fn all() -> [Channel;3] {
        [Channel::Read,Channel::Phase,Channel::Slice]
    }
    pub fn label(&self) -> &str {
        match &self {
            Channel::Read => "x",
            Channel::Phase => "y",
            Channel::Slice => "z",
        }
    }
    /// channels switched on by an [x,y,z] flag triple
    pub fn enabled(directions:&[bool;3]) -> Vec<Channel> {
        Channel::all().into_iter().zip(directions.iter()).filter(|(_,on)| **on).map(|(c,_)| c).collect()
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct GradEvent {
    pub channel:Channel,
    // T/m, signed
    pub amplitude:f64,
    pub shape:Trapezoid,
}

impl GradEvent {
    pub fn area(&self) -> f64 {
        self.shape.power_net(self.amplitude)
    }
    pub fn duration(&self) -> f64 {
        self.shape.duration()
    }
}

pub trait GradientDesigner {
    fn design(&self,channel:Channel,area:f64,duration:f64) -> GradientResult<GradEvent>;
    fn event_duration(&self,event:&GradEvent) -> f64;
}

#[derive(Clone,Debug)]
pub struct TrapezoidDesigner {
    limits:SystemLimits,
}

impl TrapezoidDesigner {
    pub fn new(limits:&SystemLimits) -> GradientResult<Self> {
        limits.validate()?;
        Ok(Self{limits:limits.clone()})
    }

    pub fn limits(&self) -> &SystemLimits {
        &self.limits
    }

    // smallest ramp (in raster periods) that is slew compliant for a trapezoid spanning n_total periods
    fn fit_ramp(&self,area:f64,n_total:u64) -> Option<u64> {
        let raster = self.limits.grad_raster_time;
        let mut n_ramp:u64 = 1;
        loop {
            if 2*n_ramp > n_total {
                return None
            }
            let amplitude = area.abs()/((n_total - n_ramp) as f64*raster);
            let needed = raster_periods(self.limits.min_ramp_time(amplitude),raster).max(1);
            if needed <= n_ramp {
                return Some(n_ramp)
            }
            n_ramp = needed;
        }
    }

    // shortest span (in raster periods) that carries the area at max_grad
    fn min_periods(&self,area:f64) -> u64 {
        let raster = self.limits.grad_raster_time;
        let n_ramp = raster_periods(self.limits.min_ramp_time(self.limits.max_grad),raster).max(1);
        let n_flat = raster_periods(area.abs()/self.limits.max_grad,raster) + 1;
        (n_ramp + n_flat).max(2*n_ramp)
    }

    fn shape(&self,area:f64,n_total:u64) -> Option<Trapezoid> {
        let raster = self.limits.grad_raster_time;
        let n_ramp = self.fit_ramp(area,n_total)?;
        let shape = Trapezoid::new(n_ramp as f64*raster,(n_total - 2*n_ramp) as f64*raster);
        let amplitude = shape.magnitude_net(area);
        match amplitude.abs() <= self.limits.max_grad*(1.0 + 1E-12) {
            true => Some(shape),
            false => None
        }
    }
}

impl GradientDesigner for TrapezoidDesigner {
    fn design(&self,channel:Channel,area:f64,duration:f64) -> GradientResult<GradEvent> {
        if !area.is_finite() {
            return Err(GradientError::Limit(format!("gradient area must be finite, got {}",area)));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(GradientError::Limit(format!("gradient duration must be positive, got {}",duration)));
        }
        let requested = raster_periods(duration,self.limits.grad_raster_time).max(2);
        let shape = match self.shape(area,requested) {
            Some(shape) => shape,
            None => {
                let n_total = self.min_periods(area).max(requested);
                debug!(channel = channel.label(),area,duration,"event lengthened to fit gradient limits");
                self.shape(area,n_total).ok_or_else(|| GradientError::Limit(
                    format!("cannot realize area {} on channel {} within limits",area,channel.label())
                ))?
            }
        };
        Ok(GradEvent{channel,amplitude:shape.magnitude_net(area),shape})
    }

    fn event_duration(&self,event:&GradEvent) -> f64 {
        ceil_to_raster(event.duration(),self.limits.block_duration_raster)
    }
}
