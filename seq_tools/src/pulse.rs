/*
 A pulse (in this module) is defined as a waveform that starts with a magnitude of 0
 and ends with a magnitude of 0. The waveform can have a positive, negative, or both polarities
 between its start and end points.

 All pulses are normalized to have a maximum unit magnitude. Scaling the net power by a
 gradient amplitude gives the area (moment) of the event.
 */

use serde::{Deserialize, Serialize};

pub trait Pulse {
    fn duration(&self) -> f64;
    fn power_net(&self,magnitude:f64) -> f64;
    fn magnitude_net(&self,power_net:f64) -> f64;
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct Trapezoid {
    pub ramp_time:f64,
    pub plateau_time:f64,
}

impl Trapezoid {
    pub fn new(ramp_time:f64,plateau_time:f64) -> Trapezoid {
        assert!(ramp_time > 0.0,"ramp time must be positive");
        assert!(plateau_time >= 0.0,"plateau time must be positive or 0");
        Trapezoid{ramp_time,plateau_time}
    }
}

impl Pulse for Trapezoid {
    fn duration(&self) -> f64 {
        2.0*self.ramp_time + self.plateau_time
    }
    fn power_net(&self,magnitude:f64) -> f64 {
        magnitude*(self.ramp_time + self.plateau_time)
    }
    fn magnitude_net(&self,power:f64) -> f64 {
        power/(self.ramp_time + self.plateau_time)
    }
}
