/*
    Acquisition protocol for a cardiac gated, compressed sensing 4D flow scan.

    Protocols live on disk as toml with a [protocol] table and a [system] table holding the
    hardware limits. Missing keys fall back to the defaults below.
 */

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use cs_table::mask::{MaskParams, SamplingPattern};
use seq_tools::system_limits::SystemLimits;
use seq_tools::venc::DEFAULT_BIPOLAR_DURATION;
use crate::error::{PlanError, PlanResult};
use crate::flow_encoding::EncodingMode;

pub trait Initialize: Sized {
    fn load(params_file:&Path) -> PlanResult<Self>;
    fn write_default(params_file:&Path) -> PlanResult<()>;
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct FlowProtocol {
    pub name:String,
    // meters, [read,phase,slice]
    pub fov:[f64;3],
    pub matrix_size:[usize;3],
    pub rep_time:f64,
    pub echo_time:f64,
    // degrees
    pub flip_angle:f64,
    // m/s
    pub venc:f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venc_low:Option<f64>,
    pub flow_directions:[bool;3],
    pub encoding_mode:EncodingMode,
    pub bipolar_duration:f64,
    pub acceleration_factor:f64,
    pub center_fraction:f64,
    pub sampling_pattern:SamplingPattern,
    pub n_cardiac_phases:usize,
    pub navigator_enabled:bool,
    pub seed:u64,
}

impl Default for FlowProtocol {
    fn default() -> Self {
        Self {
            name:String::from("4D_flow_CS_ReCAR"),
            fov:[280E-3,280E-3,140E-3],
            matrix_size:[192,128,32],
            rep_time:5.0E-3,
            echo_time:2.5E-3,
            flip_angle:8.0,
            venc:150E-2,
            venc_low:None,
            flow_directions:[true,true,true],
            encoding_mode:EncodingMode::Simple,
            bipolar_duration:DEFAULT_BIPOLAR_DURATION,
            acceleration_factor:6.0,
            center_fraction:0.04,
            sampling_pattern:SamplingPattern::Phyllotaxis,
            n_cardiac_phases:20,
            navigator_enabled:true,
            seed:0,
        }
    }
}

impl FlowProtocol {
    pub fn n_read(&self) -> usize {
        self.matrix_size[0]
    }
    pub fn n_phase(&self) -> usize {
        self.matrix_size[1]
    }
    pub fn n_slice(&self) -> usize {
        self.matrix_size[2]
    }

    pub fn mask_params(&self) -> MaskParams {
        MaskParams::new(self.n_phase(),self.n_slice(),self.acceleration_factor,self.center_fraction)
    }

    /// voxel size in meters
    pub fn resolution(&self) -> [f64;3] {
        let mut res = [0.0;3];
        for i in 0..3 {
            res[i] = self.fov[i]/self.matrix_size[i] as f64;
        }
        res
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.fov.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(PlanError::Config(format!("field of view must be positive, got {:?}",self.fov)));
        }
        if self.matrix_size.iter().any(|n| *n == 0) {
            return Err(PlanError::Config(format!("matrix size must be non-zero, got {:?}",self.matrix_size)));
        }
        if !(self.rep_time > 0.0 && self.echo_time > 0.0 && self.echo_time < self.rep_time) {
            return Err(PlanError::Config(format!(
                "need 0 < echo time < repetition time, got te={} tr={}",self.echo_time,self.rep_time
            )));
        }
        if !(self.flip_angle > 0.0 && self.flip_angle <= 180.0) {
            return Err(PlanError::Config(format!("flip angle must be in (0,180], got {}",self.flip_angle)));
        }
        if self.n_cardiac_phases == 0 {
            return Err(PlanError::Config(String::from("at least one cardiac phase is required")));
        }
        if self.venc_low.is_some() && self.encoding_mode == EncodingMode::Hadamard {
            return Err(PlanError::EncodingConfiguration(String::from("dual venc is only available with simple encoding")));
        }
        self.mask_params().validate()?;
        Ok(())
    }
}

#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub protocol:FlowProtocol,
    pub system:SystemLimits,
}

impl ScanConfig {
    pub fn validate(&self) -> PlanResult<()> {
        self.protocol.validate()?;
        self.system.validate()?;
        Ok(())
    }

    pub fn to_toml(&self) -> PlanResult<String> {
        toml::to_string_pretty(self).map_err(|e| PlanError::Config(format!("cannot serialize config: {}",e)))
    }

    pub fn from_toml(s:&str) -> PlanResult<Self> {
        let config:Self = toml::from_str(s).map_err(|e| PlanError::Config(format!("cannot deserialize config: {}",e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl Initialize for ScanConfig {
    fn load(params_file:&Path) -> PlanResult<Self> {
        let mut f = File::open(params_file).map_err(|e| PlanError::Config(format!("cannot open {:?}: {}",params_file,e)))?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(|e| PlanError::Config(format!("trouble reading {:?}: {}",params_file,e)))?;
        Self::from_toml(&s)
    }

    fn write_default(params_file:&Path) -> PlanResult<()> {
        let s = Self::default().to_toml()?;
        let mut f = File::create(params_file).map_err(|e| PlanError::Config(format!("cannot create {:?}: {}",params_file,e)))?;
        f.write_all(s.as_bytes()).map_err(|e| PlanError::Config(format!("trouble writing {:?}: {}",params_file,e)))?;
        Ok(())
    }
}
