/*
    A ScanPlan is the full acquisition plan handed to whatever assembles the timed blocks:
    the sampling mask, the ReCAR acquisition order and the flow encoding schemes. Every entry
    of the order is acquired once per scheme, schemes varying fastest.
 */

use std::collections::BTreeMap;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use cs_table::cs_table::CSTable;
use cs_table::mask::Mask;
use cs_table::recar::{OrderedAcquisition, Recar};
use seq_tools::grad_cal;
use seq_tools::gradient_event::{Channel, GradEvent, GradientDesigner};
use seq_tools::system_limits::SystemLimits;
use crate::error::PlanResult;
use crate::flow_encoding::{EncodingScheme, FlowEncodingBuilder};
use crate::protocol::{FlowProtocol, ScanConfig};

// pencil beam navigator readout: 64 samples across a 30 mm column
pub const NAVIGATOR_SAMPLES:usize = 64;
pub const NAVIGATOR_FOV:f64 = 30E-3;
pub const NAVIGATOR_DURATION:f64 = 3E-3;

#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct NavigatorRequest {
    pub channel:Channel,
    // T*s/m
    pub area:f64,
    pub duration:f64,
    pub n_samples:usize,
}

impl NavigatorRequest {
    pub fn new() -> Self {
        Self {
            channel:Channel::Slice,
            area:grad_cal::k_area_to_moment(NAVIGATOR_SAMPLES as f64/NAVIGATOR_FOV),
            duration:NAVIGATOR_DURATION,
            n_samples:NAVIGATOR_SAMPLES,
        }
    }
}

/// phase and slice encoding k-space areas (1/m) for one view
#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct EncodingAreas {
    pub phase:f64,
    pub slice:f64,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct DesignedScheme {
    pub name:String,
    pub events:Vec<GradEvent>,
    // realized duration of all flow encoding lobes, played back to back
    pub duration:f64,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PlanSummary {
    pub name:String,
    pub n_phase:usize,
    pub n_slice:usize,
    pub target_samples:usize,
    pub samples:usize,
    pub acceleration:f64,
    pub n_cardiac_phases:usize,
    pub n_views:usize,
    pub n_schemes:usize,
    pub n_acquisitions:usize,
    pub scan_time:f64,
    pub reorder_policy:String,
}

#[derive(Clone,Debug)]
pub struct ScanPlan {
    protocol:FlowProtocol,
    limits:SystemLimits,
    recar:Recar,
    mask:Mask,
    order:Vec<OrderedAcquisition>,
    schemes:Vec<EncodingScheme>,
}

impl ScanPlan {
    pub fn build<R:Rng + ?Sized>(config:&ScanConfig,rng:&mut R) -> PlanResult<Self> {
        Self::build_with_recar(config,Recar::default(),rng)
    }

    pub fn build_with_recar<R:Rng + ?Sized>(config:&ScanConfig,recar:Recar,rng:&mut R) -> PlanResult<Self> {
        config.validate()?;
        let protocol = &config.protocol;
        let builder = FlowEncodingBuilder::new(protocol.venc,&config.system,protocol.flow_directions)
            .with_bipolar_duration(protocol.bipolar_duration);
        let schemes = match protocol.venc_low {
            Some(venc_low) => builder.build_dual_venc(venc_low)?,
            None => builder.build(protocol.encoding_mode)?,
        };
        let mask = protocol.sampling_pattern.generate(&protocol.mask_params(),rng)?;
        let order = recar.sampling_order(&mask,protocol.n_cardiac_phases)?;
        let plan = Self {
            protocol:protocol.clone(),
            limits:config.system.clone(),
            recar,
            mask,
            order,
            schemes,
        };
        info!(
            name = %plan.protocol.name,
            views = plan.n_views(),
            acquisitions = plan.n_acquisitions(),
            scan_time = plan.scan_time(),
            "scan plan built"
        );
        Ok(plan)
    }

    pub fn protocol(&self) -> &FlowProtocol {
        &self.protocol
    }
    pub fn limits(&self) -> &SystemLimits {
        &self.limits
    }
    pub fn mask(&self) -> &Mask {
        &self.mask
    }
    pub fn order(&self) -> &[OrderedAcquisition] {
        &self.order
    }
    pub fn schemes(&self) -> &[EncodingScheme] {
        &self.schemes
    }
    pub fn recar(&self) -> &Recar {
        &self.recar
    }

    /// k-space views per cardiac phase
    pub fn n_views(&self) -> usize {
        self.mask.true_count()
    }

    pub fn n_acquisitions(&self) -> usize {
        self.order.len()*self.schemes.len()
    }

    pub fn scan_time(&self) -> f64 {
        self.n_acquisitions() as f64*self.protocol.rep_time
    }

    /// (view,scheme) pairs in acquisition order
    pub fn acquisitions(&self) -> impl Iterator<Item = (&OrderedAcquisition,&EncodingScheme)> + '_ {
        self.order.iter().flat_map(move |acq| self.schemes.iter().map(move |scheme| (acq,scheme)))
    }

    pub fn encoding_areas(&self,acq:&OrderedAcquisition) -> EncodingAreas {
        let n_phase = self.protocol.n_phase() as f64;
        let n_slice = self.protocol.n_slice() as f64;
        EncodingAreas {
            phase:(acq.phase_index as f64 - n_phase/2.0)/self.protocol.fov[1],
            slice:(acq.slice_index as f64 - n_slice/2.0)/self.protocol.fov[2],
        }
    }

    pub fn cs_table(&self) -> PlanResult<CSTable> {
        Ok(CSTable::from_order(&self.order,[self.protocol.n_phase(),self.protocol.n_slice()])?)
    }

    pub fn navigator(&self) -> Option<NavigatorRequest> {
        match self.protocol.navigator_enabled {
            true => Some(NavigatorRequest::new()),
            false => None
        }
    }

    pub fn design_navigator(&self,designer:&dyn GradientDesigner) -> PlanResult<Option<GradEvent>> {
        match self.navigator() {
            Some(nav) => Ok(Some(designer.design(nav.channel,nav.area,nav.duration)?)),
            None => Ok(None)
        }
    }

    /// realize the bipolar lobes of every scheme through the gradient designer
    pub fn design_encodings(&self,designer:&dyn GradientDesigner) -> PlanResult<Vec<DesignedScheme>> {
        let mut designed = Vec::<DesignedScheme>::with_capacity(self.schemes.len());
        for scheme in &self.schemes {
            let mut events = Vec::<GradEvent>::new();
            for (channel,pair) in &scheme.gradients {
                for lobe in [pair.leading,pair.trailing] {
                    events.push(designer.design(*channel,lobe.area,lobe.lobe_duration())?);
                }
            }
            let duration = events.iter().map(|e| designer.event_duration(e)).sum();
            designed.push(DesignedScheme{name:scheme.name.clone(),events,duration});
        }
        Ok(designed)
    }

    pub fn definitions(&self) -> BTreeMap<String,Value> {
        let p = &self.protocol;
        let mut defs = BTreeMap::<String,Value>::new();
        defs.insert(String::from("Name"),json!(p.name));
        defs.insert(String::from("FOV"),json!(p.fov));
        defs.insert(String::from("VoxelSize"),json!(p.resolution()));
        defs.insert(String::from("VENC"),json!(p.venc));
        if let Some(venc_low) = p.venc_low {
            defs.insert(String::from("VENC_LOW"),json!(venc_low));
        }
        defs.insert(String::from("TR"),json!(p.rep_time));
        defs.insert(String::from("TE"),json!(p.echo_time));
        defs.insert(String::from("FlipAngle"),json!(p.flip_angle));
        defs.insert(String::from("AccelerationFactor"),json!(p.acceleration_factor));
        defs.insert(String::from("GradientRasterTime"),json!(self.limits.grad_raster_time));
        defs.insert(String::from("RadiofrequencyRasterTime"),json!(self.limits.rf_raster_time));
        defs.insert(String::from("AdcRasterTime"),json!(self.limits.adc_raster_time));
        defs.insert(String::from("BlockDurationRaster"),json!(self.limits.block_duration_raster));
        defs
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            name:self.protocol.name.clone(),
            n_phase:self.protocol.n_phase(),
            n_slice:self.protocol.n_slice(),
            target_samples:self.protocol.mask_params().n_total(),
            samples:self.n_views(),
            acceleration:self.mask.acceleration(),
            n_cardiac_phases:self.protocol.n_cardiac_phases,
            n_views:self.n_views(),
            n_schemes:self.schemes.len(),
            n_acquisitions:self.n_acquisitions(),
            scan_time:self.scan_time(),
            reorder_policy:self.recar.policy_name(),
        }
    }
}
