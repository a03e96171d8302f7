/*
    Undersampling masks over the phase/slice encoding grid.

    Every mask carries a fully sampled calibration box at the grid center. The remaining
    budget of floor(n_phase*n_slice/acceleration) samples is spent either by weighted random
    draws from a radial density (variable density) or by a golden-angle spiral (phyllotaxis).
    Randomness is always supplied by the caller so a seed fixes the mask.
 */

use std::f64::consts::PI;
use std::ops::Range;
use ndarray::Array2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::error::{CsError, CsResult};

// phyllotaxis points are pulled in from the grid edge by this factor
const PHYLLOTAXIS_SCALE:f64 = 0.95;

pub fn golden_angle() -> f64 {
    PI*(3.0 - 5f64.sqrt())
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct MaskParams {
    pub n_phase:usize,
    pub n_slice:usize,
    pub acceleration_factor:f64,
    pub center_fraction:f64,
}

impl MaskParams {
    pub fn new(n_phase:usize,n_slice:usize,acceleration_factor:f64,center_fraction:f64) -> Self {
        Self{n_phase,n_slice,acceleration_factor,center_fraction}
    }

    pub fn validate(&self) -> CsResult<()> {
        if self.n_phase == 0 || self.n_slice == 0 {
            return Err(CsError::Parameter(format!("grid must be non-empty, got {}x{}",self.n_phase,self.n_slice)));
        }
        if !(self.acceleration_factor.is_finite() && self.acceleration_factor >= 1.0) {
            return Err(CsError::Parameter(format!("acceleration factor must be >= 1, got {}",self.acceleration_factor)));
        }
        if !(self.center_fraction >= 0.0 && self.center_fraction < 1.0) {
            return Err(CsError::Parameter(format!("center fraction must be in [0,1), got {}",self.center_fraction)));
        }
        Ok(())
    }

    pub fn n_cells(&self) -> usize {
        self.n_phase*self.n_slice
    }

    /// sample budget implied by the acceleration factor
    pub fn n_total(&self) -> usize {
        (self.n_cells() as f64/self.acceleration_factor).floor() as usize
    }
}

/// The always-sampled low frequency box.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct CalibrationRegion {
    pub phase_start:usize,
    pub phase_len:usize,
    pub slice_start:usize,
    pub slice_len:usize,
}

impl CalibrationRegion {
    pub fn new(params:&MaskParams) -> Self {
        let phase_len = (params.n_phase as f64*params.center_fraction).floor() as usize;
        let slice_len = (params.n_slice as f64*params.center_fraction).floor() as usize;
        Self {
            phase_start:params.n_phase/2 - phase_len/2,
            phase_len,
            slice_start:params.n_slice/2 - slice_len/2,
            slice_len,
        }
    }
    pub fn phase_range(&self) -> Range<usize> {
        self.phase_start..self.phase_start + self.phase_len
    }
    pub fn slice_range(&self) -> Range<usize> {
        self.slice_start..self.slice_start + self.slice_len
    }
    pub fn n_cells(&self) -> usize {
        self.phase_len*self.slice_len
    }
    pub fn contains(&self,phase:usize,slice:usize) -> bool {
        self.phase_range().contains(&phase) && self.slice_range().contains(&slice)
    }
}

#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct Mask {
    samples:Array2<bool>,
}

impl Mask {
    pub fn zeros(n_phase:usize,n_slice:usize) -> Self {
        Self{samples:Array2::from_elem((n_phase,n_slice),false)}
    }

    pub fn from_array(samples:Array2<bool>) -> Self {
        Self{samples}
    }

    pub fn shape(&self) -> (usize,usize) {
        self.samples.dim()
    }
    pub fn n_phase(&self) -> usize {
        self.samples.nrows()
    }
    pub fn n_slice(&self) -> usize {
        self.samples.ncols()
    }
    pub fn as_array(&self) -> &Array2<bool> {
        &self.samples
    }

    pub fn is_sampled(&self,phase:usize,slice:usize) -> bool {
        self.samples.get((phase,slice)).copied().unwrap_or(false)
    }

    pub fn true_count(&self) -> usize {
        self.samples.iter().filter(|s| **s).count()
    }

    /// realized acceleration. Infinite for an empty mask.
    pub fn acceleration(&self) -> f64 {
        self.samples.len() as f64/self.true_count() as f64
    }

    /// sampled cells in row-major order
    pub fn sampled_points(&self) -> Vec<(usize,usize)> {
        self.samples.indexed_iter().filter(|(_,s)| **s).map(|(idx,_)| idx).collect()
    }

    pub fn covers(&self,region:&CalibrationRegion) -> bool {
        region.phase_range().all(|p| region.slice_range().all(|s| self.is_sampled(p,s)))
    }

    fn fill(&mut self,region:&CalibrationRegion) {
        for p in region.phase_range() {
            for s in region.slice_range() {
                self.samples[[p,s]] = true;
            }
        }
    }

    /// one line per phase row, '#' for sampled cells
    pub fn render(&self) -> String {
        self.samples.outer_iter().map(|row| {
            row.iter().map(|s| if *s {'#'} else {'.'}).collect::<String>()
        }).collect::<Vec<String>>().join("\n")
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPattern {
    Phyllotaxis,
    #[serde(alias = "poisson")]
    VariableDensity,
}

impl SamplingPattern {
    pub fn generate<R:Rng + ?Sized>(&self,params:&MaskParams,rng:&mut R) -> CsResult<Mask> {
        let mask = match self {
            SamplingPattern::Phyllotaxis => phyllotaxis(params)?,
            SamplingPattern::VariableDensity => variable_density(params,rng)?,
        };
        info!(pattern = ?self,samples = mask.true_count(),acceleration = mask.acceleration(),"sampling mask generated");
        Ok(mask)
    }
}

struct Candidate {
    index:(usize,usize),
    weight:f64,
}

// (1 - r)^2 with r the grid-normalized distance from center
fn radial_density(params:&MaskParams,phase:usize,slice:usize) -> f64 {
    let half_p = params.n_phase as f64/2.0;
    let half_s = params.n_slice as f64/2.0;
    let y = (phase as f64 - half_p)/half_p;
    let x = (slice as f64 - half_s)/half_s;
    let r = (x*x + y*y).sqrt();
    (1.0 - r).powi(2)
}

pub fn variable_density<R:Rng + ?Sized>(params:&MaskParams,rng:&mut R) -> CsResult<Mask> {
    params.validate()?;
    let region = CalibrationRegion::new(params);
    let mut mask = Mask::zeros(params.n_phase,params.n_slice);
    mask.fill(&region);

    let n_random = params.n_total() as i64 - region.n_cells() as i64;
    if n_random < 0 {
        return Err(CsError::Parameter(format!(
            "acceleration {} allows {} samples but the calibration region already holds {}",
            params.acceleration_factor,params.n_total(),region.n_cells()
        )));
    }
    let n_random = n_random as usize;
    debug!(?region,n_random,"variable density draw");
    if n_random == 0 {
        return Ok(mask)
    }

    let mut candidates = Vec::<Candidate>::with_capacity(params.n_cells());
    for ((p,s),_) in mask.samples.indexed_iter() {
        if region.contains(p,s) {continue}
        let weight = radial_density(params,p,s);
        if weight > 0.0 {
            candidates.push(Candidate{index:(p,s),weight});
        }
    }
    let total:f64 = candidates.iter().map(|c| c.weight).sum();
    if !(total > 0.0) {
        return Err(CsError::Sampling(String::from("sampling density is zero everywhere outside the calibration region")));
    }
    if candidates.len() < n_random {
        return Err(CsError::Sampling(format!(
            "{} random samples requested but only {} cells have non-zero density",n_random,candidates.len()
        )));
    }
    candidates.iter_mut().for_each(|c| c.weight /= total);

    let chosen = candidates.choose_multiple_weighted(rng,n_random,|c| c.weight)
        .map_err(|e| CsError::Sampling(format!("weighted draw failed: {}",e)))?;
    for c in chosen {
        mask.samples[c.index] = true;
    }
    Ok(mask)
}

pub fn phyllotaxis(params:&MaskParams) -> CsResult<Mask> {
    params.validate()?;
    let region = CalibrationRegion::new(params);
    let mut mask = Mask::zeros(params.n_phase,params.n_slice);
    let n_total = params.n_total();
    let angle = golden_angle();

    for i in 0..n_total {
        let radius = (i as f64/n_total as f64).sqrt();
        let theta = i as f64*angle;
        let x = radius*theta.cos();
        let y = radius*theta.sin();
        let ks = ((x*PHYLLOTAXIS_SCALE + 1.0)*params.n_slice as f64/2.0) as i64;
        let kp = ((y*PHYLLOTAXIS_SCALE + 1.0)*params.n_phase as f64/2.0) as i64;
        let ks = ks.clamp(0,params.n_slice as i64 - 1) as usize;
        let kp = kp.clamp(0,params.n_phase as i64 - 1) as usize;
        mask.samples[[kp,ks]] = true;
    }

    let spiral = mask.true_count();
    if spiral < n_total {
        warn!(target_samples = n_total,placed = spiral,"phyllotaxis index collisions reduced the sample count");
    }
    mask.fill(&region);
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scenario() -> MaskParams {
        MaskParams::new(128,32,6.0,0.04)
    }

    #[test]
    fn calibration_box_for_reference_grid(){
        let region = CalibrationRegion::new(&scenario());
        assert_eq!(region.phase_len,5);
        assert_eq!(region.slice_len,1);
        assert_eq!(region.phase_range(),62..67);
        assert_eq!(region.slice_range(),16..17);
        assert_eq!(region.n_cells(),5);
        assert_eq!(scenario().n_total(),682);
    }

    #[test]
    fn variable_density_hits_budget(){
        let mut rng = StdRng::seed_from_u64(7);
        let params = scenario();
        let mask = variable_density(&params,&mut rng).unwrap();
        assert_eq!(mask.shape(),(128,32));
        assert_eq!(mask.true_count(),682);
        assert!(mask.covers(&CalibrationRegion::new(&params)));
    }

    #[test]
    fn variable_density_acceleration_tolerance(){
        let mut rng = StdRng::seed_from_u64(11);
        for r in 2..=10 {
            let params = MaskParams::new(128,32,r as f64,0.04);
            let mask = variable_density(&params,&mut rng).unwrap();
            assert!((mask.acceleration() - r as f64).abs() < 0.5,"R={} got {}",r,mask.acceleration());
        }
    }

    #[test]
    fn same_seed_same_mask(){
        let params = scenario();
        let a = variable_density(&params,&mut StdRng::seed_from_u64(3)).unwrap();
        let b = variable_density(&params,&mut StdRng::seed_from_u64(3)).unwrap();
        let c = variable_density(&params,&mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(a,b);
        assert_ne!(a,c);
    }

    #[test]
    fn calibration_larger_than_budget_is_parameter_error(){
        let params = MaskParams::new(16,16,200.0,0.5);
        let err = variable_density(&params,&mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err,CsError::Parameter(_)));
    }

    #[test]
    fn no_support_left_is_sampling_error(){
        // cell (1,0) of a 2x1 grid sits at r == 1, leaving one candidate for two draws
        let params = MaskParams::new(2,1,1.0,0.0);
        let err = variable_density(&params,&mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err,CsError::Sampling(_)));
    }

    #[test]
    fn invalid_parameters_rejected(){
        let mut rng = StdRng::seed_from_u64(0);
        for params in [
            MaskParams::new(0,32,4.0,0.04),
            MaskParams::new(32,0,4.0,0.04),
            MaskParams::new(32,32,0.5,0.04),
            MaskParams::new(32,32,4.0,1.0),
            MaskParams::new(32,32,4.0,-0.1),
            MaskParams::new(32,32,f64::NAN,0.1),
        ] {
            assert!(matches!(variable_density(&params,&mut rng),Err(CsError::Parameter(_))));
            assert!(matches!(phyllotaxis(&params),Err(CsError::Parameter(_))));
        }
    }

    #[test]
    fn phyllotaxis_is_deterministic_and_bounded(){
        let params = scenario();
        let a = phyllotaxis(&params).unwrap();
        let b = phyllotaxis(&params).unwrap();
        assert_eq!(a,b);
        let region = CalibrationRegion::new(&params);
        assert!(a.covers(&region));
        assert!(a.true_count() <= params.n_total() + region.n_cells());
        assert!(a.true_count() > params.n_total()/2);
        // the spiral starts at the grid center
        assert!(a.is_sampled(64,16));
    }

    #[test]
    fn pattern_dispatch(){
        let params = scenario();
        let mut rng = StdRng::seed_from_u64(1);
        let m = SamplingPattern::Phyllotaxis.generate(&params,&mut rng).unwrap();
        assert_eq!(m,phyllotaxis(&params).unwrap());
        let m = SamplingPattern::VariableDensity.generate(&params,&mut rng).unwrap();
        assert_eq!(m.true_count(),682);
    }

    #[test]
    fn render_marks_samples(){
        let mut mask = Mask::zeros(2,3);
        mask.fill(&CalibrationRegion{phase_start:1,phase_len:1,slice_start:0,slice_len:2});
        assert_eq!(mask.render(),"...\n##.");
        assert_eq!(mask.sampled_points(),vec![(1,0),(1,1)]);
        assert!(!mask.is_sampled(5,5));
    }

    proptest! {
        #[test]
        fn masks_keep_shape_and_calibration(
            n_phase in 1usize..64,
            n_slice in 1usize..48,
            acceleration in 1.0f64..12.0,
            center_fraction in 0.0f64..0.5,
            seed in any::<u64>(),
        ) {
            let params = MaskParams::new(n_phase,n_slice,acceleration,center_fraction);
            let region = CalibrationRegion::new(&params);

            let mask = phyllotaxis(&params).unwrap();
            prop_assert_eq!(mask.shape(),(n_phase,n_slice));
            prop_assert!(mask.covers(&region));

            match variable_density(&params,&mut StdRng::seed_from_u64(seed)) {
                Ok(mask) => {
                    prop_assert_eq!(mask.shape(),(n_phase,n_slice));
                    prop_assert!(mask.covers(&region));
                    prop_assert_eq!(mask.true_count(),params.n_total());
                }
                Err(e) => prop_assert!(matches!(e,CsError::Parameter(_) | CsError::Sampling(_))),
            }
        }
    }
}
