/*
    ReCAR k-space reordering.

    Sampled cells are played center-out (ascending distance from the grid center, ties in
    row-major order) and the whole pass repeats once per cardiac phase. A ReorderPolicy may
    then permute the order, for example in response to the respiratory position, but it must
    hand back exactly the same acquisitions.
 */

use std::fmt::Debug;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use tracing::info;
use crate::error::{CsError, CsResult};
use crate::mask::Mask;

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct SamplePoint {
    pub phase_index:usize,
    pub slice_index:usize,
    pub k_radius:f64,
}

impl SamplePoint {
    pub fn new(phase_index:usize,slice_index:usize,n_phase:usize,n_slice:usize) -> Self {
        let kp = phase_index as f64 - n_phase as f64/2.0;
        let ks = slice_index as f64 - n_slice as f64/2.0;
        Self{phase_index,slice_index,k_radius:(kp*kp + ks*ks).sqrt()}
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize)]
pub struct OrderedAcquisition {
    pub phase_index:usize,
    pub slice_index:usize,
    pub cardiac_phase:usize,
}

/// Reorders a computed acquisition order. `resp_position` is the respiratory position
/// in [0,1] (0 end-expiration, 1 end-inspiration) when a signal is available.
pub trait ReorderPolicy: DynClone + Debug + Send + Sync {
    fn name(&self) -> String;
    fn reorder(&self,order:Vec<OrderedAcquisition>,resp_position:Option<f64>) -> Vec<OrderedAcquisition>;
}

dyn_clone::clone_trait_object!(ReorderPolicy);

#[derive(Clone,Copy,Debug,Default)]
pub struct Baseline;

impl ReorderPolicy for Baseline {
    fn name(&self) -> String {
        String::from("baseline")
    }
    fn reorder(&self,order:Vec<OrderedAcquisition>,_resp_position:Option<f64>) -> Vec<OrderedAcquisition> {
        order
    }
}

/// sampled cells of the mask sorted center-out
pub fn center_out(mask:&Mask) -> Vec<SamplePoint> {
    let (n_phase,n_slice) = mask.shape();
    let mut points:Vec<(usize,SamplePoint)> = mask.sampled_points().into_iter()
        .map(|(p,s)| SamplePoint::new(p,s,n_phase,n_slice))
        .enumerate()
        .collect();
    // enumeration index breaks radius ties so the order never depends on sort stability
    points.sort_by(|a,b| a.1.k_radius.total_cmp(&b.1.k_radius).then(a.0.cmp(&b.0)));
    points.into_iter().map(|(_,point)| point).collect()
}

pub fn reorder(mask:&Mask,n_cardiac_phases:usize,policy:&dyn ReorderPolicy) -> CsResult<Vec<OrderedAcquisition>> {
    if n_cardiac_phases == 0 {
        return Err(CsError::Parameter(String::from("at least one cardiac phase is required")));
    }
    let points = center_out(mask);
    let mut order = Vec::<OrderedAcquisition>::with_capacity(points.len()*n_cardiac_phases);
    for cardiac_phase in 0..n_cardiac_phases {
        order.extend(points.iter().map(|point| OrderedAcquisition {
            phase_index:point.phase_index,
            slice_index:point.slice_index,
            cardiac_phase,
        }));
    }
    let reordered = policy.reorder(order.clone(),None);
    check_permutation(&order,&reordered,policy)?;
    info!(policy = policy.name(),points = points.len(),n_cardiac_phases,"acquisition order computed");
    Ok(reordered)
}

fn check_permutation(before:&[OrderedAcquisition],after:&[OrderedAcquisition],policy:&dyn ReorderPolicy) -> CsResult<()> {
    if before.len() != after.len() {
        return Err(CsError::PolicyViolation(format!(
            "policy {} returned {} acquisitions for {}",policy.name(),after.len(),before.len()
        )));
    }
    let mut a = before.to_vec();
    let mut b = after.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    if a != b {
        return Err(CsError::PolicyViolation(format!("policy {} dropped or duplicated acquisitions",policy.name())));
    }
    Ok(())
}

#[derive(Clone,Debug)]
pub struct Recar {
    policy:Box<dyn ReorderPolicy>,
}

impl Default for Recar {
    fn default() -> Self {
        Self::new(Box::new(Baseline))
    }
}

impl Recar {
    pub fn new(policy:Box<dyn ReorderPolicy>) -> Self {
        Self{policy}
    }

    pub fn policy_name(&self) -> String {
        self.policy.name()
    }

    pub fn sampling_order(&self,mask:&Mask,n_cardiac_phases:usize) -> CsResult<Vec<OrderedAcquisition>> {
        reorder(mask,n_cardiac_phases,self.policy.as_ref())
    }

    pub fn reorder_for_respiration(&self,order:&[OrderedAcquisition],resp_position:f64) -> CsResult<Vec<OrderedAcquisition>> {
        if !(0.0..=1.0).contains(&resp_position) {
            return Err(CsError::Parameter(format!("respiratory position must be in [0,1], got {}",resp_position)));
        }
        let reordered = self.policy.reorder(order.to_vec(),Some(resp_position));
        check_permutation(order,&reordered,self.policy.as_ref())?;
        Ok(reordered)
    }
}
