/*
    Flow encoding schemes.

    Every k-space view is acquired once per scheme. A scheme maps each encoded channel to the
    bipolar gradient played on it; the reference scheme maps nothing. Simple encoding adds one
    scheme per enabled channel, Hadamard encoding toggles the polarity of all three channels at
    once and therefore needs all of them.
 */

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use seq_tools::gradient_event::Channel;
use seq_tools::system_limits::SystemLimits;
use seq_tools::venc::{self, BipolarPair, GradientMomentSpec, Polarity, DEFAULT_BIPOLAR_DURATION};
use crate::error::{PlanError, PlanResult};

use seq_tools::venc::Polarity::{Negative, Positive};

// rows 2..4 of the 4x4 Hadamard matrix; row 1 is the reference
const HADAMARD_ROWS:[(&str,[Polarity;3]);3] = [
    ("hadamard_2",[Positive,Positive,Negative]),
    ("hadamard_3",[Positive,Negative,Positive]),
    ("hadamard_4",[Positive,Negative,Negative]),
];

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    Simple,
    Hadamard,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct EncodingScheme {
    pub name:String,
    pub gradients:BTreeMap<Channel,BipolarPair>,
}

impl EncodingScheme {
    pub fn reference(name:&str) -> Self {
        Self{name:name.to_string(),gradients:BTreeMap::new()}
    }
    pub fn is_reference(&self) -> bool {
        self.gradients.is_empty()
    }
    /// leading lobe on the channel
    pub fn moment(&self,channel:Channel) -> Option<GradientMomentSpec> {
        self.gradients.get(&channel).map(|pair| pair.leading)
    }
    pub fn polarity(&self,channel:Channel) -> Option<Polarity> {
        self.gradients.get(&channel).map(|pair| pair.polarity())
    }
    pub fn channels(&self) -> Vec<Channel> {
        self.gradients.keys().copied().collect()
    }
}

#[derive(Clone,Debug)]
pub struct FlowEncodingBuilder {
    venc:f64,
    limits:SystemLimits,
    directions:[bool;3],
    bipolar_duration:f64,
}

impl FlowEncodingBuilder {
    pub fn new(venc:f64,limits:&SystemLimits,directions:[bool;3]) -> Self {
        Self {
            venc,
            limits:limits.clone(),
            directions,
            bipolar_duration:DEFAULT_BIPOLAR_DURATION,
        }
    }

    pub fn with_bipolar_duration(mut self,bipolar_duration:f64) -> Self {
        self.bipolar_duration = bipolar_duration;
        self
    }

    fn bipolar_pairs(&self,venc:f64) -> PlanResult<Vec<(Channel,BipolarPair)>> {
        let pair = venc::bipolar_pair(venc,&self.limits,self.bipolar_duration)?;
        Ok(Channel::enabled(&self.directions).into_iter().map(|channel| (channel,pair)).collect())
    }

    pub fn build(&self,mode:EncodingMode) -> PlanResult<Vec<EncodingScheme>> {
        let schemes = match mode {
            EncodingMode::Simple => self.simple()?,
            EncodingMode::Hadamard => self.hadamard()?,
        };
        info!(?mode,venc = self.venc,schemes = schemes.len(),"flow encoding built");
        Ok(schemes)
    }

    fn simple(&self) -> PlanResult<Vec<EncodingScheme>> {
        let mut schemes = vec![EncodingScheme::reference("reference")];
        for (channel,pair) in self.bipolar_pairs(self.venc)? {
            let mut scheme = EncodingScheme::reference(&format!("{}_encoding",channel.label()));
            scheme.gradients.insert(channel,pair);
            schemes.push(scheme);
        }
        Ok(schemes)
    }

    fn hadamard(&self) -> PlanResult<Vec<EncodingScheme>> {
        if !self.directions.iter().all(|d| *d) {
            return Err(PlanError::EncodingConfiguration(format!(
                "hadamard encoding needs all three flow directions, got {:?}",self.directions
            )));
        }
        let pairs = self.bipolar_pairs(self.venc)?;
        let mut schemes = vec![EncodingScheme::reference("hadamard_1")];
        for (name,row) in HADAMARD_ROWS {
            let mut scheme = EncodingScheme::reference(name);
            for ((channel,pair),polarity) in pairs.iter().zip(row) {
                scheme.gradients.insert(*channel,pair.with_polarity(polarity));
            }
            schemes.push(scheme);
        }
        Ok(schemes)
    }

    /// reference, then each enabled channel at the high venc, then each at the low venc
    pub fn build_dual_venc(&self,venc_low:f64) -> PlanResult<Vec<EncodingScheme>> {
        if !(venc_low < self.venc) {
            return Err(PlanError::EncodingConfiguration(format!(
                "low venc ({}) must be below the high venc ({})",venc_low,self.venc
            )));
        }
        let mut schemes = vec![EncodingScheme::reference("reference")];
        for (venc,tag) in [(self.venc,"high"),(venc_low,"low")] {
            for (channel,pair) in self.bipolar_pairs(venc)? {
                let mut scheme = EncodingScheme::reference(&format!("{}_encoding_venc_{}",channel.label(),tag));
                scheme.gradients.insert(channel,pair);
                schemes.push(scheme);
            }
        }
        info!(venc_high = self.venc,venc_low,schemes = schemes.len(),"dual venc encoding built");
        Ok(schemes)
    }
}

pub fn build(venc:f64,limits:&SystemLimits,enabled_axes:[bool;3],mode:EncodingMode) -> PlanResult<Vec<EncodingScheme>> {
    FlowEncodingBuilder::new(venc,limits,enabled_axes).build(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SystemLimits {
        SystemLimits::default()
    }

    #[test]
    fn simple_all_axes(){
        let schemes = build(1.5,&limits(),[true,true,true],EncodingMode::Simple).unwrap();
        assert_eq!(schemes.len(),4);
        assert!(schemes[0].is_reference());
        assert_eq!(schemes[0].name,"reference");
        let names:Vec<&str> = schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names,vec!["reference","x_encoding","y_encoding","z_encoding"]);
        assert_eq!(schemes[2].channels(),vec![Channel::Phase]);
        let pair = schemes[3].gradients[&Channel::Slice];
        assert_eq!(pair.leading.area,-pair.trailing.area);
    }

    #[test]
    fn simple_single_axis(){
        let schemes = build(1.5,&limits(),[true,false,false],EncodingMode::Simple).unwrap();
        assert_eq!(schemes.len(),2);
        assert_eq!(schemes[1].channels(),vec![Channel::Read]);
        let none = build(1.5,&limits(),[false,false,false],EncodingMode::Simple).unwrap();
        assert_eq!(none.len(),1);
    }

    #[test]
    fn hadamard_polarities(){
        let schemes = build(1.5,&limits(),[true,true,true],EncodingMode::Hadamard).unwrap();
        assert_eq!(schemes.len(),4);
        assert!(schemes[0].is_reference());
        let rows:Vec<Vec<Polarity>> = schemes[1..].iter()
            .map(|s| Channel::all().iter().map(|c| s.polarity(*c).unwrap()).collect())
            .collect();
        assert_eq!(rows,vec![
            vec![Positive,Positive,Negative],
            vec![Positive,Negative,Positive],
            vec![Positive,Negative,Negative],
        ]);
        let pos = schemes[1].moment(Channel::Read).unwrap();
        let neg = schemes[1].moment(Channel::Slice).unwrap();
        assert_eq!(pos.area,-neg.area);
    }

    #[test]
    fn hadamard_requires_all_axes(){
        let err = build(1.5,&limits(),[true,true,false],EncodingMode::Hadamard).unwrap_err();
        assert!(matches!(err,PlanError::EncodingConfiguration(_)));
    }

    #[test]
    fn dual_venc_layout(){
        let builder = FlowEncodingBuilder::new(1.5,&limits(),[true,false,true]);
        let schemes = builder.build_dual_venc(0.5).unwrap();
        let names:Vec<&str> = schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names,vec!["reference","x_encoding_venc_high","z_encoding_venc_high","x_encoding_venc_low","z_encoding_venc_low"]);
        let high = schemes[1].moment(Channel::Read).unwrap();
        let low = schemes[3].moment(Channel::Read).unwrap();
        assert!(low.area > high.area);
        assert!(builder.build_dual_venc(2.0).is_err());
    }

    #[test]
    fn moments_respect_ceiling(){
        let tight = limits().with_max_grad(1E-4);
        let schemes = FlowEncodingBuilder::new(0.05,&tight,[true,true,true])
            .with_bipolar_duration(0.5E-3)
            .build(EncodingMode::Simple)
            .unwrap();
        for scheme in &schemes[1..] {
            let spec = scheme.moment(scheme.channels()[0]).unwrap();
            assert!(spec.amplitude <= tight.max_grad);
            assert!(spec.duration > 0.5E-3);
        }
        assert!(matches!(build(0.0,&limits(),[true,true,true],EncodingMode::Simple),Err(PlanError::Gradient(_))));
    }
}
