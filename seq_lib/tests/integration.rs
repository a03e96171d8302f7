use rand::SeedableRng;
use rand::rngs::StdRng;
use cs_table::cs_table::CSTable;
use cs_table::mask::{CalibrationRegion, SamplingPattern};
use seq_lib::PlanError;
use seq_lib::flow_encoding::EncodingMode;
use seq_lib::protocol::{Initialize, ScanConfig};
use seq_lib::scan_plan::ScanPlan;
use seq_tools::gradient_event::TrapezoidDesigner;

fn variable_density_config() -> ScanConfig {
    let mut config = ScanConfig::default();
    config.protocol.sampling_pattern = SamplingPattern::VariableDensity;
    config.protocol.n_cardiac_phases = 2;
    config
}

#[test]
fn reference_protocol_plan(){
    let config = variable_density_config();
    let plan = ScanPlan::build(&config,&mut StdRng::seed_from_u64(7)).unwrap();

    assert_eq!(plan.mask().shape(),(128,32));
    assert_eq!(plan.n_views(),682);
    let region = CalibrationRegion::new(&config.protocol.mask_params());
    assert_eq!(region.phase_range(),62..67);
    assert_eq!(region.slice_range(),16..17);
    assert!(plan.mask().covers(&region));

    assert_eq!(plan.order().len(),682*2);
    assert_eq!(plan.schemes().len(),4);
    assert_eq!(plan.n_acquisitions(),682*2*4);

    // center first, radius never decreasing within a cardiac phase
    let radius = |p:usize,s:usize| {
        let kp = p as f64 - 64.0;
        let ks = s as f64 - 16.0;
        (kp*kp + ks*ks).sqrt()
    };
    let first = &plan.order()[0];
    assert_eq!((first.phase_index,first.slice_index),(64,16));
    for w in plan.order()[..682].windows(2) {
        assert!(radius(w[0].phase_index,w[0].slice_index) <= radius(w[1].phase_index,w[1].slice_index));
    }
    assert!(plan.order()[682..].iter().all(|a| a.cardiac_phase == 1));
}

#[test]
fn plans_are_reproducible_from_seed(){
    let config = variable_density_config();
    let a = ScanPlan::build(&config,&mut StdRng::seed_from_u64(11)).unwrap();
    let b = ScanPlan::build(&config,&mut StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(a.mask(),b.mask());
    assert_eq!(a.order(),b.order());
    assert_eq!(a.summary(),b.summary());
}

#[test]
fn cs_table_survives_text_round_trip(){
    let plan = ScanPlan::build(&variable_density_config(),&mut StdRng::seed_from_u64(3)).unwrap();
    let table = plan.cs_table().unwrap();
    assert_eq!(table.n_views(),682);
    assert_eq!(&table.elements()[..2],&[0,0]);
    let parsed = CSTable::parse(&table.serialize()).unwrap();
    assert_eq!(parsed,table);
}

#[test]
fn hadamard_needs_every_axis(){
    let mut config = variable_density_config();
    config.protocol.encoding_mode = EncodingMode::Hadamard;
    let plan = ScanPlan::build(&config,&mut StdRng::seed_from_u64(0)).unwrap();
    let names:Vec<&str> = plan.schemes().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names,vec!["hadamard_1","hadamard_2","hadamard_3","hadamard_4"]);

    config.protocol.flow_directions = [true,true,false];
    let err = ScanPlan::build(&config,&mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err,PlanError::EncodingConfiguration(_)));
}

#[test]
fn dual_venc_plan(){
    let mut config = variable_density_config();
    config.protocol.venc_low = Some(0.5);
    let plan = ScanPlan::build(&config,&mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(plan.schemes().len(),7);
    assert!(plan.definitions().contains_key("VENC_LOW"));
}

#[test]
fn designed_events_respect_limits(){
    let mut config = variable_density_config();
    config.protocol.venc = 0.05;
    let plan = ScanPlan::build(&config,&mut StdRng::seed_from_u64(0)).unwrap();
    let designer = TrapezoidDesigner::new(plan.limits()).unwrap();
    for scheme in plan.design_encodings(&designer).unwrap() {
        for event in &scheme.events {
            assert!(event.amplitude.abs() <= plan.limits().max_grad*(1.0 + 1E-9));
        }
    }
}

#[test]
fn plan_from_config_file(){
    let path = std::env::temp_dir().join("plan_from_config_file.toml");
    let mut config = variable_density_config();
    config.protocol.navigator_enabled = false;
    let toml = config.to_toml().unwrap();
    std::fs::write(&path,toml).unwrap();
    let loaded = ScanConfig::load(&path).unwrap();
    assert_eq!(loaded,config);
    let plan = ScanPlan::build(&loaded,&mut StdRng::seed_from_u64(loaded.protocol.seed)).unwrap();
    assert!(plan.navigator().is_none());
    std::fs::remove_file(&path).unwrap();
}
