use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use seq_lib::flow_encoding::EncodingScheme;
use seq_lib::protocol::{Initialize, ScanConfig};
use seq_lib::scan_plan::{DesignedScheme, NavigatorRequest, PlanSummary, ScanPlan};
use seq_tools::gradient_event::TrapezoidDesigner;
use seq_tools::utils::sec_to_us;
use crate::args::{MaskArgs, NewConfigArgs, PlanArgs};

pub const CS_TABLE_NAME:&str = "cs_table";
pub const PLAN_NAME:&str = "plan.json";

pub type CliResult<T> = Result<T,Box<dyn std::error::Error>>;

#[derive(Serialize)]
struct PlanReport<'a> {
    summary:PlanSummary,
    definitions:BTreeMap<String,Value>,
    schemes:&'a [EncodingScheme],
    designed:Vec<DesignedScheme>,
    navigator:Option<NavigatorRequest>,
}

pub fn new_config(args:&NewConfigArgs) -> CliResult<()> {
    ScanConfig::write_default(&args.destination)?;
    info!("default protocol written to {}",args.destination.display());
    Ok(())
}

fn load_plan(config:&Path,seed:Option<u64>) -> CliResult<ScanPlan> {
    let config = ScanConfig::load(config)?;
    let seed = seed.unwrap_or(config.protocol.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(ScanPlan::build(&config,&mut rng)?)
}

pub fn plan(args:&PlanArgs) -> CliResult<()> {
    let plan = load_plan(&args.config,args.seed)?;
    let summary = plan.summary();
    info!(
        "{} views x {} schemes = {} acquisitions, scan time {:.1} s (R = {:.2})",
        summary.n_views,
        summary.n_schemes,
        summary.n_acquisitions,
        summary.scan_time,
        summary.acceleration
    );

    let designer = TrapezoidDesigner::new(plan.limits())?;
    let designed = plan.design_encodings(&designer)?;
    for scheme in &designed {
        info!("{}: {} us of flow encoding",scheme.name,sec_to_us(scheme.duration));
    }

    let Some(out) = &args.out else {
        return Ok(())
    };
    create_dir_all(out)?;

    let table = plan.cs_table()?;
    let mut f = File::create(out.join(CS_TABLE_NAME))?;
    f.write_all(table.serialize().as_bytes())?;

    let report = PlanReport {
        summary,
        definitions:plan.definitions(),
        schemes:plan.schemes(),
        designed,
        navigator:plan.navigator(),
    };
    let mut f = File::create(out.join(PLAN_NAME))?;
    f.write_all(serde_json::to_string_pretty(&report)?.as_bytes())?;
    info!("plan written to {}",out.display());
    Ok(())
}

pub fn mask(args:&MaskArgs) -> CliResult<()> {
    let plan = load_plan(&args.config,args.seed)?;
    print!("{}",plan.mask().render());
    info!(samples = plan.n_views(),acceleration = plan.mask().acceleration(),"mask rendered");
    Ok(())
}
