use clap::Parser;
use plan_scan::args::*;
use plan_scan::build::{mask, new_config, plan, CliResult};

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = PlanScanArgs::parse();
    use Action::*;
    match &args.action {
        NewConfig(args) => new_config(args),
        Plan(args) => plan(args),
        Mask(args) => mask(args),
    }
}
