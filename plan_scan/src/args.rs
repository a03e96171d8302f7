use clap;
use std::path::PathBuf;

#[derive(clap::Parser,Debug)]
pub struct PlanScanArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(clap::Subcommand,Debug)]
pub enum Action {
    /// write a default protocol file
    NewConfig(NewConfigArgs),
    /// build the scan plan for a protocol file
    Plan(PlanArgs),
    /// print the sampling mask of a protocol file
    Mask(MaskArgs),
}

#[derive(clap::Args,Debug)]
pub struct NewConfigArgs {
    pub destination:PathBuf
}

#[derive(clap::Args,Debug)]
pub struct PlanArgs {
    pub config:PathBuf,
    /// overrides the seed stored in the protocol
    #[clap(short, long)]
    pub seed:Option<u64>,
    /// directory receiving cs_table and plan.json
    #[clap(short, long)]
    pub out:Option<PathBuf>,
}

#[derive(clap::Args,Debug)]
pub struct MaskArgs {
    pub config:PathBuf,
    #[clap(short, long)]
    pub seed:Option<u64>,
}
