use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sdc_plan::{load_config, to_canonical_json_bytes};

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// YAML configuration to validate.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &CheckConfigArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let json = to_canonical_json_bytes(&config)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
