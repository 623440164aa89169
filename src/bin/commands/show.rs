use anyhow::Result;
use clap::Args;
use metareg::lens::registry::{format_form, RegistryLens};
use metareg::lens::utils::OutputFormat;
use metareg::ConnectionProvider;

use super::load_listing;

/// Arguments for the Show command
#[derive(Args)]
pub struct ShowArgs {
    /// Database id to show
    #[clap(value_name = "ID")]
    pub id: String,
}

pub fn run(provider: &ConnectionProvider, args: ShowArgs, output: OutputFormat) -> Result<()> {
    let store = provider.handle()?;
    let mut lens = RegistryLens::new(&*store);

    load_listing(&mut lens)?;

    let form = lens.select(&args.id)?;
    println!("{}", format_form(&form, output)?);
    lens.cancel();
    Ok(())
}
