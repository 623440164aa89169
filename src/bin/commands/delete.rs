use anyhow::Result;
use clap::Args;
use metareg::lens::registry::RegistryLens;
use metareg::lens::utils::OutputFormat;
use metareg::ConnectionProvider;

use super::{load_listing, print_listing, report};

/// Arguments for the Delete command
#[derive(Args)]
pub struct DeleteArgs {
    /// Database id to delete
    #[clap(value_name = "ID")]
    pub id: String,
}

pub fn run(provider: &ConnectionProvider, args: DeleteArgs, output: OutputFormat) -> Result<()> {
    let store = provider.handle()?;
    let mut lens = RegistryLens::new(&*store);

    load_listing(&mut lens)?;

    lens.select(&args.id)?;
    eprintln!(
        "[warning] deleting '{}' permanently, this cannot be undone",
        args.id
    );
    lens.delete_selected();

    print_listing(&lens, output)?;
    report(lens.take_notices())
}
