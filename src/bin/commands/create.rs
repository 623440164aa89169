use anyhow::Result;
use metareg::lens::registry::{CreateArgs, RegistryLens};
use metareg::lens::utils::OutputFormat;
use metareg::ConnectionProvider;

use super::{print_listing, report};

pub fn run(provider: &ConnectionProvider, args: CreateArgs, output: OutputFormat) -> Result<()> {
    let store = provider.handle()?;
    let mut lens = RegistryLens::new(&*store);

    lens.refresh();
    lens.begin_create();
    lens.submit_create(&args.to_draft());

    print_listing(&lens, output)?;
    report(lens.take_notices())
}
