use anyhow::Result;
use metareg::lens::registry::RegistryLens;
use metareg::lens::utils::OutputFormat;
use metareg::ConnectionProvider;

use super::{print_listing, report};

pub fn run(provider: &ConnectionProvider, output: OutputFormat) -> Result<()> {
    let store = provider.handle()?;
    let mut lens = RegistryLens::new(&*store);

    lens.refresh();
    print_listing(&lens, output)?;
    report(lens.take_notices())
}
