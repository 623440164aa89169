use anyhow::Result;
use metareg::lens::registry::{format_form, EditArgs, RegistryLens};
use metareg::lens::utils::OutputFormat;
use metareg::ConnectionProvider;

use super::{load_listing, print_listing, report};

pub fn run(provider: &ConnectionProvider, args: EditArgs, output: OutputFormat) -> Result<()> {
    let store = provider.handle()?;
    let mut lens = RegistryLens::new(&*store);

    load_listing(&mut lens)?;

    let mut form = lens.select(&args.id)?;
    if !args.has_changes() {
        eprintln!("[info] nothing to change, current values of '{}':", args.id);
        println!("{}", format_form(&form, output)?);
        lens.cancel();
        return Ok(());
    }

    args.apply(&mut form);
    lens.submit_update(&form);

    print_listing(&lens, output)?;
    report(lens.take_notices())
}
