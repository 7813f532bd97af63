//! `platforms` command: list the supported platform registry.

use crate::error::CliError;
use crate::output::Output;

pub(crate) fn platforms(out: &Output) -> Result<(), CliError> {
    out.highlight("Supported platforms");
    for descriptor in charta_platforms::all() {
        let native = if descriptor.native_support {
            "  (native diagram support; left alone)"
        } else {
            ""
        };
        out.info(&format!(
            "  {:<10} {:<22} {}{native}",
            descriptor.platform.as_str(),
            descriptor.hostname_match,
            descriptor.strategy.name(),
        ));
    }
    Ok(())
}
