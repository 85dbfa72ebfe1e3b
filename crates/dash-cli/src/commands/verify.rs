use anyhow::Context;
use dash_verify::{Pipeline, Report};

use crate::bundle;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::VerifyArgs;
use crate::output::output;

/// Handle `studydash verify`. The report is printed either way; a failed
/// verification also exits non-zero.
pub fn run(args: &VerifyArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let document = bundle::read_document(&args.file)?;
    let result = Pipeline::default().verify_document(&document);
    output(&Report::from(&result), flags.format)?;
    result
        .map(|_| ())
        .with_context(|| format!("{} did not verify", args.file.display()))
}
