//! Plan command: interactive wizard

use crate::cli::PlanArgs;
use crate::config_loader::AppContext;
use crate::interactive;
use crate::output::OutputWriter;
use anyhow::{bail, Result};

pub async fn execute(args: PlanArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        bail!("The planning wizard is interactive and does not support --json");
    }

    interactive::run_wizard(ctx, output, args.address).await
}
