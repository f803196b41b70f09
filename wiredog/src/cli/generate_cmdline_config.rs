use super::{error, write_network_config, Result};
use crate::cmdline;
use crate::{KERNEL_CMDLINE, NETWORKD_CONFIG_DIR};
use argh::FromArgs;
use snafu::ResultExt;
use std::path::PathBuf;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "generate-cmdline-config")]
/// Generate networkd configuration from the kernel command line
pub(crate) struct GenerateCmdlineConfigArgs {
    #[argh(option)]
    /// command line to compile instead of the one read from --cmdline-path
    cmdline: Option<String>,

    #[argh(option, default = "PathBuf::from(KERNEL_CMDLINE)")]
    /// file holding the kernel command line
    cmdline_path: PathBuf,

    #[argh(option, default = "PathBuf::from(NETWORKD_CONFIG_DIR)")]
    /// directory the .network files are written to
    output_dir: PathBuf,

    #[argh(switch)]
    /// print the generated files instead of writing them
    dry_run: bool,
}

/// Compile the network arguments on the kernel command line and write out each interface.
pub(crate) fn run(args: GenerateCmdlineConfigArgs) -> Result<()> {
    let compiled = match &args.cmdline {
        Some(cmdline) => cmdline::from_str(cmdline),
        None => cmdline::from_path(&args.cmdline_path).context(error::CmdlineConfigSnafu)?,
    };

    if !compiled.warnings.is_empty() {
        warn!(
            "Ignored {} kernel command line setting(s)",
            compiled.warnings.len()
        );
    }
    if compiled.networks.is_empty() {
        info!("No network configuration found on the kernel command line");
        return Ok(());
    }

    for network in &compiled.networks {
        write_network_config(network, &args.output_dir, args.dry_run)?;
    }
    Ok(())
}
