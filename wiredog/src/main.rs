/*!
# Introduction

wiredog compiles network configuration into files for systemd-networkd and wpa_supplicant.

Configuration comes from one of two places:
* netplan-style YAML files, usually dropped in `/etc/network-config-manager/yaml`
* dracut-style `ip=`, `nameserver=`, `rd.route=` and `rd.peerdns=` arguments on the kernel
  command line

Either way, each interface is reduced to a single normalized record, which is then written as a
`10-<interface>.network` file.  Wireless interfaces also get a `wpa_supplicant-<interface>.conf`
file holding their access points.

Values that can't be understood (a misspelled boolean, an out-of-range MTU) are logged and skipped;
the rest of the configuration is still generated.  A document that is structurally broken fails the
whole run.

The subcommands are:
* `generate-yaml-config`: compile YAML files
* `generate-cmdline-config`: compile the kernel command line
*/

#![deny(rust_2018_idioms)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_plain;

mod cli;
mod cmdline;
mod interface_id;
mod network;
mod networkd;
mod parse;
mod wpa_supplicant;
mod yaml;

use argh::FromArgs;
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};
use snafu::ResultExt;
use std::process;

static YAML_CONFIG_DIR: &str = "/etc/network-config-manager/yaml";
static NETWORKD_CONFIG_DIR: &str = "/etc/systemd/network";
static WPA_SUPPLICANT_CONFIG_DIR: &str = "/etc/network-config-manager";
static KERNEL_CMDLINE: &str = "/proc/cmdline";

/// Stores user-supplied global arguments.
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    /// log-level trace|debug|info|warn|error
    #[argh(option)]
    log_level: Option<LevelFilter>,

    #[argh(subcommand)]
    subcommand: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    GenerateYamlConfig(cli::GenerateYamlConfigArgs),
    GenerateCmdlineConfig(cli::GenerateCmdlineConfigArgs),
}

fn setup_logger(args: &Args) -> Result<()> {
    let log_level = args.log_level.unwrap_or(LevelFilter::Info);
    SimpleLogger::init(log_level, LogConfig::default()).context(error::LoggerSnafu)
}

fn run() -> Result<()> {
    let args: Args = argh::from_env();
    setup_logger(&args)?;

    match args.subcommand {
        SubCommand::GenerateYamlConfig(args) => cli::generate_yaml_config::run(args)?,
        SubCommand::GenerateCmdlineConfig(args) => cli::generate_cmdline_config::run(args)?,
    }
    Ok(())
}

// Returning a Result from main makes it print a Debug representation of the error, but with Snafu
// we have nice Display representations of the error, so we wrap "main" (run) and print any error.
// https://github.com/shepmaster/snafu/issues/110
fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Potential errors during wiredog execution
mod error {
    use crate::cli;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(super) enum Error {
        #[snafu(display("Logger setup error: {}", source))]
        Logger { source: log::SetLoggerError },

        #[snafu(context(false), display("{}", source))]
        Cli { source: cli::Error },
    }
}

type Result<T> = std::result::Result<T, error::Error>;
