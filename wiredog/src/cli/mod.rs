pub(crate) mod generate_cmdline_config;
pub(crate) mod generate_yaml_config;

use crate::network::Network;
use crate::networkd::{NetDevConfig, NetworkConfig};
use crate::wpa_supplicant::WpaSupplicantConfig;
pub(crate) use generate_cmdline_config::GenerateCmdlineConfigArgs;
pub(crate) use generate_yaml_config::GenerateYamlConfigArgs;
use snafu::ResultExt;
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// Write the networkd config for `network` to `output_dir`, or print it when `dry_run` is set.
/// Records that nothing was ever written to are skipped.
fn write_network_config(network: &Network, output_dir: &Path, dry_run: bool) -> Result<()> {
    let interface = network.identity().stem();
    if !network.is_modified() {
        info!("Nothing configured for '{}', skipping", interface);
        return Ok(());
    }

    let config = NetworkConfig::from(network);
    if dry_run {
        print_config(&config.config_path(output_dir), &config);
        return Ok(());
    }

    create_dir(output_dir)?;
    let path = config
        .write_config_file(output_dir)
        .context(error::NetworkConfigWriteSnafu)?;
    info!("Wrote network config for '{}' to '{}'", interface, path.display());
    Ok(())
}

/// Write the `.netdev` file for `network` to `output_dir` if it describes a virtual device, or
/// print it when `dry_run` is set.
fn write_netdev_config(network: &Network, output_dir: &Path, dry_run: bool) -> Result<()> {
    let config = match NetDevConfig::from_network(network) {
        Some(config) => config,
        None => return Ok(()),
    };
    if dry_run {
        print_config(&config.config_path(output_dir), &config);
        return Ok(());
    }

    create_dir(output_dir)?;
    let path = config
        .write_config_file(output_dir)
        .context(error::NetworkConfigWriteSnafu)?;
    info!("Wrote netdev config to '{}'", path.display());
    Ok(())
}

/// Write the wpa_supplicant config for `network` to `output_dir` if it has any access points, or
/// print it when `dry_run` is set.
fn write_wpa_supplicant_config(network: &Network, output_dir: &Path, dry_run: bool) -> Result<()> {
    if !network.has_access_points() {
        return Ok(());
    }

    let config = WpaSupplicantConfig::from(network);
    if dry_run {
        print_config(&config.config_path(output_dir), &config);
        return Ok(());
    }

    create_dir(output_dir)?;
    let path = config
        .write_config_file(output_dir)
        .context(error::WpaSupplicantConfigWriteSnafu)?;
    info!("Wrote wpa_supplicant config to '{}'", path.display());
    Ok(())
}

fn print_config<D: Display>(path: &Path, config: &D) {
    println!("# {}", path.display());
    println!("{}", config);
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).context(error::CreateDirSnafu { path: dir })
}

/// Potential errors during wiredog execution
mod error {
    use crate::{cmdline, networkd, wpa_supplicant, yaml};
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    #[allow(clippy::enum_variant_names)]
    pub(crate) enum Error {
        #[snafu(display("Unable to read/parse kernel command line: {}", source))]
        CmdlineConfig { source: cmdline::Error },

        #[snafu(display("Failed to create directory '{}': {}", path.display(), source))]
        CreateDir { path: PathBuf, source: io::Error },

        #[snafu(display("Failed to write network config: {}", source))]
        NetworkConfigWrite { source: networkd::Error },

        #[snafu(display("Failed to write wpa_supplicant config: {}", source))]
        WpaSupplicantConfigWrite { source: wpa_supplicant::Error },

        #[snafu(display("Unable to read/parse network config from '{}': {}", path.display(), source))]
        YamlConfig { path: PathBuf, source: yaml::Error },

        #[snafu(display("Unable to list YAML files in '{}': {}", path.display(), source))]
        YamlDirRead { path: PathBuf, source: io::Error },
    }
}

pub(crate) use error::Error;
pub(crate) type Result<T> = std::result::Result<T, error::Error>;
