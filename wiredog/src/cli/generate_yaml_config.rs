use super::{
    error, write_netdev_config, write_network_config, write_wpa_supplicant_config, Result,
};
use crate::yaml;
use crate::{NETWORKD_CONFIG_DIR, WPA_SUPPLICANT_CONFIG_DIR, YAML_CONFIG_DIR};
use argh::FromArgs;
use snafu::ResultExt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "generate-yaml-config")]
/// Generate networkd configuration from YAML network configuration files
pub(crate) struct GenerateYamlConfigArgs {
    #[argh(option, default = "PathBuf::from(YAML_CONFIG_DIR)")]
    /// directory searched for *.yaml and *.yml files when no files are given
    yaml_dir: PathBuf,

    #[argh(option, default = "PathBuf::from(NETWORKD_CONFIG_DIR)")]
    /// directory the .network and .netdev files are written to
    output_dir: PathBuf,

    #[argh(option, default = "PathBuf::from(WPA_SUPPLICANT_CONFIG_DIR)")]
    /// directory the wpa_supplicant files are written to
    wpa_supplicant_dir: PathBuf,

    #[argh(switch)]
    /// print the generated files instead of writing them
    dry_run: bool,

    #[argh(positional)]
    /// YAML files to compile instead of the contents of the YAML directory
    files: Vec<PathBuf>,
}

/// Compile each YAML file and write out its interfaces.
pub(crate) fn run(args: GenerateYamlConfigArgs) -> Result<()> {
    let files = if args.files.is_empty() {
        yaml_files(&args.yaml_dir)?
    } else {
        args.files
    };

    if files.is_empty() {
        info!("No network configuration files found");
        return Ok(());
    }

    for file in &files {
        info!("Reading network configuration from '{}'", file.display());
        let parsed = yaml::from_path(file).context(error::YamlConfigSnafu { path: file })?;
        if !parsed.warnings.is_empty() {
            warn!(
                "Ignored {} setting(s) in '{}'",
                parsed.warnings.len(),
                file.display()
            );
        }

        for network in &parsed.networks {
            write_netdev_config(network, &args.output_dir, args.dry_run)?;
            write_network_config(network, &args.output_dir, args.dry_run)?;
            write_wpa_supplicant_config(network, &args.wpa_supplicant_dir, args.dry_run)?;
        }
    }
    Ok(())
}

/// The YAML files in `dir`, sorted by name.  A missing directory has no files.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("'{}' does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).context(error::YamlDirReadSnafu { path: dir }),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.context(error::YamlDirReadSnafu { path: dir })?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| YAML_EXTENSIONS.contains(&ext));
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(yaml_dir: &Path, output_dir: &Path, files: Vec<PathBuf>) -> GenerateYamlConfigArgs {
        GenerateYamlConfigArgs {
            yaml_dir: yaml_dir.to_path_buf(),
            output_dir: output_dir.join("network"),
            wpa_supplicant_dir: output_dir.join("wpa"),
            dry_run: false,
            files,
        }
    }

    #[test]
    fn yaml_files_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yml", "a.yaml", "c.toml", "README"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("d.yaml")).unwrap();

        let files = yaml_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.yaml"), dir.path().join("b.yml")]
        );
    }

    #[test]
    fn missing_yaml_dir_has_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(yaml_files(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn writes_network_and_wpa_supplicant_configs() {
        let yaml_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            yaml_dir.path().join("10-wired.yaml"),
            "ethernets:\n  eth0:\n    dhcp: yes\n",
        )
        .unwrap();
        fs::write(
            yaml_dir.path().join("20-wireless.yaml"),
            "wifis:\n  wlan0:\n    dhcp4: yes\n    access-points:\n      - ssid-name: home\n        psk: hunter22\n",
        )
        .unwrap();

        run(args(yaml_dir.path(), output.path(), Vec::new())).unwrap();

        let network_dir = output.path().join("network");
        assert_eq!(
            fs::read_to_string(network_dir.join("10-eth0.network")).unwrap(),
            "[Match]\nName=eth0\n\n[Network]\nDHCP=yes\n"
        );
        assert!(network_dir.join("10-wlan0.network").exists());
        assert!(output
            .path()
            .join("wpa")
            .join("wpa_supplicant-wlan0.conf")
            .exists());
        assert!(!output.path().join("wpa").join("wpa_supplicant-eth0.conf").exists());
    }

    #[test]
    fn writes_vlan_netdev_and_networks() {
        let yaml_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let file = yaml_dir.path().join("vlan.yaml");
        fs::write(
            &file,
            "vlans:\n  vlan30:\n    id: 30\n    link: eth0\n    dhcp: ipv4\n",
        )
        .unwrap();

        run(args(yaml_dir.path(), output.path(), vec![file])).unwrap();

        let network_dir = output.path().join("network");
        assert_eq!(
            fs::read_to_string(network_dir.join("10-vlan30.netdev")).unwrap(),
            "[NetDev]\nName=vlan30\nKind=vlan\n\n[VLAN]\nId=30\n"
        );
        assert!(network_dir.join("10-vlan30.network").exists());
        assert_eq!(
            fs::read_to_string(network_dir.join("10-eth0.network")).unwrap(),
            "[Match]\nName=eth0\n\n[Network]\nVLAN=vlan30\n"
        );
    }

    #[test]
    fn unmodified_records_are_skipped() {
        let yaml_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let file = yaml_dir.path().join("empty.yaml");
        fs::write(&file, "ethernets:\n  eth0: {}\n").unwrap();

        run(args(yaml_dir.path(), output.path(), vec![file])).unwrap();
        assert!(!output.path().join("network").join("10-eth0.network").exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let yaml_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let file = yaml_dir.path().join("dhcp.yaml");
        fs::write(&file, "ethernets:\n  eth0:\n    dhcp: yes\n").unwrap();

        let mut args = args(yaml_dir.path(), output.path(), vec![file]);
        args.dry_run = true;
        run(args).unwrap();
        assert!(!output.path().join("network").exists());
    }

    #[test]
    fn structural_errors_fail_the_run() {
        let yaml_dir = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let file = yaml_dir.path().join("broken.yaml");
        fs::write(&file, "ethernets:\n  eth0: [dhcp]\n").unwrap();

        assert!(run(args(yaml_dir.path(), output.path(), vec![file])).is_err());
    }
}
