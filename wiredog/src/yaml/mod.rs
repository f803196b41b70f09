//! The yaml module turns netplan-style YAML documents into `Network`s.
//!
//! The document is first reduced to a `Node` tree, so nothing past this module depends on the YAML
//! library.  The walker then applies the schema tables to that tree.  A value that can't be
//! converted is reported as a `Warning` and the walk carries on; only a document that is
//! structurally wrong (bad YAML, or a section that isn't a mapping) fails the whole parse.
mod node;
mod schema;
mod walker;

use self::node::Node;
use self::walker::{Parsed, Walker};
use serde::Deserialize;
use serde_yaml::Value;
use snafu::ResultExt;
use std::fs;
use std::path::Path;

/// Parse every document in `text`.  Documents are walked in order and share records, so a
/// selector repeated in a later document updates the record the earlier one created.
pub(crate) fn from_str(text: &str) -> Result<Parsed> {
    // The first read learns each document's shape, the second recovers its scalars' source text
    let mut shapes = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        shapes.push(Value::deserialize(document).context(error::YamlParseSnafu)?);
    }

    let mut walker = Walker::default();
    for (document, shape) in serde_yaml::Deserializer::from_str(text).zip(&shapes) {
        if shape.is_null() {
            continue;
        }
        let node = Node::read(document, shape).context(error::YamlParseSnafu)?;
        walker.document(&node)?;
    }
    Ok(walker.finish())
}

/// Read and parse a YAML file
pub(crate) fn from_path<P>(path: P) -> Result<Parsed>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(error::YamlReadFailedSnafu { path })?;
    from_str(&text)
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to read network config from '{}': {}", path.display(), source))]
        YamlReadFailed { path: PathBuf, source: io::Error },

        #[snafu(display("Failed to parse network config: {}", source))]
        YamlParse { source: serde_yaml::Error },

        #[snafu(display("Expected a mapping for '{}', found a {}", section, found))]
        ExpectedMapping {
            section: String,
            found: &'static str,
        },
    }
}

pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_data() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("yaml")
    }

    #[test]
    fn empty_input_has_no_networks() {
        for text in ["", "---\n", "# only a comment\n"] {
            let parsed = from_str(text).unwrap();
            assert!(parsed.networks.is_empty());
            assert!(parsed.warnings.is_empty());
        }
    }

    #[test]
    fn syntax_errors_are_fatal() {
        assert!(matches!(
            from_str("ethernets: {eth0: [unterminated"),
            Err(Error::YamlParse { .. })
        ));
    }

    #[test]
    fn structural_errors_are_fatal() {
        assert!(matches!(
            from_str("ethernets: [eth0, eth1]"),
            Err(Error::ExpectedMapping { .. })
        ));
        assert!(matches!(
            from_str("ethernets:\n  eth0:\n    routes: default\n"),
            Err(Error::ExpectedMapping { .. })
        ));
    }

    #[test]
    fn bad_keys_are_fatal() {
        for text in ["ethernets:\n  ? [eth0]\n  : {mtu: 1500}\n", "ethernets:\n  '': {}\n"] {
            assert!(matches!(from_str(text), Err(Error::YamlParse { .. })), "{:?}", text);
        }
    }

    #[test]
    fn values_are_read_as_written() {
        let parsed = from_str(
            r#"
ethernets:
  eth0:
    mtu: 0x5dc
    ipv6-mtu: 0o17
wifis:
  wlan0:
    access-points:
      - ssid-name: 0012
        password: 99999999999999999999
"#,
        )
        .unwrap();
        // Octal isn't one of the accepted spellings of a number
        assert_eq!(parsed.warnings.len(), 1);

        let eth0 = &parsed.networks[0];
        assert_eq!(eth0.link.mtu, Some(1500));
        assert_eq!(eth0.ipv6_mtu, None);

        let access_point = parsed.networks[1].access_points().next().unwrap();
        assert_eq!(access_point.ssid(), "0012");
        assert_eq!(
            access_point.auth.password.as_deref(),
            Some("99999999999999999999")
        );
    }

    #[test]
    fn documents_share_records() {
        let text = "ethernets:\n  eth0:\n    mtu: 1500\n---\nethernets:\n  eth0:\n    dhcp: yes\n";
        let parsed = from_str(text).unwrap();
        assert_eq!(parsed.networks.len(), 1);
        assert_eq!(parsed.networks[0].link.mtu, Some(1500));
        assert!(parsed.networks[0].dhcp.is_some());
    }

    #[test]
    fn every_fixture_parses_without_warnings() {
        let mut count = 0;
        for entry in fs::read_dir(test_data()).unwrap() {
            let path = entry.unwrap().path();
            let parsed = from_path(&path).unwrap();
            assert!(
                parsed.warnings.is_empty(),
                "{}: {:?}",
                path.display(),
                parsed.warnings
            );
            assert!(!parsed.networks.is_empty(), "{}", path.display());
            count += 1;
        }
        assert!(count > 0);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            from_path(test_data().join("does-not-exist.yaml")),
            Err(Error::YamlReadFailed { .. })
        ));
    }
}
