//! TOML-loadable command-table profiles.
//!
//! A profile is the persisted form of a [`CommandTable`]: an ordered list
//! of parameters with their register codes and enforced values. Keeping
//! profiles external means a different device configuration (another
//! thermistor, another control mode) is a file swap, not a code change.
//!
//! # Format
//!
//! ```toml
//! [[parameter]]
//! name = "SENSOR TYPE"
//! read = "43"
//! write = "2a"
//! expected = 1
//!
//! [[parameter]]
//! name = "INPUT1"
//! read = "01"          # no write code: audited, never corrected
//! expected = 2043
//! ```
//!
//! Parameter order in the file is audit order.

use serde::Deserialize;
use thermlink_core::{Error, Result};

use crate::commands::{CommandDefinition, CommandTable};
use crate::protocol::CommandCode;

/// One `[[parameter]]` entry in a profile file.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterSpec {
    /// Descriptive label for logs and reports.
    pub name: String,
    /// Two-character read register code, absent for write-only triggers.
    #[serde(default)]
    pub read: Option<String>,
    /// Two-character write register code, absent for read-only parameters.
    #[serde(default)]
    pub write: Option<String>,
    /// The value to enforce (writable) or compare against (read-only).
    pub expected: i32,
}

/// A deserialized profile file.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// The parameters, in audit order.
    #[serde(default, rename = "parameter")]
    pub parameters: Vec<ParameterSpec>,
}

impl Profile {
    /// Parse a profile from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("invalid profile: {e}")))
    }

    /// Load and parse a profile file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read profile {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the entries and build the command table.
    ///
    /// Fails with [`Error::Config`] on a malformed register code or an
    /// entry with neither code, naming the offending parameter.
    pub fn into_table(self) -> Result<CommandTable> {
        let mut definitions = Vec::with_capacity(self.parameters.len());
        for spec in self.parameters {
            let read_code = spec
                .read
                .as_deref()
                .map(CommandCode::new)
                .transpose()
                .map_err(|e| Error::Config(format!("parameter {:?}: {e}", spec.name)))?;
            let write_code = spec
                .write
                .as_deref()
                .map(CommandCode::new)
                .transpose()
                .map_err(|e| Error::Config(format!("parameter {:?}: {e}", spec.name)))?;
            definitions.push(CommandDefinition {
                name: spec.name,
                read_code,
                write_code,
                expected: spec.expected,
            });
        }
        CommandTable::new(definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[parameter]]
        name = "SENSOR TYPE"
        read = "43"
        write = "2a"
        expected = 1

        [[parameter]]
        name = "INPUT1"
        read = "01"
        expected = 2043
    "#;

    #[test]
    fn parses_sample_profile() {
        let profile = Profile::from_toml_str(SAMPLE).unwrap();
        assert_eq!(profile.parameters.len(), 2);
        assert_eq!(profile.parameters[0].name, "SENSOR TYPE");
        assert_eq!(profile.parameters[1].read.as_deref(), Some("01"));
        assert_eq!(profile.parameters[1].write, None);
    }

    #[test]
    fn table_preserves_file_order() {
        let table = Profile::from_toml_str(SAMPLE).unwrap().into_table().unwrap();
        let names: Vec<_> = table.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["SENSOR TYPE", "INPUT1"]);
    }

    #[test]
    fn table_entry_codes_round_trip() {
        let table = Profile::from_toml_str(SAMPLE).unwrap().into_table().unwrap();
        let sensor = table.get("SENSOR TYPE").unwrap();
        assert_eq!(sensor.read_code.unwrap().to_string(), "43");
        assert_eq!(sensor.write_code.unwrap().to_string(), "2a");
        assert_eq!(sensor.expected, 1);
    }

    #[test]
    fn rejects_bad_register_code() {
        let text = r#"
            [[parameter]]
            name = "BROKEN"
            read = "4"
            expected = 0
        "#;
        let err = Profile::from_toml_str(text)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(err.to_string().contains("BROKEN"));
    }

    #[test]
    fn rejects_entry_with_no_codes() {
        let text = r#"
            [[parameter]]
            name = "NOTHING"
            expected = 0
        "#;
        let err = Profile::from_toml_str(text)
            .unwrap()
            .into_table()
            .unwrap_err();
        assert!(err.to_string().contains("neither a read nor a write code"));
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(Profile::from_toml_str("[[parameter").is_err());
    }

    #[test]
    fn empty_profile_is_an_empty_table() {
        let table = Profile::from_toml_str("").unwrap().into_table().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn uppercase_codes_are_normalised() {
        let text = r#"
            [[parameter]]
            name = "INPUT1 OFFSET"
            read = "5A"
            write = "26"
            expected = 0
        "#;
        let table = Profile::from_toml_str(text).unwrap().into_table().unwrap();
        let def = table.get("INPUT1 OFFSET").unwrap();
        assert_eq!(def.read_code.unwrap().to_string(), "5a");
    }
}
