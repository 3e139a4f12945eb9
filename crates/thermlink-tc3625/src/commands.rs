//! TC-36-25 register definitions and the command table.
//!
//! The controller exposes its configuration as a flat register space: each
//! parameter has a read code and, when the parameter is settable over the
//! link, a separate write code. A [`CommandTable`] is the declarative,
//! ordered registry of parameters the reconciler audits, together with the
//! value each writable parameter is expected to hold.
//!
//! Tables are data, not logic: [`factory_profile`] returns the laboratory's
//! standard profile, and alternative profiles can be loaded from TOML via
//! [`Profile`](crate::profile::Profile) without touching the reconciler.

use thermlink_core::{Error, Result};

use crate::protocol::CommandCode;

/// Register codes used directly by the session layer, outside any profile.
pub mod codes {
    use crate::protocol::CommandCode;

    /// Read INPUT1, the primary control thermistor, in hundredths of a
    /// degree.
    pub const INPUT1: CommandCode = CommandCode::from_ascii(*b"01");

    /// Read the active desired control value (the setpoint the control
    /// loop is currently chasing).
    pub const DESIRED_CONTROL_VALUE: CommandCode = CommandCode::from_ascii(*b"03");

    /// Read the current power output level.
    pub const POWER_OUTPUT: CommandCode = CommandCode::from_ascii(*b"02");

    /// Read the alarm status register.
    pub const ALARM_STATUS: CommandCode = CommandCode::from_ascii(*b"05");

    /// Read the fixed desired control setting.
    pub const FIXED_SETPOINT: CommandCode = CommandCode::from_ascii(*b"50");

    /// Write the fixed desired control setting, in hundredths of a degree.
    pub const SET_FIXED_SETPOINT: CommandCode = CommandCode::from_ascii(*b"1c");

    /// Write-only: clear a latched alarm. The register has no read code;
    /// it is a trigger, not a stored setting.
    pub const ALARM_LATCH_RESET: CommandCode = CommandCode::from_ascii(*b"33");
}

/// One parameter in a command table.
///
/// A parameter with no write code is audited but never corrected (it is
/// read-only by device design, e.g. the thermistor inputs). A parameter
/// with no read code cannot be audited at all and is skipped by the
/// reconciler; the model allows it so profiles can document write-only
/// trigger registers, but the shipped profile contains none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Descriptive label, used only for logging and reports.
    pub name: String,
    /// Register code used to read the parameter, if it is readable.
    pub read_code: Option<CommandCode>,
    /// Register code used to write the parameter, if it is settable.
    pub write_code: Option<CommandCode>,
    /// The value the reconciler enforces for writable parameters, and
    /// compares against for read-only ones.
    pub expected: i32,
}

impl CommandDefinition {
    /// A readable, settable parameter the reconciler keeps at `expected`.
    pub fn enforced(name: &str, read: &str, write: &str, expected: i32) -> Result<Self> {
        Ok(CommandDefinition {
            name: name.to_string(),
            read_code: Some(CommandCode::new(read)?),
            write_code: Some(CommandCode::new(write)?),
            expected,
        })
    }

    /// A read-only parameter: mismatches are reported, never corrected.
    pub fn audit_only(name: &str, read: &str, expected: i32) -> Result<Self> {
        Ok(CommandDefinition {
            name: name.to_string(),
            read_code: Some(CommandCode::new(read)?),
            write_code: None,
            expected,
        })
    }

    /// A write-only trigger register. Skipped by the reconciler.
    pub fn set_only(name: &str, write: &str, expected: i32) -> Result<Self> {
        Ok(CommandDefinition {
            name: name.to_string(),
            read_code: None,
            write_code: Some(CommandCode::new(write)?),
            expected,
        })
    }

    /// Whether the reconciler can correct this parameter.
    pub fn is_writable(&self) -> bool {
        self.write_code.is_some()
    }
}

/// An ordered, validated registry of [`CommandDefinition`]s.
///
/// Iteration order is construction order; the reconciler audits strictly
/// in this order, so a table is reproducible test input.
#[derive(Debug, Clone)]
pub struct CommandTable {
    definitions: Vec<CommandDefinition>,
}

impl CommandTable {
    /// Build a table, rejecting definitions that carry neither a read nor
    /// a write code (such an entry addresses nothing on the device).
    pub fn new(definitions: Vec<CommandDefinition>) -> Result<Self> {
        for (index, def) in definitions.iter().enumerate() {
            if def.read_code.is_none() && def.write_code.is_none() {
                return Err(Error::Config(format!(
                    "definition {} ({:?}) has neither a read nor a write code",
                    index, def.name
                )));
            }
        }
        Ok(CommandTable { definitions })
    }

    /// Iterate the definitions in audit order.
    pub fn iter(&self) -> std::slice::Iter<'_, CommandDefinition> {
        self.definitions.iter()
    }

    /// Look up a definition by its (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.definitions
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
    }

    /// Number of definitions in the table.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the table holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = &'a CommandDefinition;
    type IntoIter = std::slice::Iter<'a, CommandDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The factory profile: name, read code, write code, enforced value.
///
/// Taken from the TC-36-25 register map. The first six rows are read-only
/// process values (audited so a drifted sensor or a latched alarm shows up
/// in the report); the rest are the laboratory's required configuration.
///
/// Two registers from the device manual are deliberately absent: the
/// communications address (reserved, must not be written) and the alarm
/// latch reset trigger, which is write-only and therefore not auditable --
/// it is exposed as an explicit session operation instead
/// ([`Tc3625::reset_alarm_latch`](crate::controller::Tc3625::reset_alarm_latch)).
#[rustfmt::skip]
const FACTORY_PROFILE: &[(&str, Option<[u8; 2]>, Option<[u8; 2]>, i32)] = &[
    ("INPUT1",                           Some(*b"01"), None,         2043),
    ("DESIRED CONTROL VALUE",            Some(*b"03"), None,         0),
    ("POWER OUTPUT",                     Some(*b"02"), None,         0),
    ("ALARM STATUS",                     Some(*b"05"), None,         0),
    ("INPUT2",                           Some(*b"06"), None,         15566),
    ("OUTPUT CURRENT COUNTS",            Some(*b"07"), None,         130),
    ("ALARM TYPE",                       Some(*b"41"), Some(*b"28"), 0),
    ("SET TYPE DEFINE",                  Some(*b"42"), Some(*b"29"), 0),
    ("SENSOR TYPE",                      Some(*b"43"), Some(*b"2a"), 1),
    ("CONTROL TYPE",                     Some(*b"44"), Some(*b"2b"), 2),
    ("CONTROL OUTPUT POLARITY",          Some(*b"45"), Some(*b"2c"), 1),
    ("POWER ON/OFF",                     Some(*b"46"), Some(*b"2d"), 0),
    ("OUTPUT SHUTDOWN IF ALARM",         Some(*b"47"), Some(*b"2e"), 1),
    ("FIXED DESIRED CONTROL SETTING",    Some(*b"50"), Some(*b"1c"), 0),
    ("PROPORTIONAL BANDWIDTH",           Some(*b"51"), Some(*b"1d"), 500),
    ("INTEGRAL GAIN",                    Some(*b"52"), Some(*b"1e"), 0),
    ("DERIVATIVE GAIN",                  Some(*b"53"), Some(*b"1f"), 0),
    ("LOW EXTERNAL SET RANGE",           Some(*b"54"), Some(*b"20"), 0),
    ("HIGH EXTERNAL SET RANGE",          Some(*b"55"), Some(*b"21"), 10000),
    ("ALARM DEADBAND",                   Some(*b"56"), Some(*b"22"), 100),
    ("HIGH ALARM SETTING",               Some(*b"57"), Some(*b"23"), 10000),
    ("LOW ALARM SETTING",                Some(*b"58"), Some(*b"24"), 0),
    ("CONTROL DEADBAND SETTING",         Some(*b"59"), Some(*b"25"), 100),
    ("INPUT1 OFFSET",                    Some(*b"5a"), Some(*b"26"), 0),
    ("INPUT2 OFFSET",                    Some(*b"5b"), Some(*b"27"), 0),
    ("HEAT MULTIPLIER",                  Some(*b"5c"), Some(*b"0c"), 20),
    ("COOL MULTIPLIER",                  Some(*b"5d"), Some(*b"0d"), 20),
    ("OVER CURRENT COUNT COMPARE VALUE", Some(*b"5e"), Some(*b"0e"), 14),
    ("ALARM LATCH ENABLE",               Some(*b"48"), Some(*b"2f"), 0),
    ("CHOOSE SENSOR FOR ALARM FUNCTION", Some(*b"4a"), Some(*b"31"), 0),
    ("TEMPERATURE WORKING UNITS",        Some(*b"4b"), Some(*b"32"), 1),
    ("EEPROM WRITE ENABLE",              Some(*b"4c"), Some(*b"34"), 1),
    ("OVER CURRENT CONTINUOUS",          Some(*b"4d"), Some(*b"35"), 0),
    ("OVER CURRENT RESTART ATTEMPTS",    Some(*b"5f"), Some(*b"0f"), 300),
    ("JP3 DISPLAY ENABLE",               Some(*b"4e"), Some(*b"36"), 0),
];

/// Build the laboratory's standard command table.
///
/// Infallible: the profile data is static and every row carries a read
/// code, which the tests below assert.
pub fn factory_profile() -> CommandTable {
    let definitions = FACTORY_PROFILE
        .iter()
        .map(|&(name, read, write, expected)| CommandDefinition {
            name: name.to_string(),
            read_code: read.map(CommandCode::from_ascii),
            write_code: write.map(CommandCode::from_ascii),
            expected,
        })
        .collect();
    CommandTable { definitions }
}
