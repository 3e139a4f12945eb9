//! Configuration reconciliation: audit every parameter in a command
//! table and repair the writable ones that disagree.
//!
//! The walk is strictly in table order, one verdict per auditable
//! parameter, and it never aborts on an individual failure -- the full
//! outcome sequence comes back so the session layer can decide what is
//! fatal. Each parameter gets exactly one read attempt and, when a
//! correction is needed, exactly one write-plus-confirming-re-read.
//! There are no automatic retries: a silent retry on a live control
//! channel risks duplicate writes to hardware.
//!
//! A failed read is never "a value that happens to differ": it produces
//! [`Outcome::ReadFailed`] and no corrective write is attempted, so a
//! dead link can never cause the reconciler to spray writes built from
//! garbage.

use tracing::{debug, info, warn};

use crate::commands::{CommandDefinition, CommandTable};
use crate::controller::Tc3625;
use crate::protocol::ResponseError;

/// The verdict for one audited parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The read value already matches the profile.
    InSync {
        /// Parameter name from the table.
        name: String,
        /// The value the controller reported.
        value: i32,
    },

    /// A read-only parameter disagrees with the profile. Reported, never
    /// corrected.
    Mismatch {
        /// Parameter name from the table.
        name: String,
        /// The value the controller reported.
        actual: i32,
        /// The value the profile calls for.
        expected: i32,
    },

    /// A writable parameter disagreed, was rewritten, and the confirming
    /// re-read matches the profile.
    Corrected {
        /// Parameter name from the table.
        name: String,
        /// The out-of-profile value found by the initial read.
        old: i32,
        /// The confirmed value after correction.
        new: i32,
    },

    /// A correction was written but the confirming re-read did not come
    /// back with the expected value.
    CorrectionFailed {
        /// Parameter name from the table.
        name: String,
        /// The out-of-profile value found by the initial read.
        old: i32,
        /// The value the correction tried to store.
        attempted: i32,
        /// What the confirming re-read returned, or `None` if it failed
        /// to decode (the write may or may not have landed).
        new: Option<i32>,
    },

    /// The initial read failed; the parameter was not touched.
    ReadFailed {
        /// Parameter name from the table.
        name: String,
        /// The protocol classification of the failure.
        error: ResponseError,
    },
}

impl Outcome {
    /// The parameter this outcome describes.
    pub fn name(&self) -> &str {
        match self {
            Outcome::InSync { name, .. }
            | Outcome::Mismatch { name, .. }
            | Outcome::Corrected { name, .. }
            | Outcome::CorrectionFailed { name, .. }
            | Outcome::ReadFailed { name, .. } => name,
        }
    }

    /// Whether this outcome indicates a failure (as opposed to agreement
    /// or a successful repair).
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::Mismatch { .. }
                | Outcome::CorrectionFailed { .. }
                | Outcome::ReadFailed { .. }
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InSync { name, value } => write!(f, "{name}: in sync ({value})"),
            Outcome::Mismatch {
                name,
                actual,
                expected,
            } => write!(f, "{name}: read-only mismatch ({actual}, profile {expected})"),
            Outcome::Corrected { name, old, new } => {
                write!(f, "{name}: corrected {old} -> {new}")
            }
            Outcome::CorrectionFailed {
                name,
                old,
                attempted,
                new: Some(new),
            } => write!(
                f,
                "{name}: correction failed (was {old}, wrote {attempted}, re-read {new})"
            ),
            Outcome::CorrectionFailed {
                name,
                old,
                attempted,
                new: None,
            } => write!(
                f,
                "{name}: correction failed (was {old}, wrote {attempted}, re-read failed)"
            ),
            Outcome::ReadFailed { name, error } => write!(f, "{name}: read failed ({error})"),
        }
    }
}

/// The ordered outcomes of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    outcomes: Vec<Outcome>,
}

impl ReconcileReport {
    /// The outcomes, in table order. Parameters without a read code do
    /// not appear.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Whether every audited parameter was already in profile.
    pub fn is_in_sync(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, Outcome::InSync { .. }))
    }

    /// Number of successful corrections.
    pub fn corrections(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Corrected { .. }))
            .count()
    }

    /// The failure outcomes (mismatches, failed reads, failed
    /// corrections), in table order.
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Whether the pass ended with any failure outcome.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

impl Tc3625 {
    /// Audit every readable parameter in `table` and repair the writable
    /// ones that disagree with their expected values.
    ///
    /// Returns one [`Outcome`] per definition that has a read code, in
    /// table order. Protocol-level failures become per-parameter outcomes;
    /// only a hard transport failure (the port itself going away) aborts
    /// the walk, since every later exchange would fail identically and
    /// corrective writes on a broken link are unsafe.
    pub async fn reconcile(&mut self, table: &CommandTable) -> thermlink_core::Result<ReconcileReport> {
        info!(parameters = table.len(), "starting reconciliation");
        let mut outcomes = Vec::with_capacity(table.len());

        for def in table {
            let Some(read_code) = def.read_code else {
                debug!(name = %def.name, "no read code, skipping");
                continue;
            };

            let current = match self.read_parameter(read_code).await? {
                Ok(value) => value,
                Err(error) => {
                    warn!(name = %def.name, %error, "read failed, leaving parameter untouched");
                    outcomes.push(Outcome::ReadFailed {
                        name: def.name.clone(),
                        error,
                    });
                    continue;
                }
            };

            if current == def.expected {
                outcomes.push(Outcome::InSync {
                    name: def.name.clone(),
                    value: current,
                });
                continue;
            }

            let Some(write_code) = def.write_code else {
                warn!(
                    name = %def.name,
                    actual = current,
                    expected = def.expected,
                    "read-only parameter out of profile"
                );
                outcomes.push(Outcome::Mismatch {
                    name: def.name.clone(),
                    actual: current,
                    expected: def.expected,
                });
                continue;
            };

            outcomes.push(self.correct(def, write_code, read_code, current).await?);
        }

        let report = ReconcileReport { outcomes };
        info!(
            audited = report.outcomes().len(),
            corrections = report.corrections(),
            failures = report.failures().count(),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Write the expected value and confirm it with a re-read.
    ///
    /// The controller echoes the stored value in the write response; the
    /// echo is logged but the verdict rests solely on the confirming
    /// re-read, so a corrupted acknowledgement cannot fake a repair.
    async fn correct(
        &mut self,
        def: &CommandDefinition,
        write_code: crate::protocol::CommandCode,
        read_code: crate::protocol::CommandCode,
        old: i32,
    ) -> thermlink_core::Result<Outcome> {
        info!(
            name = %def.name,
            actual = old,
            expected = def.expected,
            "correcting parameter"
        );

        match self.write_parameter(write_code, def.expected).await? {
            Ok(echo) => debug!(name = %def.name, echo, "write acknowledged"),
            Err(error) => warn!(name = %def.name, %error, "write not acknowledged"),
        }

        match self.read_parameter(read_code).await? {
            Ok(value) if value == def.expected => Ok(Outcome::Corrected {
                name: def.name.clone(),
                old,
                new: value,
            }),
            Ok(value) => {
                warn!(name = %def.name, re_read = value, "correction did not stick");
                Ok(Outcome::CorrectionFailed {
                    name: def.name.clone(),
                    old,
                    attempted: def.expected,
                    new: Some(value),
                })
            }
            Err(error) => {
                warn!(name = %def.name, %error, "confirming re-read failed");
                Ok(Outcome::CorrectionFailed {
                    name: def.name.clone(),
                    old,
                    attempted: def.expected,
                    new: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandDefinition;
    use crate::controller::DEFAULT_RESPONSE_TIMEOUT;
    use crate::protocol::{encode_command, encode_response, CommandCode};
    use thermlink_test_harness::MockTransport;

    fn session(mock: MockTransport) -> Tc3625 {
        Tc3625::new(Box::new(mock), DEFAULT_RESPONSE_TIMEOUT)
    }

    fn request(code: &str, value: i64) -> Vec<u8> {
        encode_command(CommandCode::new(code).unwrap(), value)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    fn table(defs: Vec<CommandDefinition>) -> CommandTable {
        CommandTable::new(defs).unwrap()
    }

    // Single-parameter profile used throughout: read 01, write 28,
    // expected 500.
    fn enforced_def() -> CommandDefinition {
        CommandDefinition::enforced("ALARM TYPE", "01", "28", 500).unwrap()
    }

    #[tokio::test]
    async fn in_sync_parameter_is_left_alone() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(500));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::InSync {
                name: "ALARM TYPE".into(),
                value: 500
            }]
        );
        assert!(report.is_in_sync());
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn disagreeing_parameter_is_corrected() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(0));
        mock.expect(&request("28", 500), &encode_response(500));
        mock.expect(&request("01", 0), &encode_response(500));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::Corrected {
                name: "ALARM TYPE".into(),
                old: 0,
                new: 500
            }]
        );
        assert_eq!(report.corrections(), 1);
    }

    #[tokio::test]
    async fn correction_that_does_not_stick_is_reported() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(0));
        mock.expect(&request("28", 500), &encode_response(500));
        // The confirming re-read still says 0.
        mock.expect(&request("01", 0), &encode_response(0));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::CorrectionFailed {
                name: "ALARM TYPE".into(),
                old: 0,
                attempted: 500,
                new: Some(0)
            }]
        );
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn failed_confirming_re_read_reports_no_new_value() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(0));
        mock.expect(&request("28", 500), &encode_response(500));
        mock.expect_no_response(&request("01", 0));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::CorrectionFailed {
                name: "ALARM TYPE".into(),
                old: 0,
                attempted: 500,
                new: None
            }]
        );
    }

    #[tokio::test]
    async fn read_failure_never_triggers_a_write() {
        let mut mock = MockTransport::new();
        // Only the read is expected; a corrective write would trip the
        // mock's unexpected-send error and fail the walk.
        mock.expect_no_response(&request("01", 0));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::ReadFailed {
                name: "ALARM TYPE".into(),
                error: ResponseError::NoResponse
            }]
        );
    }

    #[tokio::test]
    async fn rejected_checksum_is_a_read_failure() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), b"*XXXXXXXXc0\r");

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![enforced_def()])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::ReadFailed {
                name: "ALARM TYPE".into(),
                error: ResponseError::ChecksumRejected
            }]
        );
    }

    #[tokio::test]
    async fn read_only_mismatch_is_reported_not_corrected() {
        let def = CommandDefinition::audit_only("INPUT1", "01", 2043).unwrap();
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(1500));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![def])).await.unwrap();

        assert_eq!(
            report.outcomes(),
            &[Outcome::Mismatch {
                name: "INPUT1".into(),
                actual: 1500,
                expected: 2043
            }]
        );
    }

    #[tokio::test]
    async fn write_only_definition_is_skipped() {
        let def = CommandDefinition::set_only("ALARM LATCH RESET", "33", 0).unwrap();
        let tc_mock = MockTransport::new();

        let mut tc = session(tc_mock);
        let report = tc.reconcile(&table(vec![def])).await.unwrap();

        assert!(report.outcomes().is_empty());
        assert!(report.is_in_sync());
    }

    #[tokio::test]
    async fn walk_continues_after_failures() {
        let first = CommandDefinition::enforced("ALARM TYPE", "41", "28", 0).unwrap();
        let second = CommandDefinition::enforced("SENSOR TYPE", "43", "2a", 1).unwrap();

        let mut mock = MockTransport::new();
        mock.expect_no_response(&request("41", 0));
        mock.expect(&request("43", 0), &encode_response(1));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(vec![first, second])).await.unwrap();

        assert_eq!(report.outcomes().len(), 2);
        assert!(matches!(report.outcomes()[0], Outcome::ReadFailed { .. }));
        assert!(matches!(report.outcomes()[1], Outcome::InSync { .. }));
    }

    #[tokio::test]
    async fn outcomes_preserve_table_order() {
        let defs = vec![
            CommandDefinition::audit_only("POWER OUTPUT", "02", 0).unwrap(),
            CommandDefinition::set_only("ALARM LATCH RESET", "33", 0).unwrap(),
            CommandDefinition::enforced("HEAT MULTIPLIER", "5c", "0c", 20).unwrap(),
        ];

        let mut mock = MockTransport::new();
        mock.expect(&request("02", 0), &encode_response(0));
        // The write-only definition issues no traffic at all.
        mock.expect(&request("5c", 0), &encode_response(20));

        let mut tc = session(mock);
        let report = tc.reconcile(&table(defs)).await.unwrap();

        let names: Vec<_> = report.outcomes().iter().map(|o| o.name()).collect();
        assert_eq!(names, ["POWER OUTPUT", "HEAT MULTIPLIER"]);
    }

    #[tokio::test]
    async fn correction_exchange_sequence_is_write_then_re_read() {
        let mut mock = MockTransport::new();
        mock.expect(&request("01", 0), &encode_response(0));
        mock.expect(&request("28", 500), &encode_response(500));
        mock.expect(&request("01", 0), &encode_response(500));

        let mut tc = session(mock);
        tc.reconcile(&table(vec![enforced_def()])).await.unwrap();
        // All three expectations consumed, in order, is the assertion:
        // MockTransport errors on any out-of-order or extra send.
    }

    #[test]
    fn outcome_display_is_readable() {
        let o = Outcome::Corrected {
            name: "SENSOR TYPE".into(),
            old: 0,
            new: 1,
        };
        assert_eq!(o.to_string(), "SENSOR TYPE: corrected 0 -> 1");

        let o = Outcome::ReadFailed {
            name: "INPUT1".into(),
            error: ResponseError::NoResponse,
        };
        assert_eq!(
            o.to_string(),
            "INPUT1: read failed (no response from controller)"
        );
    }
}
