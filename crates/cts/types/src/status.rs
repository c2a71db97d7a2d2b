//! Test case status and the folds that derive requirement and profile outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single test case.
///
/// A test case starts in [`Status::Unknown`] and moves to exactly one of the
/// four terminal values when it executes. It never moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The assertion held.
    Success,
    /// The capability is claimed but broken, or the target misbehaved.
    Failed,
    /// The test could not be attempted (missing prerequisite discovery).
    Skipped,
    /// The target explicitly reported the capability as absent.
    NotSupported,
    /// Not yet executed.
    #[default]
    Unknown,
}

impl Status {
    /// All statuses, terminal ones first.
    pub const ALL: [Status; 5] = [
        Status::Success,
        Status::Failed,
        Status::Skipped,
        Status::NotSupported,
        Status::Unknown,
    ];

    /// Whether this status is final for a test case.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Unknown)
    }

    /// Whether this status counts as a met requirement.
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Fold precedence: the higher rank wins when combining statuses.
    ///
    /// `FAILED > UNKNOWN > SKIPPED > NOT_SUPPORTED > SUCCESS`
    pub fn precedence(self) -> u8 {
        match self {
            Status::Failed => 4,
            Status::Unknown => 3,
            Status::Skipped => 2,
            Status::NotSupported => 1,
            Status::Success => 0,
        }
    }

    /// Fold the statuses of the test cases contributing to one requirement.
    ///
    /// An empty input folds to [`Status::Unknown`]: a requirement with no
    /// evidence is never met.
    pub fn fold<I>(statuses: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        statuses
            .into_iter()
            .max_by_key(|status| status.precedence())
            .unwrap_or(Status::Unknown)
    }

    /// Stable upper-case label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
            Status::Skipped => "SKIPPED",
            Status::NotSupported => "NOT_SUPPORTED",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How well a target supports one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportLevel {
    /// Every requirement, mandatory and optional, is met.
    FullSupport,
    /// Every mandatory requirement is met; some optional ones are not.
    PartialSupport,
    /// No mandatory requirement failed or was skipped, but at least one is
    /// not supported by the target.
    NoSupport,
    /// At least one mandatory requirement failed.
    NotConformant,
    /// No mandatory requirement failed, but at least one could not be
    /// evaluated.
    Undetermined,
}

impl SupportLevel {
    /// Assess a profile from its requirements as `(mandatory, status)` pairs.
    ///
    /// Only mandatory requirements decide whether the profile is supported;
    /// optional ones only separate full from partial support.
    pub fn assess<I>(requirements: I) -> SupportLevel
    where
        I: IntoIterator<Item = (bool, Status)>,
    {
        let (mandatory, optional): (Vec<_>, Vec<_>) =
            requirements.into_iter().partition(|(mandatory, _)| *mandatory);

        if mandatory.is_empty() {
            return SupportLevel::Undetermined;
        }

        match Status::fold(mandatory.iter().map(|(_, status)| *status)) {
            Status::Success => {
                if optional.iter().all(|(_, status)| status.is_success()) {
                    SupportLevel::FullSupport
                } else {
                    SupportLevel::PartialSupport
                }
            }
            Status::Failed => SupportLevel::NotConformant,
            Status::Unknown | Status::Skipped => SupportLevel::Undetermined,
            Status::NotSupported => SupportLevel::NoSupport,
        }
    }

    /// Whether this level means the profile is supported.
    pub fn is_supported(self) -> bool {
        matches!(self, SupportLevel::FullSupport | SupportLevel::PartialSupport)
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SupportLevel::FullSupport => "full support",
            SupportLevel::PartialSupport => "partial support",
            SupportLevel::NoSupport => "no support",
            SupportLevel::NotConformant => "not conformant",
            SupportLevel::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
