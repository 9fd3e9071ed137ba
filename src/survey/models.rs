//! Survey data models
//!
//! Defines the fixed major set, submission validation, and the immutable
//! response record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// The fixed set of majors students can rank, with display descriptions.
/// Seeded into the store once at startup.
pub const MAJORS: [(&str, &str); 8] = [
    (
        "Aerospace",
        "Aircraft, spacecraft, and the systems that fly them.",
    ),
    (
        "Biomedical Systems",
        "Engineering methods applied to medicine and human biology.",
    ),
    (
        "Electrical & Computer",
        "Circuits, embedded systems, and computer hardware.",
    ),
    (
        "Energy Systems",
        "Generation, storage, and distribution of electrical energy.",
    ),
    (
        "Machine Intelligence",
        "Machine learning, data systems, and intelligent software.",
    ),
    (
        "Mathematics, Statistics & Finance",
        "Quantitative modelling for financial and statistical problems.",
    ),
    (
        "Engineering Physics",
        "Advanced physics as the foundation for engineering research.",
    ),
    (
        "Robotics",
        "Perception, control, and design of autonomous machines.",
    ),
];

/// Check whether a name belongs to the fixed major set
pub fn is_valid_major(name: &str) -> bool {
    MAJORS.iter().any(|(major, _)| *major == name)
}

/// A major reference record as stored and served by the majors endpoint
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Major {
    /// Unique major name, one of [`MAJORS`]
    pub name: String,
    /// Free-text description shown alongside the name
    pub description: String,
}

/// A respondent's ranked top-three majors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// First-ranked major name
    pub first_choice: String,
    /// Second-ranked major name
    pub second_choice: String,
    /// Third-ranked major name
    pub third_choice: String,
}

/// Whether the respondent has committed to a final major
///
/// The confirmed major only exists in the `Decided` variant, so a decided
/// response without one is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Still weighing the ranked preferences
    Undecided,
    /// Final choice made; must match the first-ranked preference
    Decided {
        /// The confirmed major name
        confirmed_major: String,
    },
}

impl Decision {
    /// Whether this is the `Decided` variant
    pub fn has_decided(&self) -> bool {
        matches!(self, Decision::Decided { .. })
    }

    /// The confirmed major, if decided
    pub fn confirmed_major(&self) -> Option<&str> {
        match self {
            Decision::Undecided => None,
            Decision::Decided { confirmed_major } => Some(confirmed_major),
        }
    }
}

/// A validated survey response
///
/// Created once by [`Submission::validate`], persisted verbatim, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyResponse {
    /// Ranked top-three majors
    pub preferences: Preferences,
    /// Decision state, carrying the confirmed major when decided
    pub decision: Decision,
    /// Optional respondent name, trimmed, never empty
    pub name: Option<String>,
    /// Submission time, set at creation
    pub submitted_at: DateTime<Utc>,
}

/// A submission rejected for violating a domain rule
///
/// The display messages are exactly what the API reports back to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fewer than three non-empty preference fields were supplied
    #[error("You must select exactly 3 preferences.")]
    MissingPreferences,

    /// The same major appears in more than one preference slot
    #[error("First, second, and third choices must be different")]
    DuplicatePreferences,

    /// A choice names a major outside the fixed set
    #[error("Invalid {field} major: {value}")]
    InvalidMajor {
        /// Which field carried the bad value
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Decided respondents must name their confirmed major
    #[error("Confirmed major is required if you have decided.")]
    MissingConfirmedMajor,

    /// The confirmed major disagrees with the first-ranked preference
    #[error("Your confirmed major must match your first choice")]
    ConfirmedMajorMismatch,
}

/// Raw preference fields as they arrive off the wire, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreferences {
    /// First choice, possibly missing or empty
    #[serde(default)]
    pub first_choice: Option<String>,
    /// Second choice, possibly missing or empty
    #[serde(default)]
    pub second_choice: Option<String>,
    /// Third choice, possibly missing or empty
    #[serde(default)]
    pub third_choice: Option<String>,
}

/// An unvalidated submission, deserialized leniently so every rule violation
/// is reported through [`ValidationError`] rather than a deserialize failure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Whether the respondent claims a final decision
    #[serde(default)]
    pub has_decided: bool,
    /// Confirmed major; only consulted when `has_decided` is true
    #[serde(default)]
    pub confirmed_major: Option<String>,
    /// Ranked preferences
    #[serde(default)]
    pub preferences: Option<RawPreferences>,
    /// Optional respondent name
    #[serde(default)]
    pub name: Option<String>,
}

impl Submission {
    /// Validate the submission, producing an immutable [`SurveyResponse`]
    ///
    /// Rules are checked in order and the first violation is returned:
    /// presence of all three choices, pairwise distinctness, membership in
    /// the major set, then the decided-specific confirmed-major rules.
    /// A whitespace-only `name` is stored as absent.
    pub fn validate(self) -> Result<SurveyResponse, ValidationError> {
        let raw = self.preferences.unwrap_or_default();
        let first = raw.first_choice.unwrap_or_default();
        let second = raw.second_choice.unwrap_or_default();
        let third = raw.third_choice.unwrap_or_default();

        if first.is_empty() || second.is_empty() || third.is_empty() {
            return Err(ValidationError::MissingPreferences);
        }

        if first == second || first == third || second == third {
            return Err(ValidationError::DuplicatePreferences);
        }

        for (field, value) in [
            ("first choice", &first),
            ("second choice", &second),
            ("third choice", &third),
        ] {
            if !is_valid_major(value) {
                return Err(ValidationError::InvalidMajor {
                    field,
                    value: value.clone(),
                });
            }
        }

        let decision = if self.has_decided {
            let confirmed = self
                .confirmed_major
                .filter(|c| !c.is_empty())
                .ok_or(ValidationError::MissingConfirmedMajor)?;
            if !is_valid_major(&confirmed) {
                return Err(ValidationError::InvalidMajor {
                    field: "confirmed",
                    value: confirmed,
                });
            }
            if confirmed != first {
                return Err(ValidationError::ConfirmedMajorMismatch);
            }
            Decision::Decided {
                confirmed_major: confirmed,
            }
        } else {
            // Any confirmedMajor sent by an undecided respondent is ignored.
            Decision::Undecided
        };

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(SurveyResponse {
            preferences: Preferences {
                first_choice: first,
                second_choice: second,
                third_choice: third,
            },
            decision,
            name,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(first: &str, second: &str, third: &str) -> Option<RawPreferences> {
        Some(RawPreferences {
            first_choice: Some(first.to_string()),
            second_choice: Some(second.to_string()),
            third_choice: Some(third.to_string()),
        })
    }

    fn valid_undecided() -> Submission {
        Submission {
            has_decided: false,
            confirmed_major: None,
            preferences: prefs("Robotics", "Aerospace", "Energy Systems"),
            name: None,
        }
    }

    #[test]
    fn accepts_valid_undecided_submission() {
        let response = valid_undecided().validate().expect("should validate");
        assert_eq!(response.decision, Decision::Undecided);
        assert_eq!(response.preferences.first_choice, "Robotics");
        assert!(response.name.is_none());
    }

    #[test]
    fn accepts_valid_decided_submission() {
        let submission = Submission {
            has_decided: true,
            confirmed_major: Some("Robotics".to_string()),
            ..valid_undecided()
        };

        let response = submission.validate().expect("should validate");
        assert!(response.decision.has_decided());
        assert_eq!(response.decision.confirmed_major(), Some("Robotics"));
    }

    #[test]
    fn rejects_missing_preferences() {
        let submission = Submission {
            preferences: None,
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::MissingPreferences
        );

        let submission = Submission {
            preferences: Some(RawPreferences {
                first_choice: Some("Robotics".to_string()),
                second_choice: Some(String::new()),
                third_choice: Some("Aerospace".to_string()),
            }),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::MissingPreferences
        );
    }

    #[test]
    fn rejects_duplicate_preferences() {
        let submission = Submission {
            preferences: prefs("Robotics", "Robotics", "Aerospace"),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::DuplicatePreferences
        );
    }

    #[test]
    fn rejects_unknown_major_and_names_the_field() {
        let submission = Submission {
            preferences: prefs("Robotics", "Basket Weaving", "Aerospace"),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::InvalidMajor {
                field: "second choice",
                value: "Basket Weaving".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_check_runs_before_membership_check() {
        // Both rules are violated; distinctness is reported first.
        let submission = Submission {
            preferences: prefs("Basket Weaving", "Basket Weaving", "Aerospace"),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::DuplicatePreferences
        );
    }

    #[test]
    fn decided_requires_confirmed_major() {
        let submission = Submission {
            has_decided: true,
            confirmed_major: None,
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::MissingConfirmedMajor
        );
    }

    #[test]
    fn decided_rejects_invalid_confirmed_major() {
        let submission = Submission {
            has_decided: true,
            confirmed_major: Some("Basket Weaving".to_string()),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::InvalidMajor {
                field: "confirmed",
                value: "Basket Weaving".to_string(),
            }
        );
    }

    #[test]
    fn decided_rejects_confirmed_major_mismatch() {
        let submission = Submission {
            has_decided: true,
            confirmed_major: Some("Aerospace".to_string()),
            ..valid_undecided()
        };
        assert_eq!(
            submission.validate().unwrap_err(),
            ValidationError::ConfirmedMajorMismatch
        );
    }

    #[test]
    fn undecided_ignores_confirmed_major() {
        let submission = Submission {
            has_decided: false,
            confirmed_major: Some("Aerospace".to_string()),
            ..valid_undecided()
        };
        let response = submission.validate().expect("should validate");
        assert_eq!(response.decision, Decision::Undecided);
    }

    #[test]
    fn name_is_trimmed_and_empty_name_stored_as_absent() {
        let submission = Submission {
            name: Some("  Ada Lovelace  ".to_string()),
            ..valid_undecided()
        };
        let response = submission.validate().expect("should validate");
        assert_eq!(response.name.as_deref(), Some("Ada Lovelace"));

        let submission = Submission {
            name: Some("   ".to_string()),
            ..valid_undecided()
        };
        let response = submission.validate().expect("should validate");
        assert!(response.name.is_none());
    }

    #[test]
    fn major_set_membership() {
        assert!(is_valid_major("Mathematics, Statistics & Finance"));
        assert!(is_valid_major("Engineering Physics"));
        assert!(!is_valid_major("engineering physics"));
        assert!(!is_valid_major(""));
    }
}
