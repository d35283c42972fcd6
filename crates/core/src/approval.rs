//! Participant approval status and church-rep checklist (pastor workflow).
//!
//! The status moves forward as validation results and checklist items come
//! in; `approved` and `denied` are pastor decisions and never overwritten by
//! a sync pass.

use serde::{Deserialize, Serialize};

/// Identity, gender and age range were checked by the church rep.
pub const CHECKLIST_IDENTITY: &str = "1. Correct identity, gender, age range";

/// Consent form has been signed.
pub const CHECKLIST_CONSENT: &str = "2. Consent Form Signed by Self or Parents";

/// Member portal account exists and has been used.
pub const CHECKLIST_PORTAL: &str = "3. Account created on Member Portal and logged in";

/// Photo is usable as ID at check-in.
pub const CHECKLIST_PHOTO: &str = "4. Valid Photo as ID for event check-in";

/// All checklist items required before a participant goes to the pastor.
pub const REQUIRED_CHECKLIST: &[&str] = &[
    CHECKLIST_IDENTITY,
    CHECKLIST_CONSENT,
    CHECKLIST_PORTAL,
    CHECKLIST_PHOTO,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Validated,
    PendingApproval,
    Approved,
    Denied,
}

impl ApprovalStatus {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(Self::Pending),
            "validated" => Ok(Self::Validated),
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(format!("Unknown approval status: {other}")),
        }
    }

    /// Pastor decisions; participants in these states are left alone.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether every required checklist item appears in `checklist`.
///
/// Items are compared after trimming; extra items are ignored.
pub fn checklist_complete<S: AsRef<str>>(checklist: &[S]) -> bool {
    REQUIRED_CHECKLIST
        .iter()
        .all(|required| checklist.iter().any(|item| item.as_ref().trim() == *required))
}

/// Status for a non-final participant after a validation pass.
pub fn derive_status<S: AsRef<str>>(is_valid: bool, checklist: &[S]) -> ApprovalStatus {
    if !is_valid {
        ApprovalStatus::Pending
    } else if checklist_complete(checklist) {
        ApprovalStatus::PendingApproval
    } else {
        ApprovalStatus::Validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Validated,
            ApprovalStatus::PendingApproval,
            ApprovalStatus::Approved,
            ApprovalStatus::Denied,
        ] {
            assert_eq!(ApprovalStatus::from_str_value(status.as_str()), Ok(status));
        }
        assert!(ApprovalStatus::from_str_value("maybe").is_err());
    }

    #[test]
    fn only_pastor_decisions_are_final() {
        assert!(ApprovalStatus::Approved.is_final());
        assert!(ApprovalStatus::Denied.is_final());
        assert!(!ApprovalStatus::PendingApproval.is_final());
        assert!(!ApprovalStatus::Pending.is_final());
    }

    #[test]
    fn invalid_participant_stays_pending() {
        assert_eq!(derive_status(false, REQUIRED_CHECKLIST), ApprovalStatus::Pending);
    }

    #[test]
    fn valid_with_complete_checklist_goes_to_pastor() {
        let mut items: Vec<String> = REQUIRED_CHECKLIST.iter().map(|s| format!(" {s} ")).collect();
        items.push("5. Something extra".into());
        assert_eq!(derive_status(true, &items), ApprovalStatus::PendingApproval);
    }

    #[test]
    fn valid_with_partial_checklist_is_validated() {
        let items = [CHECKLIST_IDENTITY, CHECKLIST_CONSENT];
        assert_eq!(derive_status(true, &items), ApprovalStatus::Validated);
        assert_eq!(derive_status::<&str>(true, &[]), ApprovalStatus::Validated);
    }
}
