//! Reviewer approval of submissions and corrections
//!
//! Each pending item moves to approved exactly once, or the action is a no-op
//! when the item is gone. The outcome is always reported back as text.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::business::{BusinessRepository, LocationUpdate};
use crate::services::correction::CorrectionRepository;

pub const APPROVE_SUBMISSION: &str = "admin_approve_submission";
pub const APPROVE_CORRECTION: &str = "admin_approve_correction";

/// What was being approved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalKind {
    Submission,
    Correction,
}

impl ApprovalKind {
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id {
            APPROVE_SUBMISSION => Some(ApprovalKind::Submission),
            APPROVE_CORRECTION => Some(ApprovalKind::Correction),
            _ => None,
        }
    }

    pub fn action_id(&self) -> &'static str {
        match self {
            ApprovalKind::Submission => APPROVE_SUBMISSION,
            ApprovalKind::Correction => APPROVE_CORRECTION,
        }
    }
}

impl fmt::Display for ApprovalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalKind::Submission => f.write_str("submission"),
            ApprovalKind::Correction => f.write_str("correction"),
        }
    }
}

/// Result of one approval action; its `Display` is the reply shown to the reviewer
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    SubmissionApproved {
        name: String,
        user: String,
    },
    CorrectionApproved {
        correction_id: i32,
        name: String,
        user: String,
    },
    NotFound {
        kind: ApprovalKind,
        id: i32,
    },
    /// The correction exists but the business it targets does not
    MissingBusiness {
        correction_id: i32,
        business_id: i32,
    },
    InvalidId {
        kind: ApprovalKind,
        value: String,
    },
    UnknownAction {
        action_id: String,
    },
    Failed {
        kind: ApprovalKind,
        id: i32,
        incident_id: Uuid,
    },
}

impl ApprovalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ApprovalOutcome::SubmissionApproved { .. } | ApprovalOutcome::CorrectionApproved { .. }
        )
    }
}

impl fmt::Display for ApprovalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalOutcome::SubmissionApproved { name, user } => {
                write!(f, "`{}` has been approved by `{}`", name, user)
            }
            ApprovalOutcome::CorrectionApproved {
                correction_id,
                name,
                user,
            } => write!(
                f,
                "Correction {} to `{}` has been approved by `{}`",
                correction_id, name, user
            ),
            ApprovalOutcome::NotFound { kind, id } => write!(
                f,
                "Failed to approve {} {}: it does not exist or was already approved",
                kind, id
            ),
            ApprovalOutcome::MissingBusiness {
                correction_id,
                business_id,
            } => write!(
                f,
                "Failed to approve correction {}: business {} does not exist",
                correction_id, business_id
            ),
            ApprovalOutcome::InvalidId { kind, value } => {
                write!(f, "Failed to approve {} {:?}: not a valid id", kind, value)
            }
            ApprovalOutcome::UnknownAction { action_id } => {
                write!(f, "Unknown action `{}`", action_id)
            }
            ApprovalOutcome::Failed {
                kind,
                id,
                incident_id,
            } => write!(
                f,
                "Failed to approve {} {} (incident {})",
                kind, id, incident_id
            ),
        }
    }
}

#[derive(Clone)]
pub struct ApprovalService {
    businesses: Arc<dyn BusinessRepository>,
    corrections: Arc<dyn CorrectionRepository>,
}

impl ApprovalService {
    pub fn new(
        businesses: Arc<dyn BusinessRepository>,
        corrections: Arc<dyn CorrectionRepository>,
    ) -> Self {
        Self {
            businesses,
            corrections,
        }
    }

    /// Run the approval named by `action_id` on the item whose id is `value`
    pub async fn handle(&self, action_id: &str, value: &str, user: &str) -> ApprovalOutcome {
        let Some(kind) = ApprovalKind::from_action_id(action_id) else {
            tracing::warn!(action_id, "Unknown approval action");
            return ApprovalOutcome::UnknownAction {
                action_id: action_id.to_string(),
            };
        };

        let Ok(id) = value.trim().parse::<i32>() else {
            return ApprovalOutcome::InvalidId {
                kind,
                value: value.to_string(),
            };
        };

        let result = match kind {
            ApprovalKind::Submission => self.approve_submission(id, user).await,
            ApprovalKind::Correction => self.approve_correction(id, user).await,
        };

        match result {
            Ok(outcome) => {
                tracing::info!(%kind, id, user, success = outcome.is_success(), "Approval handled");
                outcome
            }
            Err(e) => {
                let incident_id = Uuid::new_v4();
                tracing::error!(%incident_id, %kind, id, "Approval failed: {:?}", e);
                ApprovalOutcome::Failed {
                    kind,
                    id,
                    incident_id,
                }
            }
        }
    }

    async fn approve_submission(&self, id: i32, user: &str) -> AppResult<ApprovalOutcome> {
        let Some(mut business) = self.businesses.get(id, true).await? else {
            return Ok(ApprovalOutcome::NotFound {
                kind: ApprovalKind::Submission,
                id,
            });
        };

        business.active = true;
        business.updated_at = Utc::now();
        self.businesses.update(&business, LocationUpdate::Keep).await?;

        Ok(ApprovalOutcome::SubmissionApproved {
            name: business.name,
            user: user.to_string(),
        })
    }

    async fn approve_correction(&self, id: i32, user: &str) -> AppResult<ApprovalOutcome> {
        let Some(correction) = self.corrections.get(id).await? else {
            return Ok(ApprovalOutcome::NotFound {
                kind: ApprovalKind::Correction,
                id,
            });
        };

        let Some(mut business) = self.businesses.get(correction.business_id, true).await? else {
            return Ok(ApprovalOutcome::MissingBusiness {
                correction_id: id,
                business_id: correction.business_id,
            });
        };

        correction.apply_to(&mut business);
        business.updated_at = Utc::now();
        self.corrections.approve(&correction, &business).await?;

        Ok(ApprovalOutcome::CorrectionApproved {
            correction_id: id,
            name: business.name,
            user: user.to_string(),
        })
    }
}
