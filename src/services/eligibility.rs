use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::Quiz;

/// Per-request facts the evaluator needs: the clock, the caller's source IP
/// (when the boundary layer could determine one) and the submitted access
/// code, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct EligibilityContext {
    pub now: DateTime<Utc>,
    pub source_ip: Option<IpAddr>,
    pub access_code: Option<String>,
}

/// Summary of an earlier accepted submission for the same (student, quiz)
/// pair, derived from the stored result or, failing that, the consumed
/// ticket.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PriorSubmission {
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i16>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeWindowCheck {
    Open,
    NotYetOpen { opens_at: DateTime<Utc> },
    Closed { closed_at: DateTime<Utc> },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccessCodeCheck {
    NotRequired,
    Accepted,
    Missing,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpCheck {
    Unrestricted,
    Allowed,
    /// An allow-list is configured but the request carried no usable source
    /// address; treated as not allowed.
    SourceUnknown,
    Denied {
        source_ip: IpAddr,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentCheck {
    Open,
    Assigned,
    NotAssigned,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionCheck {
    NoPriorSubmission,
    AlreadySubmitted { prior: PriorSubmission },
}

impl TimeWindowCheck {
    pub fn passed(&self) -> bool {
        matches!(self, TimeWindowCheck::Open)
    }
}

impl AccessCodeCheck {
    pub fn passed(&self) -> bool {
        matches!(self, AccessCodeCheck::NotRequired | AccessCodeCheck::Accepted)
    }
}

impl IpCheck {
    pub fn passed(&self) -> bool {
        matches!(self, IpCheck::Unrestricted | IpCheck::Allowed)
    }
}

impl AssignmentCheck {
    pub fn passed(&self) -> bool {
        matches!(self, AssignmentCheck::Open | AssignmentCheck::Assigned)
    }
}

impl SubmissionCheck {
    pub fn passed(&self) -> bool {
        matches!(self, SubmissionCheck::NoPriorSubmission)
    }
}

/// All five predicates are always evaluated and reported, even when an
/// earlier one already failed; callers need the full breakdown for
/// diagnostics.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EligibilityReasons {
    pub within_time_window: TimeWindowCheck,
    pub access_code_ok: AccessCodeCheck,
    pub ip_allowed: IpCheck,
    pub assignment_ok: AssignmentCheck,
    pub submission_ok: SubmissionCheck,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EligibilityVerdict {
    pub is_eligible: bool,
    pub reasons: EligibilityReasons,
}

/// Pure eligibility decision: no side effects, safe to call repeatedly and
/// concurrently. `prior` is the caller-supplied submission history for this
/// (student, quiz) pair; an Issued-but-unconsumed ticket deliberately does
/// not appear here, it never blocks eligibility.
pub fn evaluate(
    quiz: &Quiz,
    student_id: &str,
    context: &EligibilityContext,
    prior: Option<PriorSubmission>,
) -> EligibilityVerdict {
    let within_time_window = if context.now < quiz.starts_at {
        TimeWindowCheck::NotYetOpen {
            opens_at: quiz.starts_at,
        }
    } else {
        match quiz.ends_at {
            Some(ends_at) if context.now > ends_at => TimeWindowCheck::Closed {
                closed_at: ends_at,
            },
            _ => TimeWindowCheck::Open,
        }
    };

    let access_code_ok = if !quiz.requires_access_code() {
        AccessCodeCheck::NotRequired
    } else {
        match context.access_code.as_deref() {
            None => AccessCodeCheck::Missing,
            Some(code) if quiz.access_code_matches(code) => AccessCodeCheck::Accepted,
            Some(_) => AccessCodeCheck::Incorrect,
        }
    };

    let ip_allowed = if quiz.allowed_networks.is_empty() {
        IpCheck::Unrestricted
    } else {
        match context.source_ip {
            None => IpCheck::SourceUnknown,
            Some(ip) if quiz.allows_ip(ip) => IpCheck::Allowed,
            Some(ip) => IpCheck::Denied { source_ip: ip },
        }
    };

    let assignment_ok = if quiz.assigned_student_ids.is_empty() {
        AssignmentCheck::Open
    } else if quiz.is_assigned(student_id) {
        AssignmentCheck::Assigned
    } else {
        AssignmentCheck::NotAssigned
    };

    let submission_ok = match prior {
        None => SubmissionCheck::NoPriorSubmission,
        Some(prior) => SubmissionCheck::AlreadySubmitted { prior },
    };

    let is_eligible = within_time_window.passed()
        && access_code_ok.passed()
        && ip_allowed.passed()
        && assignment_ok.passed()
        && submission_ok.passed();

    EligibilityVerdict {
        is_eligible,
        reasons: EligibilityReasons {
            within_time_window,
            access_code_ok,
            ip_allowed,
            assignment_ok,
            submission_ok,
        },
    }
}
