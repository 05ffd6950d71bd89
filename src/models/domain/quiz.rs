use std::net::IpAddr;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A quiz as stored by the authoring subsystem. Read-only to this engine:
/// the access rules and answer keys are consumed, never written.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub created_by_user_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// SHA-256 hex of the access code; the plaintext is never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code_hash: Option<String>,
    /// CIDR allow-list. Empty means no IP restriction.
    #[serde(default)]
    pub allowed_networks: Vec<IpNetwork>,
    /// Explicit assignment. Empty means open to all students.
    #[serde(default)]
    pub assigned_student_ids: Vec<String>,
    pub questions: Vec<QuizQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub option_count: i16,
    /// Index of the correct option, the per-question answer key.
    pub correct_option: i16,
    pub order: i16,
}

impl Quiz {
    /// Window membership, inclusive at both ends.
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        if at < self.starts_at {
            return false;
        }
        match self.ends_at {
            Some(ends_at) => at <= ends_at,
            None => true,
        }
    }

    pub fn requires_access_code(&self) -> bool {
        self.access_code_hash.is_some()
    }

    pub fn access_code_matches(&self, submitted: &str) -> bool {
        match &self.access_code_hash {
            Some(stored) => hash_access_code(submitted) == *stored,
            None => true,
        }
    }

    /// Exact prefix-match against the allow-list. Only meaningful when the
    /// list is non-empty.
    pub fn allows_ip(&self, ip: IpAddr) -> bool {
        self.allowed_networks.is_empty()
            || self.allowed_networks.iter().any(|net| net.contains(ip))
    }

    pub fn is_assigned(&self, student_id: &str) -> bool {
        self.assigned_student_ids.is_empty()
            || self.assigned_student_ids.iter().any(|id| id == student_id)
    }
}

/// Same hashing used at quiz creation time; eligibility compares hex digests.
pub fn hash_access_code(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    format!("{:x}", digest)
}
