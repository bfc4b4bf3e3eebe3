//! Anomaly findings produced by lineage validation.

use serde::{Deserialize, Serialize};

/// How urgently a finding needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Medium,
    High,
}

/// Kind of anomaly, with the details specific to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    /// Child generation is not father generation + 1.
    GenMismatch {
        father_id: String,
        father_name: String,
        father_generation: i32,
        actual: i32,
        expected: i32,
    },
    /// Clan member with no parent and no children on record.
    Orphan,
    /// Given name is empty or a placeholder token.
    InvalidName { name: String },
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::GenMismatch { .. } => Severity::High,
            FindingKind::Orphan => Severity::Medium,
            FindingKind::InvalidName { .. } => Severity::High,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::GenMismatch { .. } => "GEN_MISMATCH",
            FindingKind::Orphan => "ORPHAN",
            FindingKind::InvalidName { .. } => "INVALID_NAME",
        }
    }
}

/// A single data-quality finding about one individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(flatten)]
    pub kind: FindingKind,
    pub severity: Severity,
    pub person_id: String,
    pub person_name: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        person_id: impl Into<String>,
        person_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            person_id: person_id.into(),
            person_name: person_name.into(),
            message: message.into(),
        }
    }
}

/// One link of an ancestor chain, annotated with the generation its
/// position in the chain implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub id: String,
    pub name: String,
    /// Generation stated in the source data, if any.
    pub recorded: Option<i32>,
    /// Generation implied by the distance from the founder.
    pub expected: i32,
    /// True when `recorded` is present and disagrees with `expected`.
    pub conflict: bool,
}

/// Root-cause trace for an individual with an implausible generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageTrace {
    pub person_id: String,
    pub person_name: String,
    /// Generation after propagation.
    pub computed: i32,
    /// Father chain from the founder down to the individual, when one exists.
    pub chain: Option<Vec<ChainLink>>,
}

impl LineageTrace {
    /// Links whose recorded generation contradicts their chain position.
    pub fn conflicts(&self) -> impl Iterator<Item = &ChainLink> {
        self.chain.iter().flatten().filter(|link| link.conflict)
    }
}
