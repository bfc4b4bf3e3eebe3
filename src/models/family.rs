//! Family unit: a parent couple and their shared children.

use serde::{Deserialize, Serialize};

/// A parent pair plus the children recorded with exactly that pair.
///
/// Family units are derived by the record store and never authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyUnit {
    /// Stable identifier (`F1`, `F2`, ...) in first-encountered order.
    pub id: String,
    pub husband_id: String,
    pub wife_id: String,
    pub children_ids: Vec<String>,
}
