//! Domain models for the family graph.

mod family;
mod finding;
mod individual;
mod tree;

pub use family::FamilyUnit;
pub use finding::{ChainLink, Finding, FindingKind, LineageTrace, Severity};
pub use individual::{Gender, GenerationSource, Individual, PartialDate, Photo};
pub use tree::TreeNode;
