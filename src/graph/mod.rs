//! In-memory family graph.
//!
//! - [`RecordStore`] - individuals plus children, spouse and family-unit indices
//! - [`PropagationEngine`] - fixed-point generation inference over the store
//! - [`ClanMembership`] - predicate selecting the tracked family line
//!
//! # Usage
//!
//! ```ignore
//! use phado::graph::{surname_contains, PropagationEngine, RecordStore};
//!
//! let mut store = RecordStore::build(decoded.individuals);
//! let report = PropagationEngine::new(surname_contains("Đặng"), 20).run(&mut store);
//! println!("{} individuals left without a generation", report.unassigned);
//! ```

mod clan;
mod propagation;
mod store;

pub use clan::{surname_contains, Clan, ClanMembership, SurnameContains};
pub use propagation::{
    Assignment, Generations, InferenceRule, PassOutcome, PropagationEngine, PropagationReport,
};
pub use store::{DanglingReferences, PersonsView, RecordStore};
