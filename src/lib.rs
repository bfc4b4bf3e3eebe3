//! phado - FamilyScript genealogy toolkit
//!
//! Decodes FamilyEcho exports, infers missing generation numbers along
//! parent links, detects lineage anomalies and projects descendant trees.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod familyscript;
pub mod graph;
pub mod models;
pub mod services;
