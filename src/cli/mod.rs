//! CLI module for phado.
//!
//! Subcommands:
//! - `convert`: Run the full pipeline and write every export
//! - `check`: Print the anomaly report
//! - `trace`: Print the father chain of one individual
//! - `tree`: Print the descendant tree as JSON
//! - `photos`: Attach photos from an HTML export to a dataset

mod check;
mod convert;
mod photos;
mod trace;
mod tree;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::context::Context;

pub use photos::PhotosCommand;

/// phado - FamilyScript genealogy converter and checker
#[derive(Parser)]
#[command(name = "phado")]
#[command(about = "Convert FamilyEcho genealogies, infer generations and check lineage data")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Explicit configuration file, layered over user and project files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the founder identifier
    #[arg(long, global = true)]
    pub founder: Option<String>,

    /// Override the surname fragment identifying clan members
    #[arg(long, global = true)]
    pub clan_surname: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a FamilyScript file into JSON datasets and reports
    Convert {
        /// FamilyScript input file
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check lineage data and print the anomaly report
    Check {
        /// FamilyScript input file
        input: PathBuf,

        /// Print findings as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Trace the father chain from an individual up to the founder
    Trace {
        /// FamilyScript input file
        input: PathBuf,

        /// Individual to trace
        person_id: String,
    },

    /// Print the descendant tree as JSON
    Tree {
        /// FamilyScript input file
        input: PathBuf,

        /// Root individual (defaults to the founder)
        #[arg(long)]
        root: Option<String>,

        /// Maximum depth below the root
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Attach photos from a FamilyEcho HTML export to a dataset
    Photos(PhotosCommand),
}

impl App {
    /// Run the CLI application.
    pub fn run(self) -> color_eyre::Result<()> {
        match &self.command {
            Command::Convert { input, output } => self.run_convert(input, output.as_deref()),
            Command::Check { input, json } => self.run_check(input, *json),
            Command::Trace { input, person_id } => self.run_trace(input, person_id),
            Command::Tree { input, root, depth } => {
                self.run_tree(input, root.as_deref(), *depth)
            }
            Command::Photos(cmd) => cmd.run(),
        }
    }

    /// Resolve configuration and apply command-line overrides.
    fn load_config(&self) -> color_eyre::Result<Config> {
        let mut config = Config::load_with(self.config.as_deref())?;
        if let Some(founder) = &self.founder {
            config.lineage.founder_id = founder.clone();
        }
        if let Some(surname) = &self.clan_surname {
            config.lineage.clan_surname = surname.clone();
        }
        tracing::debug!(
            "Lineage: {} (founder {}, clan surname {})",
            config.lineage.family_name,
            config.lineage.founder_id,
            config.lineage.clan_surname
        );
        Ok(config)
    }

    /// Decode, index and propagate `input`.
    fn load_context(&self, input: &Path) -> color_eyre::Result<Context> {
        let config = self.load_config()?;
        let ctx = Context::load(input, config)?;
        let report = &ctx.propagation;
        tracing::info!(
            "Generations after {} passes: {} explicit, {} inferred, {} unknown",
            report.passes,
            report.explicit,
            report.inferred,
            report.unassigned
        );
        if !report.converged {
            tracing::warn!("Propagation stopped at the pass cap before converging");
        }
        let dangling = ctx.store.dangling();
        if dangling.total() > 0 {
            tracing::warn!(
                "{} dangling references ({} father, {} mother, {} spouse)",
                dangling.total(),
                dangling.father,
                dangling.mother,
                dangling.spouse
            );
        }
        Ok(ctx)
    }
}
