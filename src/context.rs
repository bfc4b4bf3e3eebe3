//! Pipeline context shared by the services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::familyscript::{self, DecodeSummary};
use crate::graph::{surname_contains, Clan, PropagationEngine, PropagationReport, RecordStore};
use crate::models::Individual;

/// Root context holding the propagated graph and its configuration.
///
/// Built once per run (decode → index → propagate); services are derived
/// from it with `From<&Context>` and only read from it.
#[derive(Clone)]
pub struct Context {
    /// Individuals with generations assigned, plus relationship indices.
    pub store: Arc<RecordStore>,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Clan membership predicate.
    pub clan: Clan,
    /// Input file, when loaded from disk.
    pub source: Option<PathBuf>,
    pub decode: DecodeSummary,
    pub propagation: PropagationReport,
}

impl Context {
    /// Decode a FamilyScript file and run the full pipeline on it.
    pub fn load(path: &Path, config: Config) -> Result<Self, AppError> {
        let decoded = familyscript::decode_file(path)?;
        let mut ctx = Self::with_clan(
            decoded.individuals,
            surname_contains(config.lineage.clan_surname.clone()),
            config,
        );
        ctx.source = Some(path.to_path_buf());
        ctx.decode = decoded.summary;
        Ok(ctx)
    }

    /// Index and propagate already-decoded individuals.
    pub fn from_individuals(individuals: Vec<Individual>, config: Config) -> Self {
        let clan = surname_contains(config.lineage.clan_surname.clone());
        Self::with_clan(individuals, clan, config)
    }

    /// Same as [`Context::from_individuals`] with a custom clan predicate.
    pub fn with_clan(individuals: Vec<Individual>, clan: Clan, config: Config) -> Self {
        let decode = DecodeSummary {
            records: individuals.len(),
            ..Default::default()
        };
        let mut store = RecordStore::build(individuals);
        let propagation =
            PropagationEngine::new(clan.clone(), config.propagation.max_passes).run(&mut store);

        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            clan,
            source: None,
            decode,
            propagation,
        }
    }

    /// Founder identifier from configuration.
    pub fn founder_id(&self) -> &str {
        &self.config.lineage.founder_id
    }
}
