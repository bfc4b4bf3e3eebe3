//! Trace command handler.

use std::path::Path;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::error::AppError;
use crate::services::ValidationService;

use super::App;

impl App {
    /// Print the annotated father chain from the founder to `person_id`.
    pub fn run_trace(&self, input: &Path, person_id: &str) -> Result<()> {
        let ctx = self.load_context(input)?;
        let person = ctx
            .store
            .get(person_id)
            .ok_or_else(|| AppError::MissingEntity(person_id.to_string()))?;

        let service = ValidationService::from(&ctx);
        let chain = service.annotate_chain(person_id).ok_or_else(|| {
            eyre!(
                "No father chain from {} to founder {}",
                person_id,
                ctx.founder_id()
            )
        })?;

        let generation = match (person.generation, person.generation_source) {
            (Some(g), Some(source)) => format!("{g} ({source})"),
            (Some(g), None) => g.to_string(),
            (None, _) => "unknown".to_string(),
        };
        println!("{} ({}), generation {}", person.display_name(), person.id, generation);
        for link in &chain {
            let recorded = link
                .recorded
                .map_or_else(|| "-".to_string(), |g| g.to_string());
            let flag = if link.conflict { "  CONFLICT" } else { "" };
            println!(
                "  {:>3}  {:<12} {:<30} recorded {}{}",
                link.expected, link.id, link.name, recorded, flag
            );
        }
        Ok(())
    }
}
