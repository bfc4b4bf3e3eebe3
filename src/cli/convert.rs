//! Convert command handler.

use std::path::Path;

use color_eyre::Result;

use crate::services::{ExportService, Statistics};

use super::App;

impl App {
    /// Run the full pipeline and write every export.
    pub fn run_convert(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let ctx = self.load_context(input)?;
        let out_dir = output
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        let summary = ExportService::from(&ctx).write_all(&out_dir)?;
        let stats = Statistics::compute(&ctx.store);

        println!("Members:      {}", stats.total_members);
        println!("Families:     {}", stats.total_families);
        println!("Male/female:  {}/{}", stats.male_count, stats.female_count);
        println!("Alive/dead:   {}/{}", stats.alive_count, stats.deceased_count);
        if let (Some(min), Some(max)) = (stats.min_generation, stats.max_generation) {
            println!("Generations:  {} - {}", min, max);
        }
        for (generation, bucket) in &stats.generations {
            println!("  generation {:>3}: {} members", generation, bucket.count);
        }
        println!("Issues:       {}", summary.report.issue_count);
        for file in &summary.files {
            println!("Wrote {}", file.display());
        }
        Ok(())
    }
}
