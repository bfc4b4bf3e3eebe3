//! Check command handler.

use std::path::Path;

use color_eyre::Result;

use crate::services::{ExportService, ValidationService};

use super::App;

impl App {
    /// Validate the input and print the findings.
    pub fn run_check(&self, input: &Path, json: bool) -> Result<()> {
        let ctx = self.load_context(input)?;
        let report = ValidationService::from(&ctx).validate();

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", ExportService::from(&ctx).render_anomaly_report(&report));
        }
        Ok(())
    }
}
