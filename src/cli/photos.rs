//! Photos subcommand - attach inline images to an exported dataset.

use std::path::PathBuf;

use clap::Parser;

use crate::services::attach_photos;

/// Attach photos from a FamilyEcho HTML export to a dataset.
#[derive(Parser)]
pub struct PhotosCommand {
    /// FamilyEcho HTML export containing inline images.
    pub html: PathBuf,

    /// Dataset JSON produced by `convert`.
    pub dataset: PathBuf,

    /// Output directory (defaults to the dataset's directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PhotosCommand {
    /// Run the photos command.
    pub fn run(&self) -> color_eyre::Result<()> {
        let export = attach_photos(&self.html, &self.dataset, self.output.as_deref())?;
        println!("Updated {} persons with photos", export.updated);
        println!("Wrote {}", export.dataset.display());
        println!("Wrote {}", export.photos_map.display());
        Ok(())
    }
}
