//! Photo extraction from FamilyEcho HTML exports.
//!
//! The HTML export carries every portrait as a hidden inline image
//! (`ID="image-<n>" SRC="data:image/...;base64,..."`) and the embedded
//! FamilyScript lines reference them through the `r` field. Matching both
//! lets an exported dataset be enriched with the actual image data.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::familyscript;
use crate::models::Photo;

pub const PHOTOS_MAP_FILE: &str = "photos_map.json";

static IMAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"ID="image-(\d+)"\s+SRC="(data:image/[^;]+;base64,([^"]+))""#)
        .expect("image tag pattern is valid")
});

/// Images and photo references found in one HTML export.
#[derive(Debug, Default)]
pub struct PhotoIndex {
    /// Image id → data URL.
    pub images: HashMap<String, String>,
    /// Person id → photo reference.
    pub references: BTreeMap<String, Photo>,
}

impl PhotoIndex {
    pub fn from_html(html: &str) -> Self {
        let index = Self {
            images: extract_images(html),
            references: extract_photo_references(html),
        };
        tracing::info!(
            "Found {} images and {} persons with photos",
            index.images.len(),
            index.references.len()
        );
        index
    }

    /// Data URL for a person, when both the reference and the image exist.
    pub fn data_url(&self, person_id: &str) -> Option<&str> {
        let photo = self.references.get(person_id)?;
        self.images.get(&photo.image_id).map(String::as_str)
    }

    /// Person id → data URL for every resolvable reference.
    pub fn photos_map(&self) -> BTreeMap<&str, &str> {
        self.references
            .keys()
            .filter_map(|id| Some((id.as_str(), self.data_url(id)?)))
            .collect()
    }

    /// Set `photo` on every matching person of an exported dataset.
    ///
    /// Returns the number of persons updated.
    pub fn attach(&self, dataset: &mut Value) -> Result<usize, AppError> {
        let persons = dataset
            .get_mut("persons")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| AppError::Photo("dataset has no \"persons\" object".to_string()))?;

        let mut updated = 0;
        for (person_id, photo) in &self.references {
            let Some(person) = persons.get_mut(person_id).and_then(Value::as_object_mut) else {
                continue;
            };
            let Some(data_url) = self.images.get(&photo.image_id) else {
                tracing::debug!("Image {} for {} not found", photo.image_id, person_id);
                continue;
            };
            person.insert(
                "photo".to_string(),
                json!({
                    "data_url": data_url,
                    "width": photo.width,
                    "height": photo.height,
                }),
            );
            updated += 1;
        }
        tracing::info!("Updated {} persons with photo data", updated);
        Ok(updated)
    }
}

/// Collect inline images whose payload is valid base64.
pub fn extract_images(html: &str) -> HashMap<String, String> {
    IMAGE_TAG
        .captures_iter(html)
        .filter_map(|caps| {
            let image_id = &caps[1];
            if let Err(e) = STANDARD.decode(&caps[3]) {
                tracing::warn!("Skipping image {}: invalid base64 payload ({})", image_id, e);
                return None;
            }
            Some((image_id.to_string(), caps[2].to_string()))
        })
        .collect()
}

/// Collect photo references from the FamilyScript lines embedded in the HTML.
pub fn extract_photo_references(html: &str) -> BTreeMap<String, Photo> {
    html.lines()
        .filter_map(familyscript::decode_line)
        .filter_map(|person| Some((person.id, person.photo?)))
        .collect()
}

/// Files produced by [`attach_photos`].
#[derive(Debug, Clone)]
pub struct PhotoExport {
    pub dataset: PathBuf,
    pub photos_map: PathBuf,
    pub updated: usize,
}

/// Enrich `dataset_path` with photos from `html_path`.
///
/// Writes `<stem>_with_photos.json` and `photos_map.json` into `out_dir`,
/// defaulting to the dataset's directory.
pub fn attach_photos(
    html_path: &Path,
    dataset_path: &Path,
    out_dir: Option<&Path>,
) -> Result<PhotoExport, AppError> {
    tracing::info!("Reading {}", html_path.display());
    let index = PhotoIndex::from_html(&fs::read_to_string(html_path)?);

    tracing::info!("Reading {}", dataset_path.display());
    let mut dataset: Value = serde_json::from_str(&fs::read_to_string(dataset_path)?)?;
    let updated = index.attach(&mut dataset)?;

    let out_dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| dataset_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    fs::create_dir_all(&out_dir)?;

    let stem = dataset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Invalid dataset path: {}", dataset_path.display()))
        })?;
    let dataset_out = out_dir.join(format!("{stem}_with_photos.json"));
    fs::write(&dataset_out, serde_json::to_string_pretty(&dataset)?)?;
    tracing::info!("Saved {}", dataset_out.display());

    let map_out = out_dir.join(PHOTOS_MAP_FILE);
    fs::write(&map_out, serde_json::to_string(&index.photos_map())?)?;
    tracing::info!("Saved {}", map_out.display());

    Ok(PhotoExport {
        dataset: dataset_out,
        photos_map: map_out,
        updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" in base64
    const PAYLOAD: &str = "aGVsbG8=";

    fn html() -> String {
        format!(
            "<html>\n\
             <IMG WIDTH=0 HEIGHT=0 ID=\"image-111\" SRC=\"data:image/jpeg;base64,{PAYLOAD}\">\n\
             <IMG WIDTH=0 HEIGHT=0 ID=\"image-222\" SRC=\"data:image/png;base64,@@not base64@@\">\n\
             iSTART\tpTổ\tlĐặng\tr111 160 118\n\
             iB\tpBình\tr222 10 20\n\
             iC\tpCường\n\
             </html>\n"
        )
    }

    #[test]
    fn test_extract_images_skips_invalid_payload() {
        let images = extract_images(&html());
        assert_eq!(images.len(), 1);
        assert_eq!(images["111"], format!("data:image/jpeg;base64,{PAYLOAD}"));
    }

    #[test]
    fn test_extract_photo_references() {
        let refs = extract_photo_references(&html());
        assert_eq!(refs.len(), 2);
        assert_eq!(refs["START"].image_id, "111");
        assert_eq!((refs["START"].width, refs["START"].height), (160, 118));
        assert_eq!(refs["B"].image_id, "222");
    }

    #[test]
    fn test_attach_only_resolvable_photos() {
        let index = PhotoIndex::from_html(&html());
        let mut dataset = json!({
            "persons": {
                "START": {"id": "START"},
                "B": {"id": "B"},
                "C": {"id": "C"}
            }
        });
        assert_eq!(index.attach(&mut dataset).unwrap(), 1);
        assert_eq!(dataset["persons"]["START"]["photo"]["width"], 160);
        assert!(dataset["persons"]["B"].get("photo").is_none());
        assert_eq!(index.photos_map().len(), 1);
    }

    #[test]
    fn test_attach_requires_persons() {
        let index = PhotoIndex::default();
        let mut dataset = json!({"metadata": {}});
        assert!(matches!(index.attach(&mut dataset), Err(AppError::Photo(_))));
    }

    #[test]
    fn test_attach_photos_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let html_path = dir.path().join("family-tree.html");
        let dataset_path = dir.path().join("family_data.json");
        fs::write(&html_path, html()).unwrap();
        fs::write(&dataset_path, r#"{"persons":{"START":{"id":"START"}}}"#).unwrap();

        let export = attach_photos(&html_path, &dataset_path, None).unwrap();
        assert_eq!(export.updated, 1);
        assert_eq!(export.dataset, dir.path().join("family_data_with_photos.json"));

        let map: Value =
            serde_json::from_str(&fs::read_to_string(export.photos_map).unwrap()).unwrap();
        assert_eq!(map["START"], format!("data:image/jpeg;base64,{PAYLOAD}"));
    }
}
