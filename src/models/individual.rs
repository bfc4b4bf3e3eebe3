//! Individual model representing one person in the family graph.

use serde::{Deserialize, Serialize};

/// Recorded gender of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Where an individual's generation number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationSource {
    /// Stated directly in the individual's notes.
    Explicit,
    /// Father's generation + 1.
    InferredFromFather,
    /// Mother's generation + 1 (clan mothers only).
    InferredFromMother,
    /// A child's generation - 1.
    InferredFromChild,
}

impl GenerationSource {
    /// Returns true for every source assigned by propagation.
    pub fn is_inferred(&self) -> bool {
        !matches!(self, GenerationSource::Explicit)
    }

    /// Tag used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSource::Explicit => "explicit",
            GenerationSource::InferredFromFather => "inferred-from-father",
            GenerationSource::InferredFromMother => "inferred-from-mother",
            GenerationSource::InferredFromChild => "inferred-from-child",
        }
    }
}

impl std::fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date where any component may be unknown.
///
/// FamilyScript stores dates as `YYYYMMDD`, frequently truncated to
/// `YYYY` or `YYYYMM`, and burial dates as `0000MMDD` when only the
/// anniversary is known. Zero components are treated as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// `dd/mm/yyyy` with `??` for unknown day or month; absent without a year.
    pub display: Option<String>,
}

impl PartialDate {
    pub fn new(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        let display = year.map(|y| {
            let part = |v: Option<u32>| v.map_or_else(|| "??".to_string(), |v| v.to_string());
            format!("{}/{}/{}", part(day), part(month), y)
        });
        Self {
            year,
            month,
            day,
            display,
        }
    }
}

/// Photo reference attached to an individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Image identifier inside the HTML export.
    pub image_id: String,
    pub width: u32,
    pub height: u32,
    /// Inline `data:` URL, filled in by photo extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

/// One person, as decoded from a FamilyScript line.
///
/// `generation` and `generation_source` are written only by the
/// propagation engine (or the decoder, for explicit values).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Unique identifier.
    pub id: String,
    /// Given name.
    pub name: String,
    pub surname: String,
    pub surname_at_birth: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<PartialDate>,
    pub birth_place: Option<String>,
    pub death_date: Option<PartialDate>,
    pub is_deceased: bool,
    pub burial_place: Option<String>,
    pub burial_date: Option<PartialDate>,
    /// Distance in generations from the founder.
    pub generation: Option<i32>,
    pub generation_source: Option<GenerationSource>,
    /// Relative an inferred generation was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_from: Option<String>,
    /// Clan branch label.
    pub phai: Option<String>,
    /// Clan sub-branch label.
    pub chi: Option<String>,
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
    pub spouse_ids: Vec<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<Photo>,
    pub profession: Option<String>,
    pub employer: Option<String>,
    pub interests: Option<String>,
    pub notes: String,
    pub activities: String,
}

impl Individual {
    /// Creates an individual with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// `"<surname> <name>"`, trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.surname, self.name).trim().to_string()
    }

    /// Birth year, if known.
    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.as_ref().and_then(|d| d.year)
    }

    /// True when the generation was stated in the source data.
    pub fn has_explicit_generation(&self) -> bool {
        self.generation.is_some() && self.generation_source == Some(GenerationSource::Explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_source_serialization() {
        let json = serde_json::to_string(&GenerationSource::InferredFromFather).unwrap();
        assert_eq!(json, "\"inferred-from-father\"");
        let json = serde_json::to_string(&GenerationSource::Explicit).unwrap();
        assert_eq!(json, "\"explicit\"");
        assert!(GenerationSource::InferredFromChild.is_inferred());
        assert!(!GenerationSource::Explicit.is_inferred());
    }

    #[test]
    fn test_partial_date_display() {
        assert_eq!(
            PartialDate::new(Some(1950), Some(3), Some(7)).display.as_deref(),
            Some("7/3/1950")
        );
        assert_eq!(
            PartialDate::new(Some(1950), None, None).display.as_deref(),
            Some("??/??/1950")
        );
        assert_eq!(PartialDate::new(None, Some(3), Some(7)).display, None);
    }

    #[test]
    fn test_display_name_trims_missing_parts() {
        let mut person = Individual::new("I1");
        person.name = "Văn An".to_string();
        assert_eq!(person.display_name(), "Văn An");
        person.surname = "Đặng".to_string();
        assert_eq!(person.display_name(), "Đặng Văn An");
    }
}
