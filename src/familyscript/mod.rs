//! FamilyScript decoder.
//!
//! FamilyScript is the flat export format of FamilyEcho: one line per
//! individual, starting with `i<ID>`, followed by tab-separated fields whose
//! first character tags the field:
//!
//! | Prefix | Field                 | Prefix | Field            |
//! |--------|-----------------------|--------|------------------|
//! | `p`    | given name            | `s`    | spouse id        |
//! | `l`    | surname               | `a`    | address          |
//! | `q`    | surname at birth      | `e`    | email            |
//! | `g`    | gender (`m`/`f`)      | `u`    | phone            |
//! | `b`    | birth date            | `r`    | photo reference  |
//! | `d`    | death date            | `v`    | birth place      |
//! | `F`    | burial date           | `U`    | burial place     |
//! | `z`    | deceased (`1`)        | `I`    | interests        |
//! | `f`    | father id             | `j`    | profession       |
//! | `m`    | mother id             | `E`    | employer         |
//! | `o`    | notes                 | `A`    | activities       |
//!
//! Generation, phái and chi are pulled out of the notes with patterns.
//! Malformed fields are dropped; they never abort the record or the file.

mod notes;

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;
use crate::models::{Gender, GenerationSource, Individual, PartialDate, Photo};

pub use notes::{extract_chi, extract_generation, extract_phai, MAX_GENERATION};

static RECORD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^i([A-Z0-9]+)\t").expect("record id pattern is valid"));

/// Counters describing a decoded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Lines read.
    pub lines: usize,
    /// Individual records produced.
    pub records: usize,
    /// Lines that looked like records but had no valid identifier.
    pub skipped: usize,
    /// Records that replaced an earlier record with the same identifier.
    pub duplicates: usize,
}

/// Decoded individuals, in input order, plus counters.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub individuals: Vec<Individual>,
    pub summary: DecodeSummary,
}

/// Read and decode a FamilyScript file.
pub fn decode_file(path: &Path) -> Result<Decoded, AppError> {
    tracing::info!("Reading FamilyScript file: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let decoded = decode_str(&content);
    tracing::info!(
        "Decoded {} individuals ({} lines, {} skipped, {} duplicates)",
        decoded.summary.records,
        decoded.summary.lines,
        decoded.summary.skipped,
        decoded.summary.duplicates
    );
    Ok(decoded)
}

/// Decode every record line in a FamilyScript document.
///
/// A later record with an already-seen identifier replaces the earlier one
/// in place, keeping the original position.
pub fn decode_str(content: &str) -> Decoded {
    let mut decoded = Decoded::default();
    let mut positions = std::collections::HashMap::new();

    for line in content.lines() {
        decoded.summary.lines += 1;
        let line = line.trim();
        if !line.starts_with('i') {
            continue;
        }

        let Some(individual) = decode_line(line) else {
            tracing::debug!("Skipping line without a valid record id: {:.40}", line);
            decoded.summary.skipped += 1;
            continue;
        };

        match positions.get(&individual.id) {
            Some(&pos) => {
                tracing::warn!("Duplicate record {}, keeping the later line", individual.id);
                decoded.individuals[pos] = individual;
                decoded.summary.duplicates += 1;
            }
            None => {
                positions.insert(individual.id.clone(), decoded.individuals.len());
                decoded.individuals.push(individual);
            }
        }
    }

    decoded.summary.records = decoded.individuals.len();
    decoded
}

/// Decode one record line. Returns `None` when the line has no valid id.
pub fn decode_line(line: &str) -> Option<Individual> {
    let line = line.trim();
    let id = RECORD_ID.captures(line)?[1].to_string();

    let mut person = Individual::new(id);
    let mut notes_parts: Vec<&str> = Vec::new();

    for field in line.split('\t').skip(1) {
        let mut chars = field.chars();
        let Some(prefix) = chars.next() else {
            continue;
        };
        let value = chars.as_str();

        match prefix {
            'p' => person.name = value.to_string(),
            'l' => person.surname = value.to_string(),
            'q' => person.surname_at_birth = value.to_string(),
            'g' => {
                person.gender = match value {
                    "m" => Some(Gender::Male),
                    "f" => Some(Gender::Female),
                    _ => None,
                }
            }
            'b' => person.birth_date = parse_date(value),
            'd' => person.death_date = parse_date(value),
            'F' => person.burial_date = parse_date(value),
            'z' if value == "1" => person.is_deceased = true,
            'f' => person.father_id = non_empty(value),
            'm' if value.chars().next().is_some_and(char::is_uppercase) => {
                person.mother_id = Some(value.to_string())
            }
            's' => {
                if !value.is_empty() && !person.spouse_ids.iter().any(|s| s == value) {
                    person.spouse_ids.push(value.to_string());
                }
            }
            'a' => person.address = Some(value.to_string()),
            'e' => person.email = Some(value.to_string()),
            'u' => person.phone = Some(value.to_string()),
            'r' => person.photo = parse_photo(value),
            'v' => person.birth_place = Some(value.to_string()),
            'U' => person.burial_place = Some(value.to_string()),
            'I' => person.interests = Some(value.to_string()),
            'j' => person.profession = Some(value.to_string()),
            'E' => person.employer = Some(value.to_string()),
            'o' => {
                notes_parts.push(value);
                if let Some(gen) = extract_generation(value) {
                    person.generation = Some(gen);
                    person.generation_source = Some(GenerationSource::Explicit);
                }
                if let Some(phai) = extract_phai(value) {
                    person.phai = Some(phai);
                }
                if let Some(chi) = extract_chi(value) {
                    person.chi = Some(chi);
                }
            }
            'A' => {
                person.activities = value.to_string();
                if person.generation.is_none() {
                    if let Some(gen) = extract_generation(value) {
                        person.generation = Some(gen);
                        person.generation_source = Some(GenerationSource::Explicit);
                    }
                }
            }
            _ => {}
        }
    }

    person.notes = notes_parts.join(" | ");
    Some(person)
}

/// Parse a `YYYYMMDD`-style date, allowing truncation after year or month.
pub fn parse_date(value: &str) -> Option<PartialDate> {
    if value.len() < 4 || !value.is_char_boundary(4) {
        return None;
    }

    let component = |range: std::ops::Range<usize>| -> Result<Option<u32>, ()> {
        match value.get(range) {
            Some(s) if !s.is_empty() => s.parse::<u32>().map(Some).map_err(|_| ()),
            _ => Ok(None),
        }
    };

    let year = component(0..4).ok()?;
    let month = if value.len() >= 6 { component(4..6).ok()? } else { None };
    let day = if value.len() >= 8 { component(6..8).ok()? } else { None };

    let known = |v: Option<u32>| v.filter(|v| *v != 0);
    Some(PartialDate::new(
        known(year).map(|y| y as i32),
        known(month),
        known(day),
    ))
}

/// Parse `<image_id> <width> <height>`.
fn parse_photo(value: &str) -> Option<Photo> {
    let mut parts = value.split_whitespace();
    let image_id = parts.next()?.to_string();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some(Photo {
        image_id,
        width,
        height,
        data_url: None,
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
