//! Pattern extraction from free-text note fields.

use once_cell::sync::Lazy;
use regex::Regex;

/// Generation patterns, tried in order; the first match wins.
static GENERATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[Đđ]ời\s*[Tt]hứ\s*(\d+)",
        r"[Đđ]ời\s*(\d+)",
        r"[Gg]en(?:eration)?\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("generation pattern is valid"))
    .collect()
});

static PHAI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[Pp]hái\s+(\w+)").expect("phai pattern is valid"));

static CHI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[Cc]hi\s+(\d+|\w+)").expect("chi pattern is valid"));

/// Largest generation number accepted from notes.
pub const MAX_GENERATION: i32 = 10_000;

/// Extract a generation number ("Đời thứ 5", "đời 5", "Gen 5").
///
/// Zero and values above [`MAX_GENERATION`] are not generations and yield
/// `None`.
pub fn extract_generation(text: &str) -> Option<i32> {
    GENERATION_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .filter(|gen| (1..=MAX_GENERATION).contains(gen))
}

/// Extract the clan branch label following "Phái".
pub fn extract_phai(text: &str) -> Option<String> {
    PHAI_PATTERN.captures(text).map(|caps| caps[1].to_string())
}

/// Extract the sub-branch label following "Chi".
pub fn extract_chi(text: &str) -> Option<String> {
    CHI_PATTERN.captures(text).map(|caps| caps[1].to_string())
}
