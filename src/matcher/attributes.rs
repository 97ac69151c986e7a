//! Material attribute extraction from free text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::color::{color_family, ColorFamily};
use super::normalize::normalize;

/// Broad material category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Bead,
    Thread,
    Hook,
    Wire,
    Other,
}

impl MaterialKind {
    /// Lowercase kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bead => "bead",
            Self::Thread => "thread",
            Self::Hook => "hook",
            Self::Wire => "wire",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plating or finish of metal components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    NickelSilver,
    GoldBrass,
    Black,
}

/// Bead/cone composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    Tungsten,
    Brass,
}

/// Attributes derived once from a free-text material description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAttributes {
    /// Material kind
    pub kind: MaterialKind,
    /// Color family
    pub color_family: ColorFamily,
    /// Bead diameter in millimeters
    pub size_mm: Option<f32>,
    /// Finish, when recognizable
    pub finish: Option<Finish>,
    /// Weight class, when recognizable
    pub weight_class: Option<WeightClass>,
}

/// Kind tokens in priority order. Beads come first since they are the most
/// size-sensitive category.
const KIND_TOKENS: &[(MaterialKind, &str)] = &[
    (MaterialKind::Bead, r"\bbeads?\b"),
    (MaterialKind::Thread, r"\bthreads?\b"),
    (MaterialKind::Hook, r"\bhooks?\b"),
    (MaterialKind::Wire, r"\bwires?\b"),
];

lazy_static::lazy_static! {
    static ref KIND_RULES: Vec<(MaterialKind, Regex)> = KIND_TOKENS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).unwrap()))
        .collect();
    static ref MM_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*mm").unwrap();
    static ref FRACTION_RE: Regex = Regex::new(r#"(\d+)\s*/\s*(\d+)\s*(?:in\b|")?"#).unwrap();
    static ref TUNGSTEN_RE: Regex = Regex::new(r"\btungsten\b|\bwt\b").unwrap();
    static ref BRASS_RE: Regex = Regex::new(r"\bbrass\b").unwrap();
    static ref NICKEL_RE: Regex = Regex::new(r"\b(?:nickel|silver|chrome)\b").unwrap();
    static ref GOLD_RE: Regex = Regex::new(r"\b(?:gold|brass)\b").unwrap();
    static ref BLACK_RE: Regex = Regex::new(r"\b(?:black|gunmetal)\b").unwrap();
}

/// Detect the material kind from whole-word tokens
pub fn material_kind(text: &str) -> MaterialKind {
    let normalized = normalize(text);
    KIND_RULES
        .iter()
        .find(|(_, re)| re.is_match(&normalized))
        .map_or(MaterialKind::Other, |(kind, _)| *kind)
}

/// Parse a diameter in millimeters from `2.8mm` or `3/32"` style notation.
///
/// The explicit millimeter form wins when both are present. Fractions are
/// converted from inches and rounded to one decimal place; thread sizes
/// such as `6/0` are passed over.
pub fn parse_size_mm(text: &str) -> Option<f32> {
    let lower = text.to_lowercase();

    if let Some(caps) = MM_RE.captures(&lower) {
        return caps[1].parse::<f32>().ok();
    }

    FRACTION_RE.captures_iter(&lower).find_map(|caps| {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some((((num / den) * 25.4 * 10.0).round() / 10.0) as f32)
    })
}

fn finish(normalized: &str) -> Option<Finish> {
    if NICKEL_RE.is_match(normalized) {
        Some(Finish::NickelSilver)
    } else if GOLD_RE.is_match(normalized) {
        Some(Finish::GoldBrass)
    } else if BLACK_RE.is_match(normalized) {
        Some(Finish::Black)
    } else {
        None
    }
}

fn weight_class(normalized: &str) -> Option<WeightClass> {
    if TUNGSTEN_RE.is_match(normalized) {
        Some(WeightClass::Tungsten)
    } else if BRASS_RE.is_match(normalized) {
        Some(WeightClass::Brass)
    } else {
        None
    }
}

impl MaterialAttributes {
    /// Derive all attributes from free text
    pub fn extract(text: &str) -> Self {
        let normalized = normalize(text);
        let kind = material_kind(text);
        let size_mm = match kind {
            MaterialKind::Bead => parse_size_mm(text),
            _ => None,
        };

        Self {
            kind,
            color_family: color_family(text),
            size_mm,
            finish: finish(&normalized),
            weight_class: weight_class(&normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        assert_eq!(material_kind("UTC 70D Thread"), MaterialKind::Thread);
        assert_eq!(material_kind("Tiemco 2488 Hook"), MaterialKind::Hook);
        assert_eq!(material_kind("Ultra Wire - Brassie"), MaterialKind::Wire);
        assert_eq!(material_kind("Slotted Tungsten Beads"), MaterialKind::Bead);
        assert_eq!(material_kind("Peacock Herl"), MaterialKind::Other);
        assert_eq!(material_kind(""), MaterialKind::Other);
    }

    #[test]
    fn test_kind_whole_word_only() {
        assert_eq!(material_kind("Threadbare dubbing"), MaterialKind::Other);
        assert_eq!(material_kind("Beadhead"), MaterialKind::Other);
    }

    #[test]
    fn test_kind_priority() {
        assert_eq!(material_kind("Bead on thread"), MaterialKind::Bead);
        assert_eq!(material_kind("Thread for hook"), MaterialKind::Thread);
        assert_eq!(material_kind("Hook wire guard"), MaterialKind::Hook);
    }

    #[test]
    fn test_size_mm() {
        assert_eq!(parse_size_mm("Bead 2.8mm"), Some(2.8));
        assert_eq!(parse_size_mm("Bead 3 mm gold"), Some(3.0));
        assert_eq!(parse_size_mm("no size here"), None);
    }

    #[test]
    fn test_size_fraction() {
        // 3/32 * 25.4 = 2.38 -> 2.4
        assert_eq!(parse_size_mm("MFC 3/32\" Brass Bead"), Some(2.4));
        // 1/8 * 25.4 = 3.175 -> 3.2
        assert_eq!(parse_size_mm("1/8 in bead"), Some(3.2));
        assert_eq!(parse_size_mm("bead 3/0"), None);
    }

    #[test]
    fn test_size_skips_thread_sizes() {
        assert_eq!(parse_size_mm("Tungsten Bead for 6/0 thread 3/32\""), Some(2.4));
        assert_eq!(parse_size_mm("Bead 8/0 and 3/0 thread"), None);
    }

    #[test]
    fn test_mm_takes_precedence() {
        assert_eq!(parse_size_mm("Bead 1/8\" (3.3mm)"), Some(3.3));
    }

    #[test]
    fn test_size_only_for_beads() {
        assert_eq!(MaterialAttributes::extract("Tungsten Bead 2.0mm").size_mm, Some(2.0));
        assert_eq!(MaterialAttributes::extract("Thread 8/0").size_mm, None);
        assert_eq!(MaterialAttributes::extract("Wire 0.5mm").size_mm, None);
    }

    #[test]
    fn test_extract_attributes() {
        let attrs = MaterialAttributes::extract("MFC 3/16\" Brass Slotted Bead - Nickel");
        assert_eq!(attrs.kind, MaterialKind::Bead);
        assert_eq!(attrs.size_mm, Some(4.8));
        assert_eq!(attrs.color_family, ColorFamily::Silver);
        assert_eq!(attrs.finish, Some(Finish::NickelSilver));
        assert_eq!(attrs.weight_class, Some(WeightClass::Brass));

        let attrs = MaterialAttributes::extract("UTC 70D Thread - Brown");
        assert_eq!(attrs.kind, MaterialKind::Thread);
        assert_eq!(attrs.size_mm, None);
        assert_eq!(attrs.color_family, ColorFamily::Brown);
        assert_eq!(attrs.weight_class, None);
    }
}
