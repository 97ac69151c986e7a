//! Color family classification
//!
//! Free-text colors are bucketed by an ordered synonym table. The first
//! family in table order with a matching synonym wins, so overlapping
//! synonyms ("gunmetal" under both black and gray) always resolve the same way.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalize::normalize;

/// Canonical color bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFamily {
    Black,
    White,
    Cream,
    Tan,
    Brown,
    Olive,
    Dun,
    Gray,
    Silver,
    Gold,
    Copper,
    Pearl,
    Chartreuse,
    Yellow,
    Orange,
    Red,
    Pink,
    Purple,
    Blue,
    Green,
    Unknown,
}

impl ColorFamily {
    /// Lowercase family name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Cream => "cream",
            Self::Tan => "tan",
            Self::Brown => "brown",
            Self::Olive => "olive",
            Self::Dun => "dun",
            Self::Gray => "gray",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Copper => "copper",
            Self::Pearl => "pearl",
            Self::Chartreuse => "chartreuse",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is a real family (not `Unknown`)
    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl fmt::Display for ColorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synonyms per family, in priority order.
const FAMILY_SYNONYMS: &[(ColorFamily, &[&str])] = &[
    (ColorFamily::Black, &["black", "blk", "gunmetal", "jet", "ebony"]),
    (ColorFamily::White, &["white", "wht", "snow"]),
    (ColorFamily::Cream, &["cream", "ivory", "ecru", "off white"]),
    (ColorFamily::Tan, &["tan", "khaki", "beige", "camel", "sand"]),
    (ColorFamily::Brown, &["brown", "cocoa", "chocolate", "coffee", "mahogany"]),
    (ColorFamily::Olive, &["olive", "od", "drab"]),
    (ColorFamily::Dun, &["dun"]),
    (ColorFamily::Gray, &["gray", "grey", "slate", "smoke", "gunmetal", "charcoal"]),
    (ColorFamily::Silver, &["silver", "nickel", "chrome", "pewter"]),
    (ColorFamily::Gold, &["gold", "brass"]),
    (ColorFamily::Copper, &["copper", "bronze"]),
    (ColorFamily::Pearl, &["pearl", "pearlescent", "opal", "opalescent"]),
    (ColorFamily::Chartreuse, &["chartreuse", "lime"]),
    (ColorFamily::Yellow, &["yellow", "sulphur", "sulfur", "lemon"]),
    (ColorFamily::Orange, &["orange", "tangerine", "rust"]),
    (ColorFamily::Red, &["red", "scarlet", "crimson", "wine", "claret"]),
    (ColorFamily::Pink, &["pink", "salmon", "fuchsia"]),
    (ColorFamily::Purple, &["purple", "violet", "plum"]),
    (ColorFamily::Blue, &["blue", "royal", "navy"]),
    (ColorFamily::Green, &["green", "forest", "emerald"]),
];

/// Adjacent families that earn partial credit. Symmetric.
const NEAR_FAMILIES: &[(ColorFamily, ColorFamily)] = &[
    (ColorFamily::Black, ColorFamily::Gray),
    (ColorFamily::Black, ColorFamily::Silver),
    (ColorFamily::Gray, ColorFamily::Silver),
    (ColorFamily::Gray, ColorFamily::Dun),
    (ColorFamily::White, ColorFamily::Cream),
    (ColorFamily::White, ColorFamily::Pearl),
    (ColorFamily::Silver, ColorFamily::Pearl),
    (ColorFamily::Cream, ColorFamily::Tan),
    (ColorFamily::Tan, ColorFamily::Brown),
    (ColorFamily::Brown, ColorFamily::Olive),
    (ColorFamily::Brown, ColorFamily::Copper),
    (ColorFamily::Olive, ColorFamily::Dun),
    (ColorFamily::Olive, ColorFamily::Green),
    (ColorFamily::Gold, ColorFamily::Copper),
    (ColorFamily::Gold, ColorFamily::Yellow),
    (ColorFamily::Copper, ColorFamily::Orange),
    (ColorFamily::Chartreuse, ColorFamily::Yellow),
    (ColorFamily::Chartreuse, ColorFamily::Green),
    (ColorFamily::Yellow, ColorFamily::Orange),
    (ColorFamily::Orange, ColorFamily::Red),
    (ColorFamily::Red, ColorFamily::Pink),
    (ColorFamily::Pink, ColorFamily::Purple),
    (ColorFamily::Purple, ColorFamily::Blue),
];

/// A compiled row of the synonym table
struct FamilyRule {
    family: ColorFamily,
    pattern: Regex,
}

lazy_static::lazy_static! {
    static ref FAMILY_RULES: Vec<FamilyRule> = FAMILY_SYNONYMS
        .iter()
        .map(|(family, synonyms)| {
            let alternation = synonyms
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            FamilyRule {
                family: *family,
                pattern: Regex::new(&format!(r"\b(?:{})\b", alternation)).unwrap(),
            }
        })
        .collect();
}

/// Classify free text into a color family
pub fn color_family(text: &str) -> ColorFamily {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return ColorFamily::Unknown;
    }

    FAMILY_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&normalized))
        .map_or(ColorFamily::Unknown, |rule| rule.family)
}

/// Whether two distinct, known families are adjacent
pub fn is_near(a: ColorFamily, b: ColorFamily) -> bool {
    if a == b || !a.is_known() || !b.is_known() {
        return false;
    }
    NEAR_FAMILIES
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_families() {
        assert_eq!(color_family("Black"), ColorFamily::Black);
        assert_eq!(color_family("UTC 70D Thread - Brown"), ColorFamily::Brown);
        assert_eq!(color_family("Krystal Flash Pearl"), ColorFamily::Pearl);
        assert_eq!(color_family("Hot Orange"), ColorFamily::Orange);
        assert_eq!(color_family("GREY"), ColorFamily::Gray);
        assert_eq!(color_family("OD Green"), ColorFamily::Olive);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(color_family(""), ColorFamily::Unknown);
        assert_eq!(color_family("Hook"), ColorFamily::Unknown);
        assert_eq!(color_family("Natural"), ColorFamily::Unknown);
    }

    #[test]
    fn test_whole_word_matching() {
        // "body" must not trigger olive's "od", "shred" must not trigger red
        assert_eq!(color_family("body shred"), ColorFamily::Unknown);
        assert_eq!(color_family("tantalum"), ColorFamily::Unknown);
    }

    #[test]
    fn test_table_order_is_tie_break() {
        // gunmetal is listed under black and gray; black comes first
        assert_eq!(color_family("Gunmetal"), ColorFamily::Black);
        // black wins over silver when both appear
        assert_eq!(color_family("Silver / Black"), ColorFamily::Black);
        // silver is declared before gold
        assert_eq!(color_family("Brass bead nickel finish"), ColorFamily::Silver);
    }

    #[test]
    fn test_nearness() {
        assert!(is_near(ColorFamily::Black, ColorFamily::Gray));
        assert!(is_near(ColorFamily::Silver, ColorFamily::Black));
        assert!(!is_near(ColorFamily::Black, ColorFamily::Black));
        assert!(!is_near(ColorFamily::Black, ColorFamily::Pink));
        assert!(!is_near(ColorFamily::Unknown, ColorFamily::Gray));
    }
}
