//! Material matching: normalization, classification and fuzzy scoring

pub mod attributes;
pub mod color;
pub mod normalize;
pub mod scorer;

pub use attributes::{MaterialAttributes, MaterialKind};
pub use color::{color_family, is_near, ColorFamily};
pub use normalize::normalize;
pub use scorer::score;

/// Default minimum score for a free-text match to satisfy a requirement
pub const DEFAULT_THRESHOLD: f32 = 0.80;

/// Matches a required material description against on-hand descriptions
#[derive(Debug, Clone)]
pub struct MaterialMatcher {
    /// Minimum score threshold
    threshold: f32,
}

impl MaterialMatcher {
    /// Create a new matcher with the default threshold
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the minimum score threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// The configured threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Highest score of `required` against any candidate.
    ///
    /// Stops scanning at the first perfect score.
    pub fn best_score<'a, I>(&self, required: &str, candidates: I) -> f32
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best = 0.0_f32;
        for candidate in candidates {
            best = best.max(score(required, candidate));
            if best >= 1.0 {
                break;
            }
        }
        best
    }

    /// Find the best matching candidate at or above the threshold
    pub fn find_best_match<'a, I>(&self, required: &str, candidates: I) -> Option<(&'a str, f32)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best_match: Option<(&'a str, f32)> = None;

        for candidate in candidates {
            let s = score(required, candidate);
            if s >= self.threshold && best_match.map_or(true, |(_, b)| s > b) {
                best_match = Some((candidate, s));
            }
            if s >= 1.0 {
                break;
            }
        }

        best_match
    }
}

impl Default for MaterialMatcher {
    fn default() -> Self {
        Self::new()
    }
}
