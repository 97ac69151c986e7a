//! Similarity scoring between a required material and an on-hand material
//!
//! Kind-specific rules run before the generic word-overlap fallback, and the
//! fallback is capped below full confidence: only an exact normalized match
//! can reach 1.0 without sharing a kind.

use regex::Regex;

use super::attributes::{material_kind, parse_size_mm, MaterialKind};
use super::color::{color_family, is_near};
use super::normalize::{normalize, word_set};

/// Starting score for two materials of the same known kind
const SAME_KIND_BASE: f32 = 0.85;

/// Ceiling for the generic word-overlap score
const GENERIC_CAP: f32 = 0.8;

/// Slack for float noise at the bead size tier boundaries
const SIZE_EPSILON: f32 = 1e-3;

lazy_static::lazy_static! {
    static ref THREAD_WEIGHT_RE: Regex =
        Regex::new(r"\b\d+\s*(?:d|den|denier)\b|\b\d+\s*/\s*0\b").unwrap();
}

/// Score how well `on_hand` can stand in for `required`, in `[0, 1]`.
///
/// Never fails: text with no recognizable attributes falls through to the
/// word-overlap score.
pub fn score(required: &str, on_hand: &str) -> f32 {
    let req_norm = normalize(required);
    let hand_norm = normalize(on_hand);

    if req_norm.is_empty() || hand_norm.is_empty() {
        return 0.0;
    }
    if req_norm == hand_norm {
        return 1.0;
    }

    match (material_kind(required), material_kind(on_hand)) {
        (MaterialKind::Bead, MaterialKind::Bead) => bead_score(required, on_hand),
        (MaterialKind::Thread, MaterialKind::Thread) => thread_score(required, on_hand),
        (MaterialKind::Wire, MaterialKind::Wire) => wire_score(required, on_hand),
        (MaterialKind::Hook, MaterialKind::Hook) => SAME_KIND_BASE,
        _ => generic_score(required, on_hand),
    }
}

fn bead_score(required: &str, on_hand: &str) -> f32 {
    let mut s = SAME_KIND_BASE;

    if let (Some(a), Some(b)) = (parse_size_mm(required), parse_size_mm(on_hand)) {
        s += size_adjustment((a - b).abs());
    }

    s += color_bonus(required, on_hand, 0.05, 0.02);

    if mentions_tungsten(required) != mentions_tungsten(on_hand) {
        s -= 0.10;
    }

    s.clamp(0.0, 1.0)
}

fn size_adjustment(diff: f32) -> f32 {
    if diff <= 0.2 + SIZE_EPSILON {
        0.10
    } else if diff <= 0.5 + SIZE_EPSILON {
        0.05
    } else if diff <= 1.0 + SIZE_EPSILON {
        0.02
    } else {
        -0.15
    }
}

fn thread_score(required: &str, on_hand: &str) -> f32 {
    let mut s = SAME_KIND_BASE + color_bonus(required, on_hand, 0.10, 0.05);

    if has_thread_weight(required) && has_thread_weight(on_hand) {
        s += 0.02;
    }

    s.clamp(0.0, 1.0)
}

fn wire_score(required: &str, on_hand: &str) -> f32 {
    (SAME_KIND_BASE + color_bonus(required, on_hand, 0.05, 0.02)).clamp(0.0, 1.0)
}

fn generic_score(required: &str, on_hand: &str) -> f32 {
    let shared = word_set(required).intersection(&word_set(on_hand)).count();
    (0.4 + 0.1 * shared as f32).min(GENERIC_CAP)
}

/// `exact` when both sides land in the same known family, `near` when the
/// families are adjacent
fn color_bonus(required: &str, on_hand: &str, exact: f32, near: f32) -> f32 {
    let a = color_family(required);
    let b = color_family(on_hand);

    if a.is_known() && a == b {
        exact
    } else if is_near(a, b) {
        near
    } else {
        0.0
    }
}

fn mentions_tungsten(text: &str) -> bool {
    text.to_lowercase().contains("tungsten")
}

fn has_thread_weight(text: &str) -> bool {
    THREAD_WEIGHT_RE.is_match(&text.to_lowercase())
}
