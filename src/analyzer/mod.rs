//! Tie-ability analysis over a fly catalog and an inventory snapshot

pub mod unlock;

pub use unlock::{UnlockCandidate, UnlockRanker};

use serde::{Deserialize, Serialize};

use crate::matcher::{MaterialMatcher, DEFAULT_THRESHOLD};
use crate::models::{Fly, FlyScope, InventorySnapshot, MaterialCatalog, MaterialRequirement};

/// Outcome of evaluating one fly against the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// All required materials are satisfied
    pub tieable: bool,
    /// Number of unsatisfied required materials
    pub missing_count: usize,
    /// The unsatisfied required materials, in bill-of-materials order
    pub missing: Vec<MaterialRequirement>,
}

impl MatchResult {
    fn from_missing(missing: Vec<MaterialRequirement>) -> Self {
        Self {
            tieable: missing.is_empty(),
            missing_count: missing.len(),
            missing,
        }
    }
}

/// Decides which flies can be tied with the materials on hand
#[derive(Debug, Clone, Default)]
pub struct TieabilityEvaluator {
    matcher: MaterialMatcher,
}

impl TieabilityEvaluator {
    /// Create an evaluator with the default threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text match threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.matcher = self.matcher.with_threshold(threshold);
        self
    }

    /// Evaluate one fly.
    ///
    /// A required item is satisfied by its catalog id being on hand, or else
    /// by the best free-text score reaching the threshold. Optional items are
    /// never scored.
    pub fn evaluate(&self, fly: &Fly, inventory: &InventorySnapshot) -> MatchResult {
        let mut missing = Vec::new();

        for requirement in fly.required_materials() {
            if requirement.material_id().map_or(false, |id| inventory.has_id(id)) {
                continue;
            }

            let best = self
                .matcher
                .best_score(&requirement.match_text(), inventory.texts());

            if best >= self.matcher.threshold() {
                tracing::trace!("{}: '{}' satisfied by text ({:.2})", fly.name, requirement.label(), best);
            } else {
                tracing::debug!("{}: '{}' missing (best {:.2})", fly.name, requirement.label(), best);
                missing.push(requirement.clone());
            }
        }

        MatchResult::from_missing(missing)
    }

    /// Evaluate every fly, preserving input order
    pub fn evaluate_all<'a, I>(&self, flies: I, inventory: &InventorySnapshot) -> Vec<(&'a Fly, MatchResult)>
    where
        I: IntoIterator<Item = &'a Fly>,
    {
        flies
            .into_iter()
            .map(|fly| (fly, self.evaluate(fly, inventory)))
            .collect()
    }
}

/// A missing material as reported to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingMaterial {
    /// Name as entered
    pub raw_name: String,
    /// Color as entered
    pub raw_color: Option<String>,
    /// Catalog id, when linked
    pub required_material_id: Option<String>,
    /// Display label, preferring the catalog's name and color
    pub label: String,
}

impl MissingMaterial {
    fn from_requirement(requirement: &MaterialRequirement, catalog: &MaterialCatalog) -> Self {
        let label = requirement
            .material_id()
            .and_then(|id| catalog.get(id))
            .map(|e| e.label())
            .unwrap_or_else(|| requirement.label());

        Self {
            raw_name: requirement.raw_name().to_string(),
            raw_color: requirement.raw_color().map(str::to_string),
            required_material_id: requirement.material_id().map(str::to_string),
            label,
        }
    }
}

/// Per-fly line of a discovery report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlySummary {
    /// Fly id
    pub fly_id: String,
    /// Fly name
    pub fly_name: String,
    /// Owning catalog
    pub scope: FlyScope,
    /// All required materials satisfied
    pub tieable: bool,
    /// Number of missing required materials
    pub missing_count: usize,
    /// Missing required materials
    pub missing: Vec<MissingMaterial>,
}

/// Options for building a [`DiscoveryReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOptions {
    /// Free-text match threshold
    pub threshold: f32,
    /// Largest missing count listed under "almost tie-able"
    pub max_missing: usize,
    /// Only flies at most this many materials away feed the leaderboard
    pub unlock_max_missing: Option<usize>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_missing: 1,
            unlock_max_missing: None,
        }
    }
}

/// What can be tied now, what is close, and what to buy next
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Number of flies evaluated
    pub total: usize,
    /// Tie-able flies, by name
    pub tieable: Vec<FlySummary>,
    /// Flies 1..=max_missing materials away, fewest missing first
    pub almost: Vec<FlySummary>,
    /// Purchase recommendations
    pub leaderboard: Vec<UnlockCandidate>,
}

impl DiscoveryReport {
    /// Evaluate `flies` and rank purchases
    pub fn build(
        flies: &[Fly],
        inventory: &InventorySnapshot,
        catalog: &MaterialCatalog,
        options: &DiscoveryOptions,
    ) -> Self {
        let evaluator = TieabilityEvaluator::new().with_threshold(options.threshold);
        let results = evaluator.evaluate_all(flies, inventory);

        let mut report = Self {
            total: results.len(),
            ..Self::default()
        };

        for (fly, result) in &results {
            let summary = FlySummary {
                fly_id: fly.id.clone(),
                fly_name: fly.name.clone(),
                scope: fly.scope,
                tieable: result.tieable,
                missing_count: result.missing_count,
                missing: result
                    .missing
                    .iter()
                    .map(|r| MissingMaterial::from_requirement(r, catalog))
                    .collect(),
            };

            if result.tieable {
                report.tieable.push(summary);
            } else if result.missing_count <= options.max_missing {
                report.almost.push(summary);
            }
        }

        report.tieable.sort_by(|a, b| a.fly_name.to_lowercase().cmp(&b.fly_name.to_lowercase()));
        report.almost.sort_by(|a, b| {
            a.missing_count
                .cmp(&b.missing_count)
                .then_with(|| a.fly_name.to_lowercase().cmp(&b.fly_name.to_lowercase()))
        });

        let not_tieable = results.iter().filter(|(_, r)| {
            !r.tieable && options.unlock_max_missing.map_or(true, |max| r.missing_count <= max)
        });
        report.leaderboard = UnlockRanker::new(catalog)
            .rank(not_tieable.map(|(fly, r)| (*fly, r.missing.as_slice())));

        tracing::debug!(
            "Evaluated {} flies: {} tie-able, {} almost, {} purchase candidates",
            report.total,
            report.tieable.len(),
            report.almost.len(),
            report.leaderboard.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zebra_midge() -> Fly {
        Fly::new("Zebra Midge", "trout")
            .with_id("zebra")
            .with_requirement(MaterialRequirement::resolved("hook-2488", "Hook", None))
            .with_requirement(MaterialRequirement::new("Thread", Some("Black".into())))
            .with_requirement(MaterialRequirement::new("Bead", Some("Silver 2.0mm".into())))
    }

    #[test]
    fn test_no_required_items_is_tieable() {
        let fly = Fly::new("Bare Hook", "trout")
            .with_requirement(MaterialRequirement::new("Flash", None).optional());
        let result = TieabilityEvaluator::new().evaluate(&fly, &InventorySnapshot::new());
        assert!(result.tieable);
        assert_eq!(result.missing_count, 0);
    }

    #[test]
    fn test_id_match() {
        let fly = Fly::new("Hook Only", "trout")
            .with_requirement(MaterialRequirement::resolved("hook-1", "Hook", None));
        let inventory = InventorySnapshot::new().with_id("hook-1");
        assert!(TieabilityEvaluator::new().evaluate(&fly, &inventory).tieable);
    }

    #[test]
    fn test_zebra_midge_missing_bead() {
        let inventory = InventorySnapshot::new()
            .with_id("hook-2488")
            .with_text("UTC Thread Black 70D");

        let result = TieabilityEvaluator::new().evaluate(&zebra_midge(), &inventory);

        assert!(!result.tieable);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.missing[0].raw_name(), "Bead");
        assert_eq!(result.missing[0].raw_color(), Some("Silver 2.0mm"));
    }

    #[test]
    fn test_close_bead_satisfies() {
        let inventory = InventorySnapshot::new()
            .with_id("hook-2488")
            .with_text("UTC Thread Black 70D")
            .with_text("Bead Silver 2.2mm");

        let result = TieabilityEvaluator::new().evaluate(&zebra_midge(), &inventory);
        assert!(result.tieable);
    }

    #[test]
    fn test_unresolved_fallback_for_linked_requirement() {
        // linked requirement whose id is not owned can still match by text
        let fly = Fly::new("Midge", "trout")
            .with_requirement(MaterialRequirement::resolved("hook-1", "Hook", None));
        let inventory = InventorySnapshot::new().with_text("Hook");
        assert!(TieabilityEvaluator::new().evaluate(&fly, &inventory).tieable);
    }

    #[test]
    fn test_optional_items_never_block() {
        let fly = Fly::new("Pheasant Tail", "trout")
            .with_requirement(MaterialRequirement::new("Hook", None))
            .with_requirement(MaterialRequirement::new("Flashback", Some("Pearl".into())).optional());
        let inventory = InventorySnapshot::new().with_text("Hook");
        assert!(TieabilityEvaluator::new().evaluate(&fly, &inventory).tieable);
    }

    #[test]
    fn test_report() {
        let tieable = Fly::new("Hook Only", "trout")
            .with_id("h")
            .with_requirement(MaterialRequirement::new("Hook", None));
        let krystal_a = Fly::new("Fly A", "trout")
            .with_id("a")
            .with_requirement(MaterialRequirement::new("Krystal Flash", Some("Pearl".into())));
        let krystal_b = Fly::new("Fly B", "trout")
            .with_id("b")
            .with_requirement(MaterialRequirement::new("Hook", None))
            .with_requirement(MaterialRequirement::new("Krystal Flash", Some("Pearl".into())))
            .with_requirement(MaterialRequirement::new("Marabou", Some("Olive".into())));

        let flies = vec![krystal_b, tieable, krystal_a];
        let inventory = InventorySnapshot::new().with_text("Hook");
        let catalog = MaterialCatalog::default();

        let report = DiscoveryReport::build(&flies, &inventory, &catalog, &DiscoveryOptions::default());

        assert_eq!(report.total, 3);
        assert_eq!(report.tieable.len(), 1);
        assert_eq!(report.tieable[0].fly_id, "h");
        assert_eq!(report.almost.len(), 1);
        assert_eq!(report.almost[0].fly_id, "a");

        let top = &report.leaderboard[0];
        assert_eq!(top.label, "Krystal Flash (Pearl)");
        assert_eq!(top.unlocked_fly_ids, vec!["b", "a"]);
        assert_eq!(report.leaderboard.len(), 2);
    }

    #[test]
    fn test_report_unlock_filter() {
        let near = Fly::new("Near", "trout")
            .with_id("near")
            .with_requirement(MaterialRequirement::new("Marabou", None));
        let far = Fly::new("Far", "trout")
            .with_id("far")
            .with_requirement(MaterialRequirement::new("Zonker Strip", None))
            .with_requirement(MaterialRequirement::new("Chenille", None));

        let options = DiscoveryOptions {
            unlock_max_missing: Some(1),
            ..DiscoveryOptions::default()
        };
        let report = DiscoveryReport::build(
            &[near, far],
            &InventorySnapshot::new(),
            &MaterialCatalog::default(),
            &options,
        );

        assert_eq!(report.leaderboard.len(), 1);
        assert_eq!(report.leaderboard[0].label, "Marabou");
    }
}
