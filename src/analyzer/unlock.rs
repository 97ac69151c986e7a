//! "Best next purchase" ranking
//!
//! Missing materials are grouped across all flies that are not yet tie-able
//! and ranked by how many distinct flies list them. This is a single greedy
//! pass: it does not simulate buying the top candidate and recompute the
//! marginal gain of the rest, so it approximates the underlying set-cover
//! problem rather than solving it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::matcher::normalize;
use crate::models::{Fly, MaterialCatalog, MaterialRequirement};

/// A material purchase and the flies it would unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockCandidate {
    /// Grouping key: `id:<material id>` or `label:<canonical label>`
    pub key: String,
    /// Display label
    pub label: String,
    /// Flies listing this material among their missing items, in input order
    pub unlocked_fly_ids: Vec<String>,
    /// 1-based rank
    pub rank: usize,
    /// Whether the key is a catalog id rather than a best-effort label
    pub resolved: bool,
}

impl UnlockCandidate {
    /// Number of distinct flies listing this material
    pub fn unlocks(&self) -> usize {
        self.unlocked_fly_ids.len()
    }
}

#[derive(Debug)]
struct Group {
    label: String,
    canonical: String,
    resolved: bool,
    fly_ids: Vec<String>,
    seen: HashSet<String>,
}

/// Ranks missing materials by unlock count
pub struct UnlockRanker<'a> {
    /// Catalog snapshot for labels of linked materials
    catalog: &'a MaterialCatalog,
}

impl<'a> UnlockRanker<'a> {
    /// Create a ranker over a catalog snapshot
    pub fn new(catalog: &'a MaterialCatalog) -> Self {
        Self { catalog }
    }

    /// Grouping key, display label and whether the key is an id
    fn key_for(&self, requirement: &MaterialRequirement) -> (String, String, bool) {
        match requirement.material_id() {
            Some(id) => {
                let label = self
                    .catalog
                    .get(id)
                    .map(|e| e.label())
                    .unwrap_or_else(|| requirement.label());
                (format!("id:{}", id), label, true)
            }
            None => {
                let label = requirement.label();
                (format!("label:{}", normalize(&label)), label, false)
            }
        }
    }

    /// Rank candidates from `(fly, missing requirements)` pairs.
    ///
    /// Sorted by unlock count descending, then canonical label ascending.
    pub fn rank<'f, I>(&self, not_tieable: I) -> Vec<UnlockCandidate>
    where
        I: IntoIterator<Item = (&'f Fly, &'f [MaterialRequirement])>,
    {
        let mut groups: BTreeMap<String, Group> = BTreeMap::new();

        for (fly, missing) in not_tieable {
            for requirement in missing {
                let (key, label, resolved) = self.key_for(requirement);
                let group = groups.entry(key).or_insert_with(|| Group {
                    canonical: normalize(&label),
                    label,
                    resolved,
                    fly_ids: Vec::new(),
                    seen: HashSet::new(),
                });

                if group.seen.insert(fly.id.clone()) {
                    group.fly_ids.push(fly.id.clone());
                }
            }
        }

        let label_keyed = groups.values().filter(|g| !g.resolved).count();
        if label_keyed > 0 {
            tracing::debug!(
                "{} of {} unlock groups keyed by label (no catalog link)",
                label_keyed,
                groups.len()
            );
        }

        let mut ranked: Vec<(String, Group)> = groups.into_iter().collect();
        ranked.sort_by(|(ka, a), (kb, b)| {
            b.fly_ids
                .len()
                .cmp(&a.fly_ids.len())
                .then_with(|| a.canonical.cmp(&b.canonical))
                .then_with(|| ka.cmp(kb))
        });

        ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (key, group))| UnlockCandidate {
                key,
                label: group.label,
                unlocked_fly_ids: group.fly_ids,
                rank: idx + 1,
                resolved: group.resolved,
            })
            .collect()
    }
}
