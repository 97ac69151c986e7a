//! On-hand materials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::material::MaterialCatalog;
use crate::matcher::{normalize, MaterialAttributes};

/// What an inventory item refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "link", rename_all = "snake_case")]
pub enum InventoryMaterial {
    /// A catalog material
    Resolved {
        /// Catalog material id
        material_id: String,
    },
    /// Free text the user typed or imported
    Alias {
        /// Text as entered
        text: String,
        /// Canonical form, used for deduplication
        normalized: String,
        /// Attributes derived when the alias was created
        attributes: MaterialAttributes,
    },
}

/// A material the user claims to own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier
    pub id: String,
    /// Referenced material
    pub material: InventoryMaterial,
    /// When the item was added
    pub added_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Create an item for a catalog material
    pub fn resolved(material_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            material: InventoryMaterial::Resolved {
                material_id: material_id.into(),
            },
            added_at: Utc::now(),
        }
    }

    /// Create an alias item, deriving its attributes once
    pub fn alias(text: impl Into<String>) -> Self {
        let text = text.into().trim().to_string();
        let normalized = normalize(&text);
        let attributes = MaterialAttributes::extract(&text);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            material: InventoryMaterial::Alias {
                text,
                normalized,
                attributes,
            },
            added_at: Utc::now(),
        }
    }

    /// Catalog id, for resolved items
    pub fn material_id(&self) -> Option<&str> {
        match &self.material {
            InventoryMaterial::Resolved { material_id } => Some(material_id),
            InventoryMaterial::Alias { .. } => None,
        }
    }

    /// Canonical alias text, for alias items
    pub fn normalized_alias(&self) -> Option<&str> {
        match &self.material {
            InventoryMaterial::Alias { normalized, .. } => Some(normalized),
            InventoryMaterial::Resolved { .. } => None,
        }
    }

    /// Display label, looking catalog materials up in `catalog`
    pub fn label(&self, catalog: &MaterialCatalog) -> String {
        match &self.material {
            InventoryMaterial::Resolved { material_id } => catalog
                .get(material_id)
                .map(|e| e.label())
                .unwrap_or_else(|| format!("Unknown material {}", material_id)),
            InventoryMaterial::Alias { text, .. } => text.clone(),
        }
    }
}

/// Inventory as seen by the evaluator: resolved ids plus free-text entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Catalog ids on hand
    pub resolved_ids: HashSet<String>,
    /// Free-text descriptions on hand
    pub free_text: Vec<String>,
}

impl InventorySnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolved id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.resolved_ids.insert(id.into());
        self
    }

    /// Add a free-text entry
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text.push(text.into());
        self
    }

    /// Build from stored items.
    ///
    /// Owned catalog materials contribute their id and their name and color
    /// as free text, so unresolved requirements can still score against them.
    pub fn from_items<'a, I>(items: I, catalog: &MaterialCatalog) -> Self
    where
        I: IntoIterator<Item = &'a InventoryItem>,
    {
        let mut snapshot = Self::new();

        for item in items {
            match &item.material {
                InventoryMaterial::Resolved { material_id } => {
                    snapshot.resolved_ids.insert(material_id.clone());
                    if let Some(entry) = catalog.get(material_id) {
                        snapshot.free_text.push(entry.search_text());
                    }
                }
                InventoryMaterial::Alias { text, .. } => {
                    snapshot.free_text.push(text.clone());
                }
            }
        }

        snapshot
    }

    /// Whether a catalog id is on hand
    pub fn has_id(&self, id: &str) -> bool {
        self.resolved_ids.contains(id)
    }

    /// Free-text entries as string slices
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.free_text.iter().map(String::as_str)
    }

    /// Whether nothing is on hand
    pub fn is_empty(&self) -> bool {
        self.resolved_ids.is_empty() && self.free_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{ColorFamily, MaterialKind};
    use crate::models::MaterialCatalogEntry;

    #[test]
    fn test_alias_derives_attributes() {
        let item = InventoryItem::alias("  MFC 3/16\" Brass Slotted Bead - Nickel ");
        match &item.material {
            InventoryMaterial::Alias {
                text,
                normalized,
                attributes,
            } => {
                assert_eq!(text, "MFC 3/16\" Brass Slotted Bead - Nickel");
                assert_eq!(normalized, "mfc 3 16 brass slotted bead nickel");
                assert_eq!(attributes.kind, MaterialKind::Bead);
                assert_eq!(attributes.color_family, ColorFamily::Silver);
            }
            InventoryMaterial::Resolved { .. } => panic!("expected alias"),
        }
        assert!(item.material_id().is_none());
    }

    #[test]
    fn test_snapshot_from_items() {
        let catalog = MaterialCatalog::from_entries([MaterialCatalogEntry::new(
            "UTC 70D Thread",
            Some("Black".into()),
        )
        .with_id("t-black")]);

        let items = vec![
            InventoryItem::resolved("t-black"),
            InventoryItem::resolved("missing-from-catalog"),
            InventoryItem::alias("Krystal Flash Pearl"),
        ];
        let snapshot = InventorySnapshot::from_items(&items, &catalog);

        assert!(snapshot.has_id("t-black"));
        assert!(snapshot.has_id("missing-from-catalog"));
        assert_eq!(snapshot.free_text, vec!["UTC 70D Thread Black", "Krystal Flash Pearl"]);
    }

    #[test]
    fn test_item_labels() {
        let catalog = MaterialCatalog::default();
        assert_eq!(InventoryItem::alias("Hook").label(&catalog), "Hook");
        assert!(InventoryItem::resolved("x").label(&catalog).contains("x"));
    }
}
