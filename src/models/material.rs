//! Material catalog entries and the read-only lookup snapshot

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A canonical material definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCatalogEntry {
    /// Unique identifier
    pub id: String,
    /// Material name
    pub name: String,
    /// Color
    #[serde(default)]
    pub color: Option<String>,
}

impl MaterialCatalogEntry {
    /// Create a new entry with a fresh id
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        }
    }

    /// Override the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Display label, e.g. `UTC 70D Thread (Black)`
    pub fn label(&self) -> String {
        match &self.color {
            Some(color) => format!("{} ({})", self.name, color),
            None => self.name.clone(),
        }
    }

    /// Name and color as one searchable string
    pub fn search_text(&self) -> String {
        match &self.color {
            Some(color) => format!("{} {}", self.name, color),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for MaterialCatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Materials by id, built once per evaluation batch and passed explicitly
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    by_id: HashMap<String, MaterialCatalogEntry>,
}

impl MaterialCatalog {
    /// Build a snapshot from catalog entries
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MaterialCatalogEntry>,
    {
        Self {
            by_id: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Look up an entry
    pub fn get(&self, id: &str) -> Option<&MaterialCatalogEntry> {
        self.by_id.get(id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate over all entries (unordered)
    pub fn entries(&self) -> impl Iterator<Item = &MaterialCatalogEntry> {
        self.by_id.values()
    }

    /// Resolve free text to a catalog id.
    ///
    /// An exact name and color match is preferred; otherwise the first entry
    /// (lowest id) with the same name. Comparison ignores case and
    /// surrounding whitespace.
    pub fn find_id(&self, name: &str, color: Option<&str>) -> Option<&str> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        let color = color.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());

        let mut same_name: Vec<&MaterialCatalogEntry> = self
            .by_id
            .values()
            .filter(|e| e.name.trim().to_lowercase() == name)
            .collect();
        same_name.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(color) = &color {
            let exact = same_name.iter().find(|e| {
                e.color
                    .as_deref()
                    .map_or(false, |c| c.trim().to_lowercase() == *color)
            });
            if let Some(entry) = exact {
                return Some(&entry.id);
            }
        }

        same_name.first().map(|e| e.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MaterialCatalog {
        MaterialCatalog::from_entries([
            MaterialCatalogEntry::new("UTC 70D Thread", Some("Black".into())).with_id("t-black"),
            MaterialCatalogEntry::new("UTC 70D Thread", Some("Olive".into())).with_id("t-olive"),
            MaterialCatalogEntry::new("Hook", None).with_id("hook"),
        ])
    }

    #[test]
    fn test_find_id_exact_color() {
        let cat = catalog();
        assert_eq!(cat.find_id("utc 70d thread ", Some("OLIVE")), Some("t-olive"));
    }

    #[test]
    fn test_find_id_name_fallback() {
        let cat = catalog();
        // unknown color falls back to the first same-name entry
        assert_eq!(cat.find_id("UTC 70D Thread", Some("Pink")), Some("t-black"));
        assert_eq!(cat.find_id("Hook", None), Some("hook"));
        assert_eq!(cat.find_id("Marabou", None), None);
        assert_eq!(cat.find_id("  ", None), None);
    }

    #[test]
    fn test_label() {
        let cat = catalog();
        assert_eq!(cat.get("t-black").unwrap().label(), "UTC 70D Thread (Black)");
        assert_eq!(cat.get("hook").unwrap().label(), "Hook");
        assert_eq!(cat.len(), 3);
    }
}
