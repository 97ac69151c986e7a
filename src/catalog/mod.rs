//! Local single-user catalog store
//!
//! Materials, flies (shared and personal) and inventory live in one JSON
//! document. Mutations work on the in-memory copy; [`CatalogStore::save`]
//! writes the whole document through a temporary file that is renamed into
//! place, so a crash never leaves a half-written catalog behind.

pub mod search;

pub use search::{MaterialSearch, SearchHit};

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{FlyboxError, Result};
use crate::matcher::normalize;
use crate::models::{
    Fly, FlyScope, InventoryItem, InventorySnapshot, MaterialCatalog, MaterialCatalogEntry,
    MaterialRequirement,
};
use crate::parsers::FlyRow;

/// File name of the catalog document inside the data directory
pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogData {
    #[serde(default)]
    materials: Vec<MaterialCatalogEntry>,
    #[serde(default)]
    flies: Vec<Fly>,
    #[serde(default)]
    inventory: Vec<InventoryItem>,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Records added
    pub inserted: usize,
    /// Records skipped as duplicates
    pub skipped: usize,
    /// Names of the skipped records
    pub skipped_names: Vec<String>,
}

impl ImportSummary {
    fn skip(&mut self, name: impl Into<String>) {
        self.skipped += 1;
        self.skipped_names.push(name.into());
    }
}

/// JSON-file backed catalog
pub struct CatalogStore {
    path: PathBuf,
    data: CatalogData,
    resolve_materials: bool,
}

impl CatalogStore {
    /// Open the catalog at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            tracing::debug!("No catalog at {}, starting empty", path.display());
            CatalogData::default()
        };

        Ok(Self {
            path,
            data,
            resolve_materials: true,
        })
    }

    /// Open `catalog.json` inside `data_dir`
    pub fn open_in(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(data_dir.as_ref().join(CATALOG_FILE))
    }

    /// Whether free-text material names are linked to catalog ids on insert
    pub fn with_material_resolution(mut self, enabled: bool) -> Self {
        self.resolve_materials = enabled;
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the catalog atomically
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let content = serde_json::to_string_pretty(&self.data)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::info!(
            "Saved catalog: {} flies, {} materials, {} inventory items",
            self.data.flies.len(),
            self.data.materials.len(),
            self.data.inventory.len()
        );
        Ok(())
    }

    // ---- materials ----

    /// All catalog materials
    pub fn materials(&self) -> &[MaterialCatalogEntry] {
        &self.data.materials
    }

    /// Add a material, returning its id.
    ///
    /// An entry with the same name and color (ignoring case) is reused.
    pub fn add_material(&mut self, name: &str, color: Option<&str>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FlyboxError::validation("Material name cannot be empty"));
        }
        let color = color.map(str::trim).filter(|c| !c.is_empty());

        let existing = self.data.materials.iter().find(|e| {
            e.name.trim().eq_ignore_ascii_case(name)
                && e.color.as_deref().map(str::trim).map(str::to_lowercase)
                    == color.map(str::to_lowercase)
        });
        if let Some(entry) = existing {
            tracing::debug!("Material '{}' already in catalog", entry.label());
            return Ok(entry.id.clone());
        }

        let entry = MaterialCatalogEntry::new(name, color.map(str::to_string));
        let id = entry.id.clone();
        tracing::info!("Added material {}", entry.label());
        self.data.materials.push(entry);
        Ok(id)
    }

    /// Resolve a name and color to a catalog id
    pub fn find_material_id(&self, name: &str, color: Option<&str>) -> Option<String> {
        self.material_catalog().find_id(name, color).map(str::to_string)
    }

    /// Fuzzy search over catalog materials
    pub fn search_materials(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        MaterialSearch::new().search(query, &self.data.materials, limit)
    }

    /// Read-only lookup snapshot of the material catalog
    pub fn material_catalog(&self) -> MaterialCatalog {
        MaterialCatalog::from_entries(self.data.materials.iter().cloned())
    }

    // ---- flies ----

    /// All flies, shared and personal
    pub fn flies(&self) -> &[Fly] {
        &self.data.flies
    }

    /// Look a fly up by id
    pub fn get_fly(&self, id: &str) -> Option<&Fly> {
        self.data.flies.iter().find(|f| f.id == id)
    }

    /// Look a fly up by id, or by name in canonical form
    pub fn find_fly(&self, id_or_name: &str) -> Option<&Fly> {
        self.get_fly(id_or_name)
            .or_else(|| self.find_duplicate(id_or_name))
    }

    /// A stored fly whose name has the same canonical form as `name`
    pub fn find_duplicate(&self, name: &str) -> Option<&Fly> {
        let canonical = normalize(name);
        if canonical.is_empty() {
            return None;
        }
        self.data.flies.iter().find(|f| f.normalized_name() == canonical)
    }

    /// Insert a new fly into `scope`, returning its id.
    ///
    /// Fails on a blank name, a blank material name, or a name that
    /// collides with any stored fly in either scope.
    pub fn add_fly(&mut self, fly: Fly, scope: FlyScope) -> Result<String> {
        let fly = self.prepare_fly(fly, scope)?;
        let id = fly.id.clone();
        tracing::info!("Added {} fly '{}'", scope, fly.name);
        self.data.flies.push(fly);
        Ok(id)
    }

    fn prepare_fly(&self, mut fly: Fly, scope: FlyScope) -> Result<Fly> {
        fly.name = fly.name.trim().to_string();
        if fly.name.is_empty() {
            return Err(FlyboxError::validation("Fly name cannot be empty"));
        }
        if fly.normalized_name().is_empty() {
            return Err(FlyboxError::validation(format!(
                "Fly name '{}' has no letters or digits",
                fly.name
            )));
        }
        if let Some(existing) = self.find_duplicate(&fly.name) {
            return Err(FlyboxError::duplicate(&fly.name, &existing.name));
        }

        fly.scope = scope;
        let requirements = std::mem::take(&mut fly.requirements);
        fly.requirements = self.prepare_requirements(requirements)?;
        Ok(fly)
    }

    /// Validate line items, link them to the catalog and renumber positions
    fn prepare_requirements(
        &self,
        mut requirements: Vec<MaterialRequirement>,
    ) -> Result<Vec<MaterialRequirement>> {
        requirements.sort_by_key(|r| r.position);
        let catalog = self.material_catalog();

        requirements
            .into_iter()
            .enumerate()
            .map(|(pos, mut requirement)| {
                if requirement.raw_name().trim().is_empty() {
                    return Err(FlyboxError::validation(format!(
                        "Material {} has an empty name",
                        pos + 1
                    )));
                }
                if self.resolve_materials && requirement.material_id().is_none() {
                    if let Some(id) = catalog.find_id(requirement.raw_name(), requirement.raw_color()) {
                        requirement.resolve(id);
                    }
                }
                Ok(requirement.at(pos))
            })
            .collect()
    }

    /// Import parsed CSV rows into `scope`.
    ///
    /// Rows whose name collides with a stored fly, or with an earlier row of
    /// the same batch, are skipped.
    pub fn import_rows(&mut self, rows: Vec<FlyRow>, scope: FlyScope) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for row in rows {
            let name = row.name.clone();
            let fly = row.into_fly(scope, None);

            match self.prepare_fly(fly, scope) {
                Ok(fly) => {
                    self.data.flies.push(fly);
                    summary.inserted += 1;
                }
                Err(FlyboxError::DuplicateFly { existing, .. }) => {
                    tracing::warn!("Skipping '{}': already stored as '{}'", name, existing);
                    summary.skip(name);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Imported {} flies ({} duplicates skipped)",
            summary.inserted,
            summary.skipped
        );
        Ok(summary)
    }

    /// Replace a personal fly's whole material list.
    ///
    /// Every item is validated before the old list is touched; on error the
    /// stored list is unchanged.
    pub fn replace_requirements(
        &mut self,
        fly_id: &str,
        requirements: Vec<MaterialRequirement>,
    ) -> Result<()> {
        let fly = self
            .get_fly(fly_id)
            .ok_or_else(|| FlyboxError::fly_not_found(fly_id))?;
        if fly.scope == FlyScope::Global {
            return Err(FlyboxError::ReadOnlyFly(fly.name.clone()));
        }

        let prepared = self.prepare_requirements(requirements)?;

        let fly = self
            .data
            .flies
            .iter_mut()
            .find(|f| f.id == fly_id)
            .ok_or_else(|| FlyboxError::fly_not_found(fly_id))?;
        fly.requirements = prepared;

        tracing::info!("Replaced materials of '{}' ({} items)", fly.name, fly.requirements.len());
        Ok(())
    }

    /// Delete a personal fly
    pub fn delete_fly(&mut self, fly_id: &str) -> Result<Fly> {
        let idx = self
            .data
            .flies
            .iter()
            .position(|f| f.id == fly_id)
            .ok_or_else(|| FlyboxError::fly_not_found(fly_id))?;

        if self.data.flies[idx].scope == FlyScope::Global {
            return Err(FlyboxError::ReadOnlyFly(self.data.flies[idx].name.clone()));
        }

        let fly = self.data.flies.remove(idx);
        tracing::info!("Deleted fly '{}'", fly.name);
        Ok(fly)
    }

    // ---- inventory ----

    /// All inventory items
    pub fn inventory(&self) -> &[InventoryItem] {
        &self.data.inventory
    }

    /// Add a catalog material to the inventory.
    ///
    /// Returns `false` if it is already on hand.
    pub fn add_inventory_material(&mut self, material_id: &str) -> Result<bool> {
        if !self.data.materials.iter().any(|m| m.id == material_id) {
            return Err(FlyboxError::MaterialNotFound(material_id.to_string()));
        }
        if self.data.inventory.iter().any(|i| i.material_id() == Some(material_id)) {
            tracing::debug!("Material {} already in inventory", material_id);
            return Ok(false);
        }

        self.data.inventory.push(InventoryItem::resolved(material_id));
        Ok(true)
    }

    /// Add a free-text alias to the inventory.
    ///
    /// Returns `false` if an alias with the same canonical text exists.
    pub fn add_alias(&mut self, text: &str) -> Result<bool> {
        let canonical = normalize(text);
        if canonical.is_empty() {
            return Err(FlyboxError::validation("Alias text cannot be empty"));
        }
        if self
            .data
            .inventory
            .iter()
            .any(|i| i.normalized_alias() == Some(canonical.as_str()))
        {
            tracing::debug!("Alias '{}' already in inventory", text.trim());
            return Ok(false);
        }

        self.data.inventory.push(InventoryItem::alias(text));
        Ok(true)
    }

    /// Bulk-add aliases from text separated by newlines or commas
    pub fn import_aliases(&mut self, text: &str) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for entry in text.split(|c| c == '\n' || c == ',') {
            let entry = entry.trim();
            if normalize(entry).is_empty() {
                continue;
            }
            if self.add_alias(entry)? {
                summary.inserted += 1;
            } else {
                summary.skip(entry);
            }
        }

        tracing::info!(
            "Imported {} aliases ({} duplicates skipped)",
            summary.inserted,
            summary.skipped
        );
        Ok(summary)
    }

    /// Remove an inventory item by id
    pub fn remove_inventory_item(&mut self, item_id: &str) -> Result<InventoryItem> {
        let idx = self
            .data
            .inventory
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| FlyboxError::InventoryItemNotFound(item_id.to_string()))?;
        Ok(self.data.inventory.remove(idx))
    }

    /// Inventory as seen by the evaluator
    pub fn inventory_snapshot(&self) -> InventorySnapshot {
        InventorySnapshot::from_items(&self.data.inventory, &self.material_catalog())
    }
}
