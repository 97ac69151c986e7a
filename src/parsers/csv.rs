//! Fly catalog CSV import and export
//!
//! Columns: `name,category,difficulty,sizes,target_species,colorways,image_url,materials`.
//! The header row is optional. List columns are split on `;` or `|`, and
//! each material is a `Name@Color@required|optional` token.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::error::{FlyboxError, Result};
use crate::models::{Fly, FlyScope, MaterialCatalog, MaterialRequirement};

/// Column order used for export and for header-less input
pub const COLUMNS: [&str; 8] = [
    "name",
    "category",
    "difficulty",
    "sizes",
    "target_species",
    "colorways",
    "image_url",
    "materials",
];

/// One parsed fly row
#[derive(Debug, Clone, PartialEq)]
pub struct FlyRow {
    /// Pattern name
    pub name: String,
    /// Category
    pub category: String,
    /// Difficulty
    pub difficulty: Option<String>,
    /// Hook sizes
    pub sizes: Vec<String>,
    /// Target species
    pub target_species: Vec<String>,
    /// Colorways
    pub colorways: Vec<String>,
    /// Reference image
    pub image_url: Option<String>,
    /// Bill of materials
    pub materials: Vec<MaterialRequirement>,
}

impl FlyRow {
    /// Build a fly from this row.
    ///
    /// With a catalog, material names are linked to catalog ids where an
    /// entry matches; otherwise they stay free text.
    pub fn into_fly(self, scope: FlyScope, catalog: Option<&MaterialCatalog>) -> Fly {
        let mut fly = Fly::new(self.name, self.category).with_scope(scope);
        fly.difficulty = self.difficulty;
        fly.sizes = self.sizes;
        fly.target_species = self.target_species;
        fly.colorways = self.colorways;
        fly.image_url = self.image_url;

        for mut requirement in self.materials {
            if let Some(catalog) = catalog {
                if let Some(id) = catalog.find_id(requirement.raw_name(), requirement.raw_color()) {
                    requirement.resolve(id);
                }
            }
            fly.add_requirement(requirement);
        }

        fly
    }

    /// Row view of a stored fly
    pub fn from_fly(fly: &Fly) -> Self {
        let mut materials = fly.requirements.clone();
        materials.sort_by_key(|r| r.position);

        Self {
            name: fly.name.clone(),
            category: fly.category.clone(),
            difficulty: fly.difficulty.clone(),
            sizes: fly.sizes.clone(),
            target_species: fly.target_species.clone(),
            colorways: fly.colorways.clone(),
            image_url: fly.image_url.clone(),
            materials,
        }
    }

    fn to_record(&self) -> [String; 8] {
        [
            flatten(&self.name),
            flatten(&self.category),
            self.difficulty.as_deref().map(flatten).unwrap_or_default(),
            join_list(&self.sizes),
            join_list(&self.target_species),
            join_list(&self.colorways),
            self.image_url.as_deref().map(flatten).unwrap_or_default(),
            self.materials
                .iter()
                .map(MaterialRequirement::to_token)
                .collect::<Vec<_>>()
                .join(";"),
        ]
    }
}

/// Where each known column sits in a record
struct ColumnMap {
    index: HashMap<&'static str, usize>,
}

impl ColumnMap {
    fn positional() -> Self {
        Self {
            index: COLUMNS.iter().enumerate().map(|(i, c)| (*c, i)).collect(),
        }
    }

    fn from_header(header: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, field) in header.iter().enumerate() {
            let field = field.trim().to_lowercase();
            if let Some(column) = COLUMNS.iter().find(|c| **c == field) {
                index.entry(*column).or_insert(i);
            }
        }
        Self { index }
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|i| record.get(*i))
            .map(str::trim)
            .unwrap_or("")
    }
}

fn is_header(record: &StringRecord) -> bool {
    let fields: Vec<String> = record.iter().map(|f| f.trim().to_lowercase()).collect();
    let has = |name: &str| fields.iter().any(|f| f == name);
    has("name") && (has("category") || has("materials"))
}

/// Parse fly rows from CSV text.
///
/// Rows with an empty name are skipped; an empty category falls back to
/// `default_category`.
pub fn parse_flies_csv(text: &str, default_category: &str) -> Result<Vec<FlyRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let mut first_row = None;

    let map = match records.next() {
        None => return Ok(Vec::new()),
        Some(first) => {
            let first = first?;
            if is_header(&first) {
                tracing::debug!("CSV header detected");
                ColumnMap::from_header(&first)
            } else {
                first_row = Some(first);
                ColumnMap::positional()
            }
        }
    };

    let mut rows = Vec::new();

    for record in first_row.into_iter().map(Ok).chain(records) {
        let record: StringRecord = record?;

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let name = map.get(&record, "name");
        if name.is_empty() {
            let line = record.position().map_or(0, |p| p.line());
            tracing::warn!("Skipping CSV row at line {}: empty name", line);
            continue;
        }

        let category = match map.get(&record, "category") {
            "" => default_category.to_string(),
            c => c.to_string(),
        };

        let materials = split_list(map.get(&record, "materials"))
            .iter()
            .enumerate()
            .filter_map(|(pos, token)| MaterialRequirement::parse_token(token, pos))
            .collect();

        rows.push(FlyRow {
            name: name.to_string(),
            category,
            difficulty: non_empty(map.get(&record, "difficulty")),
            sizes: split_list(map.get(&record, "sizes")),
            target_species: split_list(map.get(&record, "target_species")),
            colorways: split_list(map.get(&record, "colorways")),
            image_url: non_empty(map.get(&record, "image_url")),
            materials,
        });
    }

    tracing::debug!("Parsed {} fly rows", rows.len());
    Ok(rows)
}

/// Write flies as CSV text with a header row
pub fn write_flies_csv(flies: &[Fly]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for fly in flies {
        writer.write_record(FlyRow::from_fly(fly).to_record())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FlyboxError::Other(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| FlyboxError::Other(format!("CSV is not UTF-8: {}", e)))
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(|c| c == ';' || c == '|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| flatten(&s.replace([';', '|'], " ")))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn flatten(s: &str) -> String {
    s.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaterialCatalogEntry;

    #[test]
    fn test_parse_with_header() {
        let text = "name,category,difficulty,sizes,target_species,colorways,image_url,materials\n\
                    Zebra Midge,trout,Beginner,16;18|20,Trout,Black/Silver,,Hook@@req;Thread@Black@req;Bead@Silver@optional\n";
        let rows = parse_flies_csv(text, "trout").unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Zebra Midge");
        assert_eq!(row.difficulty.as_deref(), Some("Beginner"));
        assert_eq!(row.sizes, vec!["16", "18", "20"]);
        assert_eq!(row.image_url, None);
        assert_eq!(row.materials.len(), 3);
        assert_eq!(row.materials[1].raw_color(), Some("Black"));
        assert_eq!(row.materials[2].position, 2);
        assert!(!row.materials[2].required);
    }

    #[test]
    fn test_parse_reordered_header() {
        let text = "materials,name\nHook,Bare Hook\n";
        let rows = parse_flies_csv(text, "bass").unwrap();
        assert_eq!(rows[0].name, "Bare Hook");
        assert_eq!(rows[0].category, "bass");
        assert_eq!(rows[0].materials[0].raw_name(), "Hook");
    }

    #[test]
    fn test_parse_positional() {
        let text = "Woolly Bugger,,,,,,,Marabou@Olive;Chenille@Olive\n,trout\n";
        let rows = parse_flies_csv(text, "trout").unwrap();

        // second row has no name and is skipped
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "trout");
        assert_eq!(rows[0].materials.len(), 2);
        assert!(rows[0].materials.iter().all(|m| m.required));
    }

    #[test]
    fn test_short_rows() {
        let rows = parse_flies_csv("Hare's Ear,trout\n", "trout").unwrap();
        assert_eq!(rows[0].name, "Hare's Ear");
        assert!(rows[0].materials.is_empty());
    }

    #[test]
    fn test_into_fly_resolves_catalog() {
        let catalog = MaterialCatalog::from_entries([
            MaterialCatalogEntry::new("Thread", Some("Black".into())).with_id("t-black")
        ]);
        let rows = parse_flies_csv("Midge,trout,,,,,,Thread@black;Hook\n", "trout").unwrap();
        let fly = rows[0].clone().into_fly(FlyScope::Global, Some(&catalog));

        assert_eq!(fly.scope, FlyScope::Global);
        assert_eq!(fly.requirements[0].material_id(), Some("t-black"));
        assert_eq!(fly.requirements[1].material_id(), None);
        assert_eq!(fly.requirements[1].position, 1);
    }

    #[test]
    fn test_round_trip() {
        let mut fly = Fly::new("Pheasant Tail", "trout")
            .with_requirement(MaterialRequirement::new("Pheasant Tail Fibers", None))
            .with_requirement(MaterialRequirement::new("Wire", Some("Copper".into())))
            .with_requirement(MaterialRequirement::new("Flashback", Some("Pearl\nTinsel".into())).optional());
        fly.sizes = vec!["14".into(), "16".into()];
        fly.difficulty = Some("Intermediate".into());

        let text = write_flies_csv(&[fly.clone()]).unwrap();
        assert!(text.starts_with("name,category,"));

        let rows = parse_flies_csv(&text, "trout").unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, fly.name);
        assert_eq!(row.sizes, fly.sizes);
        assert_eq!(row.difficulty, fly.difficulty);
        assert_eq!(row.materials.len(), 3);
        assert_eq!(row.materials[1].raw_color(), Some("Copper"));
        assert_eq!(row.materials[2].raw_color(), Some("Pearl Tinsel"));
        assert!(!row.materials[2].required);
    }

    #[test]
    fn test_list_separators_in_items_are_flattened() {
        let mut fly = Fly::new("Clouser Minnow", "saltwater");
        fly.colorways = vec!["Chartreuse|White".into(), "Olive; Tan".into(), "|".into()];

        let text = write_flies_csv(&[fly]).unwrap();
        let rows = parse_flies_csv(&text, "trout").unwrap();
        assert_eq!(rows[0].colorways, vec!["Chartreuse White", "Olive  Tan"]);
    }
}
