//! Fly patterns and their bills of materials

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matcher::normalize;

/// Which catalog a fly lives in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlyScope {
    /// Shared catalog, read-only for ordinary users
    Global,
    /// The user's own catalog ("My Flies")
    #[default]
    Personal,
}

impl fmt::Display for FlyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Personal => write!(f, "personal"),
        }
    }
}

/// Identity of a required material: a catalog link or free text only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "link", rename_all = "snake_case")]
pub enum MaterialRef {
    /// Linked to a material catalog entry
    Resolved {
        /// Catalog material id
        id: String,
        /// Name as entered or imported
        name: String,
        /// Color qualifier as entered or imported
        color: Option<String>,
    },
    /// Free text that has no catalog link
    Unresolved {
        /// Name as entered or imported
        name: String,
        /// Color qualifier as entered or imported
        color: Option<String>,
    },
}

impl MaterialRef {
    /// Raw material name
    pub fn name(&self) -> &str {
        match self {
            Self::Resolved { name, .. } | Self::Unresolved { name, .. } => name,
        }
    }

    /// Raw color qualifier
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Resolved { color, .. } | Self::Unresolved { color, .. } => color.as_deref(),
        }
    }

    /// Catalog id, when linked
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Resolved { id, .. } => Some(id),
            Self::Unresolved { .. } => None,
        }
    }
}

/// One line item of a fly's bill of materials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// Material identity
    pub material: MaterialRef,
    /// Strictly needed (`false` means optional or substitutable)
    pub required: bool,
    /// Display ordering key
    pub position: usize,
}

impl MaterialRequirement {
    /// Create a required, unresolved line item
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            material: MaterialRef::Unresolved {
                name: name.into(),
                color: clean_color(color),
            },
            required: true,
            position: 0,
        }
    }

    /// Create a required line item linked to a catalog material
    pub fn resolved(id: impl Into<String>, name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            material: MaterialRef::Resolved {
                id: id.into(),
                name: name.into(),
                color: clean_color(color),
            },
            required: true,
            position: 0,
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the display position
    pub fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Raw material name
    pub fn raw_name(&self) -> &str {
        self.material.name()
    }

    /// Raw color qualifier
    pub fn raw_color(&self) -> Option<&str> {
        self.material.color()
    }

    /// Catalog id, when linked
    pub fn material_id(&self) -> Option<&str> {
        self.material.id()
    }

    /// Link this line item to a catalog material
    pub fn resolve(&mut self, id: impl Into<String>) {
        let name = self.raw_name().to_string();
        let color = self.raw_color().map(str::to_string);
        self.material = MaterialRef::Resolved {
            id: id.into(),
            name,
            color,
        };
    }

    /// Display label, e.g. `Krystal Flash (Pearl)`
    pub fn label(&self) -> String {
        match self.raw_color() {
            Some(color) => format!("{} ({})", self.raw_name(), color),
            None => self.raw_name().to_string(),
        }
    }

    /// Text scored against inventory descriptions: name and color together
    pub fn match_text(&self) -> String {
        match self.raw_color() {
            Some(color) => format!("{} {}", self.raw_name(), color),
            None => self.raw_name().to_string(),
        }
    }

    /// Parse a `Name@Color@required|optional` token.
    ///
    /// Color and requiredness are optional; a third part starting with
    /// `opt` marks the item optional. Returns `None` for a blank name.
    pub fn parse_token(token: &str, position: usize) -> Option<Self> {
        let mut parts = token.split('@').map(str::trim);

        let name = parts.next().unwrap_or("");
        if name.is_empty() {
            return None;
        }

        let color = parts.next().filter(|c| !c.is_empty()).map(str::to_string);
        let required = !parts
            .next()
            .map_or(false, |r| r.to_lowercase().starts_with("opt"));

        let mut req = Self::new(name, color).at(position);
        req.required = required;
        Some(req)
    }

    /// Format as a `Name@Color@req|opt` token
    pub fn to_token(&self) -> String {
        let flag = if self.required { "req" } else { "opt" };
        format!(
            "{}@{}@{}",
            flatten(self.raw_name()),
            self.raw_color().map(flatten).unwrap_or_default(),
            flag
        )
    }
}

impl fmt::Display for MaterialRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if !self.required {
            write!(f, " [optional]")?;
        }
        Ok(())
    }
}

fn clean_color(color: Option<String>) -> Option<String> {
    color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Strip characters that would break the token or row structure
fn flatten(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
        .replace(['@', ';', '|'], " ")
        .trim()
        .to_string()
}

/// A fly tying pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fly {
    /// Unique identifier
    pub id: String,
    /// Pattern name
    pub name: String,
    /// Category (trout, bass, saltwater, ...)
    pub category: String,
    /// Difficulty
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Hook sizes
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Target species
    #[serde(default)]
    pub target_species: Vec<String>,
    /// Known colorways
    #[serde(default)]
    pub colorways: Vec<String>,
    /// Reference image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Owning catalog
    #[serde(default)]
    pub scope: FlyScope,
    /// Bill of materials, ordered by position
    #[serde(default)]
    pub requirements: Vec<MaterialRequirement>,
}

impl Fly {
    /// Create a new personal fly with a fresh id
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            difficulty: None,
            sizes: Vec::new(),
            target_species: Vec::new(),
            colorways: Vec::new(),
            image_url: None,
            scope: FlyScope::Personal,
            requirements: Vec::new(),
        }
    }

    /// Override the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the owning catalog
    pub fn with_scope(mut self, scope: FlyScope) -> Self {
        self.scope = scope;
        self
    }

    /// Append a line item at the next position
    pub fn add_requirement(&mut self, requirement: MaterialRequirement) {
        let position = self.requirements.len();
        self.requirements.push(requirement.at(position));
    }

    /// Builder form of [`Fly::add_requirement`]
    pub fn with_requirement(mut self, requirement: MaterialRequirement) -> Self {
        self.add_requirement(requirement);
        self
    }

    /// Canonical form of the name, used for duplicate detection
    pub fn normalized_name(&self) -> String {
        normalize(&self.name)
    }

    /// Line items that must be on hand
    pub fn required_materials(&self) -> impl Iterator<Item = &MaterialRequirement> {
        self.requirements.iter().filter(|r| r.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_full() {
        let req = MaterialRequirement::parse_token("Krystal Flash@Pearl@required", 2).unwrap();
        assert_eq!(req.raw_name(), "Krystal Flash");
        assert_eq!(req.raw_color(), Some("Pearl"));
        assert!(req.required);
        assert_eq!(req.position, 2);
        assert!(req.material_id().is_none());
    }

    #[test]
    fn test_parse_token_defaults() {
        let req = MaterialRequirement::parse_token(" Hook ", 0).unwrap();
        assert_eq!(req.raw_name(), "Hook");
        assert_eq!(req.raw_color(), None);
        assert!(req.required);

        let req = MaterialRequirement::parse_token("Hook@@1", 0).unwrap();
        assert_eq!(req.raw_color(), None);
        assert!(req.required);
    }

    #[test]
    fn test_parse_token_optional() {
        let req = MaterialRequirement::parse_token("Flashback@Pearl@Optional", 0).unwrap();
        assert!(!req.required);
        let req = MaterialRequirement::parse_token("Flashback@@opt", 0).unwrap();
        assert!(!req.required);
    }

    #[test]
    fn test_parse_token_blank_name() {
        assert!(MaterialRequirement::parse_token("", 0).is_none());
        assert!(MaterialRequirement::parse_token("@Black@req", 0).is_none());
    }

    #[test]
    fn test_token_round_trip() {
        let req = MaterialRequirement::new("Thread", Some("Black".into())).optional();
        let token = req.to_token();
        assert_eq!(token, "Thread@Black@opt");
        let parsed = MaterialRequirement::parse_token(&token, 0).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn test_resolve_keeps_text() {
        let mut req = MaterialRequirement::new("Hook", None);
        req.resolve("m-1");
        assert_eq!(req.material_id(), Some("m-1"));
        assert_eq!(req.raw_name(), "Hook");
    }

    #[test]
    fn test_label_and_match_text() {
        let req = MaterialRequirement::new("Bead", Some("Silver 2.0mm".into()));
        assert_eq!(req.label(), "Bead (Silver 2.0mm)");
        assert_eq!(req.match_text(), "Bead Silver 2.0mm");
        assert_eq!(MaterialRequirement::new("Hook", Some("  ".into())).raw_color(), None);
    }

    #[test]
    fn test_fly_requirements() {
        let fly = Fly::new("Zebra Midge", "trout")
            .with_requirement(MaterialRequirement::new("Hook", None))
            .with_requirement(MaterialRequirement::new("Wire", Some("Silver".into())).optional());

        assert_eq!(fly.requirements[1].position, 1);
        assert_eq!(fly.required_materials().count(), 1);
        assert_eq!(fly.normalized_name(), "zebra midge");
        assert_eq!(fly.scope, FlyScope::Personal);
    }
}
