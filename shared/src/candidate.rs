use serde::{Serialize, Deserialize};
use validator::Validate;

use crate::validation::validate_candidate_name;

/// One entry on the wheel, e.g. a cocktail recipe.
///
/// Both the recipe spelling (`ingredients`, `instructions`, `imageUrl`) and
/// the generic one (`attributes`, `description`, `image_ref`) are accepted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct Candidate {
    #[validate(length(min = 1), custom = "validate_candidate_name")]
    pub name: String,
    #[serde(default, alias = "ingredients")]
    pub attributes: Vec<String>,
    #[serde(default, alias = "instructions")]
    pub description: String,
    #[serde(default, rename = "imageUrl", alias = "image_ref")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            description: String::new(),
            image_ref: None,
            tags: Vec::new(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_ref.as_deref().map_or(false, |url| !url.trim().is_empty())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
