//! Tags and ingredients: per-user entities identified by a name

use serde::{Deserialize, Serialize};

use common::error::reject_null_characters;

use crate::{error::FieldError, models::field::Field};

/// Longest accepted tag or ingredient name
pub const MAX_NAME_LENGTH: usize = 255;

/// A user-owned entity with a name that recipes can be linked to
///
/// The constants name the entity table and the link table joining it to
/// `recipes`. They are compile-time identifiers, never user input.
pub trait NamedEntity: Serialize + Send + Sync + Unpin + 'static {
    /// Entity table, e.g. `tags`
    const TABLE: &'static str;
    /// Link table between recipes and this entity, e.g. `recipe_tags`
    const LINK_TABLE: &'static str;
    /// Column of the link table referencing this entity, e.g. `tag_id`
    const LINK_COLUMN: &'static str;
    /// Singular name used in messages and request fields
    const LABEL: &'static str;

    fn from_parts(id: i64, name: String) -> Self;

    fn id(&self) -> i64;

    fn name(&self) -> &str;
}

/// Tag entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl NamedEntity for Tag {
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "recipe_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const LABEL: &'static str = "tag";

    fn from_parts(id: i64, name: String) -> Self {
        Self { id, name }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ingredient entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

impl NamedEntity for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LINK_TABLE: &'static str = "recipe_ingredients";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const LABEL: &'static str = "ingredient";

    fn from_parts(id: i64, name: String) -> Self {
        Self { id, name }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Nested `{name}` object sent inside a recipe body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDescriptor {
    pub name: String,
}

/// Query parameters for tag and ingredient listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedListParams {
    pub assigned_only: Option<String>,
}

/// Body of a tag or ingredient rename
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNamedRequest {
    #[serde(default)]
    pub name: Field<String>,
}

impl UpdateNamedRequest {
    /// Validate the new name; `PUT` (`partial == false`) requires one
    pub fn into_name(self, partial: bool) -> Result<Option<String>, FieldError> {
        match self.name {
            Field::Present(name) => validate_name("name", &name).map(Some),
            Field::Missing if partial => Ok(None),
            Field::Missing => Err(FieldError::new("name", "This field is required.")),
        }
    }
}

/// Trim a name and check it is storable, not blank and not too long
pub fn validate_name(field: &str, raw: &str) -> Result<String, FieldError> {
    reject_null_characters(field, raw)?;
    let name = raw.trim();

    if name.is_empty() {
        return Err(FieldError::new(field, "This field may not be blank."));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(FieldError::new(
            field,
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        ));
    }

    Ok(name.to_string())
}
