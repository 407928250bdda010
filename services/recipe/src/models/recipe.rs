//! Recipe models for the recipe service

use chrono::{DateTime, Utc};
use common::error::reject_null_characters;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    error::FieldError,
    models::{
        field::Field,
        named::{Ingredient, NamedDescriptor, Tag},
    },
    reconcile::collect_names,
};

const MAX_TITLE_LENGTH: usize = 255;
const MAX_LINK_LENGTH: usize = 255;
const MAX_PRICE_DIGITS: u32 = 5;
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Recipe row as stored in the `recipes` table
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full recipe representation returned by detail, create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub description: String,
    pub image: Option<String>,
}

impl RecipeDetail {
    pub fn from_row(row: RecipeRow, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            link: row.link,
            tags,
            ingredients,
            description: row.description,
            image: row.image,
        }
    }
}

/// Recipe representation used in listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl From<RecipeDetail> for RecipeSummary {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            time_minutes: detail.time_minutes,
            price: detail.price,
            link: detail.link,
            tags: detail.tags,
            ingredients: detail.ingredients,
        }
    }
}

/// Query parameters for recipe listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeListParams {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// Body of recipe create, full update and partial update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub time_minutes: Field<i32>,
    #[serde(default)]
    pub price: Field<Decimal>,
    #[serde(default)]
    pub link: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub image: Field<Option<String>>,
    #[serde(default)]
    pub tags: Field<Vec<NamedDescriptor>>,
    #[serde(default)]
    pub ingredients: Field<Vec<NamedDescriptor>>,
}

/// Validated input for a new recipe
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Validated changes to an existing recipe
///
/// `tags` and `ingredients` keep the missing/present distinction: a present
/// list, even an empty one, replaces the current links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub title: Field<String>,
    pub time_minutes: Field<i32>,
    pub price: Field<Decimal>,
    pub link: Field<String>,
    pub description: Field<String>,
    pub image: Field<Option<String>>,
    pub tags: Field<Vec<String>>,
    pub ingredients: Field<Vec<String>>,
}

impl RecipeChanges {
    /// True when at least one column of the recipe row changes
    pub fn touches_row(&self) -> bool {
        self.title.is_present()
            || self.time_minutes.is_present()
            || self.price.is_present()
            || self.link.is_present()
            || self.description.is_present()
            || self.image.is_present()
    }
}

impl RecipePayload {
    /// Validate a create request; `title`, `time_minutes` and `price` are required
    pub fn into_new_recipe(self) -> Result<NewRecipe, FieldError> {
        let title = required("title", self.title)?;
        let time_minutes = required("time_minutes", self.time_minutes)?;
        let price = required("price", self.price)?;

        Ok(NewRecipe {
            title: validate_title(&title)?,
            time_minutes,
            price: validate_price(price)?,
            link: self
                .link
                .into_option()
                .map(|link| validate_link(&link))
                .transpose()?
                .unwrap_or_default(),
            description: self
                .description
                .into_option()
                .map(|description| validate_description(&description))
                .transpose()?
                .unwrap_or_default(),
            image: self
                .image
                .into_option()
                .flatten()
                .map(|image| validate_image(&image))
                .transpose()?,
            tags: self
                .tags
                .into_option()
                .map(|tags| collect_names("tags", &tags))
                .transpose()?
                .unwrap_or_default(),
            ingredients: self
                .ingredients
                .into_option()
                .map(|ingredients| collect_names("ingredients", &ingredients))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Validate an update; a full update (`partial == false`) requires the same fields as create
    pub fn into_changes(self, partial: bool) -> Result<RecipeChanges, FieldError> {
        if !partial {
            for (field, present) in [
                ("title", self.title.is_present()),
                ("time_minutes", self.time_minutes.is_present()),
                ("price", self.price.is_present()),
            ] {
                if !present {
                    return Err(FieldError::new(field, "This field is required."));
                }
            }
        }

        Ok(RecipeChanges {
            title: self.title.try_map(|title| validate_title(&title))?,
            time_minutes: self.time_minutes,
            price: self.price.try_map(validate_price)?,
            link: self.link.try_map(|link| validate_link(&link))?,
            description: self
                .description
                .try_map(|description| validate_description(&description))?,
            image: self.image.try_map(|image| {
                image.map(|image| validate_image(&image)).transpose()
            })?,
            tags: self.tags.try_map(|tags| collect_names("tags", &tags))?,
            ingredients: self
                .ingredients
                .try_map(|ingredients| collect_names("ingredients", &ingredients))?,
        })
    }
}

fn required<T>(field: &str, value: Field<T>) -> Result<T, FieldError> {
    value
        .into_option()
        .ok_or_else(|| FieldError::new(field, "This field is required."))
}

fn validate_title(raw: &str) -> Result<String, FieldError> {
    reject_null_characters("title", raw)?;
    let title = raw.trim();

    if title.is_empty() {
        return Err(FieldError::new("title", "This field may not be blank."));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(FieldError::new(
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_LENGTH} characters."),
        ));
    }

    Ok(title.to_string())
}

fn validate_link(raw: &str) -> Result<String, FieldError> {
    reject_null_characters("link", raw)?;
    let link = raw.trim();

    if link.chars().count() > MAX_LINK_LENGTH {
        return Err(FieldError::new(
            "link",
            format!("Ensure this field has no more than {MAX_LINK_LENGTH} characters."),
        ));
    }

    Ok(link.to_string())
}

fn validate_description(raw: &str) -> Result<String, FieldError> {
    reject_null_characters("description", raw)?;
    Ok(raw.trim().to_string())
}

fn validate_image(raw: &str) -> Result<String, FieldError> {
    reject_null_characters("image", raw)?;
    let image = raw.trim();

    if image.chars().count() > MAX_LINK_LENGTH {
        return Err(FieldError::new(
            "image",
            format!("Ensure this field has no more than {MAX_LINK_LENGTH} characters."),
        ));
    }

    Ok(image.to_string())
}

/// Check the price fits `NUMERIC(5, 2)`
fn validate_price(price: Decimal) -> Result<Decimal, FieldError> {
    if price.round_dp(PRICE_DECIMAL_PLACES) != price {
        return Err(FieldError::new(
            "price",
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        ));
    }

    let limit = Decimal::from(10i64.pow(MAX_PRICE_DIGITS - PRICE_DECIMAL_PLACES));
    if price.abs() >= limit {
        return Err(FieldError::new(
            "price",
            format!("Ensure that there are no more than {MAX_PRICE_DIGITS} digits in total."),
        ));
    }

    Ok(price)
}
