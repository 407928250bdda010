//! Recipe list filtering by related tag and ingredient ids
//!
//! Each supplied id list becomes a semi-join (`r.id IN (SELECT recipe_id ...)`),
//! so a recipe linked to several matching entities still yields one row.
//! Within a list the ids are OR-ed; the tag and ingredient conditions are AND-ed.

use sqlx::{Postgres, QueryBuilder};

use crate::{
    error::FieldError,
    models::{
        named::{Ingredient, NamedEntity, NamedListParams, Tag},
        recipe::RecipeListParams,
    },
};

/// Validated recipe list filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeFilter {
    pub fn from_params(params: &RecipeListParams) -> Result<Self, FieldError> {
        Ok(Self {
            tags: parse_id_list("tags", params.tags.as_deref())?,
            ingredients: parse_id_list("ingredients", params.ingredients.as_deref())?,
        })
    }

    /// Append the membership conditions to a query over `recipes r`
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ids) = &self.tags {
            push_membership::<Tag>(builder, ids);
        }

        if let Some(ids) = &self.ingredients {
            push_membership::<Ingredient>(builder, ids);
        }
    }
}

fn push_membership<E: NamedEntity>(builder: &mut QueryBuilder<'_, Postgres>, ids: &[i64]) {
    builder
        .push(format!(
            " AND r.id IN (SELECT recipe_id FROM {} WHERE {} = ANY(",
            E::LINK_TABLE,
            E::LINK_COLUMN
        ))
        .push_bind(ids.to_vec())
        .push("))");
}

/// Parse a comma-separated id list such as `"1,2,3"`
///
/// A missing or empty parameter means no filter. Tokens are trimmed; an
/// empty or non-integer token rejects the whole parameter.
pub fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, FieldError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| {
                FieldError::new(field, format!("'{token}' is not a valid integer id."))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Parse an integer or boolean flag; absent means `false`
pub fn parse_flag(field: &str, raw: Option<&str>) -> Result<bool, FieldError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(false),
        Some(raw) => raw,
    };

    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value != 0);
    }

    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FieldError::new(
            field,
            format!("'{raw}' is not a valid flag, expected 0 or 1."),
        )),
    }
}

/// Whether a tag/ingredient listing is limited to entities used by a recipe
pub fn assigned_only(params: &NamedListParams) -> Result<bool, FieldError> {
    parse_flag("assigned_only", params.assigned_only.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", None).unwrap(), None);
        assert_eq!(parse_id_list("tags", Some("")).unwrap(), None);
        assert_eq!(parse_id_list("tags", Some("3")).unwrap(), Some(vec![3]));
        assert_eq!(
            parse_id_list("tags", Some("1, 2,3")).unwrap(),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_parse_id_list_rejects_malformed_tokens() {
        let err = parse_id_list("tags", Some("1,abc")).unwrap_err();
        assert_eq!(err.field, "tags");
        assert_eq!(err.message, "'abc' is not a valid integer id.");

        assert!(parse_id_list("ingredients", Some("1,,2")).is_err());
        assert!(parse_id_list("ingredients", Some("1.5")).is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("assigned_only", None).unwrap());
        assert!(!parse_flag("assigned_only", Some("0")).unwrap());
        assert!(parse_flag("assigned_only", Some("1")).unwrap());
        assert!(parse_flag("assigned_only", Some("True")).unwrap());
        assert!(!parse_flag("assigned_only", Some("false")).unwrap());
        assert!(parse_flag("assigned_only", Some("yes")).is_err());
    }

    #[test]
    fn test_no_filter_adds_no_conditions() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT r.id FROM recipes r WHERE TRUE");
        RecipeFilter::default().push_conditions(&mut builder);

        assert_eq!(builder.sql(), "SELECT r.id FROM recipes r WHERE TRUE");
    }

    #[test]
    fn test_both_filters_are_semi_joins() {
        let filter = RecipeFilter::from_params(&RecipeListParams {
            tags: Some("1,2".to_string()),
            ingredients: Some("5".to_string()),
        })
        .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT r.id FROM recipes r WHERE TRUE");
        filter.push_conditions(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT r.id FROM recipes r WHERE TRUE \
             AND r.id IN (SELECT recipe_id FROM recipe_tags WHERE tag_id = ANY($1)) \
             AND r.id IN (SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id = ANY($2))"
        );
    }
}
