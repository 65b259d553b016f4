use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TypeError;
use super::format::{join_list, Amount, IngredientLine};
use crate::SEARCH_OPTIONS;

pub type Id = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOption {
    Name,
    Tag,
    PreparationTime,
    Ingredient,
}

impl FromStr for SearchOption {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "tag" | "tags" => Ok(Self::Tag),
            "prep-time" | "preparation_time" => Ok(Self::PreparationTime),
            "ingredient" | "ingredients" => Ok(Self::Ingredient),
            _ => {
                let options: Vec<&str> = SEARCH_OPTIONS.iter().map(|(key, _)| *key).collect();
                Err(TypeError::new(&format!(
                    "Unknown search option {value:?}, expected one of {}",
                    options.join(", ")
                )))
            }
        }
    }
}

impl TryFrom<Value> for SearchOption {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => value.parse(),
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub name: String,
    pub preparation_time: i64,
    pub cooking_time: i64,
    pub created_at: NaiveDateTime,
    pub image: Option<String>,
    pub favorite: bool,
    pub recipe_of_the_day: bool,
    pub assigned_on: Option<NaiveDate>,
}

/// A line of the recipe list view.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub id: Id,
    pub name: String,
    pub preparation_time: i64,
    pub cooking_time: i64,
    pub created_at: NaiveDateTime,
    pub ingredients: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    pub id: Id,
    pub recipe_id: Id,
    pub ingredient_id: Id,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

impl RecipeIngredient {
    pub fn line(&self) -> IngredientLine {
        IngredientLine {
            name: self.name.to_owned(),
            amount: Amount {
                quantity: self.quantity,
                unit: self.unit.to_owned(),
            },
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparationStep {
    pub id: Id,
    pub description: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeStep {
    pub recipe_id: Id,
    pub step_id: Id,
    pub step_order: i64,
    pub description: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
    pub tags: Vec<Tag>,
}

impl RecipeDetails {
    /// `name (quantity unit),...` as shown in the detail view.
    pub fn ingredient_summary(&self) -> String {
        join_list(self.ingredients.iter().map(|i| i.line().to_string()))
    }

    pub fn tag_summary(&self) -> String {
        join_list(self.tags.iter().map(|t| t.name.to_owned()))
    }

    /// Turns a stored recipe back into the form that would produce it.
    pub fn to_form(&self) -> RecipeForm {
        RecipeForm {
            name: self.recipe.name.to_owned(),
            preparation_time: self.recipe.preparation_time,
            cooking_time: self.recipe.cooking_time,
            image: self.recipe.image.to_owned(),
            favorite: self.recipe.favorite,
            ingredients: self.ingredients.iter().map(|i| i.line()).collect(),
            steps: self
                .steps
                .iter()
                .map(|s| s.description.to_owned())
                .collect(),
            tags: self.tags.iter().map(|t| t.name.to_owned()).collect(),
        }
    }
}

/// Everything the new/edit forms submit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeForm {
    pub name: String,
    pub preparation_time: i64,
    pub cooking_time: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_options_parse_from_form_values() {
        let option = SearchOption::try_from(Value::String(String::from("prep-time")));
        assert_eq!(option, Ok(SearchOption::PreparationTime));

        assert!(SearchOption::try_from(Value::Bool(true)).is_err());
        assert!("color".parse::<SearchOption>().is_err());
    }
}
