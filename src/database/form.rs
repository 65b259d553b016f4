use std::{collections::HashMap, str::FromStr};

use serde_json::Value;

use super::error::{Error, TypeError};
use super::format::{split_list, IngredientLine};
use super::schema::RecipeForm;
use crate::constants::{
    INGREDIENT_NAME_MAX_LEN, RECIPE_NAME_MAX_LEN, STEP_DESCRIPTION_MAX_LEN, TAG_NAME_MAX_LEN,
    UNIT_MAX_LEN,
};

pub type FormData = HashMap<String, Value>;

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let data: FormData = serde_json::from_str(json)
            .map_err(|_e| TypeError::new("Form data is not a JSON object"))?;

        Ok(Self::from_data(data))
    }

    pub fn get_value<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: TryFrom<Value>,
    {
        match self.inner.get(key) {
            Some(value) => value
                .to_owned()
                .try_into()
                .map_err(|_e| TypeError::new("Invalid type conversion")),
            None => Err(TypeError::new("Invalid key")),
        }
    }

    /// Numbers arrive either as JSON numbers or as text typed into a field.
    pub fn get_number<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: FromStr,
    {
        match self.inner.get(key) {
            Some(Value::Number(v)) => v
                .to_string()
                .parse()
                .map_err(|_e| TypeError::new("Invalid type conversion")),
            Some(Value::String(v)) => v
                .trim()
                .parse()
                .map_err(|_e| TypeError::new("Invalid type conversion")),
            Some(_) => Err(TypeError::new("Failed to parse value as number")),
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<String, TypeError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(v.to_string()),
                None => Err(TypeError::new("Invalid key")),
            },
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_optional_str(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get_str(key).map(Some),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(v)) => Ok(*v),
            Some(Value::String(v)) => match v.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" | "" => Ok(false),
                _ => Err(TypeError::new("Invalid boolean")),
            },
            Some(_) => Err(TypeError::new("Invalid boolean")),
        }
    }

    /// A list field is either a JSON array of strings or one comma-joined string.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, TypeError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(vec![]),
            Some(Value::String(v)) => Ok(split_list(v)),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| TypeError::new("Invalid list item"))
                })
                .collect(),
            Some(_) => Err(TypeError::new("Invalid list")),
        }
    }
}

impl TryFrom<&Form> for RecipeForm {
    type Error = TypeError;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let ingredients = form
            .get_list("ingredients")?
            .iter()
            .map(|line| line.parse::<IngredientLine>())
            .collect::<Result<Vec<IngredientLine>, TypeError>>()?;

        let recipe = Self {
            name: form.get_str("name")?.trim().to_string(),
            preparation_time: form.get_number("preparation_time")?,
            cooking_time: form.get_number("cooking_time")?,
            image: form.get_optional_str("image")?,
            favorite: form.get_bool("favorite")?,
            ingredients,
            steps: form.get_list("steps")?,
            tags: form.get_list("tags")?,
        };

        recipe.validate()?;
        Ok(recipe)
    }
}

fn check_text(value: &str, max_len: usize, field: &str) -> Result<(), TypeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TypeError::new(&format!("{field} can't be empty")));
    }
    if value.chars().count() > max_len {
        return Err(TypeError::new(&format!(
            "{field} is longer than {max_len} characters"
        )));
    }
    Ok(())
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), TypeError> {
        check_text(&self.name, RECIPE_NAME_MAX_LEN, "Recipe name")?;

        if self.preparation_time < 0 || self.cooking_time < 0 {
            return Err(TypeError::new("Times can't be negative"));
        }

        for line in self.ingredients.iter() {
            check_text(&line.name, INGREDIENT_NAME_MAX_LEN, "Ingredient name")?;
            check_text(&line.amount.unit, UNIT_MAX_LEN, "Unit")?;
            if line.amount.quantity < 0 {
                return Err(TypeError::new("Quantities can't be negative"));
            }
        }

        for step in self.steps.iter() {
            check_text(step, STEP_DESCRIPTION_MAX_LEN, "Step")?;
        }

        for tag in self.tags.iter() {
            check_text(tag, TAG_NAME_MAX_LEN, "Tag")?;
        }

        Ok(())
    }
}
