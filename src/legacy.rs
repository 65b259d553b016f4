//! Import of the recipe list kept by the file-based version of the app.
//!
//! That version stored one recipe per CSV row, with ingredients, amounts,
//! steps and tags packed into comma-joined cells:
//!
//! ```text
//! id,nombre,ingredientes,cantidades,preparacion,tiempo de preparacion,tiempo de coccion,creado,imagen,etiquetas,favorito
//! 1,Tortilla,"huevo,papa","4 unidad,2 unidad","Batir,Freir",15 min,25 min,18:05 21-03-2023,None,"Facil",True
//! ```
//!
//! `etiquetas` and `favorito` only exist in later files.

use std::{fs::File, io::Read, path::Path};

use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};

use crate::{
    actions::recipes::insert_recipe,
    error::{Error, TypeError},
    format::{combine_ingredients, parse_minutes, parse_timestamp, split_list},
    schema::{Id, RecipeForm},
};

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyRecipe {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ingredientes", default)]
    pub ingredients: String,
    #[serde(rename = "cantidades", default)]
    pub amounts: String,
    #[serde(rename = "preparacion", default)]
    pub steps: String,
    #[serde(rename = "tiempo de preparacion")]
    pub preparation_time: String,
    #[serde(rename = "tiempo de coccion")]
    pub cooking_time: String,
    #[serde(rename = "creado", default)]
    pub created_at: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
    #[serde(rename = "etiquetas", default)]
    pub tags: String,
    #[serde(rename = "favorito", default)]
    pub favorite: String,
}

impl LegacyRecipe {
    /// `None`, empty, or a (possibly quoted) Windows-style relative path.
    fn image_path(&self) -> Option<String> {
        let image = self.image.trim().trim_matches('\'').trim_matches('"');
        if image.is_empty() || image == "None" {
            return None;
        }

        Some(image.replace("\\\\", "/").replace('\\', "/"))
    }

    fn is_favorite(&self) -> bool {
        matches!(
            self.favorite.trim().to_lowercase().as_str(),
            "true" | "1" | "si" | "sí" | "yes"
        )
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        if self.created_at.trim().is_empty() {
            return None;
        }

        match parse_timestamp(&self.created_at) {
            Ok(timestamp) => Some(timestamp),
            Err(_) => {
                log::warn!(
                    "Unreadable creation time {:?} for {}",
                    self.created_at,
                    self.name
                );
                None
            }
        }
    }
}

impl TryFrom<&LegacyRecipe> for RecipeForm {
    type Error = TypeError;

    fn try_from(legacy: &LegacyRecipe) -> Result<Self, Self::Error> {
        let form = Self {
            name: legacy.name.trim().to_string(),
            preparation_time: parse_minutes(&legacy.preparation_time)?,
            cooking_time: parse_minutes(&legacy.cooking_time)?,
            image: legacy.image_path(),
            favorite: legacy.is_favorite(),
            ingredients: combine_ingredients(&legacy.ingredients, &legacy.amounts)?,
            steps: split_list(&legacy.steps),
            tags: split_list(&legacy.tags),
        };

        form.validate()?;
        Ok(form)
    }
}

pub fn read_legacy_recipes<R: Read>(reader: R) -> Result<Vec<LegacyRecipe>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut recipes = vec![];
    for record in reader.deserialize() {
        recipes.push(record?);
    }

    Ok(recipes)
}

/// Inserts every row as a recipe and returns the new ids in file order.
/// Stops at the first row that can't be converted.
pub async fn import_csv<R: Read>(reader: R, pool: &Pool<Sqlite>) -> Result<Vec<Id>, Error> {
    let recipes = read_legacy_recipes(reader)?;
    let mut ids = Vec::with_capacity(recipes.len());

    for (row, legacy) in recipes.iter().enumerate() {
        let form = RecipeForm::try_from(legacy)
            .map_err(|e| Error::InvalidRequest(format!("row {}: {e}", row + 1)))?;

        ids.push(insert_recipe(&form, legacy.created_at(), pool).await?);
    }

    log::info!("Imported {} legacy recipes", ids.len());
    Ok(ids)
}

pub async fn import_csv_file(path: &Path, pool: &Pool<Sqlite>) -> Result<Vec<Id>, Error> {
    let file = File::open(path)?;
    import_csv(file, pool).await
}
