use sqlx::{Pool, Sqlite};

use super::RECIPE_ROW_COLUMNS;
use crate::{
    error::{Error, QueryError},
    format::{parse_minutes, search_key},
    schema::{RecipeRow, SearchOption},
};

/// `LIKE` pattern matching `text` anywhere, with wildcards in `text` taken literally.
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{escaped}%")
}

/// Substring match on the case-folded name, so `ñoquis` finds `Ñoquis`.
pub async fn search_by_name(name: &str, pool: &Pool<Sqlite>) -> Result<Vec<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_ROW_COLUMNS} FROM recipes r WHERE r.search_name LIKE $1 ESCAPE '\\' ORDER BY r.id"
    ))
    .bind(contains_pattern(&search_key(name)))
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn search_by_tag(tag: &str, pool: &Pool<Sqlite>) -> Result<Vec<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "
        SELECT {RECIPE_ROW_COLUMNS}
        FROM recipes r
        WHERE EXISTS (
            SELECT 1 FROM recipe_tags rt
            INNER JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = r.id AND t.name = $1
        )
        ORDER BY r.id
    "
    ))
    .bind(tag.trim())
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn search_by_preparation_time(
    minutes: i64,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_ROW_COLUMNS} FROM recipes r WHERE r.preparation_time = $1 ORDER BY r.id"
    ))
    .bind(minutes)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn search_by_ingredient(
    ingredient: &str,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "
        SELECT {RECIPE_ROW_COLUMNS}
        FROM recipes r
        WHERE EXISTS (
            SELECT 1 FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = r.id AND i.name = $1
        )
        ORDER BY r.id
    "
    ))
    .bind(ingredient.trim())
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// Runs the search picked in the search bar against the typed text.
pub async fn search(
    option: SearchOption,
    input: &str,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeRow>, Error> {
    log::debug!("Searching by {option:?}: {input}");

    match option {
        SearchOption::Name => search_by_name(input, pool).await,
        SearchOption::Tag => search_by_tag(input, pool).await,
        SearchOption::PreparationTime => {
            search_by_preparation_time(parse_minutes(input)?, pool).await
        }
        SearchOption::Ingredient => search_by_ingredient(input, pool).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("rice"), "%rice%");
        assert_eq!(contains_pattern(" 100%_ "), "%100\\%\\_%");
    }
}
