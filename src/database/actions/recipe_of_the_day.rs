use chrono::NaiveDate;
use rand::seq::SliceRandom;
use sqlx::{Pool, Sqlite};

use super::RECIPE_ROW_COLUMNS;
use crate::{
    error::{Error, QueryError},
    schema::{Id, RecipeRow},
};

/// Flags a uniformly random recipe as the recipe of `today`, replacing any
/// previous pick. Returns `None` when there are no recipes.
pub async fn select_recipe_of_the_day(
    today: NaiveDate,
    pool: &Pool<Sqlite>,
) -> Result<Option<Id>, Error> {
    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    let ids: Vec<(Id,)> = sqlx::query_as("SELECT id FROM recipes")
        .fetch_all(&mut *tx)
        .await
        .map_err(QueryError::from)?;

    let pick = ids.choose(&mut rand::thread_rng()).map(|row| row.0);
    let pick = match pick {
        Some(id) => id,
        None => return Ok(None),
    };

    sqlx::query(
        "UPDATE recipes SET recipe_of_the_day = 0, assigned_on = NULL WHERE recipe_of_the_day = 1",
    )
    .execute(&mut *tx)
    .await
    .map_err(QueryError::from)?;

    sqlx::query("UPDATE recipes SET recipe_of_the_day = 1, assigned_on = $1 WHERE id = $2")
        .bind(today)
        .bind(pick)
        .execute(&mut *tx)
        .await
        .map_err(QueryError::from)?;

    tx.commit().await.map_err(QueryError::from)?;
    log::info!("Recipe {pick} is the recipe of {today}");

    Ok(Some(pick))
}

pub async fn get_recipe_of_the_day(pool: &Pool<Sqlite>) -> Result<Option<RecipeRow>, Error> {
    let row: Option<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_ROW_COLUMNS} FROM recipes r WHERE r.recipe_of_the_day = 1 LIMIT 1"
    ))
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn reset_recipe_of_the_day(pool: &Pool<Sqlite>) -> Result<(), Error> {
    sqlx::query(
        "UPDATE recipes SET recipe_of_the_day = 0, assigned_on = NULL WHERE recipe_of_the_day = 1",
    )
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(())
}

/// True when no recipe is flagged or the flag was set on another calendar day.
pub async fn has_day_changed(today: NaiveDate, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    let row: Option<(Option<NaiveDate>,)> =
        sqlx::query_as("SELECT assigned_on FROM recipes WHERE recipe_of_the_day = 1 LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    match row {
        Some((Some(assigned_on),)) => Ok(assigned_on != today),
        Some((None,)) => {
            log::warn!("Recipe of the day has no assignment date");
            Ok(true)
        }
        None => Ok(true),
    }
}

/// Picks a new recipe of the day when the day changed and returns the current one.
pub async fn refresh_recipe_of_the_day(
    today: NaiveDate,
    pool: &Pool<Sqlite>,
) -> Result<Option<RecipeRow>, Error> {
    if has_day_changed(today, pool).await? {
        select_recipe_of_the_day(today, pool).await?;
    }

    get_recipe_of_the_day(pool).await
}
