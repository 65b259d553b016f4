use sqlx::{Acquire, Pool, Sqlite};

use crate::{
    error::{Error, QueryError},
    schema::{Id, Ingredient, RecipeIngredient},
};

/// Returns the id of the ingredient called `name`, inserting it first when
/// it doesn't exist yet.
pub async fn create_ingredient<'a, A>(name: &str, db: A) -> Result<Id, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let name = name.trim();

    if let Some(id) = find_ingredient(name, &mut *conn).await? {
        return Ok(id);
    }

    let id: (Id,) = sqlx::query_as("INSERT INTO ingredients (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    log::debug!("Created ingredient {} ({name})", id.0);
    Ok(id.0)
}

pub async fn find_ingredient<'a, A>(name: &str, db: A) -> Result<Option<Id>, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM ingredients WHERE name = $1")
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(row.map(|r| r.0))
}

pub async fn get_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn list_ingredients(pool: &Pool<Sqlite>) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT * FROM ingredients ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn rename_ingredient(id: Id, name: &str, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("UPDATE ingredients SET name = $1 WHERE id = $2")
        .bind(name.trim())
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No ingredient exists with specified id"));
    }

    Ok(())
}

/// Removes the ingredient from every recipe that uses it as well.
pub async fn delete_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No ingredient exists with specified id"));
    }

    Ok(())
}

pub async fn add_ingredient_to_recipe<'a, A>(
    recipe_id: Id,
    ingredient_id: Id,
    quantity: i64,
    unit: &str,
    db: A,
) -> Result<Id, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    ",
    )
    .bind(recipe_id)
    .bind(ingredient_id)
    .bind(quantity)
    .bind(unit.trim())
    .fetch_one(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(id.0)
}

pub async fn remove_ingredient_from_recipe(
    recipe_id: Id,
    ingredient_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    let result =
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1 AND ingredient_id = $2")
            .bind(recipe_id)
            .bind(ingredient_id)
            .execute(pool)
            .await
            .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::invalid_request("Ingredient is not in recipe"));
    }

    Ok(())
}

/// Ingredients of a recipe in the order they were added.
pub async fn list_recipe_ingredients<'a, A>(
    recipe_id: Id,
    db: A,
) -> Result<Vec<RecipeIngredient>, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT ri.id AS id, ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name,
            ri.quantity AS quantity, ri.unit AS unit
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}
