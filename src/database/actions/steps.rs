use sqlx::{Acquire, Pool, Sqlite};

use crate::{
    error::{Error, QueryError},
    schema::{Id, PreparationStep, RecipeStep},
};

pub async fn create_step<'a, A>(description: &str, db: A) -> Result<Id, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let id: (Id,) =
        sqlx::query_as("INSERT INTO preparation_steps (description) VALUES ($1) RETURNING id")
            .bind(description.trim())
            .fetch_one(&mut *conn)
            .await
            .map_err(QueryError::from)?;

    Ok(id.0)
}

pub async fn get_step(id: Id, pool: &Pool<Sqlite>) -> Result<Option<PreparationStep>, Error> {
    let row: Option<PreparationStep> =
        sqlx::query_as("SELECT * FROM preparation_steps WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn update_step(id: Id, description: &str, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("UPDATE preparation_steps SET description = $1 WHERE id = $2")
        .bind(description.trim())
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No step exists with specified id"));
    }

    Ok(())
}

pub async fn delete_step(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM preparation_steps WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No step exists with specified id"));
    }

    Ok(())
}

pub async fn add_step_to_recipe<'a, A>(
    recipe_id: Id,
    step_id: Id,
    order: i64,
    db: A,
) -> Result<(), Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    sqlx::query("INSERT INTO recipe_steps (recipe_id, step_id, step_order) VALUES ($1, $2, $3)")
        .bind(recipe_id)
        .bind(step_id)
        .bind(order)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}

/// Adds a new step after the current last one and returns its id.
pub async fn append_step(recipe_id: Id, description: &str, pool: &Pool<Sqlite>) -> Result<Id, Error> {
    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    let last: (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(step_order), 0) FROM recipe_steps WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(QueryError::from)?;

    let step_id = create_step(description, &mut *tx).await?;
    add_step_to_recipe(recipe_id, step_id, last.0 + 1, &mut *tx).await?;

    tx.commit().await.map_err(QueryError::from)?;
    Ok(step_id)
}

/// Steps of a recipe by their order.
pub async fn list_recipe_steps<'a, A>(recipe_id: Id, db: A) -> Result<Vec<RecipeStep>, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let rows: Vec<RecipeStep> = sqlx::query_as(
        "
        SELECT rs.recipe_id AS recipe_id, p.id AS step_id, rs.step_order AS step_order,
            p.description AS description
        FROM recipe_steps rs
        INNER JOIN preparation_steps p ON p.id = rs.step_id
        WHERE rs.recipe_id = $1
        ORDER BY rs.step_order, rs.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// Steps belong to the recipes that list them; drop the ones nothing lists.
pub async fn delete_orphan_steps<'a, A>(db: A) -> Result<u64, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let result = sqlx::query(
        "DELETE FROM preparation_steps WHERE id NOT IN (SELECT step_id FROM recipe_steps)",
    )
    .execute(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions::connect_in_memory, actions::create_recipe, schema::RecipeForm};

    async fn empty_recipe(pool: &Pool<Sqlite>) -> Id {
        let form = RecipeForm {
            name: String::from("Rice"),
            preparation_time: 5,
            cooking_time: 20,
            ..RecipeForm::default()
        };
        create_recipe(&form, pool).await.unwrap()
    }

    #[tokio::test]
    async fn appended_steps_continue_the_order() {
        let pool = connect_in_memory().await.unwrap();
        let recipe = empty_recipe(&pool).await;

        append_step(recipe, "Rinse the rice", &pool).await.unwrap();
        append_step(recipe, "Boil for 20 minutes", &pool).await.unwrap();

        let steps = list_recipe_steps(recipe, &pool).await.unwrap();
        let orders: Vec<i64> = steps.iter().map(|s| s.step_order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(steps[1].description, "Boil for 20 minutes");
    }

    #[tokio::test]
    async fn steps_can_be_edited() {
        let pool = connect_in_memory().await.unwrap();
        let recipe = empty_recipe(&pool).await;
        let step = append_step(recipe, "Boil", &pool).await.unwrap();

        update_step(step, "Simmer", &pool).await.unwrap();
        assert_eq!(
            get_step(step, &pool).await.unwrap().unwrap().description,
            "Simmer"
        );

        delete_step(step, &pool).await.unwrap();
        assert!(list_recipe_steps(recipe, &pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn orphan_steps_are_removed() {
        let pool = connect_in_memory().await.unwrap();
        let loose = create_step("Nobody uses me", &pool).await.unwrap();

        assert_eq!(delete_orphan_steps(&pool).await.unwrap(), 1);
        assert!(get_step(loose, &pool).await.unwrap().is_none());
    }
}
