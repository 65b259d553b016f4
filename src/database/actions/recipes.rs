use chrono::{Local, NaiveDateTime, SubsecRound};
use sqlx::{Pool, Sqlite, SqliteConnection};

use super::{
    add_ingredient_to_recipe, add_step_to_recipe, add_tag_to_recipe, create_ingredient,
    create_step, create_tag, delete_orphan_steps, list_recipe_ingredients, list_recipe_steps,
    list_recipe_tags, RECIPE_ROW_COLUMNS,
};
use crate::{
    error::{Error, QueryError},
    format::search_key,
    schema::{Id, Recipe, RecipeDetails, RecipeForm, RecipeRow},
};

pub async fn create_recipe(form: &RecipeForm, pool: &Pool<Sqlite>) -> Result<Id, Error> {
    insert_recipe(form, None, pool).await
}

/// Same as [`create_recipe`] but keeps a creation time recorded elsewhere.
/// Without one the recipe is stamped with the local wall-clock time.
pub(crate) async fn insert_recipe(
    form: &RecipeForm,
    created_at: Option<NaiveDateTime>,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    form.validate()?;
    let created_at = created_at.unwrap_or_else(|| Local::now().naive_local().trunc_subsecs(0));
    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (name, search_name, preparation_time, cooking_time, created_at, image, favorite)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
    ",
    )
    .bind(form.name.trim())
    .bind(search_key(&form.name))
    .bind(form.preparation_time)
    .bind(form.cooking_time)
    .bind(created_at)
    .bind(&form.image)
    .bind(form.favorite)
    .fetch_one(&mut *tx)
    .await
    .map_err(QueryError::from)?;

    let recipe_id = id.0;
    insert_recipe_parts(recipe_id, form, &mut *tx).await?;

    tx.commit().await.map_err(QueryError::from)?;
    log::info!("Created recipe {recipe_id} ({})", form.name);

    Ok(recipe_id)
}

async fn insert_recipe_parts(
    recipe_id: Id,
    form: &RecipeForm,
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    for line in form.ingredients.iter() {
        let ingredient_id = create_ingredient(&line.name, &mut *conn).await?;
        add_ingredient_to_recipe(
            recipe_id,
            ingredient_id,
            line.amount.quantity,
            &line.amount.unit,
            &mut *conn,
        )
        .await?;
    }

    for (i, description) in form.steps.iter().enumerate() {
        let step_id = create_step(description, &mut *conn).await?;
        add_step_to_recipe(recipe_id, step_id, i as i64 + 1, &mut *conn).await?;
    }

    for name in form.tags.iter() {
        let tag_id = create_tag(name, &mut *conn).await?;
        add_tag_to_recipe(recipe_id, tag_id, &mut *conn).await?;
    }

    Ok(())
}

pub async fn get_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn get_recipe_details(
    id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Option<RecipeDetails>, Error> {
    let recipe = match get_recipe(id, pool).await? {
        Some(recipe) => recipe,
        None => return Ok(None),
    };

    Ok(Some(RecipeDetails {
        recipe,
        ingredients: list_recipe_ingredients(id, pool).await?,
        steps: list_recipe_steps(id, pool).await?,
        tags: list_recipe_tags(id, pool).await?,
    }))
}

pub async fn list_recipes(pool: &Pool<Sqlite>) -> Result<Vec<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_ROW_COLUMNS} FROM recipes r ORDER BY r.id"
    ))
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// Overwrites the recipe row and replaces its ingredients, steps and tags.
pub async fn update_recipe(id: Id, form: &RecipeForm, pool: &Pool<Sqlite>) -> Result<(), Error> {
    form.validate()?;
    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    let result = sqlx::query(
        "
        UPDATE recipes
        SET name = $1, search_name = $2, preparation_time = $3, cooking_time = $4,
            image = $5, favorite = $6
        WHERE id = $7
    ",
    )
    .bind(form.name.trim())
    .bind(search_key(&form.name))
    .bind(form.preparation_time)
    .bind(form.cooking_time)
    .bind(&form.image)
    .bind(form.favorite)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No recipe exists with specified id"));
    }

    for table in ["recipe_ingredients", "recipe_steps", "recipe_tags"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE recipe_id = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(QueryError::from)?;
    }
    delete_orphan_steps(&mut *tx).await?;

    insert_recipe_parts(id, form, &mut *tx).await?;

    tx.commit().await.map_err(QueryError::from)?;
    log::info!("Updated recipe {id}");

    Ok(())
}

pub async fn update_recipe_info(
    id: Id,
    name: &str,
    preparation_time: i64,
    cooking_time: i64,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    let form = RecipeForm {
        name: name.to_string(),
        preparation_time,
        cooking_time,
        ..RecipeForm::default()
    };
    form.validate()?;

    let result = sqlx::query(
        "
        UPDATE recipes
        SET name = $1, search_name = $2, preparation_time = $3, cooking_time = $4
        WHERE id = $5
    ",
    )
    .bind(form.name.trim())
    .bind(search_key(&form.name))
    .bind(preparation_time)
    .bind(cooking_time)
    .bind(id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No recipe exists with specified id"));
    }

    Ok(())
}

pub async fn set_favorite(id: Id, favorite: bool, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("UPDATE recipes SET favorite = $1 WHERE id = $2")
        .bind(favorite)
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No recipe exists with specified id"));
    }

    Ok(())
}

/// Deletes the recipe; its links cascade and its steps go with it.
pub async fn delete_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No recipe exists with specified id"));
    }

    let steps = delete_orphan_steps(&mut *tx).await?;

    tx.commit().await.map_err(QueryError::from)?;
    log::info!("Deleted recipe {id} and {steps} of its steps");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions::connect_in_memory, format::IngredientLine};

    fn soup() -> RecipeForm {
        RecipeForm {
            name: String::from("Onion soup"),
            preparation_time: 10,
            cooking_time: 30,
            image: None,
            favorite: false,
            ingredients: vec![
                IngredientLine::new("Onion", 3, "unit"),
                IngredientLine::new("Butter", 50, "g"),
            ],
            steps: vec![String::from("Slice the onions"), String::from("Simmer")],
            tags: vec![String::from("Winter")],
        }
    }

    #[tokio::test]
    async fn invalid_forms_write_nothing() {
        let pool = connect_in_memory().await.unwrap();
        let mut form = soup();
        form.name = String::new();

        assert!(matches!(create_recipe(&form, &pool).await, Err(Error::Type(_))));
        assert!(list_recipes(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_view_joins_ingredient_names() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_recipe(&soup(), &pool).await.unwrap();

        let rows = list_recipes(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].ingredients.as_deref(), Some("Onion,Butter"));
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let pool = connect_in_memory().await.unwrap();

        assert!(get_recipe_details(42, &pool).await.unwrap().is_none());
        assert!(matches!(delete_recipe(42, &pool).await, Err(Error::NotFound(_))));
        assert!(matches!(
            update_recipe(42, &soup(), &pool).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(set_favorite(42, true, &pool).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn favorite_flag_toggles() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_recipe(&soup(), &pool).await.unwrap();

        set_favorite(id, true, &pool).await.unwrap();
        assert!(get_recipe(id, &pool).await.unwrap().unwrap().favorite);

        set_favorite(id, false, &pool).await.unwrap();
        assert!(!get_recipe(id, &pool).await.unwrap().unwrap().favorite);
    }

    #[tokio::test]
    async fn imported_timestamps_are_kept() {
        let pool = connect_in_memory().await.unwrap();
        let created_at = crate::format::parse_timestamp("09:30 01-02-2023").unwrap();

        let id = insert_recipe(&soup(), Some(created_at), &pool).await.unwrap();
        let recipe = get_recipe(id, &pool).await.unwrap().unwrap();
        assert_eq!(recipe.created_at, created_at);
    }

    #[tokio::test]
    async fn new_recipes_are_stamped_with_local_time() {
        let pool = connect_in_memory().await.unwrap();
        let before = Local::now().naive_local().trunc_subsecs(0);

        let id = create_recipe(&soup(), &pool).await.unwrap();
        let after = Local::now().naive_local();

        let created_at = get_recipe(id, &pool).await.unwrap().unwrap().created_at;
        assert!(created_at >= before && created_at <= after, "{created_at} not in [{before}, {after}]");
    }

    #[tokio::test]
    async fn renaming_refreshes_the_search_name() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_recipe(&soup(), &pool).await.unwrap();

        update_recipe_info(id, "Sopa de CEBOLLA", 10, 30, &pool).await.unwrap();

        let key: (String,) = sqlx::query_as("SELECT search_name FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(key.0, "sopa de cebolla");
    }
}
