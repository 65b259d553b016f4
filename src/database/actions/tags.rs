use sqlx::{Acquire, Pool, Sqlite};

use crate::{
    error::{Error, QueryError},
    schema::{Id, Tag},
};

/// Returns the id of the tag called `name`, inserting it first when needed.
pub async fn create_tag<'a, A>(name: &str, db: A) -> Result<Id, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let name = name.trim();

    if let Some(id) = find_tag(name, &mut *conn).await? {
        return Ok(id);
    }

    let id: (Id,) = sqlx::query_as("INSERT INTO tags (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    log::debug!("Created tag {} ({name})", id.0);
    Ok(id.0)
}

pub async fn get_tag(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(tag)
}

pub async fn find_tag<'a, A>(name: &str, db: A) -> Result<Option<Id>, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let tag: Option<(Id,)> = sqlx::query_as("SELECT id FROM tags WHERE name = $1")
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(tag.map(|tag| tag.0))
}

pub async fn list_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(list)
}

pub async fn rename_tag(id: Id, name: &str, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("UPDATE tags SET name = $1 WHERE id = $2")
        .bind(name.trim())
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No tag exists with specified id"));
    }

    Ok(())
}

pub async fn delete_tag(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No tag exists with specified id"));
    }

    Ok(())
}

pub async fn list_recipe_tags<'a, A>(recipe_id: Id, db: A) -> Result<Vec<Tag>, Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.id AS id, t.name AS name
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(list)
}

/// Tagging a recipe twice with the same tag is a no-op.
pub async fn add_tag_to_recipe<'a, A>(recipe_id: Id, tag_id: Id, db: A) -> Result<(), Error>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await.map_err(QueryError::from)?;
    sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}

pub async fn remove_tag_from_recipe(
    recipe_id: Id,
    tag_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1 AND tag_id = $2")
        .bind(recipe_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::invalid_request("Recipe doesn't have this tag"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions::connect_in_memory, actions::create_recipe, schema::RecipeForm};

    #[tokio::test]
    async fn tagging_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        let form = RecipeForm {
            name: String::from("Gazpacho"),
            ..RecipeForm::default()
        };
        let recipe = create_recipe(&form, &pool).await.unwrap();

        let summer = create_tag("Summer", &pool).await.unwrap();
        assert_eq!(create_tag("Summer", &pool).await.unwrap(), summer);

        add_tag_to_recipe(recipe, summer, &pool).await.unwrap();
        add_tag_to_recipe(recipe, summer, &pool).await.unwrap();
        assert_eq!(list_recipe_tags(recipe, &pool).await.unwrap().len(), 1);

        remove_tag_from_recipe(recipe, summer, &pool).await.unwrap();
        assert!(list_recipe_tags(recipe, &pool).await.unwrap().is_empty());
        assert!(matches!(
            remove_tag_from_recipe(recipe, summer, &pool).await,
            Err(Error::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn tags_reject_unknown_recipes() {
        let pool = connect_in_memory().await.unwrap();
        let tag = create_tag("Winter", &pool).await.unwrap();

        assert!(add_tag_to_recipe(9999, tag, &pool).await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_tag_untags_recipes() {
        let pool = connect_in_memory().await.unwrap();
        let form = RecipeForm {
            name: String::from("Stew"),
            tags: vec![String::from("Winter")],
            ..RecipeForm::default()
        };
        let recipe = create_recipe(&form, &pool).await.unwrap();
        let winter = find_tag("Winter", &pool).await.unwrap().unwrap();

        rename_tag(winter, "Cold days", &pool).await.unwrap();
        assert_eq!(get_tag(winter, &pool).await.unwrap().unwrap().name, "Cold days");

        delete_tag(winter, &pool).await.unwrap();
        assert!(list_recipe_tags(recipe, &pool).await.unwrap().is_empty());
        assert!(list_tags(&pool).await.unwrap().is_empty());
    }
}
