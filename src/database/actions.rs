use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use super::error::{Error, QueryError};
use crate::config::Config;

pub mod ingredients;
pub mod recipe_of_the_day;
pub mod recipes;
pub mod search;
pub mod steps;
pub mod tags;

pub use ingredients::*;
pub use recipe_of_the_day::*;
pub use recipes::*;
pub use search::*;
pub use steps::*;
pub use tags::*;

/// Columns of the list view; `r` is the recipe table alias.
pub(crate) const RECIPE_ROW_COLUMNS: &str = "
    r.id, r.name, r.preparation_time, r.cooking_time, r.created_at,
    (
        SELECT GROUP_CONCAT(i.name, ',')
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = r.id
    ) AS ingredients
";

/// Opens the database with a single connection that lives as long as the
/// returned pool, then brings the schema up to date.
pub async fn connect(config: &Config) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(QueryError::from)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(QueryError::from)?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::debug!("Connected to {}", config.database_url);

    Ok(pool)
}

/// Fresh in-memory database, used by the tests.
pub async fn connect_in_memory() -> Result<Pool<Sqlite>, Error> {
    connect(&Config::in_memory()).await
}
