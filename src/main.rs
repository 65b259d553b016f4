use std::{fs, path::PathBuf, process};

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use recipe_manager::{
    actions::{self, connect},
    form::Form,
    format::IngredientLine,
    images::store_image,
    legacy::import_csv_file,
    schema::{Id, RecipeForm, SearchOption},
    seeds::seed,
    views::{render_recipe_details, render_recipe_list},
    Config, Error,
};
use sqlx::{Pool, Sqlite};

#[derive(Parser, Debug)]
#[command(name = "recipe-manager", version, about = "Keeps your recipes")]
struct Cli {
    /// Database to open, e.g. sqlite://recipes.db
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Directory recipe images are copied into
    #[arg(long, global = true, env = "IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every recipe
    List,
    /// Show one recipe
    Show { id: Id },
    /// Add a recipe
    New(RecipeArgs),
    /// Edit a recipe; fields that aren't given keep their value
    Edit {
        id: Id,
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Delete a recipe
    Delete { id: Id },
    /// Mark a recipe as favorite
    Favorite {
        id: Id,
        #[arg(long)]
        off: bool,
    },
    /// Search recipes by name, tag, prep-time or ingredient
    Search { option: SearchOption, text: String },
    /// Show the recipe of the day
    Today,
    /// Import the CSV recipe list of the file-based version
    Import { path: PathBuf },
    /// Insert sample recipes
    Seed,
}

#[derive(Args, Debug)]
struct RecipeArgs {
    /// JSON file with the form fields
    #[arg(long)]
    form: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    /// Preparation time in minutes
    #[arg(long = "prep")]
    preparation_time: Option<i64>,
    /// Cooking time in minutes
    #[arg(long = "cook")]
    cooking_time: Option<i64>,
    /// Image file to attach
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    favorite: Option<bool>,
    /// "name (quantity unit)", repeatable
    #[arg(long = "ingredient")]
    ingredients: Vec<IngredientLine>,
    /// Preparation step, repeatable, in order
    #[arg(long = "step")]
    steps: Vec<String>,
    /// Tag, repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl RecipeArgs {
    /// Lays the given flags over `base`; list flags replace the whole list.
    /// The image is only copied once the rest of the form is valid.
    fn merge_into(self, mut base: RecipeForm, config: &Config) -> Result<RecipeForm, Error> {
        if let Some(path) = &self.form {
            let form = Form::from_json(&fs::read_to_string(path)?)?;
            base = RecipeForm::try_from(&form)?;
        }

        if let Some(name) = self.name {
            base.name = name;
        }
        if let Some(minutes) = self.preparation_time {
            base.preparation_time = minutes;
        }
        if let Some(minutes) = self.cooking_time {
            base.cooking_time = minutes;
        }
        if let Some(favorite) = self.favorite {
            base.favorite = favorite;
        }
        if !self.ingredients.is_empty() {
            base.ingredients = self.ingredients;
        }
        if !self.steps.is_empty() {
            base.steps = self.steps;
        }
        if !self.tags.is_empty() {
            base.tags = self.tags;
        }

        base.validate()?;
        if let Some(image) = self.image {
            base.image = Some(store_image(&image, &config.images_dir)?);
        }

        Ok(base)
    }
}

async fn run(command: Commands, config: &Config, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let today = Local::now().date_naive();

    match command {
        Commands::List => {
            let current = actions::refresh_recipe_of_the_day(today, pool).await?;
            let rows = actions::list_recipes(pool).await?;
            println!("{}", render_recipe_list(&rows, current.map(|r| r.id)));
        }
        Commands::Show { id } => match actions::get_recipe_details(id, pool).await? {
            Some(details) => println!("{}", render_recipe_details(&details)),
            None => return Err(Error::not_found("No recipe exists with specified id")),
        },
        Commands::New(recipe) => {
            let form = recipe.merge_into(RecipeForm::default(), config)?;
            let id = actions::create_recipe(&form, pool).await?;
            println!("Created recipe {id}");
        }
        Commands::Edit { id, recipe } => {
            let current = actions::get_recipe_details(id, pool)
                .await?
                .ok_or_else(|| Error::not_found("No recipe exists with specified id"))?;
            let form = recipe.merge_into(current.to_form(), config)?;
            actions::update_recipe(id, &form, pool).await?;
            println!("Updated recipe {id}");
        }
        Commands::Delete { id } => {
            actions::delete_recipe(id, pool).await?;
            println!("Deleted recipe {id}");
        }
        Commands::Favorite { id, off } => {
            actions::set_favorite(id, !off, pool).await?;
        }
        Commands::Search { option, text } => {
            let rows = actions::search(option, &text, pool).await?;
            if rows.is_empty() {
                log::warn!("No recipes match {text:?}");
            }
            println!("{}", render_recipe_list(&rows, None));
        }
        Commands::Today => match actions::refresh_recipe_of_the_day(today, pool).await? {
            Some(row) => {
                if let Some(details) = actions::get_recipe_details(row.id, pool).await? {
                    println!("{}", render_recipe_details(&details));
                }
            }
            None => println!("No recipes yet"),
        },
        Commands::Import { path } => {
            let ids = import_csv_file(&path, pool).await?;
            println!("Imported {} recipes", ids.len());
        }
        Commands::Seed => {
            let ids = seed(pool).await?;
            println!("Added {} sample recipes", ids.len());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let cli = Cli::parse();
    let config = Config::from_env()
        .with_database_url(cli.database_url)
        .with_images_dir(cli.images_dir);

    let pool = match connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Could not open {}: {e}", config.database_url);
            process::exit(1);
        }
    };

    let result = run(cli.command, &config, &pool).await;
    pool.close().await;

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}
