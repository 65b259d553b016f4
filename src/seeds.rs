use sqlx::{Pool, Sqlite};

use crate::{
    actions::create_recipe,
    error::Error,
    format::IngredientLine,
    schema::{Id, RecipeForm},
};

struct SeedRecipe {
    name: &'static str,
    preparation_time: i64,
    cooking_time: i64,
    favorite: bool,
    ingredients: &'static [(&'static str, i64, &'static str)],
    steps: &'static [&'static str],
    tags: &'static [&'static str],
}

const SEED_RECIPES: &[SeedRecipe] = &[
    SeedRecipe {
        name: "Roast chicken",
        preparation_time: 30,
        cooking_time: 60,
        favorite: true,
        ingredients: &[("Chicken", 1, "unit"), ("Salt", 1, "pinch"), ("Pepper", 1, "pinch")],
        steps: &[
            "Preheat the oven to 180°C.",
            "Season the chicken with salt and pepper.",
            "Put the chicken on a baking tray.",
            "Roast for 60 minutes.",
        ],
        tags: &["Easy"],
    },
    SeedRecipe {
        name: "Tomato salad",
        preparation_time: 15,
        cooking_time: 0,
        favorite: false,
        ingredients: &[("Tomato", 3, "unit"), ("Olive oil", 1, "tbsp"), ("Salt", 1, "pinch")],
        steps: &[
            "Wash and slice the tomatoes.",
            "Lay the slices on a plate.",
            "Dress with olive oil and salt.",
            "Garnish with fresh basil.",
        ],
        tags: &["Easy", "Quick", "Summer", "Vegetarian"],
    },
    SeedRecipe {
        name: "Chicken and rice",
        preparation_time: 20,
        cooking_time: 40,
        favorite: false,
        ingredients: &[("Chicken", 1, "unit"), ("Rice", 300, "g"), ("Garlic", 2, "clove")],
        steps: &[],
        tags: &["Quick", "Healthy"],
    },
    SeedRecipe {
        name: "Onion soup",
        preparation_time: 10,
        cooking_time: 30,
        favorite: false,
        ingredients: &[("Onion", 4, "unit"), ("Olive oil", 2, "tbsp")],
        steps: &[],
        tags: &["Healthy", "Winter"],
    },
    SeedRecipe {
        name: "Fries",
        preparation_time: 5,
        cooking_time: 20,
        favorite: true,
        ingredients: &[("Potato", 2, "unit"), ("Olive oil", 3, "tbsp")],
        steps: &[],
        tags: &["Cheap"],
    },
    SeedRecipe {
        name: "Steamed carrots",
        preparation_time: 10,
        cooking_time: 15,
        favorite: false,
        ingredients: &[("Carrot", 4, "unit")],
        steps: &[],
        tags: &["Gluten free", "Vegetarian"],
    },
];

impl SeedRecipe {
    fn form(&self) -> RecipeForm {
        RecipeForm {
            name: self.name.to_string(),
            preparation_time: self.preparation_time,
            cooking_time: self.cooking_time,
            image: None,
            favorite: self.favorite,
            ingredients: self
                .ingredients
                .iter()
                .map(|(name, quantity, unit)| IngredientLine::new(name, *quantity, unit))
                .collect(),
            steps: self.steps.iter().map(|s| s.to_string()).collect(),
            tags: self.tags.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fills a fresh database with a handful of sample recipes.
pub async fn seed(pool: &Pool<Sqlite>) -> Result<Vec<Id>, Error> {
    let mut ids = Vec::with_capacity(SEED_RECIPES.len());
    for recipe in SEED_RECIPES {
        ids.push(create_recipe(&recipe.form(), pool).await?);
    }

    log::info!("Seeded {} recipes", ids.len());
    Ok(ids)
}
