use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

use crate::{
    format::{format_minutes, format_timestamp},
    schema::{Id, RecipeDetails, RecipeRow},
};

const LIST_HEADER: [&str; 6] = [
    "ID",
    "Name",
    "Ingredients",
    "Preparation time",
    "Cooking time",
    "Created",
];

/// The recipe list; the recipe of the day, when given, is shown in bold.
pub fn recipe_table(rows: &[RecipeRow], recipe_of_the_day: Option<Id>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(LIST_HEADER.to_vec());

    for row in rows {
        let cells = vec![
            Cell::new(row.id),
            Cell::new(&row.name),
            Cell::new(row.ingredients.as_deref().unwrap_or("")),
            Cell::new(format_minutes(row.preparation_time)),
            Cell::new(format_minutes(row.cooking_time)),
            Cell::new(format_timestamp(&row.created_at)),
        ];

        if Some(row.id) == recipe_of_the_day {
            table.add_row(cells.into_iter().map(|cell| cell.add_attribute(Attribute::Bold)));
        } else {
            table.add_row(cells);
        }
    }

    table
}

pub fn render_recipe_list(rows: &[RecipeRow], recipe_of_the_day: Option<Id>) -> String {
    if rows.is_empty() {
        return String::from("No recipes found");
    }

    recipe_table(rows, recipe_of_the_day).to_string()
}

pub fn render_recipe_details(details: &RecipeDetails) -> String {
    let recipe = &details.recipe;
    let mut out = String::new();

    out += &format!("{} (#{})", recipe.name, recipe.id);
    if recipe.favorite {
        out += " ★";
    }
    if recipe.recipe_of_the_day {
        out += " [recipe of the day]";
    }
    out += "\n";

    out += &format!(
        "Preparation: {}  Cooking: {}  Created: {}\n",
        format_minutes(recipe.preparation_time),
        format_minutes(recipe.cooking_time),
        format_timestamp(&recipe.created_at)
    );

    if let Some(image) = &recipe.image {
        out += &format!("Image: {image}\n");
    }

    if !details.tags.is_empty() {
        out += &format!("Tags: {}\n", details.tag_summary());
    }

    out += "\nIngredients:\n";
    for ingredient in details.ingredients.iter() {
        out += &format!("  - {}\n", ingredient.line());
    }

    out += "\nPreparation:\n";
    for step in details.steps.iter() {
        out += &format!("  {}. {}\n", step.step_order, step.description);
    }

    out
}
