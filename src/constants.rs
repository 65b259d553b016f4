pub const DEFAULT_DATABASE_URL: &str = "sqlite://recipe_manager.db";
pub const DEFAULT_IMAGES_DIR: &str = "images";

pub const RECIPE_NAME_MAX_LEN: usize = 75;
pub const INGREDIENT_NAME_MAX_LEN: usize = 75;
pub const UNIT_MAX_LEN: usize = 25;
pub const STEP_DESCRIPTION_MAX_LEN: usize = 255;
pub const TAG_NAME_MAX_LEN: usize = 45;

pub const LIST_SEPARATOR: char = ',';
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%H:%M %d-%m-%Y";

pub const SEARCH_OPTIONS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("tag", "Tag"),
    ("prep-time", "Preparation time"),
    ("ingredient", "Ingredient"),
];
