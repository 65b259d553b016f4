use std::{env, path::PathBuf};

use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_IMAGES_DIR};

/// Where the application keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub images_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::from(DEFAULT_DATABASE_URL),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }
}

impl Config {
    /// Reads `DATABASE_URL` and `IMAGES_DIR`, falling back to the defaults.
    /// Call `dotenv::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            images_dir: env::var("IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.images_dir),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: String::from("sqlite::memory:"),
            ..Self::default()
        }
    }

    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        self
    }

    pub fn with_images_dir(mut self, images_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = images_dir {
            self.images_dir = dir;
        }
        self
    }
}
