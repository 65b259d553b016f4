mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod format;
    pub mod schema;
}
mod config;
mod constants;

pub mod images;
pub mod legacy;
pub mod seeds;
pub mod views;

pub use config::*;
pub use constants::*;
pub use database::*;
pub use error::Error;
