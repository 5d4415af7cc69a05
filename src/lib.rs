pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod trends;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
