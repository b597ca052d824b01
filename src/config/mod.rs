//! Configuration loading and validation

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, GithubConfig, HarvesterConfig, OutputConfig};
pub use validation::validate;
