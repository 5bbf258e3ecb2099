pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompts;
pub mod recipe_parser;
pub mod recipes;
pub mod scaling;
pub mod search;
pub mod server;
pub mod store;
