use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::recipes::{DietaryTag, Difficulty};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find recipes by ingredient and generate recipes with AI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Rank catalog recipes against the ingredients you have
    Search {
        /// Ingredient on hand (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Required dietary tag: vegetarian, vegan, gluten-free (repeatable)
        #[arg(long)]
        dietary: Vec<DietaryTag>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Maximum cooking time in minutes
        #[arg(long)]
        max_time: Option<u32>,
        #[arg(long)]
        cuisine: Option<String>,
    },
    /// Print a recipe with substitutes, optionally rescaled
    Show {
        id: u32,
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        servings: Option<u32>,
    },
    /// List substitutes for an ingredient
    Substitutes { ingredient: String },
    /// Normalise a saved model reply into recipe JSON
    Parse { file: PathBuf },
    /// Ask the configured model providers for a recipe by dish name
    Generate { dish: String },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
