use anyhow::{Context, Result};
use tokio::fs;

use recipe_finder::api_connection::chain::ProviderChain;
use recipe_finder::cli::{parse_args, Command};
use recipe_finder::config::AppConfig;
use recipe_finder::logging::init_tracing;
use recipe_finder::prompts::recipe_by_name_prompt;
use recipe_finder::recipe_parser::{parse_ai_response, request_recipe, ParseOptions};
use recipe_finder::recipes::{builtin_recipes, find_recipe, load_recipes_from_path, Recipe};
use recipe_finder::scaling::adjust_servings;
use recipe_finder::search::{find_recipes, get_substitutions, SearchFilters};
use recipe_finder::server;

fn load_catalog(config: &AppConfig) -> Result<Vec<Recipe>> {
    match &config.recipes_path {
        Some(path) => load_recipes_from_path(path),
        None => builtin_recipes(),
    }
}

fn print_recipe(recipe: &Recipe) {
    println!(
        "#{} {} ({}, {}, {} min, serves {})",
        recipe.id, recipe.name, recipe.cuisine, recipe.difficulty, recipe.cooking_time, recipe.servings
    );
    if !recipe.dietary.is_empty() {
        let tags: Vec<&str> = recipe.dietary.iter().map(|t| t.as_str()).collect();
        println!("Dietary: {}", tags.join(", "));
    }

    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        let substitutes = get_substitutions(&ingredient.name);
        if substitutes.is_empty() {
            println!("  - {} {} {}", ingredient.amount, ingredient.unit, ingredient.name);
        } else {
            println!(
                "  - {} {} {} (or: {})",
                ingredient.amount,
                ingredient.unit,
                ingredient.name,
                substitutes.join(", ")
            );
        }
    }

    println!("\nSteps:");
    for (idx, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {}", idx + 1, step);
    }

    let n = &recipe.nutrition;
    println!(
        "\nNutrition per serving: {} kcal, {}g protein, {}g carbs, {}g fat, {}g fiber",
        n.calories, n.protein, n.carbs, n.fat, n.fiber
    );
}

async fn run(command: Command, mut config: AppConfig) -> Result<()> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(config).await
        }
        Command::Search {
            ingredients,
            dietary,
            difficulty,
            max_time,
            cuisine,
        } => {
            let recipes = load_catalog(&config)?;
            let filters = SearchFilters {
                dietary,
                difficulty,
                max_cooking_time: max_time,
                cuisine,
            };
            let results = find_recipes(&recipes, &ingredients, &filters);
            if results.is_empty() {
                println!("No recipes match.");
            }
            for result in results {
                println!(
                    "{:>5.1}%  #{:<3} {} ({})",
                    result.match_score * 100.0,
                    result.recipe.id,
                    result.recipe.name,
                    result.recipe.cuisine
                );
                if !ingredients.is_empty() && !result.missing_ingredients.is_empty() {
                    println!("        missing: {}", result.missing_ingredients.join(", "));
                }
            }
            Ok(())
        }
        Command::Show { id, servings } => {
            let recipes = load_catalog(&config)?;
            let recipe = find_recipe(&recipes, id).with_context(|| format!("No recipe with id {}", id))?;
            match servings {
                Some(servings) => print_recipe(&adjust_servings(recipe, servings)),
                None => print_recipe(recipe),
            }
            Ok(())
        }
        Command::Substitutes { ingredient } => {
            let substitutes = get_substitutions(&ingredient);
            if substitutes.is_empty() {
                println!("No known substitutes for '{}'.", ingredient);
            } else {
                println!("{}", substitutes.join("\n"));
            }
            Ok(())
        }
        Command::Parse { file } => {
            let text = fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read model output from {:?}", file))?;
            let recipe = parse_ai_response(Some(&text));
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        Command::Generate { dish } => {
            let chain = ProviderChain::from_settings(&config.providers)?;
            let recipe = request_recipe(&chain, &recipe_by_name_prompt(dish.trim()), &ParseOptions::default())
                .await
                .with_context(|| format!("Recipe generation failed for '{}'", dish))?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format, &config.environment)?;

    run(cli_args.command, config).await
}
