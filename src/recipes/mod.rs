pub mod data_loader;

pub use data_loader::{builtin_recipes, load_recipes_from_path, parse_recipes};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dietary tags a recipe can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryTag {
    Vegetarian,
    Vegan,
    GlutenFree,
}

pub const DIETARY_OPTIONS: [DietaryTag; 3] =
    [DietaryTag::Vegetarian, DietaryTag::Vegan, DietaryTag::GlutenFree];

impl DietaryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryTag::Vegetarian => "vegetarian",
            DietaryTag::Vegan => "vegan",
            DietaryTag::GlutenFree => "gluten-free",
        }
    }
}

impl fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietaryTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vegetarian" => Ok(DietaryTag::Vegetarian),
            "vegan" => Ok(DietaryTag::Vegan),
            "gluten-free" | "gluten_free" | "glutenfree" => Ok(DietaryTag::GlutenFree),
            other => Err(format!("Unknown dietary tag: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    /// Decimal ("200", "0.5") or fraction ("1/2") text, as written in the catalog.
    pub amount: String,
    pub unit: String,
}

/// Per-serving nutrition.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nutrition {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub fiber: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u32,
    pub name: String,
    pub cuisine: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub cooking_time: u32,
    pub servings: u32,
    #[serde(default)]
    pub dietary: Vec<DietaryTag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<String>,
    pub nutrition: Nutrition,
    pub image: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub rating_count: u32,
}

impl Recipe {
    pub fn has_dietary(&self, tag: DietaryTag) -> bool {
        self.dietary.contains(&tag)
    }
}

pub fn find_recipe(recipes: &[Recipe], id: u32) -> Option<&Recipe> {
    recipes.iter().find(|recipe| recipe.id == id)
}

/// Every distinct ingredient name in the catalog, sorted.
pub fn all_ingredients(recipes: &[Recipe]) -> Vec<String> {
    let mut names: Vec<String> = recipes
        .iter()
        .flat_map(|recipe| recipe.ingredients.iter().map(|i| i.name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

pub fn cuisines(recipes: &[Recipe]) -> Vec<String> {
    let mut cuisines: Vec<String> = recipes.iter().map(|r| r.cuisine.clone()).collect();
    cuisines.sort();
    cuisines.dedup();
    cuisines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dietary_tag_serializes_kebab_case() {
        let json = serde_json::to_string(&DietaryTag::GlutenFree).unwrap();
        assert_eq!(json, "\"gluten-free\"");
        let tag: DietaryTag = serde_json::from_str("\"vegan\"").unwrap();
        assert_eq!(tag, DietaryTag::Vegan);
    }

    #[test]
    fn test_parse_filters_from_text() {
        assert_eq!("Gluten-Free".parse::<DietaryTag>(), Ok(DietaryTag::GlutenFree));
        assert_eq!(" hard ".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("keto".parse::<DietaryTag>().is_err());
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_catalog_views() {
        let recipes = builtin_recipes().unwrap();

        let ingredients = all_ingredients(&recipes);
        assert!(ingredients.windows(2).all(|w| w[0] < w[1]));
        assert!(ingredients.iter().any(|name| name == "chicken breast"));

        let cuisines = cuisines(&recipes);
        assert_eq!(cuisines.len(), 12);
        assert_eq!(cuisines.first().map(String::as_str), Some("American"));

        assert_eq!(find_recipe(&recipes, 3).map(|r| r.name.as_str()), Some("Vegetable Curry"));
        assert!(find_recipe(&recipes, 999).is_none());
    }
}
