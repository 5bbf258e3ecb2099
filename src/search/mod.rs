pub mod normalize;
pub mod scorer;
pub mod substitutions;

pub use normalize::{ingredient_matches, normalize};
pub use scorer::{find_recipes, score_recipe, ScoredRecipe, SearchFilters};
pub use substitutions::get_substitutions;
