//! Ingredient name canonicalisation and matching.
//!
//! The stemmer is deliberately naive. Three suffix rewrites run one after the
//! other, each on the output of the previous one, so only the first rule ever
//! fires on ordinary plurals: "tomatoes" becomes "tomatoe" and "berries"
//! becomes "berrie". Catalog data and substitution keys are matched against
//! this exact behaviour.

/// Lowercases, trims and strips a naive plural suffix.
pub fn normalize(s: &str) -> String {
    let mut out = s.to_lowercase().trim().to_string();

    if out.ends_with('s') {
        out.truncate(out.len() - 1);
    }
    if out.ends_with("es") {
        out.truncate(out.len() - 2);
    }
    if out.ends_with("ies") {
        out.truncate(out.len() - 3);
        out.push('y');
    }
    out
}

/// True when either normalised name contains the other.
///
/// An empty term matches every ingredient, since the empty string is contained
/// in anything. Callers that accept free-form user input should drop blank
/// terms before matching.
pub fn ingredient_matches(user_term: &str, recipe_ingredient: &str) -> bool {
    let user = normalize(user_term);
    let recipe = normalize(recipe_ingredient);
    recipe.contains(&user) || user.contains(&recipe)
}
