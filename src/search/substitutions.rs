use super::normalize::normalize;

/// Substitutes per canonical ingredient. Lookup walks this table in order and
/// the first entry whose key fits wins, so more specific keys must come first
/// when they share words with a later one.
const SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("butter", &["margarine", "coconut oil", "olive oil"]),
    ("milk", &["almond milk", "oat milk", "coconut milk", "soy milk"]),
    ("egg", &["flax egg", "chia egg", "applesauce", "banana"]),
    ("cream", &["coconut cream", "cashew cream", "yogurt"]),
    ("flour", &["almond flour", "coconut flour", "oat flour"]),
    ("sugar", &["honey", "maple syrup", "stevia"]),
    ("soy sauce", &["coconut aminos", "tamari", "fish sauce"]),
    ("chicken breast", &["tofu", "turkey breast", "tempeh"]),
    ("chicken thigh", &["tofu", "turkey thigh", "tempeh"]),
    ("ground beef", &["ground turkey", "ground chicken", "lentils", "mushroom"]),
    ("beef sirloin", &["chicken breast", "tofu", "portobello mushroom"]),
    ("ground lamb", &["ground beef", "ground turkey", "lentils"]),
    ("shrimp", &["tofu", "chicken", "tempeh"]),
    ("cod fillet", &["tilapia", "haddock", "tofu"]),
    ("salmon fillet", &["trout", "tuna", "tofu"]),
    ("bacon", &["turkey bacon", "tempeh bacon", "mushroom"]),
    ("parmesan cheese", &["nutritional yeast", "pecorino", "asiago"]),
    ("mozzarella cheese", &["provolone", "gouda", "vegan mozzarella"]),
    ("yogurt", &["coconut yogurt", "sour cream"]),
    ("rice", &["quinoa", "cauliflower rice", "couscous"]),
    ("pasta", &["zucchini noodles", "rice noodles", "spaghetti squash"]),
    ("bread", &["tortilla", "rice cake", "lettuce wrap"]),
    ("tortilla", &["pita bread", "lettuce leaf", "naan"]),
    ("peanuts", &["cashews", "almonds", "sunflower seeds"]),
    ("coconut milk", &["almond milk", "cream", "cashew milk"]),
];

/// Substitutes for an ingredient, or an empty list when nothing fits.
///
/// An entry fits when its normalised key equals the normalised query or is
/// contained in it ("unsalted butter" finds "butter").
pub fn get_substitutions(ingredient_name: &str) -> Vec<String> {
    let query = normalize(ingredient_name);

    SUBSTITUTIONS
        .iter()
        .find(|(key, _)| {
            let key = normalize(key);
            key == query || query.contains(&key)
        })
        .map(|(_, subs)| subs.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}
