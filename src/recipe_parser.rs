use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::api_connection::chain::ProviderChain;
use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::ModelPrompt;

pub const DEFAULT_SERVINGS: u32 = 4;
pub const DEFAULT_DIFFICULTY: &str = "Medium";
const FALLBACK_TIME: &str = "N/A";
const RAW_PREVIEW_CHARS: usize = 300;
const MAX_FALLBACK_INGREDIENT_CHARS: usize = 80;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json\s*").expect("json fence pattern should be valid"));
static BARE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*").expect("fence pattern should be valid"));
static QUOTES_AND_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\[\]"']"#).expect("quote pattern should be valid"));
static LIST_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\n]+").expect("separator pattern should be valid"));
static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("numbered marker pattern should be valid"));
static DASH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*").expect("dash marker pattern should be valid"));

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AiIngredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiRecipeDetails {
    pub servings: u32,
    pub prep_time: String,
    pub cook_time: String,
    pub difficulty: String,
    pub steps: Vec<String>,
}

impl Default for AiRecipeDetails {
    fn default() -> Self {
        Self {
            servings: DEFAULT_SERVINGS,
            prep_time: String::new(),
            cook_time: String::new(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            steps: Vec::new(),
        }
    }
}

/// A model-generated recipe in the fixed response schema.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiRecipe {
    pub dish_name: String,
    pub cuisine: String,
    pub ingredients: Vec<AiIngredient>,
    pub recipe: AiRecipeDetails,
    /// Free-form nutrient name to value, passed through from the model.
    pub nutrition: Map<String, Value>,
    /// Cleaned model text, only set when no JSON object could be recovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AiRecipe {
    /// True when the result carries neither ingredients nor steps.
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.recipe.steps.is_empty()
    }
}

/// Placeholder dish names. Different call sites present different wording.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Used when there is no text at all, or the parsed object lacks a name.
    pub unknown_dish_name: String,
    /// Used when text arrived but no JSON object could be recovered from it.
    pub detected_dish_name: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unknown_dish_name: "Unknown Dish".to_string(),
            detected_dish_name: "Detected Dish".to_string(),
        }
    }
}

/// Ingredient entries arrive either as bare strings or as objects.
enum RawIngredient<'a> {
    Bare(&'a str),
    Named {
        name: Option<String>,
        quantity: String,
        raw: &'a Value,
    },
}

impl<'a> RawIngredient<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(RawIngredient::Bare(s.as_str())),
            Value::Object(fields) => Some(RawIngredient::Named {
                name: fields.get("name").and_then(truthy_text),
                quantity: fields.get("quantity").and_then(truthy_text).unwrap_or_default(),
                raw: value,
            }),
            other => Some(RawIngredient::Named {
                name: None,
                quantity: String::new(),
                raw: other,
            }),
        }
    }

    fn resolve(self) -> AiIngredient {
        match self {
            RawIngredient::Bare(name) => AiIngredient {
                name: name.to_string(),
                quantity: String::new(),
            },
            RawIngredient::Named { name, quantity, raw } => AiIngredient {
                name: name.unwrap_or_else(|| render_value(raw)),
                quantity,
            },
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of a truthy string or number.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) if is_truthy(value) => Some(render_value(value)),
        _ => None,
    }
}

fn parse_servings(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| *f >= 1.0).map(|f| f.round() as u32),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u32>().ok().filter(|n| *n > 0)
        }
        _ => None,
    };
    parsed.unwrap_or(DEFAULT_SERVINGS)
}

fn parse_steps(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(steps)) => steps.iter().map(render_value).collect(),
        Some(Value::String(step)) if !step.is_empty() => vec![step.clone()],
        _ => Vec::new(),
    }
}

fn normalize_recipe(parsed: &Map<String, Value>, options: &ParseOptions) -> AiRecipe {
    let details = parsed.get("recipe").and_then(Value::as_object);
    let detail = |key: &str| details.and_then(|d| d.get(key));

    let ingredients = match parsed.get("ingredients") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(RawIngredient::from_value)
            .map(RawIngredient::resolve)
            .collect(),
        _ => Vec::new(),
    };

    AiRecipe {
        dish_name: parsed
            .get("dishName")
            .filter(|v| is_truthy(v))
            .map(render_value)
            .unwrap_or_else(|| options.unknown_dish_name.clone()),
        cuisine: parsed.get("cuisine").and_then(truthy_text).unwrap_or_default(),
        ingredients,
        recipe: AiRecipeDetails {
            servings: parse_servings(detail("servings")),
            prep_time: detail("prepTime").and_then(truthy_text).unwrap_or_default(),
            cook_time: detail("cookTime").and_then(truthy_text).unwrap_or_default(),
            difficulty: detail("difficulty")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_DIFFICULTY)
                .to_string(),
            steps: parse_steps(detail("steps")),
        },
        nutrition: parsed
            .get("nutrition")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        raw_response: None,
    }
}

/// Parses `text` as JSON and accepts it only if it is an object with a dish name.
fn try_parse_recipe(text: &str, options: &ParseOptions) -> Option<AiRecipe> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    if !object.get("dishName").is_some_and(is_truthy) {
        return None;
    }
    Some(normalize_recipe(object, options))
}

/// Removes markdown code fences anywhere in the text.
pub fn strip_code_fences(text: &str) -> String {
    let without_json_fences = JSON_FENCE.replace_all(text, "");
    BARE_FENCE.replace_all(&without_json_fences, "").trim().to_string()
}

/// From the first `{` through the last `}`, if there is such a span.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Best-effort ingredient names from free text: split on commas and newlines,
/// drop list markers and implausibly short or long tokens, de-duplicate.
pub fn extract_ingredients_list(text: &str) -> Vec<AiIngredient> {
    let cleaned = QUOTES_AND_BRACKETS.replace_all(text, "");
    let mut seen = HashSet::new();

    LIST_SEPARATORS
        .split(&cleaned)
        .map(|token| {
            let token = NUMBERED_MARKER.replace(token, "");
            DASH_MARKER.replace(&token, "").trim().to_string()
        })
        .filter(|token| {
            let len = token.chars().count();
            len > 1 && len < MAX_FALLBACK_INGREDIENT_CHARS
        })
        .filter(|token| seen.insert(token.clone()))
        .map(|name| AiIngredient {
            name,
            quantity: String::new(),
        })
        .collect()
}

fn empty_recipe(options: &ParseOptions) -> AiRecipe {
    AiRecipe {
        dish_name: options.unknown_dish_name.clone(),
        cuisine: String::new(),
        ingredients: Vec::new(),
        recipe: AiRecipeDetails::default(),
        nutrition: Map::new(),
        raw_response: None,
    }
}

fn fallback_recipe(clean: &str, options: &ParseOptions) -> AiRecipe {
    AiRecipe {
        dish_name: options.detected_dish_name.clone(),
        cuisine: String::new(),
        ingredients: extract_ingredients_list(clean),
        recipe: AiRecipeDetails {
            prep_time: FALLBACK_TIME.to_string(),
            cook_time: FALLBACK_TIME.to_string(),
            steps: vec![clean.to_string()],
            ..AiRecipeDetails::default()
        },
        nutrition: Map::new(),
        raw_response: Some(clean.to_string()),
    }
}

pub fn parse_ai_response(raw_text: Option<&str>) -> AiRecipe {
    parse_ai_response_with(raw_text, &ParseOptions::default())
}

/// Turns model output into an [`AiRecipe`], never failing.
///
/// Tried in order: the whole fence-stripped text as JSON, then the widest
/// `{...}` span inside it. Either must yield an object with a dish name.
/// Failing both, the cleaned text becomes a single step and ingredient names
/// are guessed from it.
pub fn parse_ai_response_with(raw_text: Option<&str>, options: &ParseOptions) -> AiRecipe {
    let Some(text) = raw_text.filter(|t| !t.is_empty()) else {
        return empty_recipe(options);
    };

    let clean = strip_code_fences(text);

    if let Some(recipe) = try_parse_recipe(&clean, options) {
        return recipe;
    }

    if let Some(recipe) = brace_span(&clean).and_then(|span| try_parse_recipe(span, options)) {
        return recipe;
    }

    let preview: String = clean.chars().take(RAW_PREVIEW_CHARS).collect();
    tracing::debug!(raw = %preview, "Could not parse JSON from model response, using text fallback");
    fallback_recipe(&clean, options)
}

/// Sends `prompt` down the provider chain and normalises whatever comes back.
pub async fn request_recipe(
    chain: &ProviderChain,
    prompt: &ModelPrompt,
    options: &ParseOptions,
) -> Result<AiRecipe, ApiConnectionError> {
    let completion = chain.complete(prompt).await?;
    tracing::info!(
        provider = %completion.provider,
        length = completion.text.len(),
        "Model response received"
    );
    Ok(parse_ai_response_with(Some(&completion.text), options))
}
