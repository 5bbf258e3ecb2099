use regex::Regex;
use std::sync::LazyLock;

use crate::recipes::{Nutrition, Recipe, RecipeIngredient};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading number pattern should be valid")
});

/// Parses an ingredient amount: "1/2", mixed "1 1/2", or a decimal with
/// optional trailing text ("2 large" reads as 2).
///
/// Returns `None` for text with no usable number, including a zero denominator.
pub fn parse_amount(amount: &str) -> Option<f64> {
    let amount = amount.trim();

    let value = if let Some((whole_and_numerator, denominator)) = amount.split_once('/') {
        let denominator: f64 = denominator.split('/').next()?.trim().parse().ok()?;
        let (whole, numerator) = match whole_and_numerator.trim().rsplit_once(char::is_whitespace) {
            Some((whole, numerator)) => (whole.trim().parse::<f64>().ok()?, numerator.parse::<f64>().ok()?),
            None => (0.0, whole_and_numerator.trim().parse::<f64>().ok()?),
        };
        let fraction = numerator / denominator;
        if whole < 0.0 {
            whole - fraction
        } else {
            whole + fraction
        }
    } else {
        LEADING_NUMBER.find(amount)?.as_str().parse::<f64>().ok()?
    };

    value.is_finite().then_some(value)
}

/// Whole values print without a decimal point, anything else with one decimal.
/// Rounding happens on `value * 10`, so a half that is inexact in binary still
/// rounds away from zero: 0.35 prints as "0.4", not the "0.3" an exact-binary
/// rounding would give.
pub fn format_amount(value: f64) -> String {
    // Adding zero folds -0.0 into 0.0.
    let value = value + 0.0;
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    }
}

fn scale_amount(amount: &str, ratio: f64) -> String {
    match parse_amount(amount).map(|value| value * ratio) {
        Some(scaled) if scaled.is_finite() => format_amount(scaled),
        _ => amount.to_string(),
    }
}

fn scale_nutrition(nutrition: &Nutrition, ratio: f64) -> Nutrition {
    let mut scaled = *nutrition;
    macro_rules! scale_field {
        ($field:ident) => {
            scaled.$field = (f64::from(nutrition.$field) * ratio).round() as u32;
        };
    }
    scale_field!(calories);
    scale_field!(protein);
    scale_field!(carbs);
    scale_field!(fat);
    scale_field!(fiber);
    scaled
}

/// Rescales a recipe to `new_servings`.
///
/// Each ingredient amount is multiplied by `new_servings / recipe.servings`;
/// amounts that do not parse as numbers are left as written. Every nutrition
/// field is rounded on its own, so totals may drift by a unit or two.
///
/// Callers should keep `new_servings >= 1`; zero is accepted and zeroes
/// every numeric amount.
pub fn adjust_servings(recipe: &Recipe, new_servings: u32) -> Recipe {
    let ratio = if recipe.servings == 0 {
        1.0
    } else {
        f64::from(new_servings) / f64::from(recipe.servings)
    };

    Recipe {
        servings: new_servings,
        ingredients: recipe
            .ingredients
            .iter()
            .map(|ingredient| RecipeIngredient {
                amount: scale_amount(&ingredient.amount, ratio),
                ..ingredient.clone()
            })
            .collect(),
        nutrition: scale_nutrition(&recipe.nutrition, ratio),
        ..recipe.clone()
    }
}
