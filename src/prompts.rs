use crate::api_connection::endpoints::{InlineImage, ModelPrompt};

pub const IMAGE_PROMPT_TEMPERATURE: f32 = 0.2;
pub const BY_NAME_PROMPT_TEMPERATURE: f32 = 0.3;

macro_rules! reply_format_instruction {
    () => {
        "Reply with ONLY valid JSON in this exact format (no markdown, no code fences):"
    };
}

macro_rules! response_schema_tail {
    () => {
        r#"  "cuisine": "Italian/Indian/Chinese/etc",
  "ingredients": [
    {"name": "ingredient name", "quantity": "amount with unit"}
  ],
  "recipe": {
    "servings": 4,
    "prepTime": "15 mins",
    "cookTime": "30 mins",
    "difficulty": "Easy/Medium/Hard",
    "steps": [
      "Step 1 description",
      "Step 2 description"
    ]
  },
  "nutrition": {
    "calories": 450,
    "protein": "28g",
    "carbs": "55g",
    "fat": "12g",
    "fiber": "4g"
  }
}"#
    };
}

const REPLY_FORMAT_INSTRUCTION: &str = reply_format_instruction!();
const RESPONSE_SCHEMA_TAIL: &str = response_schema_tail!();

pub const IMAGE_RECIPE_PROMPT: &str = concat!(
    "You are a professional chef. Look at this food image carefully.\n\n",
    "1. Identify the dish name\n",
    "2. List all ingredients with quantities\n",
    "3. Provide step-by-step cooking instructions\n",
    "4. Estimate nutritional information per serving\n\n",
    reply_format_instruction!(),
    "\n{\n  \"dishName\": \"Name of the dish\",\n",
    response_schema_tail!()
);

/// Recipe request for a named dish. The name is JSON-escaped inside the example object.
pub fn build_recipe_by_name_prompt(dish_name: &str) -> String {
    let json_name = serde_json::Value::String(dish_name.to_string()).to_string();
    format!(
        "You are a professional chef. The user wants to cook \"{dish_name}\".\n\n\
         1. Confirm the dish name\n\
         2. List all ingredients with exact quantities\n\
         3. Provide detailed step-by-step cooking instructions\n\
         4. Estimate nutritional information per serving\n\n\
         {REPLY_FORMAT_INSTRUCTION}\n\
         {{\n  \"dishName\": {json_name},\n{RESPONSE_SCHEMA_TAIL}"
    )
}

pub fn image_recipe_prompt(image: InlineImage) -> ModelPrompt {
    ModelPrompt::text(IMAGE_RECIPE_PROMPT, IMAGE_PROMPT_TEMPERATURE).with_image(image)
}

pub fn recipe_by_name_prompt(dish_name: &str) -> ModelPrompt {
    ModelPrompt::text(build_recipe_by_name_prompt(dish_name), BY_NAME_PROMPT_TEMPERATURE)
}
