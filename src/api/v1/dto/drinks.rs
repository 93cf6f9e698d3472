/*
 * Responsibility
 * - Drinks の request/response DTO
 * - short (ingredient name を含まない) / long (完全な recipe) の 2 つの表現
 * - 形式チェック (validation) はここで行い、違反は 400 にする
 */
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::repos::{Drink, DrinkPatch, Ingredient, NewDrink};

const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub parts: Option<Number>,
}

/// A recipe is normally a list; a single ingredient object is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<IngredientInput>),
    One(IngredientInput),
}

impl RecipeInput {
    fn into_recipe(self) -> Result<Vec<Ingredient>, &'static str> {
        let items = match self {
            RecipeInput::Many(items) => items,
            RecipeInput::One(item) => vec![item],
        };

        if items.is_empty() {
            return Err("recipe must not be empty");
        }

        items.into_iter().map(IngredientInput::into_ingredient).collect()
    }
}

impl IngredientInput {
    fn into_ingredient(self) -> Result<Ingredient, &'static str> {
        let name = self
            .name
            .filter(|s| !s.trim().is_empty())
            .ok_or("ingredient name is required")?;
        let color = self
            .color
            .filter(|s| !s.trim().is_empty())
            .ok_or("ingredient color is required")?;
        let parts = self.parts.ok_or("ingredient parts is required")?;

        if !parts.as_f64().is_some_and(|p| p.is_finite() && p >= 0.0) {
            return Err("ingredient parts must be >= 0");
        }

        Ok(Ingredient { name, color, parts })
    }
}

fn check_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("title is required");
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err("title must be <= 80 chars");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl CreateDrinkRequest {
    pub fn into_new_drink(self) -> Result<NewDrink, &'static str> {
        let title = self.title.ok_or("title is required")?;
        check_title(&title)?;

        let recipe = self.recipe.ok_or("recipe is required")?.into_recipe()?;

        Ok(NewDrink { title, recipe })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn into_patch(self) -> Result<DrinkPatch, &'static str> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }

        let recipe = self.recipe.map(RecipeInput::into_recipe).transpose()?;

        Ok(DrinkPatch {
            title: self.title,
            recipe,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: Number,
}

/// Public projection: ingredient names are withheld.
#[derive(Debug, Serialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl From<Drink> for DrinkShort {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
            recipe: d
                .recipe
                .into_iter()
                .map(|i| ShortIngredient {
                    color: i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<Drink> for DrinkLong {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
            recipe: d.recipe,
        }
    }
}

/// `{"success": true, "drinks": ...}`
#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: T,
}

impl<T> DrinksResponse<T> {
    pub fn ok(drinks: T) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// `{"success": true, "delete": id}`
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}
