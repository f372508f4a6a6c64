use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One layer of a drink's recipe
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Ingredient {
    /// Display color of the layer
    pub color: String,
    /// Ingredient name, e.g. "espresso"
    pub name: String,
    /// Relative amount of this ingredient
    pub parts: u32,
}

/// Short form of an ingredient, without the name
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// A drink with its full recipe (the "long" representation)
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Drink {
    /// Identifier assigned by the store
    pub id: i64,
    /// Unique drink title
    pub title: String,
    /// Ordered list of ingredients
    pub recipe: Vec<Ingredient>,
}

/// Drink representation for callers without the detail permission
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ShortDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl Drink {
    /// Collapses the recipe to colors and parts
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }
}

/// Recipe as sent by clients: a list of ingredients or a single one
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

/// Request body for creating or updating a drink
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Default)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// A validated drink ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Fields to change on an existing drink; `None` keeps the stored value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    /// Applies the changes on top of a stored drink
    pub fn apply(self, drink: Drink) -> Drink {
        Drink {
            id: drink.id,
            title: self.title.unwrap_or(drink.title),
            recipe: self.recipe.unwrap_or(drink.recipe),
        }
    }
}

fn normalize_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn normalize_recipe(recipe: Option<RecipeInput>) -> Option<Vec<Ingredient>> {
    recipe
        .map(Vec::<Ingredient>::from)
        .filter(|ingredients| !ingredients.is_empty())
}

impl DrinkPayload {
    /// Both a non-blank title and a non-empty recipe are required to create a drink
    pub fn into_new_drink(self) -> Option<NewDrink> {
        Some(NewDrink {
            title: normalize_title(self.title)?,
            recipe: normalize_recipe(self.recipe)?,
        })
    }

    /// Blank titles and empty recipes are treated as absent
    pub fn into_changes(self) -> DrinkChanges {
        DrinkChanges {
            title: normalize_title(self.title),
            recipe: normalize_recipe(self.recipe),
        }
    }
}

/// Response listing drinks in short form
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ShortDrinksResponse {
    pub success: bool,
    pub drinks: Vec<ShortDrink>,
}

/// Response listing drinks with their full recipe
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

/// Response for a deleted drink
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DeleteResponse {
    pub success: bool,
    /// Identifier of the removed drink
    pub delete: i64,
}
