//! Grocery-list state: the ingredient catalog, saved meals and the shopping
//! list, built on the store types of this crate.

mod config;
mod ingredient;
mod local;
mod meal;

pub use config::GroceriesConfig;
pub use ingredient::{
    ingredient_store, parse_catalog, Ingredient, IngredientCatalog, IngredientSource,
    JsonFileSource,
};
pub use local::{persisted, FileStorage, LocalStore, MemoryStorage, Storage};
pub use meal::{grocery_list_store, meal_store, open_storage, Meal};
