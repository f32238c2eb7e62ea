use super::config::GroceriesConfig;
use super::ingredient::Ingredient;
use super::local::{FileStorage, LocalStore, MemoryStorage, Storage};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: u32,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

/// Storage selected by the config: files under `storage_dir`, or memory.
pub fn open_storage(config: &GroceriesConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match &config.storage_dir {
        Some(dir) => Arc::new(FileStorage::open(dir)?),
        None => Arc::new(MemoryStorage::new()),
    };
    Ok(storage)
}

/// Saved meals.
pub fn meal_store(storage: Arc<dyn Storage>, config: &GroceriesConfig) -> Result<LocalStore<Vec<Meal>>> {
    LocalStore::open(storage, config.meals_key.clone(), Vec::new())
}

/// Ingredients on the current grocery list.
pub fn grocery_list_store(
    storage: Arc<dyn Storage>,
    config: &GroceriesConfig,
) -> Result<LocalStore<Vec<Ingredient>>> {
    LocalStore::open(storage, config.grocery_list_key.clone(), Vec::new())
}
