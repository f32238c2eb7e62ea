use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for the grocery stores.
///
/// ```
/// use grocer::groceries::GroceriesConfig;
///
/// let config = GroceriesConfig::from_toml_str(r#"
///     ingredients_path = "data/ingredients.json"
///     storage_dir = "state"
/// "#).unwrap();
/// assert_eq!(config.meals_key, "meals");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroceriesConfig {
    /// JSON catalog of known ingredients.
    pub ingredients_path: PathBuf,
    /// Directory for persisted state; in-memory storage when unset.
    pub storage_dir: Option<PathBuf>,
    pub meals_key: String,
    pub grocery_list_key: String,
}

impl Default for GroceriesConfig {
    fn default() -> Self {
        Self {
            ingredients_path: PathBuf::from("ingredients_slim.json"),
            storage_dir: None,
            meals_key: "meals".to_string(),
            grocery_list_key: "ingredientList".to_string(),
        }
    }
}

impl GroceriesConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<()> {
        if self.meals_key.is_empty() || self.grocery_list_key.is_empty() {
            return Err(StoreError::Config("storage keys must not be empty".to_string()));
        }
        if self.meals_key == self.grocery_list_key {
            return Err(StoreError::Config(format!(
                "meals and grocery list share the storage key {:?}",
                self.meals_key
            )));
        }
        Ok(())
    }
}
