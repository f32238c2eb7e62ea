use crate::asyncable::{Asyncable, AsyncValue};
use crate::error::{Result, StoreError};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
}

impl Ingredient {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            allergens: None,
        }
    }
}

/// On-disk catalog layout: `{ "ingredients": [...] }`.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    ingredients: Vec<Ingredient>,
}

/// Parse a catalog document.
pub fn parse_catalog(source: &str) -> Result<Vec<Ingredient>> {
    let document: CatalogDocument = serde_json::from_str(source)
        .map_err(|e| StoreError::Deserialization(format!("ingredient catalog: {e}")))?;
    Ok(document.ingredients)
}

/// Somewhere ingredients can be fetched from.
pub trait IngredientSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Ingredient>>>;
}

/// Reads a catalog document from a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IngredientSource for JsonFileSource {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Ingredient>>> {
        let path = self.path.clone();
        async move {
            let source = tokio::fs::read_to_string(&path).await.map_err(|e| {
                StoreError::Storage(format!(
                    "failed to fetch ingredients from {}: {e}",
                    path.display()
                ))
            })?;
            parse_catalog(&source)
        }
        .boxed()
    }
}

/// Ingredients fetched once and kept for the life of the catalog.
///
/// Concurrent first loads share a single fetch. A failed fetch is not
/// remembered, so the next load tries again.
pub struct IngredientCatalog {
    source: Box<dyn IngredientSource>,
    loaded: OnceCell<Vec<Ingredient>>,
}

impl IngredientCatalog {
    pub fn new(source: impl IngredientSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: OnceCell::new(),
        }
    }

    pub async fn load(&self) -> Result<Vec<Ingredient>> {
        let ingredients = self
            .loaded
            .get_or_try_init(|| async {
                debug!("fetching ingredient catalog");
                let ingredients = self.source.fetch().await?;
                info!(count = ingredients.len(), "ingredient catalog loaded");
                Ok::<_, StoreError>(ingredients)
            })
            .await?;
        Ok(ingredients.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }
}

/// A read-only store over the catalog's ingredients.
pub fn ingredient_store(catalog: Arc<IngredientCatalog>) -> Asyncable<Vec<Ingredient>> {
    Asyncable::new(
        move || {
            let catalog = Arc::clone(&catalog);
            Ok(Some(AsyncValue::from_future(async move {
                catalog.load().await
            })))
        },
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CATALOG: &str = r#"{
        "ingredients": [
            { "id": 1, "name": "Flour", "category": "Baking", "allergens": ["gluten"] },
            { "id": 2, "name": "Eggs" }
        ]
    }"#;

    struct CountingSource {
        fetches: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl IngredientSource for CountingSource {
        fn fetch(&self) -> BoxFuture<'static, Result<Vec<Ingredient>>> {
            let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail_first && attempt == 0;
            async move {
                if fail {
                    Err(StoreError::Storage("503".to_string()))
                } else {
                    parse_catalog(CATALOG)
                }
            }
            .boxed()
        }
    }

    #[test]
    fn parses_optional_fields() {
        let ingredients = parse_catalog(CATALOG).unwrap();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].allergens.as_deref(), Some(&["gluten".to_string()][..]));
        assert_eq!(ingredients[1], Ingredient::new(2, "Eggs"));
    }

    #[test]
    fn malformed_catalog_is_a_deserialization_error() {
        assert!(matches!(
            parse_catalog(r#"{ "items": [] }"#),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn catalog_fetches_once() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let catalog = IngredientCatalog::new(CountingSource {
            fetches: fetches.clone(),
            fail_first: false,
        });

        let (a, b) = tokio::join!(catalog.load(), catalog.load());
        assert_eq!(a.unwrap(), b.unwrap());
        catalog.load().await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(catalog.is_loaded());
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let catalog = IngredientCatalog::new(CountingSource {
            fetches: fetches.clone(),
            fail_first: true,
        });

        assert!(catalog.load().await.is_err());
        assert!(!catalog.is_loaded());
        assert_eq!(catalog.load().await.unwrap().len(), 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn file_source_reads_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingredients.json");
        std::fs::write(&path, CATALOG).unwrap();

        let store = ingredient_store(Arc::new(IngredientCatalog::new(JsonFileSource::new(&path))));
        assert!(!store.has_setter());
        let ingredients = store.get().await.unwrap();
        assert_eq!(ingredients[0].name, "Flour");
    }

    #[tokio::test]
    async fn missing_file_surfaces_through_the_store() {
        let store = ingredient_store(Arc::new(IngredientCatalog::new(JsonFileSource::new(
            "/nonexistent/ingredients.json",
        ))));
        assert!(matches!(store.get().await, Err(StoreError::Storage(_))));
    }
}
