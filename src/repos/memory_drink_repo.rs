use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::drink_repo::{Drink, DrinkPatch, DrinkRepo, NewDrink};
use crate::repos::error::RepoError;

/// Process-local drink store, used when no `DATABASE_URL` is configured.
///
/// Mirrors the Postgres table: ids are assigned from a counter that never
/// reuses a value, and titles are unique.
#[derive(Debug, Default)]
pub struct MemoryDrinkRepo {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i64, Drink>,
    last_id: i64,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

impl MemoryDrinkRepo {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }
}

#[async_trait]
impl DrinkRepo for MemoryDrinkRepo {
    async fn list(&self) -> Result<Vec<Drink>, RepoError> {
        // BTreeMap iterates in key order
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, RepoError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, new: NewDrink) -> Result<Drink, RepoError> {
        let mut inner = self.inner.write().await;

        if inner.title_taken(&new.title, None) {
            return Err(RepoError::Conflict);
        }

        inner.last_id += 1;
        let drink = Drink {
            id: inner.last_id,
            title: new.title,
            recipe: new.recipe,
        };
        inner.rows.insert(drink.id, drink.clone());

        Ok(drink)
    }

    async fn update(&self, id: i64, patch: DrinkPatch) -> Result<Option<Drink>, RepoError> {
        let mut inner = self.inner.write().await;

        if let Some(title) = &patch.title
            && inner.title_taken(title, Some(id))
        {
            return Err(RepoError::Conflict);
        }

        let Some(drink) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            drink.title = title;
        }
        if let Some(recipe) = patch.recipe {
            drink.recipe = recipe;
        }

        Ok(Some(drink.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::drink_repo::Ingredient;

    fn water() -> NewDrink {
        NewDrink {
            title: "Water".to_string(),
            recipe: vec![Ingredient {
                name: "Water".to_string(),
                color: "blue".to_string(),
                parts: 1.into(),
            }],
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids_and_lists_in_order() {
        let repo = MemoryDrinkRepo::new();
        let a = repo.create(water()).await.unwrap();
        let b = repo
            .create(NewDrink {
                title: "Tea".to_string(),
                ..water()
            })
            .await
            .unwrap();

        assert!(b.id > a.id);
        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = MemoryDrinkRepo::new();
        let a = repo.create(water()).await.unwrap();
        assert!(repo.delete(a.id).await.unwrap());

        let b = repo.create(water()).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn duplicate_title_conflicts_without_side_effects() {
        let repo = MemoryDrinkRepo::new();
        repo.create(water()).await.unwrap();

        let err = repo.create(water()).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn patch_updates_only_given_fields() {
        let repo = MemoryDrinkRepo::new();
        let created = repo.create(water()).await.unwrap();

        let updated = repo
            .update(
                created.id,
                DrinkPatch {
                    title: Some("Tea".to_string()),
                    recipe: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Tea");
        assert_eq!(updated.recipe, created.recipe);
    }

    #[tokio::test]
    async fn patch_keeping_own_title_is_not_a_conflict() {
        let repo = MemoryDrinkRepo::new();
        let created = repo.create(water()).await.unwrap();

        let patch = DrinkPatch {
            title: Some("Water".to_string()),
            recipe: None,
        };
        assert!(repo.update(created.id, patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_rows() {
        let repo = MemoryDrinkRepo::new();
        assert!(repo.get(42).await.unwrap().is_none());
        assert!(repo.update(42, DrinkPatch::default()).await.unwrap().is_none());
        assert!(!repo.delete(42).await.unwrap());
    }
}
