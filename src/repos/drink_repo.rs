/*
 * Responsibility
 * - drinks の永続化インターフェース (DrinkRepo)
 * - handler はこの trait だけを見る (Postgres / in-memory を差し替え可能)
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    // kept as the client sent it (integer or decimal)
    pub parts: Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Clone)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

#[async_trait]
pub trait DrinkRepo: Send + Sync {
    // All drinks ordered by id ascending.
    async fn list(&self) -> Result<Vec<Drink>, RepoError>;

    async fn get(&self, id: i64) -> Result<Option<Drink>, RepoError>;

    async fn create(&self, new: NewDrink) -> Result<Drink, RepoError>;

    // Returns `None` when no drink has this id.
    async fn update(&self, id: i64, patch: DrinkPatch) -> Result<Option<Drink>, RepoError>;

    // Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}
