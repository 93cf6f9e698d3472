/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作
 * - 更新系はトランザクション内で実行し、失敗時は明示的に rollback
 * - DB エラーは RepoError に変換して返す (unique 違反 => Conflict)
 */
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::repos::drink_repo::{Drink, DrinkPatch, DrinkRepo, Ingredient, NewDrink};
use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: Json<Vec<Ingredient>>,
}

impl From<DrinkRow> for Drink {
    fn from(row: DrinkRow) -> Self {
        Drink {
            id: i64::from(row.id),
            title: row.title,
            recipe: row.recipe.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgDrinkRepo {
    pool: PgPool,
}

impl PgDrinkRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drinks (
                id SERIAL PRIMARY KEY,
                title VARCHAR(80) NOT NULL UNIQUE,
                recipe JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ids beyond the SERIAL range can never match a row
fn column_id(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

#[async_trait]
impl DrinkRepo for PgDrinkRepo {
    async fn list(&self) -> Result<Vec<Drink>, RepoError> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Drink::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, RepoError> {
        let Some(id) = column_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Drink::from))
    }

    async fn create(&self, new: NewDrink) -> Result<Drink, RepoError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(&new.title)
        .bind(Json(&new.recipe))
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(row.into())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(RepoError::from_sqlx(e))
            }
        }
    }

    async fn update(&self, id: i64, patch: DrinkPatch) -> Result<Option<Drink>, RepoError> {
        let Some(id) = column_id(id) else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.recipe.as_ref().map(Json))
        .fetch_optional(&mut *tx)
        .await;

        match updated {
            Ok(row) => {
                tx.commit().await?;
                Ok(row.map(Drink::from))
            }
            Err(e) => {
                tx.rollback().await?;
                Err(RepoError::from_sqlx(e))
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let Some(id) = column_id(id) else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await;

        match deleted {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected() > 0)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(RepoError::from_sqlx(e))
            }
        }
    }
}
