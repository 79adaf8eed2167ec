// src/repositories/short_link.rs - Data access
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{LinkStats, NewShortLink, ShortLink};

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepositoryTrait: Send + Sync {
    /// Finds a link by its slug, compared exactly and case-sensitively
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>>;

    /// Checks whether any link already uses `slug`
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Finds a link by its unique identifier
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortLink>>;

    /// Lists the links of one owner, newest first
    async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortLink>>;

    /// Inserts a new link with a zero click count
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the slug is already taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn insert(&self, link: &NewShortLink) -> Result<ShortLink>;

    /// Adds one to the click count as a single atomic operation
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If the link no longer exists
    async fn increment_click_count(&self, id: &Uuid) -> Result<()>;

    /// Replaces the expiry of a link owned by `owner_id`
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link matches both id and owner
    async fn update_expiry(
        &self,
        id: &Uuid,
        owner_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink>;

    /// Hard-deletes a link owned by `owner_id`
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link matches both id and owner
    async fn delete(&self, id: &Uuid, owner_id: &str) -> Result<()>;

    /// Counts links and clicks of one owner and returns its `top` most clicked links
    async fn owner_stats(&self, owner_id: &str, top: i64) -> Result<LinkStats>;
}

// Implementation using actual database
pub struct ShortLinkRepository {
    pool: PgPool,
}

impl ShortLinkRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, owner_id, original_url, slug, click_count, expires_at, created_at, updated_at";

#[async_trait]
impl ShortLinkRepositoryTrait for ShortLinkRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>> {
        let query = format!("SELECT {} FROM short_links WHERE slug = $1", SELECT_COLUMNS);

        sqlx::query_as::<_, ShortLink>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_links WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .map_err(RepositoryError::Database)?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortLink>> {
        let query = format!("SELECT {} FROM short_links WHERE id = $1", SELECT_COLUMNS);

        sqlx::query_as::<_, ShortLink>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortLink>> {
        let query = format!(
            "SELECT {} FROM short_links WHERE owner_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        );

        let links = sqlx::query_as::<_, ShortLink>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(links)
    }

    async fn insert(&self, link: &NewShortLink) -> Result<ShortLink> {
        // The unique constraint on `slug` rejects a concurrent duplicate as 23505
        let query = format!(
            "INSERT INTO short_links (id, owner_id, original_url, slug, click_count, expires_at) \
             VALUES ($1, $2, $3, $4, 0, $5) \
             RETURNING {}",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, ShortLink>(&query)
            .bind(link.id)
            .bind(&link.owner_id)
            .bind(&link.original_url)
            .bind(&link.slug)
            .bind(link.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = RepositoryError::from(e);
                match &err {
                    RepositoryError::Conflict(_) => {
                        debug!("Slug '{}' rejected by unique constraint", link.slug)
                    }
                    _ => error!("Failed to insert short link: {}", err),
                }
                err
            })
    }

    async fn increment_click_count(&self, id: &Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE short_links SET click_count = click_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Short link with ID {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn update_expiry(
        &self,
        id: &Uuid,
        owner_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        debug!("Updating expiry of link {} to {:?}", id, expires_at);

        let query = format!(
            "UPDATE short_links SET expires_at = $1, updated_at = NOW() \
             WHERE id = $2 AND owner_id = $3 \
             RETURNING {}",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, ShortLink>(&query)
            .bind(expires_at)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Short link with ID {} not found", id)))
    }

    async fn delete(&self, id: &Uuid, owner_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM short_links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Short link with ID {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn owner_stats(&self, owner_id: &str, top: i64) -> Result<LinkStats> {
        let (total_links, total_clicks, expired_links): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(click_count), 0)::BIGINT, \
                    COUNT(*) FILTER (WHERE expires_at IS NOT NULL AND expires_at < NOW()) \
             FROM short_links WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {} FROM short_links WHERE owner_id = $1 \
             ORDER BY click_count DESC, created_at DESC LIMIT $2",
            SELECT_COLUMNS
        );

        let popular = sqlx::query_as::<_, ShortLink>(&query)
            .bind(owner_id)
            .bind(top)
            .fetch_all(&self.pool)
            .await?;

        Ok(LinkStats {
            total_links,
            total_clicks,
            expired_links,
            popular,
        })
    }
}
