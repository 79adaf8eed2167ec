use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ShortLinkRepositoryTrait;
use crate::errors::RepositoryError;
use crate::models::{LinkStats, NewShortLink, ShortLink};

type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Default)]
struct Inner {
    links: HashMap<Uuid, ShortLink>,
    slugs: HashMap<String, Uuid>,
}

/// Lock-guarded storage with the same guarantees as the Postgres table:
/// slugs are unique on insert and increments cannot be lost.
#[derive(Debug, Default)]
pub struct InMemoryShortLinkRepository {
    inner: RwLock<Inner>,
}

impl InMemoryShortLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `link` as-is, bypassing slug generation. Used to stage collisions.
    pub async fn seed(&self, link: ShortLink) {
        let mut inner = self.inner.write().await;
        inner.slugs.insert(link.slug.clone(), link.id);
        inner.links.insert(link.id, link);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.links.len()
    }
}

fn not_found(id: &Uuid) -> RepositoryError {
    RepositoryError::NotFound(format!("Short link with ID {} not found", id))
}

#[async_trait]
impl ShortLinkRepositoryTrait for InMemoryShortLinkRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>> {
        let inner = self.inner.read().await;
        Ok(inner
            .slugs
            .get(slug)
            .and_then(|id| inner.links.get(id))
            .cloned())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.inner.read().await.slugs.contains_key(slug))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ShortLink>> {
        Ok(self.inner.read().await.links.get(id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortLink>> {
        let inner = self.inner.read().await;
        let mut links: Vec<ShortLink> = inner
            .links
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn insert(&self, link: &NewShortLink) -> Result<ShortLink> {
        let mut inner = self.inner.write().await;
        if inner.slugs.contains_key(&link.slug) {
            return Err(RepositoryError::Conflict(format!(
                "Slug '{}' already exists",
                link.slug
            )));
        }

        let now = Utc::now();
        let record = ShortLink {
            id: link.id,
            owner_id: link.owner_id.clone(),
            original_url: link.original_url.clone(),
            slug: link.slug.clone(),
            click_count: 0,
            expires_at: link.expires_at,
            created_at: now,
            updated_at: now,
        };
        inner.slugs.insert(record.slug.clone(), record.id);
        inner.links.insert(record.id, record.clone());

        Ok(record)
    }

    async fn increment_click_count(&self, id: &Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let link = inner.links.get_mut(id).ok_or_else(|| not_found(id))?;
        link.click_count += 1;
        link.updated_at = Utc::now();
        Ok(())
    }

    async fn update_expiry(
        &self,
        id: &Uuid,
        owner_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        let mut inner = self.inner.write().await;
        let link = inner
            .links
            .get_mut(id)
            .filter(|l| l.owner_id == owner_id)
            .ok_or_else(|| not_found(id))?;
        link.expires_at = expires_at;
        link.updated_at = Utc::now();
        Ok(link.clone())
    }

    async fn delete(&self, id: &Uuid, owner_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let slug = match inner.links.get(id) {
            Some(link) if link.owner_id == owner_id => link.slug.clone(),
            _ => return Err(not_found(id)),
        };
        inner.links.remove(id);
        inner.slugs.remove(&slug);
        Ok(())
    }

    async fn owner_stats(&self, owner_id: &str, top: i64) -> Result<LinkStats> {
        let inner = self.inner.read().await;
        let now = Utc::now();
        let mut owned: Vec<&ShortLink> = inner
            .links
            .values()
            .filter(|l| l.owner_id == owner_id)
            .collect();

        let stats = LinkStats {
            total_links: owned.len() as i64,
            total_clicks: owned.iter().map(|l| l.click_count).sum(),
            expired_links: owned.iter().filter(|l| l.is_expired_at(now)).count() as i64,
            popular: Vec::new(),
        };

        owned.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(LinkStats {
            popular: owned
                .into_iter()
                .take(top.max(0) as usize)
                .cloned()
                .collect(),
            ..stats
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_link(owner: &str, slug: &str) -> NewShortLink {
        NewShortLink {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            original_url: "https://example.com".to_string(),
            slug: slug.to_string(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_slug() {
        let repo = InMemoryShortLinkRepository::new();
        let saved = repo.insert(&new_link("alice", "abcdef123")).await.unwrap();

        assert_eq!(saved.click_count, 0);
        let found = repo.find_by_slug("abcdef123").await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert!(repo.find_by_slug("ABCDEF123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_slug() {
        let repo = InMemoryShortLinkRepository::new();
        repo.insert(&new_link("alice", "abcdef123")).await.unwrap();

        let err = repo.insert(&new_link("bob", "abcdef123")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn mutations_are_scoped_to_owner() {
        let repo = InMemoryShortLinkRepository::new();
        let saved = repo.insert(&new_link("alice", "abcdef123")).await.unwrap();

        let err = repo.delete(&saved.id, "bob").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        let err = repo
            .update_expiry(&saved.id, "bob", Some(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        repo.delete(&saved.id, "alice").await.unwrap();
        assert!(!repo.exists_by_slug("abcdef123").await.unwrap());
    }

    #[tokio::test]
    async fn increment_missing_link_is_not_found() {
        let repo = InMemoryShortLinkRepository::new();
        let err = repo.increment_click_count(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryShortLinkRepository::new());
        let saved = repo.insert(&new_link("alice", "abcdef123")).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let id = saved.id;
                tokio::spawn(async move { repo.increment_click_count(&id).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let link = repo.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(link.click_count, 50);
    }
}
