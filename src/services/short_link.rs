// src/services/short_link.rs - Business logic
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::ShortenerConfig;
use crate::errors::{RepositoryError, ServiceError};
use crate::models::{
    AnalyticsDto, CreateShortLinkDto, NewShortLink, PopularLinkDto, Resolution, ShortLink,
    ShortLinkQueryParams, ShortLinkResponseDto,
};
use crate::repositories::ShortLinkRepositoryTrait;
use crate::utils::slug::generate_slug;

type Result<T> = std::result::Result<T, ServiceError>;

/// Slug candidates tried before creation gives up
pub const MAX_SLUG_ATTEMPTS: u32 = 5;

const DEFAULT_PAGE_SIZE: i64 = 20;
const POPULAR_LINKS: i64 = 5;

#[async_trait]
pub trait ShortLinkServiceTrait {
    /// Shortens `dto.original_url` on behalf of `owner_id`
    async fn create(&self, owner_id: &str, dto: CreateShortLinkDto)
        -> Result<ShortLinkResponseDto>;

    /// Maps a slug to its destination, counting the click when the link is active
    async fn resolve(&self, slug: &str) -> Result<Resolution>;

    async fn list(
        &self,
        owner_id: &str,
        params: ShortLinkQueryParams,
    ) -> Result<Vec<ShortLinkResponseDto>>;

    async fn get(&self, owner_id: &str, id: &Uuid) -> Result<ShortLinkResponseDto>;

    /// Sets or clears (`None`) the expiry of an owned link
    async fn update_expiry(
        &self,
        owner_id: &str,
        id: &Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLinkResponseDto>;

    async fn delete(&self, owner_id: &str, id: &Uuid) -> Result<()>;

    async fn analytics(&self, owner_id: &str) -> Result<AnalyticsDto>;
}

pub struct ShortLinkService<T: ShortLinkRepositoryTrait> {
    repository: Arc<T>,
    config: ShortenerConfig,
    slug_generator: fn(&str) -> String,
}

impl<T: ShortLinkRepositoryTrait> ShortLinkService<T> {
    pub fn new(repository: Arc<T>, config: ShortenerConfig) -> Self {
        Self {
            repository,
            config,
            slug_generator: generate_slug,
        }
    }

    #[cfg(test)]
    fn with_slug_generator(mut self, slug_generator: fn(&str) -> String) -> Self {
        self.slug_generator = slug_generator;
        self
    }

    fn to_response(&self, link: ShortLink) -> ShortLinkResponseDto {
        let short_url = self.config.short_url(&link.slug);
        ShortLinkResponseDto::new(link, short_url)
    }

    fn require_owner(owner_id: &str) -> Result<()> {
        if owner_id.trim().is_empty() {
            return Err(ServiceError::Unauthorized(
                "An owner is required for this operation".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads a link and checks that `owner_id` may act on it
    async fn find_owned(&self, owner_id: &str, id: &Uuid) -> Result<ShortLink> {
        Self::require_owner(owner_id)?;

        let link = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Short link with ID {} not found", id)))?;

        if link.owner_id != owner_id {
            warn!("User '{}' attempted to access link {}", owner_id, id);
            return Err(ServiceError::Unauthorized(format!(
                "Short link with ID {} belongs to another user",
                id
            )));
        }

        Ok(link)
    }
}

#[async_trait]
impl<T: ShortLinkRepositoryTrait> ShortLinkServiceTrait for ShortLinkService<T> {
    async fn create(
        &self,
        owner_id: &str,
        dto: CreateShortLinkDto,
    ) -> Result<ShortLinkResponseDto> {
        Self::require_owner(owner_id)?;

        if let Err(e) = dto.validate() {
            return Err(ServiceError::InvalidInput(e.to_string()));
        }

        let expires_at = dto
            .custom_expiry
            .unwrap_or_else(|| Utc::now() + Duration::days(self.config.default_expiry_days));

        // The pre-check avoids most wasted inserts; the unique constraint
        // catches the candidates that race past it.
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = (self.slug_generator)(&dto.original_url);

            if self.repository.exists_by_slug(&slug).await? {
                warn!(
                    "Slug '{}' already exists (attempt {}/{})",
                    slug, attempt, MAX_SLUG_ATTEMPTS
                );
                continue;
            }

            let new_link = NewShortLink {
                id: Uuid::new_v4(),
                owner_id: owner_id.to_string(),
                original_url: dto.original_url.clone(),
                slug,
                expires_at: Some(expires_at),
            };

            match self.repository.insert(&new_link).await {
                Ok(link) => {
                    info!(
                        "Created short link '{}' for user '{}'",
                        link.slug, link.owner_id
                    );
                    return Ok(self.to_response(link));
                }
                Err(RepositoryError::Conflict(reason)) => {
                    warn!(
                        "Slug '{}' taken at insert: {} (attempt {}/{})",
                        new_link.slug, reason, attempt, MAX_SLUG_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(
            "Could not allocate a slug for '{}' after {} attempts",
            dto.original_url, MAX_SLUG_ATTEMPTS
        );
        Err(ServiceError::SlugAllocationFailed(MAX_SLUG_ATTEMPTS))
    }

    async fn resolve(&self, slug: &str) -> Result<Resolution> {
        let Some(link) = self.repository.find_by_slug(slug).await? else {
            debug!("No short link for slug '{}'", slug);
            return Ok(Resolution::NotFound);
        };

        if link.is_expired_at(Utc::now()) {
            debug!("Short link '{}' expired at {:?}", slug, link.expires_at);
            return Ok(Resolution::Expired);
        }

        match self.repository.increment_click_count(&link.id).await {
            Ok(()) => Ok(Resolution::Redirect(link.original_url)),
            // Deleted between lookup and increment
            Err(RepositoryError::NotFound(_)) => Ok(Resolution::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(
        &self,
        owner_id: &str,
        params: ShortLinkQueryParams,
    ) -> Result<Vec<ShortLinkResponseDto>> {
        Self::require_owner(owner_id)?;

        if let Err(e) = params.validate() {
            return Err(ServiceError::InvalidInput(e.to_string()));
        }

        let links = self
            .repository
            .find_by_owner(
                owner_id,
                params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                params.offset.unwrap_or(0),
            )
            .await?;

        Ok(links
            .into_iter()
            .map(|link| self.to_response(link))
            .collect())
    }

    async fn get(&self, owner_id: &str, id: &Uuid) -> Result<ShortLinkResponseDto> {
        let link = self.find_owned(owner_id, id).await?;
        Ok(self.to_response(link))
    }

    async fn update_expiry(
        &self,
        owner_id: &str,
        id: &Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLinkResponseDto> {
        self.find_owned(owner_id, id).await?;

        let link = self
            .repository
            .update_expiry(id, owner_id, expires_at)
            .await?;
        info!("Updated expiry of link {} to {:?}", id, link.expires_at);

        Ok(self.to_response(link))
    }

    async fn delete(&self, owner_id: &str, id: &Uuid) -> Result<()> {
        self.find_owned(owner_id, id).await?;

        self.repository.delete(id, owner_id).await?;
        info!("Deleted link {} of user '{}'", id, owner_id);

        Ok(())
    }

    async fn analytics(&self, owner_id: &str) -> Result<AnalyticsDto> {
        Self::require_owner(owner_id)?;

        let stats = self.repository.owner_stats(owner_id, POPULAR_LINKS).await?;

        Ok(AnalyticsDto {
            total_links: stats.total_links,
            total_clicks: stats.total_clicks,
            expired_links: stats.expired_links,
            popular_links: stats
                .popular
                .into_iter()
                .map(|link| PopularLinkDto {
                    id: link.id,
                    short_url: self.config.short_url(&link.slug),
                    slug: link.slug,
                    original_url: link.original_url,
                    clicks: link.click_count,
                })
                .collect(),
        })
    }
}
