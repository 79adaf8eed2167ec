// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validations::validate_url;

/// A persisted mapping from a slug to its destination
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ShortLink {
    /// Generated at creation, never changes
    pub id: Uuid,

    /// Identifier of the user that created the link
    pub owner_id: String,

    /// The destination the slug redirects to
    pub original_url: String,

    /// Unique, URL-safe path segment
    pub slug: String,

    /// Number of successful resolutions, only ever grows
    pub click_count: i64,

    /// When the link stops resolving (None means it never expires)
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// A link is expired once `now` is strictly past its expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => now > expiry,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Fields supplied by the service when inserting a link
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortLink {
    pub id: Uuid,
    pub owner_id: String,
    pub original_url: String,
    pub slug: String,
    pub expires_at: Option<DateTime<Utc>>,
}

// DTO for creating a new short link. Wire names are camelCase; the
// snake_case spellings are still accepted.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortLinkDto {
    #[serde(alias = "original_url")]
    #[validate(custom(function = "validate_url"))]
    pub original_url: String,

    /// Overrides the default lifetime; a past timestamp creates an already expired link
    #[serde(default, alias = "custom_expiry")]
    pub custom_expiry: Option<DateTime<Utc>>,
}

// DTO for changing the expiry of an existing link
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpiryDto {
    /// `null` removes the expiry
    #[serde(alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct ShortLinkQueryParams {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    pub offset: Option<i64>,
}

/// A link as returned to its owner, with the client-facing short URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLinkResponseDto {
    pub id: Uuid,
    pub owner_id: String,
    pub original_url: String,
    pub slug: String,
    pub short_url: String,
    pub click_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLinkResponseDto {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        let is_expired = link.is_expired();
        ShortLinkResponseDto {
            id: link.id,
            owner_id: link.owner_id,
            original_url: link.original_url,
            slug: link.slug,
            short_url,
            click_count: link.click_count,
            expires_at: link.expires_at,
            is_expired,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Outcome of resolving a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The link is active; the counter was incremented
    Redirect(String),
    NotFound,
    Expired,
}

/// Raw counters for one owner, as read from storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkStats {
    pub total_links: i64,
    pub total_clicks: i64,
    pub expired_links: i64,
    pub popular: Vec<ShortLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularLinkDto {
    pub id: Uuid,
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDto {
    pub total_links: i64,
    pub total_clicks: i64,
    pub expired_links: i64,
    pub popular_links: Vec<PopularLinkDto>,
}
