use actix_web::{
    http::header::{CacheControl, CacheDirective, LOCATION},
    web, HttpResponse,
};
use log::{debug, info};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::AppError,
    extractors::OwnerId,
    models::{CreateShortLinkDto, Resolution, ShortLinkQueryParams, UpdateExpiryDto},
    repositories::ShortLinkRepositoryTrait,
    services::{ShortLinkService, ShortLinkServiceTrait},
    types::Result,
};

pub type ShortLinkServiceData<R> = web::Data<ShortLinkService<R>>;

/// Create short link route handler
pub async fn create_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    dto: web::Json<CreateShortLinkDto>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let link = service.create(owner.as_str(), dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "data": link,
        "message": "Successfully created short link",
    })))
}

/// List the caller's links
pub async fn list_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    query: web::Query<ShortLinkQueryParams>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let links = service.list(owner.as_str(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "data": links,
        "message": "Successfully retrieved short links",
    })))
}

pub async fn get_by_id_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    id: web::Path<Uuid>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let link = service.get(owner.as_str(), &id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "data": link,
        "message": "Successfully retrieved short link",
    })))
}

pub async fn update_expiry_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    id: web::Path<Uuid>,
    body: web::Json<UpdateExpiryDto>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let link = service
        .update_expiry(owner.as_str(), &id.into_inner(), body.into_inner().expires_at)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "data": link,
        "message": "Expiry updated successfully",
    })))
}

pub async fn delete_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    id: web::Path<Uuid>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let id = id.into_inner();
    service.delete(owner.as_str(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "deleted_id": &id,
        "message": format!("Successfully deleted short link with ID '{}'", id),
    })))
}

pub async fn analytics_handler<R: ShortLinkRepositoryTrait + 'static>(
    owner: OwnerId,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let analytics = service.analytics(owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "data": analytics,
        "message": "Successfully retrieved analytics",
    })))
}

/// Redirect route handler
pub async fn redirect_handler<R: ShortLinkRepositoryTrait + 'static>(
    path: web::Path<String>,
    service: ShortLinkServiceData<R>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    debug!("Redirect requested for slug: {}", slug);

    match service.resolve(&slug).await? {
        Resolution::Redirect(url) => {
            info!("Redirecting '{}' to '{}'", slug, url);
            // Every visit must reach us to be counted
            Ok(HttpResponse::TemporaryRedirect()
                .insert_header(CacheControl(vec![CacheDirective::NoStore]))
                .insert_header((LOCATION, url))
                .finish())
        }
        Resolution::NotFound => {
            info!("Slug '{}' not found", slug);
            Err(AppError::NotFound(format!("No short link for '{}'", slug)))
        }
        Resolution::Expired => {
            info!("Slug '{}' has expired", slug);
            Err(AppError::Gone(format!("Short link '{}' has expired", slug)))
        }
    }
}
