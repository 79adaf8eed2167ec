use std::sync::Arc;

use actix_web::web;

mod short_link;

pub use short_link::{ShortLinkService, ShortLinkServiceTrait};

use crate::{config::ShortenerConfig, db::Database, repositories::ShortLinkRepository};

/// Service Register
pub fn register(db: Database, shortener: ShortenerConfig, cfg: &mut web::ServiceConfig) {
    let short_link_repository = ShortLinkRepository::new(db);
    let short_link_service = ShortLinkService::new(Arc::new(short_link_repository), shortener);
    cfg.app_data(web::Data::new(short_link_service));
}
