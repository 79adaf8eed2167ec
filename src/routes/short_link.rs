use actix_web::web;

use crate::{
    handlers::{
        analytics_handler, create_handler, delete_handler, get_by_id_handler, list_handler,
        redirect_handler, update_expiry_handler,
    },
    repositories::ShortLinkRepositoryTrait,
};

/// Registers the owner API and the public `/{slug}` redirect.
///
/// The redirect matches any single path segment, so this must be configured last.
pub fn configure_routes<R: ShortLinkRepositoryTrait + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/urls")
                    .route("", web::post().to(create_handler::<R>))
                    .route("", web::get().to(list_handler::<R>))
                    .route("/{id}", web::get().to(get_by_id_handler::<R>))
                    .route("/{id}", web::put().to(update_expiry_handler::<R>))
                    .route("/{id}", web::delete().to(delete_handler::<R>)),
            )
            .route("/analytics", web::get().to(analytics_handler::<R>)),
    );
    cfg.route("/{slug}", web::get().to(redirect_handler::<R>));
}
