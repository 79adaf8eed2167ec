use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{err, ok, Ready};

use crate::errors::AppError;

/// Header set by the upstream authentication layer
pub const OWNER_HEADER: &str = "X-User-Id";

/// Identity of the caller, taken from [`OWNER_HEADER`] on every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for OwnerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let owner = req
            .headers()
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match owner {
            Some(owner) => ok(OwnerId(owner.to_string())),
            None => err(AppError::Unauthorized(format!(
                "Missing or empty {} header",
                OWNER_HEADER
            ))),
        }
    }
}
