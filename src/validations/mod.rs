mod short_link;

pub use short_link::validate_url;
