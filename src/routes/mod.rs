pub mod api;

pub use api::{create_api_router, create_app, create_public_router};
