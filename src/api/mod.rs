pub mod handlers;
pub mod routes;

pub use handlers::NOT_FOUND_MESSAGE;
pub use routes::create_api_router;
