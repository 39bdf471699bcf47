//! HTTP boundary for pastebox
//!
//! A thin, swappable shell over the paste store: it validates input shape,
//! delegates, and translates store errors into status codes. No business
//! logic lives here.

pub mod paste_routes;
pub mod server;

pub use paste_routes::{paste_routes, upload_routes, AppState};
pub use server::HttpServer;
