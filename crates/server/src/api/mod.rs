pub mod handlers;
pub mod middleware;
pub mod movies;
pub mod routes;
pub mod subtitles;
pub mod watcher;

pub use routes::create_router;
