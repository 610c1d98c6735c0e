mod router;
pub mod server;

pub use server::HttpServer;
