pub mod app;
pub mod response;
pub mod routes;
pub mod types;
