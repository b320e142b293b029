pub mod content_guard;
pub mod fetcher;
pub mod type_detect;
