pub mod dispatcher;
pub mod docx;
pub mod engine;
pub mod pdf;
