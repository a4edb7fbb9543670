pub mod cache;
pub mod openai;
pub mod parser;
pub mod types;
