pub mod chat;
pub mod extractor;
pub mod prompt;
pub mod session;
pub mod submission;
pub mod weather;
