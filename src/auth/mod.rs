pub mod extractor;
pub mod github;
pub mod jwt;
