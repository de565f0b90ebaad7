pub mod answers;
pub mod metadata;
