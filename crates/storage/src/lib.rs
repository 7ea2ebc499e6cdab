#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, ProblemQuery, ProblemRepository, Storage, StorageError};
