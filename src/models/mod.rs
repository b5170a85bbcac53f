//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorData};
pub use book::{Book, BookData, BookDetails, BookFilter, BookListing};
pub use book_instance::{BookInstance, BookInstanceData, BookInstanceDetails, BookInstanceFilter, CopyStatus};
pub use genre::{Genre, GenreData, GenreOption};

/// A record with a canonical location derived from its identity
pub trait Resource {
    fn url(&self) -> String;
}
