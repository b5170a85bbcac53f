//! Lifecycle controllers for the catalog entities

pub mod aggregate;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use crate::repository::Repository;

/// Result of a page flow: a view to render, or a location to redirect to
#[derive(Debug)]
pub enum Outcome<V> {
    Render(V),
    Redirect(String),
}

impl<V> Outcome<V> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::Redirect(_))
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub books: books::BooksService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub book_instances: book_instances::BookInstancesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(repository),
        }
    }
}
