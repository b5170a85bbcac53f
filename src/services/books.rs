//! Book lifecycle: list, detail, create, update and delete flows
//!
//! Write flows sanitize, then validate, then either re-render the form with
//! the submitted values and field errors, or persist and redirect. Deleting a
//! book is refused while copies of it exist.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany};

use super::{aggregate::Aggregate, Outcome};
use crate::{
    error::{parse_id, AppError, AppResult},
    models::{
        book::BookForm, Author, Book, BookData, BookDetails, BookInstance, BookInstanceFilter,
        BookListing, Genre, GenreOption, Resource,
    },
    repository::Repository,
    validation::{self, FieldError, FieldRule, Fields, Rule},
    views::{linked, Linked},
};

pub const BOOK_LIST_URL: &str = "/catalog/books";

const BOOK_FIELDS: &[&str] = &["title", "author", "summary", "isbn"];

const BOOK_RULES: &[FieldRule] = &[
    FieldRule::new("title", Rule::NotEmpty, "Title must not be empty."),
    FieldRule::new("author", Rule::NotEmpty, "Author must not be empty"),
    FieldRule::new("author", Rule::Reference, "Author must be a valid reference"),
    FieldRule::new("summary", Rule::NotEmpty, "Summary must not be empty"),
    FieldRule::new("isbn", Rule::NotEmpty, "ISBN must not be empty"),
];

/// Book form submission
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub isbn: String,
    /// A single genre, repeated keys, or an array
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    pub genre: Vec<String>,
}

impl BookInput {
    fn fields(&self) -> Fields {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("summary", &self.summary),
            ("isbn", &self.isbn),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

/// Book delete confirmation submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookDeleteInput {
    #[serde(default)]
    pub bookid: String,
}

#[derive(Debug, Serialize)]
pub struct BookListView {
    pub book_list: Vec<Linked<BookListing>>,
}

#[derive(Debug, Serialize)]
pub struct BookDetailView {
    pub book: Linked<BookDetails>,
    pub book_instances: Vec<Linked<BookInstance>>,
}

#[derive(Debug, Serialize)]
pub struct BookFormView {
    pub authors: Vec<Linked<Author>>,
    pub genres: Vec<GenreOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookForm>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct BookDeleteView {
    pub book: Linked<Book>,
    pub book_instances: Vec<Linked<BookInstance>>,
}

/// Trim genre references, drop empty ones and write valid ones in canonical form
fn clean_refs<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| match v.parse::<i32>() {
            Ok(id) if id > 0 => id.to_string(),
            _ => v.to_string(),
        })
        .collect()
}

/// Build the candidate book and collect every field error
fn candidate(id: Option<i32>, input: &BookInput, genre: Vec<String>) -> (BookForm, Vec<FieldError>) {
    let fields = validation::sanitize(&input.fields(), BOOK_FIELDS);
    let mut errors = validation::check(&fields, BOOK_RULES);
    errors.extend(
        genre
            .iter()
            .filter(|g| !validation::is_reference(g))
            .map(|g| FieldError::new("genre", "Genre must be a valid reference", g)),
    );

    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let form = BookForm {
        id,
        title: field("title"),
        author: field("author"),
        summary: field("summary"),
        isbn: field("isbn"),
        genre,
    };
    (form, errors)
}

fn book_data(form: &BookForm) -> AppResult<BookData> {
    let author_id = form
        .author
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Invalid author reference {}", form.author)))?;
    let genre_ids = form
        .genre
        .iter()
        .map(|g| {
            g.parse::<i32>()
                .map_err(|_| AppError::Validation(format!("Invalid genre reference {}", g)))
        })
        .collect::<AppResult<Vec<i32>>>()?;
    Ok(BookData {
        title: form.title.clone(),
        author_id,
        summary: form.summary.clone(),
        isbn: form.isbn.clone(),
        genre_ids,
    })
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books with their authors
    pub async fn list(&self) -> AppResult<BookListView> {
        let books = self.repository.books.find_all_listing().await?;
        Ok(BookListView { book_list: linked(books) })
    }

    /// A book with author, genres and copies
    pub async fn detail(&self, id: &str) -> AppResult<BookDetailView> {
        let id = parse_id(id, "Book")?;
        let books = self.repository.books.clone();
        let instances = self.repository.book_instances.clone();

        let mut joined = Aggregate::new()
            .query("book", async move { books.find_by_id_populated(id).await })
            .query("book_instances", async move {
                instances.find_all(BookInstanceFilter::by_book(id)).await
            })
            .run()
            .await?;

        Ok(BookDetailView {
            book: joined.take::<BookDetails>("book")?.into(),
            book_instances: linked(joined.take("book_instances")?),
        })
    }

    /// Authors and genres for the form, genres marked when selected
    async fn form_view(
        &self,
        book: Option<BookForm>,
        errors: Vec<FieldError>,
    ) -> AppResult<BookFormView> {
        let authors = self.repository.authors.clone();
        let genres = self.repository.genres.clone();

        let mut joined = Aggregate::new()
            .query("authors", async move { authors.find_all().await })
            .query("genres", async move { genres.find_all().await })
            .run()
            .await?;

        let selected = book.as_ref().map(|b| b.genre.as_slice()).unwrap_or(&[]);
        Ok(BookFormView {
            authors: linked(joined.take("authors")?),
            genres: GenreOption::mark(joined.take::<Vec<Genre>>("genres")?, selected),
            book,
            errors,
        })
    }

    /// Blank creation form
    pub async fn create_form(&self) -> AppResult<BookFormView> {
        self.form_view(None, Vec::new()).await
    }

    /// Create a book from a form submission
    pub async fn create(&self, input: BookInput) -> AppResult<Outcome<BookFormView>> {
        let genre = clean_refs(input.genre.iter().map(String::as_str));
        let (form, errors) = candidate(None, &input, genre);

        if !errors.is_empty() {
            tracing::debug!("Book form rejected with {} error(s)", errors.len());
            let view = self.form_view(Some(form), errors).await?;
            return Ok(Outcome::Render(view));
        }

        let book = self.repository.books.save(&book_data(&form)?).await?;
        tracing::info!("Created book id={}", book.id);
        Ok(Outcome::Redirect(book.url()))
    }

    /// A book and the copies that would block its deletion
    async fn delete_view(&self, id: i32) -> AppResult<BookDeleteView> {
        let books = self.repository.books.clone();
        let instances = self.repository.book_instances.clone();

        let mut joined = Aggregate::new()
            .query("book_instances", async move {
                instances.find_all(BookInstanceFilter::by_book(id)).await
            })
            .query("book", async move { books.find_by_id(id).await })
            .run()
            .await?;

        Ok(BookDeleteView {
            book: joined.take::<Book>("book")?.into(),
            book_instances: linked(joined.take("book_instances")?),
        })
    }

    /// Delete confirmation page
    pub async fn delete_form(&self, id: &str) -> AppResult<BookDeleteView> {
        self.delete_view(parse_id(id, "Book")?).await
    }

    /// Delete a book unless copies of it still exist
    pub async fn delete(&self, input: BookDeleteInput) -> AppResult<Outcome<BookDeleteView>> {
        let raw = validation::sanitize_value(&input.bookid);
        if raw.is_empty() {
            return Err(AppError::Validation("Book id must not be empty".to_string()));
        }
        let id = parse_id(&raw, "Book")?;

        let view = self.delete_view(id).await?;
        if !view.book_instances.is_empty() {
            tracing::debug!(
                "Refusing to delete book id={}: {} copies remain",
                id,
                view.book_instances.len()
            );
            return Ok(Outcome::Render(view));
        }

        self.repository.books.delete_by_id(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(Outcome::Redirect(BOOK_LIST_URL.to_string()))
    }

    /// Update form pre-filled with the stored book
    pub async fn update_form(&self, id: &str) -> AppResult<BookFormView> {
        let id = parse_id(&validation::sanitize_value(id), "Book")?;
        let books = self.repository.books.clone();
        let genres = self.repository.genres.clone();
        let authors = self.repository.authors.clone();

        let mut joined = Aggregate::new()
            .query("book", async move { books.find_by_id_populated(id).await })
            .query("genres", async move { genres.find_all().await })
            .query("authors", async move { authors.find_all().await })
            .run()
            .await?;

        let book: BookDetails = joined.take("book")?;
        let form = BookForm::from(&book);
        Ok(BookFormView {
            authors: linked(joined.take("authors")?),
            genres: GenreOption::mark(joined.take::<Vec<Genre>>("genres")?, &form.genre),
            book: Some(form),
            errors: Vec::new(),
        })
    }

    /// Replace a book from a form submission, keeping its identity
    pub async fn update(&self, id: &str, input: BookInput) -> AppResult<Outcome<BookFormView>> {
        let id = parse_id(&validation::sanitize_value(id), "Book")?;
        let genre = clean_refs(input.genre.iter().flat_map(|g| g.split(',')));
        let (form, errors) = candidate(Some(id), &input, genre);

        if !errors.is_empty() {
            tracing::debug!("Book form for id={} rejected with {} error(s)", id, errors.len());
            let view = self.form_view(Some(form), errors).await?;
            return Ok(Outcome::Render(view));
        }

        let book = self.repository.books.update_by_id(id, &book_data(&form)?).await?;
        tracing::info!("Updated book id={}", book.id);
        Ok(Outcome::Redirect(book.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::CopyStatus, repository::mock::MockRepository};

    fn author(id: i32) -> Author {
        Author {
            id,
            first_name: "Frank".into(),
            family_name: "Herbert".into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    fn genre(id: i32, name: &str) -> Genre {
        Genre { id, name: name.into() }
    }

    fn copy(id: i32, book_id: i32) -> BookInstance {
        BookInstance {
            id,
            book_id,
            imprint: "Chilton Books, 1965".into(),
            status: CopyStatus::Available,
            due_back: None,
        }
    }

    fn stored(id: i32, data: &BookData) -> Book {
        Book {
            id,
            title: data.title.clone(),
            author_id: data.author_id,
            summary: data.summary.clone(),
            isbn: data.isbn.clone(),
            genre_ids: data.genre_ids.clone(),
        }
    }

    fn with_form_lists(mock: &mut MockRepository) {
        mock.authors.expect_find_all().returning(|| Ok(vec![author(1)]));
        mock.genres
            .expect_find_all()
            .returning(|| Ok(vec![genre(1, "Fantasy"), genre(2, "Science Fiction")]));
    }

    fn dune() -> BookInput {
        BookInput {
            title: "Dune".into(),
            author: "1".into(),
            summary: "desert planet".into(),
            isbn: "9780441013593".into(),
            genre: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_without_genre_saves_empty_refs() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_save()
            .withf(|data| data.title == "Dune" && data.author_id == 1 && data.genre_ids.is_empty())
            .times(1)
            .returning(|data| Ok(stored(42, data)));

        let service = BooksService::new(mock.build());
        match service.create(dune()).await.unwrap() {
            Outcome::Redirect(location) => assert_eq!(location, "/catalog/book/42"),
            Outcome::Render(_) => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_create_with_empty_title_rerenders_form() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_save().never();

        let service = BooksService::new(mock.build());
        let input = BookInput {
            title: "".into(),
            summary: "x".into(),
            isbn: "123".into(),
            ..dune()
        };
        let view = match service.create(input).await.unwrap() {
            Outcome::Render(view) => view,
            Outcome::Redirect(_) => panic!("expected form"),
        };

        assert_eq!(view.errors.len(), 1);
        assert_eq!(view.errors[0].param, "title");
        assert_eq!(view.authors.len(), 1);
        assert_eq!(view.genres.len(), 2);
        let book = view.book.unwrap();
        assert_eq!(book.title, "");
        assert_eq!(book.summary, "x");
    }

    #[tokio::test]
    async fn test_whitespace_only_fields_are_rejected() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_save().never();

        let service = BooksService::new(mock.build());
        let input = BookInput {
            summary: "   ".into(),
            isbn: "\t".into(),
            genre: vec!["2".into()],
            ..dune()
        };
        let view = match service.create(input).await.unwrap() {
            Outcome::Render(view) => view,
            Outcome::Redirect(_) => panic!("expected form"),
        };

        let params: Vec<&str> = view.errors.iter().map(|e| e.param.as_str()).collect();
        assert_eq!(params, vec!["summary", "isbn"]);
        let checked: Vec<bool> = view.genres.iter().map(|g| g.checked).collect();
        assert_eq!(checked, vec![false, true]);
    }

    #[tokio::test]
    async fn test_create_escapes_then_trims() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_save()
            .withf(|data| data.title == "Dune &amp; Sons" && data.isbn == "978")
            .times(1)
            .returning(|data| Ok(stored(3, data)));

        let service = BooksService::new(mock.build());
        let input = BookInput {
            title: "  Dune & Sons ".into(),
            isbn: " 978 ".into(),
            ..dune()
        };
        assert!(service.create(input).await.unwrap().is_redirect());
    }

    #[tokio::test]
    async fn test_delete_with_copies_is_refused() {
        let mut mock = MockRepository::new();
        mock.book_instances
            .expect_find_all()
            .withf(|filter| filter.book_id == Some(9))
            .returning(|_| Ok(vec![copy(1, 9), copy(2, 9)]));
        mock.books.expect_find_by_id().returning(|id| {
            Ok(stored(id, &BookData {
                title: "Dune".into(),
                author_id: 1,
                summary: "s".into(),
                isbn: "i".into(),
                genre_ids: vec![],
            }))
        });
        mock.books.expect_delete_by_id().never();

        let service = BooksService::new(mock.build());
        let outcome = service
            .delete(BookDeleteInput { bookid: "9".into() })
            .await
            .unwrap();

        match outcome {
            Outcome::Render(view) => {
                assert_eq!(view.book.item.id, 9);
                let ids: Vec<i32> = view.book_instances.iter().map(|c| c.item.id).collect();
                assert_eq!(ids, vec![1, 2]);
            }
            Outcome::Redirect(_) => panic!("delete must be refused"),
        }
    }

    #[tokio::test]
    async fn test_delete_without_copies_removes_book() {
        let mut mock = MockRepository::new();
        mock.book_instances.expect_find_all().returning(|_| Ok(vec![]));
        mock.books.expect_find_by_id().returning(|id| {
            Ok(stored(id, &BookData {
                title: "Dune".into(),
                author_id: 1,
                summary: "s".into(),
                isbn: "i".into(),
                genre_ids: vec![],
            }))
        });
        mock.books
            .expect_delete_by_id()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|_| Ok(()));

        let service = BooksService::new(mock.build());
        match service.delete(BookDeleteInput { bookid: " 9 ".into() }).await.unwrap() {
            Outcome::Redirect(location) => assert_eq!(location, BOOK_LIST_URL),
            Outcome::Render(_) => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_delete_requires_identity() {
        let service = BooksService::new(MockRepository::new().build());
        let result = service.delete(BookDeleteInput::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_splits_genres() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_update_by_id()
            .withf(|id, data| *id == 7 && data.genre_ids == vec![1, 3])
            .times(1)
            .returning(|id, data| Ok(stored(id, data)));

        let service = BooksService::new(mock.build());
        let input = BookInput {
            genre: vec!["1,3".into()],
            ..dune()
        };
        match service.update(" 7 ", input).await.unwrap() {
            Outcome::Redirect(location) => assert_eq!(location, "/catalog/book/7"),
            Outcome::Render(_) => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_update_of_missing_book_propagates_not_found() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_update_by_id()
            .returning(|id, _| Err(AppError::NotFound(format!("Book {} not found", id))));

        let service = BooksService::new(mock.build());
        let result = service.update("7", dune()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_form_marks_stored_genres() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_find_by_id_populated().returning(|id| {
            Ok(BookDetails {
                id,
                title: "Dune".into(),
                author_id: 1,
                author: Some(author(1)),
                summary: "s".into(),
                isbn: "i".into(),
                genres: vec![genre(2, "Science Fiction")],
            })
        });

        let service = BooksService::new(mock.build());
        let view = service.update_form("5").await.unwrap();

        let checked: Vec<bool> = view.genres.iter().map(|g| g.checked).collect();
        assert_eq!(checked, vec![false, true]);
        let book = view.book.unwrap();
        assert_eq!(book.id, Some(5));
        assert_eq!(book.author, "1");
    }

    #[tokio::test]
    async fn test_update_form_keeps_unresolved_author() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_find_by_id_populated().returning(|id| {
            Ok(BookDetails {
                id,
                title: "Dune".into(),
                author_id: 17,
                author: None,
                summary: "s".into(),
                isbn: "i".into(),
                genres: vec![],
            })
        });

        let service = BooksService::new(mock.build());
        let view = service.update_form("5").await.unwrap();
        let book = view.book.unwrap();
        assert_eq!(book.author, "17");

        // Submitting the form unchanged keeps the stored reference
        let mut mock = MockRepository::new();
        mock.books
            .expect_update_by_id()
            .withf(|id, data| *id == 5 && data.author_id == 17)
            .times(1)
            .returning(|id, data| Ok(stored(id, data)));
        let service = BooksService::new(mock.build());
        let input = BookInput {
            title: book.title,
            author: book.author,
            summary: book.summary,
            isbn: book.isbn,
            genre: book.genre,
        };
        assert!(service.update("5", input).await.unwrap().is_redirect());
    }

    #[tokio::test]
    async fn test_create_store_failure_propagates() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_save()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let service = BooksService::new(mock.build());
        let result = service.create(dune()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_store_failure_propagates() {
        let mut mock = MockRepository::new();
        mock.book_instances.expect_find_all().returning(|_| Ok(vec![]));
        mock.books.expect_find_by_id().returning(|id| {
            Ok(stored(id, &BookData {
                title: "Dune".into(),
                author_id: 1,
                summary: "s".into(),
                isbn: "i".into(),
                genre_ids: vec![],
            }))
        });
        mock.books
            .expect_delete_by_id()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let service = BooksService::new(mock.build());
        let result = service.delete(BookDeleteInput { bookid: "9".into() }).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_padded_genre_reference_stays_checked() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_save().never();

        let service = BooksService::new(mock.build());
        let input = BookInput {
            title: "".into(),
            genre: vec!["01".into()],
            ..dune()
        };
        let view = match service.create(input).await.unwrap() {
            Outcome::Render(view) => view,
            Outcome::Redirect(_) => panic!("expected form"),
        };
        let checked: Vec<bool> = view.genres.iter().map(|g| g.checked).collect();
        assert_eq!(checked, vec![true, false]);
        assert_eq!(view.book.unwrap().genre, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_detail_of_missing_book_is_not_found() {
        let mut mock = MockRepository::new();
        mock.books
            .expect_find_by_id_populated()
            .returning(|id| Err(AppError::NotFound(format!("Book {} not found", id))));
        mock.book_instances.expect_find_all().returning(|_| Ok(vec![]));

        let service = BooksService::new(mock.build());
        assert!(matches!(service.detail("12").await, Err(AppError::NotFound(_))));
        assert!(matches!(service.detail("not-an-id").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_form_offers_unchecked_genres() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);

        let service = BooksService::new(mock.build());
        let view = service.create_form().await.unwrap();
        assert!(view.book.is_none());
        assert!(view.errors.is_empty());
        assert!(view.genres.iter().all(|g| !g.checked));
    }

    #[tokio::test]
    async fn test_malformed_genre_reference_is_a_field_error() {
        let mut mock = MockRepository::new();
        with_form_lists(&mut mock);
        mock.books.expect_save().never();

        let service = BooksService::new(mock.build());
        let input = BookInput {
            genre: vec!["fantasy".into()],
            ..dune()
        };
        let view = match service.create(input).await.unwrap() {
            Outcome::Render(view) => view,
            Outcome::Redirect(_) => panic!("expected form"),
        };
        assert_eq!(view.errors[0].param, "genre");
    }
}
