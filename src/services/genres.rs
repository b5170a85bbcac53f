//! Genre lifecycle flows

use serde::{Deserialize, Serialize};

use super::{aggregate::Aggregate, Outcome};
use crate::{
    error::{parse_id, AppError, AppResult},
    models::{Book, BookFilter, Genre, GenreData, Resource},
    repository::Repository,
    validation::{self, FieldError, FieldRule, Fields, Rule},
    views::{linked, Linked},
};

pub const GENRE_LIST_URL: &str = "/catalog/genres";

const GENRE_RULES: &[FieldRule] = &[
    FieldRule::new("name", Rule::NotEmpty, "Genre name required"),
    FieldRule::new("name", Rule::MinLength(3), "Genre name must contain at least 3 characters"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreInput {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreDeleteInput {
    #[serde(default)]
    pub genreid: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenreForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct GenreListView {
    pub genre_list: Vec<Linked<Genre>>,
}

#[derive(Debug, Serialize)]
pub struct GenreDetailView {
    pub genre: Linked<Genre>,
    pub genre_books: Vec<Linked<Book>>,
}

#[derive(Debug, Default, Serialize)]
pub struct GenreFormView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<GenreForm>,
    pub errors: Vec<FieldError>,
}

/// Sanitize and check a submitted genre.
///
/// Length is measured on the trimmed name as typed, before escaping.
fn candidate(id: Option<i32>, input: &GenreInput) -> (GenreForm, Vec<FieldError>) {
    let typed: Fields = [("name".to_string(), input.name.trim().to_string())].into_iter().collect();
    let name = validation::sanitize_value(&input.name);
    let errors = validation::check(&typed, GENRE_RULES)
        .into_iter()
        .map(|e| FieldError { value: name.clone(), ..e })
        .collect();
    (GenreForm { id, name }, errors)
}

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<GenreListView> {
        let genres = self.repository.genres.find_all().await?;
        Ok(GenreListView { genre_list: linked(genres) })
    }

    /// A genre and the books filed under it
    async fn with_books(&self, id: i32) -> AppResult<GenreDetailView> {
        let genres = self.repository.genres.clone();
        let books = self.repository.books.clone();

        let mut joined = Aggregate::new()
            .query("genre", async move { genres.find_by_id(id).await })
            .query("genre_books", async move { books.find_all(BookFilter::by_genre(id)).await })
            .run()
            .await?;

        Ok(GenreDetailView {
            genre: joined.take::<Genre>("genre")?.into(),
            genre_books: linked(joined.take("genre_books")?),
        })
    }

    pub async fn detail(&self, id: &str) -> AppResult<GenreDetailView> {
        self.with_books(parse_id(id, "Genre")?).await
    }

    pub fn create_form(&self) -> GenreFormView {
        GenreFormView::default()
    }

    /// Create a genre; an existing genre of the same name is reused
    pub async fn create(&self, input: GenreInput) -> AppResult<Outcome<GenreFormView>> {
        let (form, errors) = candidate(None, &input);
        if !errors.is_empty() {
            return Ok(Outcome::Render(GenreFormView { genre: Some(form), errors }));
        }

        if let Some(existing) = self.repository.genres.find_by_name(&form.name).await? {
            tracing::debug!("Genre {:?} already exists as id={}", form.name, existing.id);
            return Ok(Outcome::Redirect(existing.url()));
        }

        let genre = self.repository.genres.save(&GenreData { name: form.name }).await?;
        tracing::info!("Created genre id={}", genre.id);
        Ok(Outcome::Redirect(genre.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<GenreDetailView> {
        self.with_books(parse_id(id, "Genre")?).await
    }

    /// Delete a genre unless books are still filed under it
    pub async fn delete(&self, input: GenreDeleteInput) -> AppResult<Outcome<GenreDetailView>> {
        let raw = validation::sanitize_value(&input.genreid);
        if raw.is_empty() {
            return Err(AppError::Validation("Genre id must not be empty".to_string()));
        }
        let id = parse_id(&raw, "Genre")?;

        let view = self.with_books(id).await?;
        if !view.genre_books.is_empty() {
            tracing::debug!("Refusing to delete genre id={}: {} books remain", id, view.genre_books.len());
            return Ok(Outcome::Render(view));
        }

        self.repository.genres.delete_by_id(id).await?;
        tracing::info!("Deleted genre id={}", id);
        Ok(Outcome::Redirect(GENRE_LIST_URL.to_string()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<GenreFormView> {
        let id = parse_id(&validation::sanitize_value(id), "Genre")?;
        let genre = self.repository.genres.find_by_id(id).await?;
        Ok(GenreFormView {
            genre: Some(GenreForm { id: Some(genre.id), name: genre.name }),
            errors: Vec::new(),
        })
    }

    pub async fn update(&self, id: &str, input: GenreInput) -> AppResult<Outcome<GenreFormView>> {
        let id = parse_id(&validation::sanitize_value(id), "Genre")?;
        let (form, errors) = candidate(Some(id), &input);
        if !errors.is_empty() {
            return Ok(Outcome::Render(GenreFormView { genre: Some(form), errors }));
        }

        let genre = self
            .repository
            .genres
            .update_by_id(id, &GenreData { name: form.name })
            .await?;
        tracing::info!("Updated genre id={}", genre.id);
        Ok(Outcome::Redirect(genre.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;

    #[tokio::test]
    async fn test_existing_genre_is_reused() {
        let mut mock = MockRepository::new();
        mock.genres
            .expect_find_by_name()
            .withf(|name| name == "Fantasy")
            .returning(|name| Ok(Some(Genre { id: 6, name: name.to_string() })));
        mock.genres.expect_save().never();

        let service = GenresService::new(mock.build());
        let outcome = service.create(GenreInput { name: " Fantasy ".into() }).await.unwrap();
        match outcome {
            Outcome::Redirect(location) => assert_eq!(location, "/catalog/genre/6"),
            Outcome::Render(_) => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_new_genre_is_saved() {
        let mut mock = MockRepository::new();
        mock.genres.expect_find_by_name().returning(|_| Ok(None));
        mock.genres
            .expect_save()
            .times(1)
            .returning(|data| Ok(Genre { id: 8, name: data.name.clone() }));

        let service = GenresService::new(mock.build());
        let outcome = service.create(GenreInput { name: "Poetry".into() }).await.unwrap();
        assert!(outcome.is_redirect());
    }

    #[tokio::test]
    async fn test_short_name_is_rejected() {
        let service = GenresService::new(MockRepository::new().build());
        let outcome = service.create(GenreInput { name: "  SF ".into() }).await.unwrap();
        match outcome {
            Outcome::Render(view) => {
                assert_eq!(view.errors.len(), 1);
                assert_eq!(view.genre.unwrap().name, "SF");
            }
            Outcome::Redirect(_) => panic!("expected form"),
        }
    }

    #[tokio::test]
    async fn test_short_name_is_measured_before_escaping() {
        let service = GenresService::new(MockRepository::new().build());
        let outcome = service.create(GenreInput { name: " A& ".into() }).await.unwrap();
        match outcome {
            Outcome::Render(view) => {
                assert_eq!(view.errors.len(), 1);
                assert_eq!(view.errors[0].value, "A&amp;");
                assert_eq!(view.genre.unwrap().name, "A&amp;");
            }
            Outcome::Redirect(_) => panic!("expected form"),
        }
    }

    #[tokio::test]
    async fn test_delete_genre_with_books_is_refused() {
        let mut mock = MockRepository::new();
        mock.genres
            .expect_find_by_id()
            .returning(|id| Ok(Genre { id, name: "Fantasy".into() }));
        mock.books.expect_find_all().withf(|f| f.genre_id == Some(2)).returning(|_| {
            Ok(vec![Book {
                id: 1,
                title: "The Name of the Wind".into(),
                author_id: 1,
                summary: "s".into(),
                isbn: "i".into(),
                genre_ids: vec![2],
            }])
        });
        mock.genres.expect_delete_by_id().never();

        let service = GenresService::new(mock.build());
        let outcome = service.delete(GenreDeleteInput { genreid: "2".into() }).await.unwrap();
        assert!(!outcome.is_redirect());
    }
}
