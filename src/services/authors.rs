//! Author lifecycle flows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{aggregate::Aggregate, Outcome};
use crate::{
    error::{parse_id, AppError, AppResult},
    models::{author::AuthorForm, Author, AuthorData, Book, BookFilter, Resource},
    repository::Repository,
    validation::{self, FieldError, FieldRule, Fields, Rule},
    views::{linked, Linked},
};

pub const AUTHOR_LIST_URL: &str = "/catalog/authors";

const AUTHOR_FIELDS: &[&str] = &["first_name", "family_name", "date_of_birth", "date_of_death"];

const AUTHOR_RULES: &[FieldRule] = &[
    FieldRule::new("first_name", Rule::NotEmpty, "First name must be specified."),
    FieldRule::new("family_name", Rule::NotEmpty, "Family name must be specified."),
    FieldRule::new("date_of_birth", Rule::OptionalDate, "Invalid date of birth"),
    FieldRule::new("date_of_death", Rule::OptionalDate, "Invalid date of death"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub date_of_death: String,
}

impl AuthorInput {
    fn fields(&self) -> Fields {
        [
            ("first_name", &self.first_name),
            ("family_name", &self.family_name),
            ("date_of_birth", &self.date_of_birth),
            ("date_of_death", &self.date_of_death),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorDeleteInput {
    #[serde(default)]
    pub authorid: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorListView {
    pub author_list: Vec<Linked<Author>>,
}

#[derive(Debug, Serialize)]
pub struct AuthorDetailView {
    pub author: Linked<Author>,
    pub name: String,
    pub lifespan: String,
    pub author_books: Vec<Linked<Book>>,
}

#[derive(Debug, Default, Serialize)]
pub struct AuthorFormView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorForm>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct AuthorDeleteView {
    pub author: Linked<Author>,
    pub author_books: Vec<Linked<Book>>,
}

fn candidate(id: Option<i32>, input: &AuthorInput) -> (AuthorForm, Vec<FieldError>) {
    let fields = validation::sanitize(&input.fields(), AUTHOR_FIELDS);
    let errors = validation::check(&fields, AUTHOR_RULES);
    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let form = AuthorForm {
        id,
        first_name: field("first_name"),
        family_name: field("family_name"),
        date_of_birth: field("date_of_birth"),
        date_of_death: field("date_of_death"),
    };
    (form, errors)
}

fn optional_date(value: &str) -> AppResult<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::Validation(format!("Invalid date {}", value)))
}

fn author_data(form: &AuthorForm) -> AppResult<AuthorData> {
    Ok(AuthorData {
        first_name: form.first_name.clone(),
        family_name: form.family_name.clone(),
        date_of_birth: optional_date(&form.date_of_birth)?,
        date_of_death: optional_date(&form.date_of_death)?,
    })
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<AuthorListView> {
        let authors = self.repository.authors.find_all().await?;
        Ok(AuthorListView { author_list: linked(authors) })
    }

    /// An author and the books that reference it
    async fn with_books(&self, id: i32) -> AppResult<(Author, Vec<Book>)> {
        let authors = self.repository.authors.clone();
        let books = self.repository.books.clone();

        let mut joined = Aggregate::new()
            .query("author", async move { authors.find_by_id(id).await })
            .query("author_books", async move { books.find_all(BookFilter::by_author(id)).await })
            .run()
            .await?;

        Ok((joined.take("author")?, joined.take("author_books")?))
    }

    pub async fn detail(&self, id: &str) -> AppResult<AuthorDetailView> {
        let (author, books) = self.with_books(parse_id(id, "Author")?).await?;
        Ok(AuthorDetailView {
            name: author.name(),
            lifespan: author.lifespan(),
            author: author.into(),
            author_books: linked(books),
        })
    }

    pub fn create_form(&self) -> AuthorFormView {
        AuthorFormView::default()
    }

    pub async fn create(&self, input: AuthorInput) -> AppResult<Outcome<AuthorFormView>> {
        let (form, errors) = candidate(None, &input);
        if !errors.is_empty() {
            tracing::debug!("Author form rejected with {} error(s)", errors.len());
            return Ok(Outcome::Render(AuthorFormView { author: Some(form), errors }));
        }

        let author = self.repository.authors.save(&author_data(&form)?).await?;
        tracing::info!("Created author id={}", author.id);
        Ok(Outcome::Redirect(author.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<AuthorDeleteView> {
        let (author, books) = self.with_books(parse_id(id, "Author")?).await?;
        Ok(AuthorDeleteView { author: author.into(), author_books: linked(books) })
    }

    /// Delete an author unless books still reference it
    pub async fn delete(&self, input: AuthorDeleteInput) -> AppResult<Outcome<AuthorDeleteView>> {
        let raw = validation::sanitize_value(&input.authorid);
        if raw.is_empty() {
            return Err(AppError::Validation("Author id must not be empty".to_string()));
        }
        let id = parse_id(&raw, "Author")?;

        let (author, books) = self.with_books(id).await?;
        if !books.is_empty() {
            tracing::debug!("Refusing to delete author id={}: {} books remain", id, books.len());
            return Ok(Outcome::Render(AuthorDeleteView {
                author: author.into(),
                author_books: linked(books),
            }));
        }

        self.repository.authors.delete_by_id(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(Outcome::Redirect(AUTHOR_LIST_URL.to_string()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<AuthorFormView> {
        let id = parse_id(&validation::sanitize_value(id), "Author")?;
        let author = self.repository.authors.find_by_id(id).await?;
        Ok(AuthorFormView { author: Some(AuthorForm::from(&author)), errors: Vec::new() })
    }

    pub async fn update(&self, id: &str, input: AuthorInput) -> AppResult<Outcome<AuthorFormView>> {
        let id = parse_id(&validation::sanitize_value(id), "Author")?;
        let (form, errors) = candidate(Some(id), &input);
        if !errors.is_empty() {
            return Ok(Outcome::Render(AuthorFormView { author: Some(form), errors }));
        }

        let author = self.repository.authors.update_by_id(id, &author_data(&form)?).await?;
        tracing::info!("Updated author id={}", author.id);
        Ok(Outcome::Redirect(author.url()))
    }
}
