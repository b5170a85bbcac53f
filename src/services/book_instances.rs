//! Book instance (copy) lifecycle flows

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{aggregate::Aggregate, Outcome};
use crate::{
    error::{parse_id, AppError, AppResult},
    models::{
        book_instance::BookInstanceForm, Book, BookFilter, BookInstance, BookInstanceData,
        BookInstanceDetails, CopyStatus, Resource,
    },
    repository::Repository,
    validation::{self, FieldError, FieldRule, Fields, Rule},
    views::{linked, Linked},
};

pub const BOOK_INSTANCE_LIST_URL: &str = "/catalog/bookinstances";

const BOOK_INSTANCE_FIELDS: &[&str] = &["book", "imprint", "status", "due_back"];

const BOOK_INSTANCE_RULES: &[FieldRule] = &[
    FieldRule::new("book", Rule::NotEmpty, "Book must be specified"),
    FieldRule::new("book", Rule::Reference, "Book must be a valid reference"),
    FieldRule::new("imprint", Rule::NotEmpty, "Imprint must be specified"),
    FieldRule::new("status", Rule::OneOf(CopyStatus::NAMES), "Invalid status"),
    FieldRule::new("due_back", Rule::OptionalDate, "Invalid date"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInstanceInput {
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub imprint: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub due_back: String,
}

impl BookInstanceInput {
    fn fields(&self) -> Fields {
        let status = if self.status.trim().is_empty() {
            CopyStatus::default().to_string()
        } else {
            self.status.clone()
        };
        [
            ("book", self.book.clone()),
            ("imprint", self.imprint.clone()),
            ("status", status),
            ("due_back", self.due_back.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInstanceDeleteInput {
    #[serde(default)]
    pub bookinstanceid: String,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceListView {
    pub bookinstance_list: Vec<Linked<BookInstanceDetails>>,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceDetailView {
    pub bookinstance: Linked<BookInstanceDetails>,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceFormView {
    pub book_list: Vec<Linked<Book>>,
    pub statuses: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookinstance: Option<BookInstanceForm>,
    pub errors: Vec<FieldError>,
}

fn candidate(id: Option<i32>, input: &BookInstanceInput) -> (BookInstanceForm, Vec<FieldError>) {
    let fields = validation::sanitize(&input.fields(), BOOK_INSTANCE_FIELDS);
    let errors = validation::check(&fields, BOOK_INSTANCE_RULES);
    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let form = BookInstanceForm {
        id,
        book: field("book"),
        imprint: field("imprint"),
        status: field("status"),
        due_back: field("due_back"),
    };
    (form, errors)
}

fn book_instance_data(form: &BookInstanceForm) -> AppResult<BookInstanceData> {
    let invalid = |what: &str, value: &str| AppError::Validation(format!("Invalid {} {}", what, value));
    let book_id = form.book.parse::<i32>().map_err(|_| invalid("book reference", &form.book))?;
    let status = form.status.parse::<CopyStatus>().map_err(|_| invalid("status", &form.status))?;
    let due_back = if form.due_back.is_empty() {
        Utc::now().date_naive()
    } else {
        NaiveDate::parse_from_str(&form.due_back, "%Y-%m-%d")
            .map_err(|_| invalid("date", &form.due_back))?
    };
    Ok(BookInstanceData {
        book_id,
        imprint: form.imprint.clone(),
        status,
        due_back: Some(due_back),
    })
}

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<BookInstanceListView> {
        let instances = self.repository.book_instances.find_all_populated().await?;
        Ok(BookInstanceListView { bookinstance_list: linked(instances) })
    }

    pub async fn detail(&self, id: &str) -> AppResult<BookInstanceDetailView> {
        let id = parse_id(id, "Book copy")?;
        let instance = self.repository.book_instances.find_by_id_populated(id).await?;
        Ok(BookInstanceDetailView { bookinstance: instance.into() })
    }

    async fn form_view(
        &self,
        bookinstance: Option<BookInstanceForm>,
        errors: Vec<FieldError>,
    ) -> AppResult<BookInstanceFormView> {
        let books = self.repository.books.find_all(BookFilter::default()).await?;
        Ok(BookInstanceFormView {
            book_list: linked(books),
            statuses: CopyStatus::NAMES,
            selected_book: bookinstance.as_ref().map(|b| b.book.clone()),
            bookinstance,
            errors,
        })
    }

    pub async fn create_form(&self) -> AppResult<BookInstanceFormView> {
        self.form_view(None, Vec::new()).await
    }

    pub async fn create(&self, input: BookInstanceInput) -> AppResult<Outcome<BookInstanceFormView>> {
        let (form, errors) = candidate(None, &input);
        if !errors.is_empty() {
            tracing::debug!("Book copy form rejected with {} error(s)", errors.len());
            return Ok(Outcome::Render(self.form_view(Some(form), errors).await?));
        }

        let instance = self.repository.book_instances.save(&book_instance_data(&form)?).await?;
        tracing::info!("Created book copy id={} of book id={}", instance.id, instance.book_id);
        Ok(Outcome::Redirect(instance.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<BookInstanceDetailView> {
        self.detail(id).await
    }

    /// Copies have no dependents; deletion is never refused
    pub async fn delete(&self, input: BookInstanceDeleteInput) -> AppResult<Outcome<()>> {
        let raw = validation::sanitize_value(&input.bookinstanceid);
        if raw.is_empty() {
            return Err(AppError::Validation("Book copy id must not be empty".to_string()));
        }
        let id = parse_id(&raw, "Book copy")?;

        self.repository.book_instances.delete_by_id(id).await?;
        tracing::info!("Deleted book copy id={}", id);
        Ok(Outcome::Redirect(BOOK_INSTANCE_LIST_URL.to_string()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<BookInstanceFormView> {
        let id = parse_id(&validation::sanitize_value(id), "Book copy")?;
        let instances = self.repository.book_instances.clone();
        let books = self.repository.books.clone();

        let mut joined = Aggregate::new()
            .query("bookinstance", async move { instances.find_by_id(id).await })
            .query("books", async move { books.find_all(BookFilter::default()).await })
            .run()
            .await?;

        let instance: BookInstance = joined.take("bookinstance")?;
        let form = BookInstanceForm::from(&instance);
        Ok(BookInstanceFormView {
            book_list: linked(joined.take("books")?),
            statuses: CopyStatus::NAMES,
            selected_book: Some(form.book.clone()),
            bookinstance: Some(form),
            errors: Vec::new(),
        })
    }

    pub async fn update(
        &self,
        id: &str,
        input: BookInstanceInput,
    ) -> AppResult<Outcome<BookInstanceFormView>> {
        let id = parse_id(&validation::sanitize_value(id), "Book copy")?;
        let (form, errors) = candidate(Some(id), &input);
        if !errors.is_empty() {
            return Ok(Outcome::Render(self.form_view(Some(form), errors).await?));
        }

        let instance = self
            .repository
            .book_instances
            .update_by_id(id, &book_instance_data(&form)?)
            .await?;
        tracing::info!("Updated book copy id={}", instance.id);
        Ok(Outcome::Redirect(instance.url()))
    }
}
