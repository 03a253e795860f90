//! Fluent builders for complete Book and Author payloads
//!
//! A builder only records what the caller set. Defaults are resolved at the
//! terminal call, so every `build`/`build_random` may mint a new id or a
//! new random value. Keep the returned entity if you need it twice.

use bookstore_common::{unique_id, Author, Book, EntityId};
use chrono::{SecondsFormat, Utc};
use rand::Rng;

use crate::random;

/// Current instant in the API's date format, e.g. `2025-09-20T08:00:07.760Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookBuilder {
    id: Option<EntityId>,
    title: Option<String>,
    description: Option<String>,
    page_count: Option<i32>,
    excerpt: Option<String>,
    publish_date: Option<String>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every field from an existing book.
    pub fn from_book(book: &Book) -> Self {
        Self::new()
            .with_id(book.id)
            .with_title(book.title.clone())
            .with_description(book.description.clone())
            .with_page_count(book.page_count)
            .with_excerpt(book.excerpt.clone())
            .with_publish_date(book.publish_date.clone())
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_page_count(mut self, page_count: i32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_publish_date(mut self, publish_date: impl Into<String>) -> Self {
        self.publish_date = Some(publish_date.into());
        self
    }

    /// Fill unset fields with fixed defaults.
    pub fn build(&self) -> Book {
        Book {
            id: self.id.unwrap_or_else(unique_id),
            title: self.title.clone().unwrap_or_else(|| "Default Title".to_string()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "Default description".to_string()),
            page_count: self.page_count.unwrap_or(100),
            excerpt: self.excerpt.clone().unwrap_or_else(|| "Default excerpt".to_string()),
            publish_date: self.publish_date.clone().unwrap_or_else(now_timestamp),
        }
    }

    /// Fill unset fields with random realistic values.
    pub fn build_random(&self) -> Book {
        self.build_random_with(&mut rand::thread_rng())
    }

    pub fn build_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Book {
        Book {
            id: self.id.unwrap_or_else(unique_id),
            title: self.title.clone().unwrap_or_else(|| random::random_title(rng)),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| random::random_sentence(rng)),
            page_count: self.page_count.unwrap_or_else(|| random::random_page_count(rng)),
            excerpt: self.excerpt.clone().unwrap_or_else(|| random::random_paragraph(rng)),
            publish_date: self.publish_date.clone().unwrap_or_else(now_timestamp),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorBuilder {
    id: Option<EntityId>,
    id_book: Option<EntityId>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl AuthorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every field from an existing author.
    pub fn from_author(author: &Author) -> Self {
        Self::new()
            .with_id(author.id)
            .with_id_book(author.id_book)
            .with_first_name(author.first_name.clone())
            .with_last_name(author.last_name.clone())
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_id_book(mut self, id_book: EntityId) -> Self {
        self.id_book = Some(id_book);
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Id and book reference, with the reference falling back to the id.
    fn resolve_ids(&self) -> (EntityId, EntityId) {
        let id = self.id.unwrap_or_else(unique_id);
        (id, self.id_book.unwrap_or(id))
    }

    /// Fill unset fields with fixed defaults.
    pub fn build(&self) -> Author {
        let (id, id_book) = self.resolve_ids();
        Author {
            id,
            id_book,
            first_name: self.first_name.clone().unwrap_or_else(|| "Default".to_string()),
            last_name: self.last_name.clone().unwrap_or_else(|| "Author".to_string()),
        }
    }

    /// Fill unset fields with random realistic values.
    pub fn build_random(&self) -> Author {
        self.build_random_with(&mut rand::thread_rng())
    }

    pub fn build_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Author {
        let (id, id_book) = self.resolve_ids();
        Author {
            id,
            id_book,
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| random::random_first_name(rng)),
            last_name: self
                .last_name
                .clone()
                .unwrap_or_else(|| random::random_last_name(rng)),
        }
    }
}
