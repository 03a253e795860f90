//! Bookstore entities as they travel over the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Numeric entity identifier (32-bit on the wire)
pub type EntityId = i32;

/// Kind of bookstore entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Book,
    Author,
}

impl EntityKind {
    /// Lowercase singular name, used in logs and context keys
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Book => "book",
            EntityKind::Author => "author",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(EntityKind::Book),
            "author" | "authors" => Ok(EntityKind::Author),
            other => Err(Error::UnknownEntityKind(other.to_string())),
        }
    }
}

/// An entity the bookstore API stores under a numeric id.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// Which kind this is
    const KIND: EntityKind;

    /// Collection path relative to the API base URL
    const RESOURCE: &'static str;

    /// Identifier of this entity
    fn id(&self) -> EntityId;
}

/// A book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub page_count: i32,
    pub excerpt: String,
    pub publish_date: String,
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;
    const RESOURCE: &'static str = "/api/v1/Books";

    fn id(&self) -> EntityId {
        self.id
    }
}

/// An author. `id_book` points at a book and is never checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: EntityId,
    pub id_book: EntityId,
    pub first_name: String,
    pub last_name: String,
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;
    const RESOURCE: &'static str = "/api/v1/Authors";

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_book_wire_format() {
        let book = Book {
            id: 7,
            title: "Dune".to_string(),
            description: "Spice".to_string(),
            page_count: 412,
            excerpt: "A beginning".to_string(),
            publish_date: "1965-08-01T00:00:00.000Z".to_string(),
        };
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "Dune",
                "description": "Spice",
                "pageCount": 412,
                "excerpt": "A beginning",
                "publishDate": "1965-08-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_author_parses_camel_case() {
        let author: Author = serde_json::from_value(json!({
            "id": 3,
            "idBook": 11,
            "firstName": "Ursula",
            "lastName": "Le Guin"
        }))
        .unwrap();
        assert_eq!(author.id(), 3);
        assert_eq!(author.id_book, 11);
        assert_eq!(author.last_name, "Le Guin");
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("Book".parse::<EntityKind>().unwrap(), EntityKind::Book);
        assert_eq!(" authors ".parse::<EntityKind>().unwrap(), EntityKind::Author);
        assert!("publisher".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_resources() {
        assert_eq!(Book::RESOURCE, "/api/v1/Books");
        assert_eq!(Author::RESOURCE, "/api/v1/Authors");
        assert_eq!(Author::KIND.to_string(), "author");
    }
}
