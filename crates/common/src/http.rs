//! HTTP status vocabulary used by scenario assertions.
//!
//! Only the codes the bookstore scenarios talk about are named here. Any
//! other code observed on the wire is still reported, it just renders as
//! `UNKNOWN` instead of a symbolic name.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Symbolic name used for codes that have no [`HttpCode`] variant.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Named HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpCode {
    // 2xx
    Ok,
    Created,
    Accepted,
    NoContent,

    // 4xx
    BadRequest,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
}

impl HttpCode {
    /// Every named code, in declaration order.
    pub const ALL: [HttpCode; 9] = [
        HttpCode::Ok,
        HttpCode::Created,
        HttpCode::Accepted,
        HttpCode::NoContent,
        HttpCode::BadRequest,
        HttpCode::Forbidden,
        HttpCode::NotFound,
        HttpCode::Conflict,
        HttpCode::UnprocessableEntity,
    ];

    /// Numeric status code
    pub const fn code(self) -> u16 {
        match self {
            HttpCode::Ok => 200,
            HttpCode::Created => 201,
            HttpCode::Accepted => 202,
            HttpCode::NoContent => 204,
            HttpCode::BadRequest => 400,
            HttpCode::Forbidden => 403,
            HttpCode::NotFound => 404,
            HttpCode::Conflict => 409,
            HttpCode::UnprocessableEntity => 422,
        }
    }

    /// Symbolic name, e.g. `NOT_FOUND`
    pub const fn name(self) -> &'static str {
        match self {
            HttpCode::Ok => "OK",
            HttpCode::Created => "CREATED",
            HttpCode::Accepted => "ACCEPTED",
            HttpCode::NoContent => "NO_CONTENT",
            HttpCode::BadRequest => "BAD_REQUEST",
            HttpCode::Forbidden => "FORBIDDEN",
            HttpCode::NotFound => "NOT_FOUND",
            HttpCode::Conflict => "CONFLICT",
            HttpCode::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
        }
    }

    /// Look up the named code for a numeric status, if there is one.
    pub fn resolve(code: u16) -> Option<HttpCode> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Symbolic name for any numeric status, falling back to `UNKNOWN`.
    pub fn name_of(code: u16) -> &'static str {
        Self::resolve(code).map(HttpCode::name).unwrap_or(UNKNOWN_NAME)
    }

    /// `true` for 2xx codes
    pub const fn is_success(self) -> bool {
        matches!(self.code(), 200..=299)
    }
}

/// Renders as `NAME (code)`, the form used in assertion messages.
impl std::fmt::Display for HttpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl FromStr for HttpCode {
    type Err = Error;

    /// Accepts the symbolic name (any case) or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u16>() {
            return HttpCode::resolve(code).ok_or_else(|| Error::UnknownStatusName(s.to_string()));
        }
        let upper = trimmed.to_ascii_uppercase().replace([' ', '-'], "_");
        HttpCode::ALL
            .into_iter()
            .find(|c| c.name() == upper)
            .ok_or_else(|| Error::UnknownStatusName(s.to_string()))
    }
}

impl From<HttpCode> for u16 {
    fn from(code: HttpCode) -> Self {
        code.code()
    }
}
