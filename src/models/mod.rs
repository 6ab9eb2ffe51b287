use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod request;
pub mod shape;

pub use request::{RecommendationQuery, RecommendationRequest, MAX_COUNT, MIN_COUNT};
pub use shape::OutputShape;

/// Kind of media the user wants recommendations for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Book,
    Movie,
}

impl MediaType {
    /// Lowercase noun used in prompts and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Book => "book",
            MediaType::Movie => "movie",
        }
    }

    /// Record fields the model must fill in, besides the link
    pub fn descriptive_fields(&self) -> &'static str {
        match self {
            MediaType::Book => "name, author, genre, summary",
            MediaType::Movie => "title, director, genre, summary",
        }
    }

    /// External catalogs the model should link to
    pub fn catalog(&self) -> &'static str {
        match self {
            MediaType::Book => "Goodreads or Amazon",
            MediaType::Movie => "IMDb or TMDB",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recommended book as produced by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    pub name: String,
    pub author: String,
    pub genre: String,
    pub summary: String,
    pub link: String,
}

/// A recommended movie as produced by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub director: String,
    pub genre: String,
    pub summary: String,
    pub link: String,
}

/// One recommendation, serialized as `{"book": {...}}` or `{"movie": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Book(BookRecord),
    Movie(MovieRecord),
}

impl Recommendation {
    pub fn media_type(&self) -> MediaType {
        match self {
            Recommendation::Book(_) => MediaType::Book,
            Recommendation::Movie(_) => MediaType::Movie,
        }
    }
}

/// Response body for the recommendations endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}
