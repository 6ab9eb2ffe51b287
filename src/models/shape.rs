use serde::Deserialize;
use serde_json::{json, Value};

use super::{BookRecord, MediaType, MovieRecord, Recommendation};
use crate::error::{AppError, AppResult};

/// Output schema requested from the model.
///
/// The wrapper key differs by shape (`book`, `books`, `movie`, `movies`);
/// [`OutputShape::normalize`] folds all four into one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    SingleBook,
    MultipleBooks,
    SingleMovie,
    MultipleMovies,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SingleBook {
    book: BookRecord,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MultipleBooks {
    books: Vec<BookRecord>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SingleMovie {
    movie: MovieRecord,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MultipleMovies {
    movies: Vec<MovieRecord>,
}

impl OutputShape {
    pub fn select(media_type: MediaType, count: usize) -> Self {
        match (media_type, count == 1) {
            (MediaType::Book, true) => OutputShape::SingleBook,
            (MediaType::Book, false) => OutputShape::MultipleBooks,
            (MediaType::Movie, true) => OutputShape::SingleMovie,
            (MediaType::Movie, false) => OutputShape::MultipleMovies,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            OutputShape::SingleBook | OutputShape::MultipleBooks => MediaType::Book,
            OutputShape::SingleMovie | OutputShape::MultipleMovies => MediaType::Movie,
        }
    }

    /// Schema name sent alongside the schema
    pub fn name(&self) -> &'static str {
        match self {
            OutputShape::SingleBook => "single_book_recommendation",
            OutputShape::MultipleBooks => "multiple_books_recommendation",
            OutputShape::SingleMovie => "single_movie_recommendation",
            OutputShape::MultipleMovies => "multiple_movies_recommendation",
        }
    }

    fn wrapper_key(&self) -> &'static str {
        match self {
            OutputShape::SingleBook => "book",
            OutputShape::MultipleBooks => "books",
            OutputShape::SingleMovie => "movie",
            OutputShape::MultipleMovies => "movies",
        }
    }

    fn is_list(&self) -> bool {
        matches!(self, OutputShape::MultipleBooks | OutputShape::MultipleMovies)
    }

    /// Strict JSON Schema: all properties required, nothing extra allowed
    pub fn json_schema(&self) -> Value {
        let fields: [&str; 5] = match self.media_type() {
            MediaType::Book => ["name", "author", "genre", "summary", "link"],
            MediaType::Movie => ["title", "director", "genre", "summary", "link"],
        };

        let properties: serde_json::Map<String, Value> = fields
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "string" })))
            .collect();

        let record = json!({
            "type": "object",
            "properties": properties,
            "required": fields,
            "additionalProperties": false,
        });

        let inner = if self.is_list() {
            json!({ "type": "array", "items": record })
        } else {
            record
        };

        let key = self.wrapper_key();
        json!({
            "type": "object",
            "properties": { key: inner },
            "required": [key],
            "additionalProperties": false,
        })
    }

    /// Converts model output of this shape into tagged recommendations
    pub fn normalize(&self, output: Value) -> AppResult<Vec<Recommendation>> {
        let mismatch = |e: serde_json::Error| {
            AppError::Upstream(format!(
                "model output does not match {} schema: {}",
                self.name(),
                e
            ))
        };

        let recommendations = match self {
            OutputShape::SingleBook => {
                let single: SingleBook = serde_json::from_value(output).map_err(mismatch)?;
                vec![Recommendation::Book(single.book)]
            }
            OutputShape::MultipleBooks => {
                let multiple: MultipleBooks = serde_json::from_value(output).map_err(mismatch)?;
                multiple.books.into_iter().map(Recommendation::Book).collect()
            }
            OutputShape::SingleMovie => {
                let single: SingleMovie = serde_json::from_value(output).map_err(mismatch)?;
                vec![Recommendation::Movie(single.movie)]
            }
            OutputShape::MultipleMovies => {
                let multiple: MultipleMovies = serde_json::from_value(output).map_err(mismatch)?;
                multiple.movies.into_iter().map(Recommendation::Movie).collect()
            }
        };

        Ok(recommendations)
    }
}
