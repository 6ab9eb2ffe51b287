use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::MediaType;
use crate::error::{AppError, AppResult};

pub const MIN_COUNT: usize = 1;
pub const MAX_COUNT: usize = 10;

/// Raw request body for the recommendations endpoint.
///
/// `count` is kept loose so that numeric strings from HTML forms are
/// accepted; [`RecommendationRequest::validate`] does the coercion.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub favorites: Vec<String>,
    #[serde(default, deserialize_with = "present_value")]
    pub count: Option<Value>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent field is `None`
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A request that passed validation and is safe to send upstream
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub favorites: Vec<String>,
    pub count: usize,
    pub media_type: MediaType,
}

impl RecommendationRequest {
    /// Checks favorites and count, collecting every issue into one message
    pub fn validate(self) -> AppResult<RecommendationQuery> {
        let mut issues = Vec::new();

        let favorites: Vec<String> = self
            .favorites
            .iter()
            .map(|favorite| favorite.trim().to_string())
            .collect();

        if favorites.is_empty() {
            issues.push("favorites: at least one favorite is required".to_string());
        } else if let Some(index) = favorites.iter().position(String::is_empty) {
            issues.push(format!("favorites[{}]: must not be blank", index));
        }

        let count = match self.count.as_ref() {
            None => {
                issues.push("count: is required".to_string());
                None
            }
            Some(raw) => match coerce_count(raw) {
                Ok(count) => Some(count),
                Err(issue) => {
                    issues.push(format!("count: {}", issue));
                    None
                }
            },
        };

        match count {
            Some(count) if issues.is_empty() => Ok(RecommendationQuery {
                favorites,
                count,
                media_type: self.media_type,
            }),
            _ => Err(AppError::InvalidInput(issues.join("; "))),
        }
    }
}

/// Converts a loosely typed count into an integer within bounds
fn coerce_count(raw: &Value) -> Result<usize, String> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };

    let number = match number {
        Some(n) if n.is_finite() => n,
        _ => return Err(format!("expected a number, received {}", raw)),
    };

    if number.fract() != 0.0 {
        return Err(format!("expected an integer, received {}", number));
    }
    if number < MIN_COUNT as f64 || number > MAX_COUNT as f64 {
        return Err(format!(
            "must be between {} and {}, received {}",
            MIN_COUNT, MAX_COUNT, number
        ));
    }

    Ok(number as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> RecommendationRequest {
        serde_json::from_value(body).unwrap()
    }

    fn details(result: AppResult<RecommendationQuery>) -> String {
        match result {
            Err(AppError::InvalidInput(details)) => details,
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let query = parse(json!({
            "favorites": [" 1984 ", "Brave New World"],
            "count": 2,
            "type": "book"
        }))
        .validate()
        .unwrap();

        assert_eq!(query.favorites, vec!["1984", "Brave New World"]);
        assert_eq!(query.count, 2);
        assert_eq!(query.media_type, MediaType::Book);
    }

    #[test]
    fn test_count_bounds_are_inclusive() {
        for count in [1, 10] {
            let query = parse(json!({ "favorites": ["Heat"], "count": count, "type": "movie" }))
                .validate()
                .unwrap();
            assert_eq!(query.count, count);
        }
    }

    #[test]
    fn test_count_out_of_range_is_rejected() {
        for count in [0, 11, -3] {
            let result =
                parse(json!({ "favorites": ["Heat"], "count": count, "type": "movie" })).validate();
            assert!(details(result).contains("between 1 and 10"));
        }
    }

    #[test]
    fn test_numeric_string_count_is_coerced() {
        let query = parse(json!({ "favorites": ["Heat"], "count": " 4 ", "type": "movie" }))
            .validate()
            .unwrap();
        assert_eq!(query.count, 4);
    }

    #[test]
    fn test_non_numeric_count_is_rejected() {
        let result = parse(json!({ "favorites": ["Heat"], "count": "abc", "type": "movie" })).validate();
        assert!(details(result).starts_with("count: expected a number"));
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let result = parse(json!({ "favorites": ["Heat"], "count": 2.5, "type": "movie" })).validate();
        assert!(details(result).contains("expected an integer"));
    }

    #[test]
    fn test_missing_count_is_rejected() {
        let result = parse(json!({ "favorites": ["Heat"], "type": "movie" })).validate();
        assert_eq!(details(result), "count: is required");
    }

    #[test]
    fn test_null_count_coerces_to_zero() {
        let result = parse(json!({ "favorites": ["Heat"], "count": null, "type": "movie" })).validate();
        assert_eq!(details(result), "count: must be between 1 and 10, received 0");
    }

    #[test]
    fn test_empty_and_blank_favorites_are_rejected() {
        let empty = parse(json!({ "favorites": [], "count": 1, "type": "book" })).validate();
        assert!(details(empty).contains("at least one favorite"));

        let blank = parse(json!({ "favorites": ["Dune", "  "], "count": 1, "type": "book" })).validate();
        assert!(details(blank).contains("favorites[1]"));
    }

    #[test]
    fn test_all_issues_are_reported_together() {
        let result = parse(json!({ "favorites": [], "count": 0, "type": "book" })).validate();
        let details = details(result);
        assert!(details.contains("favorites"));
        assert!(details.contains("count"));
    }

    #[test]
    fn test_unknown_media_type_fails_to_deserialize() {
        let result = serde_json::from_value::<RecommendationRequest>(json!({
            "favorites": ["Heat"],
            "count": 1,
            "type": "podcast"
        }));
        assert!(result.is_err());
    }
}
