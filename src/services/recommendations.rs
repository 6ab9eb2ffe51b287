use std::time::Instant;

use crate::{
    error::AppResult,
    models::{OutputShape, Recommendation, RecommendationQuery},
    services::{prompt::build_prompt, providers::CompletionProvider},
};

/// Generates recommendations for a validated query
///
/// Builds the prompt, picks the output shape from media type and count,
/// makes exactly one provider call and folds the result into a uniform list.
/// No retries: any provider failure is returned as-is.
pub async fn get_recommendations(
    provider: &dyn CompletionProvider,
    query: &RecommendationQuery,
) -> AppResult<Vec<Recommendation>> {
    let start = Instant::now();
    let prompt = build_prompt(&query.favorites, query.count, query.media_type);
    let shape = OutputShape::select(query.media_type, query.count);

    tracing::info!(
        provider = provider.name(),
        media_type = %query.media_type,
        count = query.count,
        favorites = query.favorites.len(),
        schema = shape.name(),
        "Requesting recommendations"
    );

    let output = provider.generate_object(&prompt, shape).await?;
    let mut recommendations = shape.normalize(output)?;

    if recommendations.len() > query.count {
        tracing::warn!(
            requested = query.count,
            received = recommendations.len(),
            "Model returned extra recommendations, truncating"
        );
        recommendations.truncate(query.count);
    } else if recommendations.len() < query.count {
        tracing::warn!(
            requested = query.count,
            received = recommendations.len(),
            "Model returned fewer recommendations than requested"
        );
    }

    tracing::info!(
        returned = recommendations.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Recommendations generated"
    );

    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::MediaType,
        services::providers::MockCompletionProvider,
    };
    use serde_json::{json, Value};

    fn query(favorites: &[&str], count: usize, media_type: MediaType) -> RecommendationQuery {
        RecommendationQuery {
            favorites: favorites.iter().map(|s| s.to_string()).collect(),
            count,
            media_type,
        }
    }

    fn book(name: &str) -> Value {
        json!({
            "name": name,
            "author": "Author",
            "genre": "Fiction",
            "summary": "Summary",
            "link": "https://www.goodreads.com/"
        })
    }

    fn movie(title: &str) -> Value {
        json!({
            "title": title,
            "director": "Director",
            "genre": "Drama",
            "summary": "Summary",
            "link": "https://www.themoviedb.org/"
        })
    }

    fn mock_returning(expected_shape: OutputShape, output: Value) -> MockCompletionProvider {
        let mut provider = MockCompletionProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate_object()
            .withf(move |_, shape| *shape == expected_shape)
            .times(1)
            .returning(move |_, _| Ok(output.clone()));
        provider
    }

    #[tokio::test]
    async fn test_multiple_books_are_tagged_as_books() {
        let provider = mock_returning(
            OutputShape::MultipleBooks,
            json!({ "books": [book("Fahrenheit 451"), book("We")] }),
        );

        let recs = get_recommendations(&provider, &query(&["1984", "Brave New World"], 2, MediaType::Book))
            .await
            .unwrap();

        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.media_type() == MediaType::Book));
    }

    #[tokio::test]
    async fn test_single_movie_is_wrapped_in_list() {
        let provider = mock_returning(OutputShape::SingleMovie, json!({ "movie": movie("Heat") }));

        let recs = get_recommendations(&provider, &query(&["Collateral"], 1, MediaType::Movie))
            .await
            .unwrap();

        assert_eq!(recs.len(), 1);
        assert!(matches!(&recs[0], Recommendation::Movie(m) if m.title == "Heat"));
    }

    #[tokio::test]
    async fn test_prompt_carries_favorites() {
        let mut provider = MockCompletionProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate_object()
            .withf(|prompt, _| prompt.contains("favorite movies: Alien, Aliens."))
            .times(1)
            .returning(|_, _| Ok(json!({ "movies": [movie("The Thing"), movie("Predator")] })));

        let recs = get_recommendations(&provider, &query(&["Alien", "Aliens"], 2, MediaType::Movie))
            .await
            .unwrap();

        assert_eq!(recs.len(), 2);
    }

    #[tokio::test]
    async fn test_extra_recommendations_are_truncated() {
        let provider = mock_returning(
            OutputShape::MultipleMovies,
            json!({ "movies": [movie("A"), movie("B"), movie("C")] }),
        );

        let recs = get_recommendations(&provider, &query(&["Heat"], 2, MediaType::Movie))
            .await
            .unwrap();

        assert_eq!(recs.len(), 2);
        assert!(matches!(&recs[1], Recommendation::Movie(m) if m.title == "B"));
    }

    #[tokio::test]
    async fn test_fewer_recommendations_are_returned_as_is() {
        let provider = mock_returning(OutputShape::MultipleBooks, json!({ "books": [book("A")] }));

        let recs = get_recommendations(&provider, &query(&["Dune"], 3, MediaType::Book))
            .await
            .unwrap();

        assert_eq!(recs.len(), 1);
        assert!(matches!(&recs[0], Recommendation::Book(b) if b.name == "A"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried() {
        let mut provider = MockCompletionProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate_object()
            .times(1)
            .returning(|_, _| Err(AppError::Upstream("timeout".to_string())));

        let result = get_recommendations(&provider, &query(&["Dune"], 3, MediaType::Book)).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_mismatched_output_is_upstream_error() {
        let provider = mock_returning(OutputShape::MultipleBooks, json!({ "movies": [movie("A")] }));

        let result = get_recommendations(&provider, &query(&["Dune"], 3, MediaType::Book)).await;

        tokio_test::assert_err!(result);
    }
}
