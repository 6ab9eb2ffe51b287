use crate::models::MediaType;

/// Builds the instruction sent to the model for a recommendation request.
///
/// Pure formatting: the same inputs always produce the same prompt.
pub fn build_prompt(favorites: &[String], count: usize, media_type: MediaType) -> String {
    let plural_recommendation = if count > 1 { "s" } else { "" };
    let plural_favorite = if favorites.len() > 1 { "s" } else { "" };

    format!(
        "Generate {count} {media} recommendation{plural_recommendation} based on the following favorite {media}{plural_favorite}: {favorites}.

For each recommendation, include:
- {fields}
- link: A valid URL to the {media} on {catalog}

Please provide detailed and accurate information for each recommendation.",
        media = media_type.as_str(),
        favorites = favorites.join(", "),
        fields = media_type.descriptive_fields(),
        catalog = media_type.catalog(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorites(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_book_prompt() {
        let prompt = build_prompt(&favorites(&["1984", "Brave New World"]), 2, MediaType::Book);

        assert_eq!(
            prompt,
            "Generate 2 book recommendations based on the following favorite books: 1984, Brave New World.

For each recommendation, include:
- name, author, genre, summary
- link: A valid URL to the book on Goodreads or Amazon

Please provide detailed and accurate information for each recommendation."
        );
    }

    #[test]
    fn test_movie_prompt_singular() {
        let prompt = build_prompt(&favorites(&["Heat"]), 1, MediaType::Movie);

        assert!(prompt.starts_with(
            "Generate 1 movie recommendation based on the following favorite movie: Heat.\n"
        ));
        assert!(prompt.contains("- title, director, genre, summary\n"));
        assert!(prompt.contains("on IMDb or TMDB"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let items = favorites(&["Dune", "Hyperion"]);
        assert_eq!(
            build_prompt(&items, 5, MediaType::Book),
            build_prompt(&items, 5, MediaType::Book)
        );
    }
}
