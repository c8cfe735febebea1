use crate::domain::entities::Post;

/// Case-insensitive substring match on the title or the raw HTML content.
///
/// The query is lowercased as given; surrounding whitespace is significant.
pub fn matches(post: &Post, query: &str) -> bool {
    contains(post, &query.to_lowercase())
}

/// Posts of `corpus` matching `query`, in corpus order.
pub fn filter_posts(corpus: &[Post], query: &str) -> Vec<Post> {
    let needle = query.to_lowercase();
    corpus
        .iter()
        .filter(|post| contains(post, &needle))
        .cloned()
        .collect()
}

fn contains(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle) || post.content.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::entities::Related;

    fn post(id: u64, title: &str, content: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            slug: format!("post-{id}"),
            content: content.to_string(),
            excerpt: None,
            published_at: datetime!(2024-01-01 0:00 UTC),
            cover_image: Related::Absent,
            author: Related::Absent,
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn title_match_ignores_case() {
        assert!(matches(&post(1, "Intro to Rust", ""), "RUST"));
        assert!(!matches(&post(2, "Go basics", "goroutines"), "rust"));
    }

    #[test]
    fn content_markup_is_searched() {
        let post = post(1, "Styling", "<p class=\"lead\">Hello</p>");
        assert!(matches(&post, "class=\"lead\""));
        assert!(matches(&post, "<p"));
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let post = post(1, "Rustacean", "");
        assert!(matches(&post, "rust"));
        assert!(!matches(&post, " rust"));
    }

    #[test]
    fn filtering_keeps_corpus_order() {
        let corpus = vec![
            post(3, "Async Rust", ""),
            post(2, "Go basics", ""),
            post(1, "Rust traits", ""),
        ];
        let ids: Vec<u64> = filter_posts(&corpus, "rust").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(filter_posts(&corpus, "haskell").is_empty());
    }
}
