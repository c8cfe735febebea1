//! Pure mapping from retrieval intents to CMS request descriptors.
//!
//! Nothing here performs I/O; the client turns a [`QueryDescriptor`] into a
//! URL under `<origin>/api/<resource>`.

use std::fmt;

pub const DEFAULT_LATEST_LIMIT: u32 = 6;
pub const DEFAULT_LISTING_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Posts,
    Categories,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Categories => "categories",
        }
    }
}

/// Relations that can be populated on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    CoverImage,
    Author,
    Categories,
    Tags,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::CoverImage => "coverImage",
            Relation::Author => "author",
            Relation::Categories => "categories",
            Relation::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: &'static str,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        write!(f, "{}:{order}", self.field)
    }
}

/// Equality predicate on a (possibly nested) field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    pub path: Vec<&'static str>,
    pub value: String,
}

impl Filter {
    pub fn eq(path: &[&'static str], value: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            value: value.into(),
        }
    }

    /// `filters[a][b][$eq]`
    pub fn key(&self) -> String {
        let mut key = String::from("filters");
        for segment in &self.path {
            key.push('[');
            key.push_str(segment);
            key.push(']');
        }
        key.push_str("[$eq]");
        key
    }
}

/// Everything the client needs to issue one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    pub resource: Resource,
    pub filters: Vec<Filter>,
    pub populate: Vec<Relation>,
    pub sort: Option<Sort>,
    pub limit: Option<u32>,
}

impl QueryDescriptor {
    fn new(resource: Resource) -> Self {
        Self {
            resource,
            filters: Vec::new(),
            populate: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    fn populate(mut self, relations: &[Relation]) -> Self {
        self.populate.extend_from_slice(relations);
        self
    }

    fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Unencoded query pairs in a stable order: filters, populate, sort, limit.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|filter| (filter.key(), filter.value.clone()))
            .collect();

        if !self.populate.is_empty() {
            let relations: Vec<&str> = self.populate.iter().map(|r| r.as_str()).collect();
            pairs.push(("populate".to_string(), relations.join(",")));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort".to_string(), sort.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("pagination[limit]".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// A named retrieval together with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RetrievalIntent {
    LatestPosts { limit: u32 },
    PostBySlug { slug: String },
    PostsByCategory { slug: String, limit: u32 },
    PostsByAuthor { author_id: u64, limit: u32 },
    PostsByTag { slug: String, limit: u32 },
    Categories,
}

impl RetrievalIntent {
    pub fn name(&self) -> &'static str {
        match self {
            RetrievalIntent::LatestPosts { .. } => "latest_posts",
            RetrievalIntent::PostBySlug { .. } => "post_by_slug",
            RetrievalIntent::PostsByCategory { .. } => "posts_by_category",
            RetrievalIntent::PostsByAuthor { .. } => "posts_by_author",
            RetrievalIntent::PostsByTag { .. } => "posts_by_tag",
            RetrievalIntent::Categories => "categories",
        }
    }

    /// Canonical `key=value&...` rendering of the parameters.
    pub fn params(&self) -> String {
        match self {
            RetrievalIntent::LatestPosts { limit } => format!("limit={limit}"),
            RetrievalIntent::PostBySlug { slug } => format!("slug={slug}"),
            RetrievalIntent::PostsByCategory { slug, limit }
            | RetrievalIntent::PostsByTag { slug, limit } => format!("slug={slug}&limit={limit}"),
            RetrievalIntent::PostsByAuthor { author_id, limit } => {
                format!("author_id={author_id}&limit={limit}")
            }
            RetrievalIntent::Categories => String::new(),
        }
    }

    /// Whether every required parameter is known. A slug page without a slug
    /// (or an author page without an id) must never hit the CMS.
    pub fn is_ready(&self) -> bool {
        match self {
            RetrievalIntent::PostBySlug { slug }
            | RetrievalIntent::PostsByCategory { slug, .. }
            | RetrievalIntent::PostsByTag { slug, .. } => !slug.trim().is_empty(),
            RetrievalIntent::PostsByAuthor { author_id, .. } => *author_id != 0,
            RetrievalIntent::LatestPosts { .. } | RetrievalIntent::Categories => true,
        }
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        use Relation::{Author, Categories, CoverImage, Tags};

        match self {
            RetrievalIntent::LatestPosts { limit } => QueryDescriptor::new(Resource::Posts)
                .populate(&[CoverImage, Author, Categories])
                .sort(Sort::desc("publishedAt"))
                .limit(*limit),
            RetrievalIntent::PostBySlug { slug } => QueryDescriptor::new(Resource::Posts)
                .filter(Filter::eq(&["slug"], slug.as_str()))
                .populate(&[Author, CoverImage, Tags, Categories]),
            RetrievalIntent::PostsByCategory { slug, limit } => {
                QueryDescriptor::new(Resource::Posts)
                    .filter(Filter::eq(&["categories", "slug"], slug.as_str()))
                    .populate(&[Author, CoverImage, Categories])
                    .limit(*limit)
            }
            RetrievalIntent::PostsByAuthor { author_id, limit } => {
                QueryDescriptor::new(Resource::Posts)
                    .filter(Filter::eq(&["author", "id"], author_id.to_string()))
                    .populate(&[CoverImage, Categories, Author])
                    .limit(*limit)
            }
            RetrievalIntent::PostsByTag { slug, limit } => QueryDescriptor::new(Resource::Posts)
                .filter(Filter::eq(&["tags", "slug"], slug.as_str()))
                .populate(&[Author, CoverImage, Categories, Tags])
                .limit(*limit),
            RetrievalIntent::Categories => {
                QueryDescriptor::new(Resource::Categories).sort(Sort::asc("name"))
            }
        }
    }
}

impl fmt::Display for RetrievalIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        if params.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}({params})", self.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(intent: &RetrievalIntent) -> Vec<(String, String)> {
        intent.descriptor().query_pairs()
    }

    fn owned(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn latest_posts_sorted_and_limited() {
        let intent = RetrievalIntent::LatestPosts { limit: 9 };
        assert_eq!(intent.descriptor().resource, Resource::Posts);
        assert_eq!(
            pairs(&intent),
            owned(&[
                ("populate", "coverImage,author,categories"),
                ("sort", "publishedAt:desc"),
                ("pagination[limit]", "9"),
            ])
        );
    }

    #[test]
    fn post_by_slug_filters_exactly() {
        let intent = RetrievalIntent::PostBySlug {
            slug: "hello-world".to_string(),
        };
        assert_eq!(
            pairs(&intent),
            owned(&[
                ("filters[slug][$eq]", "hello-world"),
                ("populate", "author,coverImage,tags,categories"),
            ])
        );
    }

    #[test]
    fn relation_filters_use_nested_paths() {
        let category = RetrievalIntent::PostsByCategory {
            slug: "rust".to_string(),
            limit: DEFAULT_LISTING_LIMIT,
        };
        assert_eq!(
            pairs(&category),
            owned(&[
                ("filters[categories][slug][$eq]", "rust"),
                ("populate", "author,coverImage,categories"),
                ("pagination[limit]", "10"),
            ])
        );

        let author = RetrievalIntent::PostsByAuthor {
            author_id: 42,
            limit: 5,
        };
        assert_eq!(
            pairs(&author),
            owned(&[
                ("filters[author][id][$eq]", "42"),
                ("populate", "coverImage,categories,author"),
                ("pagination[limit]", "5"),
            ])
        );

        let tag = RetrievalIntent::PostsByTag {
            slug: "async".to_string(),
            limit: 10,
        };
        assert_eq!(
            pairs(&tag),
            owned(&[
                ("filters[tags][slug][$eq]", "async"),
                ("populate", "author,coverImage,categories,tags"),
                ("pagination[limit]", "10"),
            ])
        );
    }

    #[test]
    fn categories_sorted_by_name() {
        let descriptor = RetrievalIntent::Categories.descriptor();
        assert_eq!(descriptor.resource, Resource::Categories);
        assert_eq!(
            descriptor.query_pairs(),
            owned(&[("sort", "name:asc")])
        );
    }

    #[test]
    fn readiness_requires_parameters() {
        assert!(RetrievalIntent::LatestPosts { limit: 6 }.is_ready());
        assert!(RetrievalIntent::Categories.is_ready());
        assert!(
            !RetrievalIntent::PostBySlug {
                slug: "  ".to_string()
            }
            .is_ready()
        );
        assert!(
            !RetrievalIntent::PostsByAuthor {
                author_id: 0,
                limit: 10
            }
            .is_ready()
        );
    }

    #[test]
    fn display_includes_params() {
        let intent = RetrievalIntent::PostsByTag {
            slug: "web".to_string(),
            limit: 10,
        };
        assert_eq!(intent.to_string(), "posts_by_tag(slug=web&limit=10)");
        assert_eq!(RetrievalIntent::Categories.to_string(), "categories");
    }
}
