//! GROQ queries issued against the content store.

/// Startups with a slug, newest first, in the card summary projection.
///
/// `$search` is `null` for the unfiltered listing; otherwise it is matched
/// against the title, the category and the author's name.
pub const STARTUPS_QUERY: &str = r#"*[_type == "startup" && defined(slug.current) && (!defined($search) || title match $search || category match $search || author->name match $search)] | order(_createdAt desc) {
  _id,
  title,
  slug,
  _createdAt,
  author -> {
    _id, name, image, bio
  },
  views,
  likes,
  description,
  category,
  image,
}"#;
