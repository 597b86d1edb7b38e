//! HTML rendering for the listing page.

use askama::Template;
use chrono::DateTime;

use crate::cms::StartupRecord;
use crate::listing::{Outcome, RenderModel, EMPTY_MESSAGE};
use crate::session::Session;

#[derive(Template)]
#[template(path = "page.html")]
struct ListingPage<'a> {
    query: &'a str,
    greeting: &'a str,
    /// Replaces the card grid when non-empty
    message: &'a str,
    cards: Vec<CardView<'a>>,
}

/// Display-ready fields for one startup card. Missing data renders empty.
struct CardView<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    category_query: String,
    image: &'a str,
    views: u64,
    date: String,
    author_id: &'a str,
    author_name: &'a str,
    author_image: &'a str,
}

impl<'a> CardView<'a> {
    fn from_record(record: &'a StartupRecord) -> Self {
        let author = record.author.as_ref();
        let category = record.category.as_deref().unwrap_or_default();

        Self {
            id: &record.id,
            title: record.title.as_deref().unwrap_or_default(),
            description: record.description.as_deref().unwrap_or_default(),
            category,
            category_query: url::form_urlencoded::byte_serialize(category.as_bytes()).collect(),
            image: record.image.as_deref().unwrap_or_default(),
            views: record.views.unwrap_or(0),
            date: record
                .created_at
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
            author_id: author.map(|a| a.id.as_str()).unwrap_or_default(),
            author_name: author.and_then(|a| a.name.as_deref()).unwrap_or_default(),
            author_image: author.and_then(|a| a.image.as_deref()).unwrap_or_default(),
        }
    }
}

/// Format an RFC 3339 timestamp as `Month D, YYYY`, or return it unchanged.
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Render the full listing page for a resolved model.
pub fn render_listing(model: &RenderModel) -> askama::Result<String> {
    let (cards, message): (Vec<CardView<'_>>, &str) = match model.outcome() {
        Outcome::Cards(items) => (items.iter().map(CardView::from_record).collect(), ""),
        Outcome::Failed(message) => (Vec::new(), message),
        Outcome::Empty => (Vec::new(), EMPTY_MESSAGE),
    };

    let greeting = model
        .session
        .as_ref()
        .and_then(Session::display_name)
        .unwrap_or_default();

    ListingPage {
        query: &model.query,
        greeting,
        message,
        cards,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::listing::{LOAD_FAILED_MESSAGE, MALFORMED_MESSAGE};
    use crate::session::SessionUser;

    fn model(query: &str, items: Vec<StartupRecord>, error: Option<&str>) -> RenderModel {
        RenderModel {
            query: query.to_string(),
            items,
            error_message: error.map(ToOwned::to_owned),
            session: None,
        }
    }

    fn full_record() -> StartupRecord {
        serde_json::from_value(json!({
            "_id": "a1",
            "title": "Rocket Rides",
            "_createdAt": "2024-11-02T09:30:00Z",
            "author": { "_id": "u1", "name": "Sam", "image": "https://img.example/u1.png" },
            "views": 42,
            "description": "Rides to orbit",
            "category": "Space Tech",
            "image": "https://img.example/a1.png"
        }))
        .unwrap()
    }

    fn card_count(html: &str) -> usize {
        html.matches("class=\"startup-card\"").count()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-11-02T09:30:00Z"), "November 2, 2024");
        assert_eq!(format_date("2023-01-15T00:00:00.000Z"), "January 15, 2023");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_search_results_with_cards() {
        let items = vec![
            serde_json::from_value(json!({ "_id": "a1" })).unwrap(),
            serde_json::from_value(json!({ "_id": "a2" })).unwrap(),
        ];
        let html = render_listing(&model("AI", items, None)).unwrap();

        assert!(html.contains("Search results for \"AI\""));
        assert_eq!(card_count(&html), 2);
        assert!(html.find("data-id=\"a1\"").unwrap() < html.find("data-id=\"a2\"").unwrap());
        assert!(!html.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_all_startups_empty() {
        let html = render_listing(&model("", Vec::new(), None)).unwrap();

        assert!(html.contains("All Startups"));
        assert!(html.contains("No startups found"));
        assert_eq!(card_count(&html), 0);
    }

    #[test]
    fn test_error_message_replaces_cards() {
        let html = render_listing(&model("", Vec::new(), Some(LOAD_FAILED_MESSAGE))).unwrap();
        assert!(html.contains("Failed to load startups."));
        assert!(!html.contains(EMPTY_MESSAGE));

        let html = render_listing(&model("x", Vec::new(), Some(MALFORMED_MESSAGE))).unwrap();
        assert!(html.contains("Posts data is not in the expected format."));
    }

    #[test]
    fn test_card_fields() {
        let html = render_listing(&model("", vec![full_record()], None)).unwrap();

        assert!(html.contains("November 2, 2024"));
        assert!(html.contains("42 views"));
        assert!(html.contains("Rocket Rides"));
        assert!(html.contains("Rides to orbit"));
        assert!(html.contains("Sam"));
        assert!(html.contains("href=\"/user/u1\""));
        assert!(html.contains("href=\"/startup/a1\""));
        assert!(html.contains("/?query=Space+Tech"));
    }

    #[test]
    fn test_search_form_keeps_query() {
        let html = render_listing(&model("fintech", Vec::new(), None)).unwrap();
        assert!(html.contains("name=\"query\" value=\"fintech\""));
        assert!(html.contains("aria-label=\"Reset search\""));

        let html = render_listing(&model("", Vec::new(), None)).unwrap();
        assert!(!html.contains("aria-label=\"Reset search\""));
    }

    #[test]
    fn test_query_is_escaped() {
        let html = render_listing(&model("<script>", Vec::new(), None)).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_greeting_from_session() {
        let mut signed_in = model("", Vec::new(), None);
        signed_in.session = Some(Session {
            id: "u1".to_string(),
            user: Some(SessionUser {
                name: Some("Ada".to_string()),
                email: None,
                image: None,
            }),
            expires: None,
        });

        let html = render_listing(&signed_in).unwrap();
        assert!(html.contains("Signed in as Ada"));

        let html = render_listing(&model("", Vec::new(), None)).unwrap();
        assert!(!html.contains("Signed in as"));
    }
}
