//! Listing page resolver.
//!
//! Turns an optional search string into a [`RenderModel`]: the startups to
//! show, or the message to show instead. Collaborator failures never escape
//! this module; they degrade to a fixed user-facing message.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cms::{ContentSource, StartupRecord};
use crate::session::{Session, SessionSource};

/// Shown when the content store fails or reports an error
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load startups.";

/// Shown when the content store answers with something other than a list
pub const MALFORMED_MESSAGE: &str = "Posts data is not in the expected format.";

/// Shown when a well-formed answer holds no startups
pub const EMPTY_MESSAGE: &str = "No startups found";

/// Normalize the raw `query` parameter into a search filter.
///
/// Absent or empty means "no filter". Anything else is passed through unchanged.
pub fn normalize_query(raw_query: Option<&str>) -> Option<&str> {
    raw_query.filter(|q| !q.is_empty())
}

/// Resolver output consumed by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    /// The query as the user typed it, empty when absent
    pub query: String,
    /// Startups to render, in content store order
    pub items: Vec<StartupRecord>,
    /// User-facing failure message; `items` is empty whenever this is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// What the results section shows. Exactly one applies to any model.
#[derive(Debug, PartialEq)]
pub enum Outcome<'a> {
    Cards(&'a [StartupRecord]),
    Failed(&'a str),
    Empty,
}

impl RenderModel {
    fn new(query: &str, session: Option<Session>) -> Self {
        Self {
            query: query.to_string(),
            items: Vec::new(),
            error_message: None,
            session,
        }
    }

    /// Pick the results-section outcome; an error message always wins.
    pub fn outcome(&self) -> Outcome<'_> {
        match &self.error_message {
            Some(message) => Outcome::Failed(message),
            None if self.items.is_empty() => Outcome::Empty,
            None => Outcome::Cards(&self.items),
        }
    }

    /// Results heading
    pub fn heading(&self) -> String {
        if self.query.is_empty() {
            "All Startups".to_string()
        } else {
            format!("Search results for \"{}\"", self.query)
        }
    }
}

/// Resolves listing requests against the content and session collaborators.
#[derive(Clone)]
pub struct ListingResolver {
    content: Arc<dyn ContentSource>,
    sessions: Arc<dyn SessionSource>,
}

impl ListingResolver {
    pub fn new(content: Arc<dyn ContentSource>, sessions: Arc<dyn SessionSource>) -> Self {
        Self { content, sessions }
    }

    /// Resolve one listing request.
    ///
    /// `cookie` is the raw `Cookie` header, handed to the session lookup.
    /// The two lookups are independent and run concurrently.
    pub async fn resolve(&self, raw_query: Option<&str>, cookie: Option<&str>) -> RenderModel {
        let filter = normalize_query(raw_query);

        let (session, fetched) = tokio::join!(
            self.lookup_session(cookie),
            self.content.fetch_startups(filter)
        );

        match &session {
            Some(session) => debug!("Session ID: {}", session.id),
            None => debug!("No session for this request"),
        }

        let mut model = RenderModel::new(raw_query.unwrap_or_default(), session);

        match fetched {
            Ok(items) => {
                debug!("Fetched {} startup(s)", items.len());
                model.items = items;
            }
            Err(err) if err.is_upstream() => {
                error!("Error fetching startups: {}", err);
                model.error_message = Some(LOAD_FAILED_MESSAGE.to_string());
            }
            Err(err) => {
                error!("Expected startups to be a list: {}", err);
                model.error_message = Some(MALFORMED_MESSAGE.to_string());
            }
        }

        model
    }

    /// A failed lookup is logged and treated as signed out.
    async fn lookup_session(&self, cookie: Option<&str>) -> Option<Session> {
        match self.sessions.current_session(cookie).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session lookup failed: {:#}", e);
                None
            }
        }
    }
}
