//! Per-task request context construction
//!
//! Builds the headers and query parameters for one (location, category)
//! task. Pure: the same inputs always produce the same context.

use crate::input::{Category, Location};
use thiserror::Error;
use url::Url;

/// Query parameter carrying the first-level category id
pub const QUERY_L0: &str = "category_l0";

/// Query parameter carrying the second-level category id
pub const QUERY_L1: &str = "category_l1";

/// Reasons a task cannot be turned into a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestContextError {
    #[error("category field '{0}' is empty")]
    MissingField(&'static str),

    #[error("coordinate '{0}' is not a finite number")]
    NonFiniteCoordinate(&'static str),
}

/// Headers and query for one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub headers: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
}

impl RequestContext {
    /// Value of the first header named `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds request contexts for a fixed endpoint and credentials
#[derive(Debug, Clone)]
pub struct RequestContextBuilder {
    authority: String,
    origin: String,
    site_root: Url,
    auth_token: String,
    user_agent: String,
}

impl RequestContextBuilder {
    pub fn new(endpoint: &Url, auth_token: &str, user_agent: &str) -> Self {
        let authority = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let mut site_root = endpoint.clone();
        site_root.set_path("");
        site_root.set_query(None);
        site_root.set_fragment(None);

        Self {
            authority,
            origin: endpoint.origin().ascii_serialization(),
            site_root,
            auth_token: auth_token.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Builds the context for one task
    ///
    /// Fails when a category identifier used in the referer or query is
    /// empty, or a coordinate is not finite.
    pub fn build(
        &self,
        location: &Location,
        category: &Category,
    ) -> Result<RequestContext, RequestContextError> {
        require(&category.l1_name, "l1_category")?;
        require(&category.l1_id, "l1_category_id")?;
        require(&category.l2_id, "l2_category_id")?;
        if !location.latitude.is_finite() {
            return Err(RequestContextError::NonFiniteCoordinate("latitude"));
        }
        if !location.longitude.is_finite() {
            return Err(RequestContextError::NonFiniteCoordinate("longitude"));
        }

        let slug = category_slug(&category.l1_name);
        let mut referer = self.site_root.clone();
        if let Ok(mut segments) = referer.path_segments_mut() {
            segments.clear().extend([
                "cn",
                slug.as_str(),
                "cid",
                category.l1_id.as_str(),
                category.l2_id.as_str(),
            ]);
        }

        let headers = vec![
            ("authority", self.authority.clone()),
            ("origin", self.origin.clone()),
            ("referer", referer.to_string()),
            ("auth_key", self.auth_token.clone()),
            ("lat", coordinate_text(location.latitude)),
            ("lon", coordinate_text(location.longitude)),
            ("content-type", "application/json".to_string()),
            ("user-agent", self.user_agent.clone()),
        ];

        let query = vec![
            (QUERY_L0, category.l1_id.clone()),
            (QUERY_L1, category.l2_id.clone()),
        ];

        Ok(RequestContext { headers, query })
    }
}

/// Lower-cases a category name and replaces each space with `-`
pub fn category_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Renders a coordinate with at least one decimal place (`28.0`, not `28`)
pub fn coordinate_text(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), RequestContextError> {
    if value.trim().is_empty() {
        Err(RequestContextError::MissingField(field))
    } else {
        Ok(())
    }
}
