//! Route metadata.
//!
//! A [`RouteDescriptor`] is everything docket knows about one controller
//! method: verb, URI template, synopsis and documented parameters. It is what
//! the [`AnnotationReader`](crate::AnnotationReader) produces and caches.
//! A [`DocRecord`] is the published, client-facing view of the same data.

use serde::{Deserialize, Serialize};

use crate::annotation;
use crate::method::Method;

/// One documented parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub description: String,
}

/// Metadata for one routable controller method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Name of the handler this route dispatches to.
    pub handler: String,
    pub http_method: Method,
    /// Path template, `{name}` for path parameters.
    pub uri: String,
    pub synopsis: String,
    pub parameters: Vec<ParamDoc>,
}

impl RouteDescriptor {
    /// Derives a route from a handler declaration.
    ///
    /// Returns `None` when the handler name has no recognised verb prefix.
    ///
    /// ```rust
    /// use docket::{Method, RouteDescriptor};
    ///
    /// let route = RouteDescriptor::derive("/models", "get_related", &["id"], "Related models.").unwrap();
    /// assert_eq!(route.http_method, Method::Get);
    /// assert_eq!(route.uri, "/models/related/{id}");
    /// assert_eq!(route.synopsis, "Related models.");
    /// ```
    pub fn derive(base: &str, handler: &str, path_params: &[&str], comment: &str) -> Option<Self> {
        let (http_method, suffix) = Method::from_handler_name(handler)?;
        let annotation::Annotation { synopsis, parameters } = annotation::parse(comment);
        Some(Self {
            handler: handler.to_owned(),
            http_method,
            uri: build_uri(base, suffix, path_params),
            synopsis,
            parameters,
        })
    }
}

/// Suffixes that name the shape of the target rather than a path segment:
/// `get_collection` is `GET /base`, `get_resource` + `id` is `GET /base/{id}`.
const SHAPE_SUFFIXES: [&str; 2] = ["collection", "resource"];

/// `base` + optional `/suffix` + one `/{param}` per path parameter.
pub(crate) fn build_uri(base: &str, suffix: &str, path_params: &[&str]) -> String {
    let mut uri = String::from("/");
    uri.push_str(base.trim_matches('/'));

    let suffix = if SHAPE_SUFFIXES.contains(&suffix) { "" } else { suffix };

    let segments = std::iter::once(suffix.to_owned())
        .chain(path_params.iter().map(|p| format!("{{{p}}}")))
        .filter(|s| !s.is_empty());
    for segment in segments {
        if !uri.ends_with('/') {
            uri.push('/');
        }
        uri.push_str(&segment);
    }
    uri
}

/// The published documentation entry for one route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRecord {
    #[serde(rename = "HTTPMethod")]
    pub http_method: String,
    #[serde(rename = "URI")]
    pub uri: String,
    #[serde(rename = "Synopsis")]
    pub synopsis: String,
    pub parameters: Vec<ParamDoc>,
}

impl From<&RouteDescriptor> for DocRecord {
    fn from(route: &RouteDescriptor) -> Self {
        Self {
            http_method: route.http_method.as_str().to_owned(),
            uri: route.uri.clone(),
            synopsis: route.synopsis.clone(),
            parameters: route.parameters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_from_base_suffix_and_params() {
        assert_eq!(build_uri("/modelbs", "", &[]), "/modelbs");
        assert_eq!(build_uri("modelbs/", "", &["id"]), "/modelbs/{id}");
        assert_eq!(build_uri("/justa", "testfunc", &[]), "/justa/testfunc");
        assert_eq!(build_uri("/a", "b", &["x", "y"]), "/a/b/{x}/{y}");
        assert_eq!(build_uri("", "status", &[]), "/status");
        assert_eq!(build_uri("/", "", &[]), "/");
    }

    #[test]
    fn shape_suffixes_add_no_segment() {
        assert_eq!(build_uri("/modelbs", "collection", &[]), "/modelbs");
        assert_eq!(build_uri("/modelbs", "resource", &["id"]), "/modelbs/{id}");
        assert_eq!(build_uri("/modelbs", "resources", &[]), "/modelbs/resources");
    }

    #[test]
    fn non_routable_name_yields_nothing() {
        assert!(RouteDescriptor::derive("/m", "helper", &[], "Helps.").is_none());
    }

    #[test]
    fn missing_comment_still_routes() {
        let route = RouteDescriptor::derive("/m", "delete", &["id"], "").unwrap();
        assert_eq!(route.http_method, Method::Delete);
        assert_eq!(route.uri, "/m/{id}");
        assert!(route.synopsis.is_empty());
        assert!(route.parameters.is_empty());
    }

    #[test]
    fn doc_record_uses_published_field_names() {
        let route = RouteDescriptor::derive("/m", "get", &[], "All.\n@param page int? Page").unwrap();
        let json = serde_json::to_value(DocRecord::from(&route)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "HTTPMethod": "GET",
                "URI": "/m",
                "Synopsis": "All.",
                "parameters": [{"name": "page", "type": "int", "required": false, "description": "Page"}]
            })
        );
    }
}
