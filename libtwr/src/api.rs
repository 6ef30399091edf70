//! The seam to the REST client.
//!
//! Authentication, transport and rate limiting belong to whoever implements
//! [`TwitterApi`]; this crate only builds requests and walks the pages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, TransportError, Tweet};

/// One page of results plus the token of the page after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Tweet>,
    /// `None` once the API has nothing more to return.
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub languages: Vec<String>,
    pub include_entities: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            languages: Vec::new(),
            include_entities: true,
        }
    }

    pub fn with_languages<S: AsRef<str>>(mut self, languages: &[S]) -> Self {
        self.languages = languages.iter().map(|l| l.as_ref().to_owned()).collect();
        self
    }
}

/// Whose timeline to read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    Id(u64),
    ScreenName(String),
}

impl UserRef {
    /// Picks the identifier to use when a caller may supply either.
    ///
    /// The numeric id wins when both are given. An empty screen name counts
    /// as missing.
    pub fn from_parts(user_id: Option<u64>, screen_name: Option<&str>) -> Result<Self> {
        match (user_id, screen_name.map(str::trim).filter(|s| !s.is_empty())) {
            (Some(id), _) => Ok(Self::Id(id)),
            (None, Some(name)) => Ok(Self::ScreenName(name.to_owned())),
            (None, None) => Err(Error::InvalidArgument(
                "Must provide one of user_id or screen_name".to_owned(),
            )),
        }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "user_id={}", id),
            Self::ScreenName(name) => write!(f, "screen_name={}", name),
        }
    }
}

/// Hint for how coarse a place lookup should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Poi,
    Neighborhood,
    City,
    Admin,
    Country,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poi => "poi",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::Admin => "admin",
            Self::Country => "country",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "poi" => Ok(Self::Poi),
            "neighborhood" => Ok(Self::Neighborhood),
            "city" => Ok(Self::City),
            "admin" => Ok(Self::Admin),
            "country" => Ok(Self::Country),
            _ => Err(Error::InvalidArgument(format!("Unknown granularity {:?}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSearch {
    pub query: String,
    pub max_results: Option<u64>,
    pub granularity: Option<Granularity>,
}

/// A place-search candidate. Only `id` is relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub place_type: String,
}

/// An authenticated handle to the REST API.
///
/// Every call blocks until the API answers. Failures are returned as-is and
/// surface to callers as [`Error::Transport`].
pub trait TwitterApi {
    /// One page of a tweet search. `page` is `None` for the first page.
    fn search(
        &self,
        request: &SearchRequest,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError>;

    /// One page of a user's timeline.
    fn user_timeline(
        &self,
        user: &UserRef,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError>;

    /// Candidate places for a free-text name, most likely first.
    fn geo_search(&self, search: &PlaceSearch) -> std::result::Result<Vec<Place>, TransportError>;
}

impl<T: TwitterApi + ?Sized> TwitterApi for &T {
    fn search(
        &self,
        request: &SearchRequest,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError> {
        (**self).search(request, page)
    }

    fn user_timeline(
        &self,
        user: &UserRef,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError> {
        (**self).user_timeline(user, page)
    }

    fn geo_search(&self, search: &PlaceSearch) -> std::result::Result<Vec<Place>, TransportError> {
        (**self).geo_search(search)
    }
}

impl<T: TwitterApi + ?Sized> TwitterApi for Box<T> {
    fn search(
        &self,
        request: &SearchRequest,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError> {
        (**self).search(request, page)
    }

    fn user_timeline(
        &self,
        user: &UserRef,
        page: Option<&str>,
    ) -> std::result::Result<Page, TransportError> {
        (**self).user_timeline(user, page)
    }

    fn geo_search(&self, search: &PlaceSearch) -> std::result::Result<Vec<Place>, TransportError> {
        (**self).geo_search(search)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ref_prefers_id() {
        assert_eq!(
            UserRef::from_parts(Some(7), Some("smapp")).unwrap(),
            UserRef::Id(7)
        );
        assert_eq!(
            UserRef::from_parts(None, Some("smapp")).unwrap(),
            UserRef::ScreenName("smapp".to_owned())
        );
    }

    #[test]
    fn test_user_ref_requires_one() {
        assert!(matches!(
            UserRef::from_parts(None, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            UserRef::from_parts(None, Some("  ")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("City".parse::<Granularity>().unwrap(), Granularity::City);
        assert_eq!(Granularity::Neighborhood.as_str(), "neighborhood");
        assert!("galaxy".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_place_deserializes_with_only_id() {
        let place: Place = serde_json::from_str(r#"{"id": "5a110d312052166f"}"#).unwrap();
        assert_eq!(place.id, "5a110d312052166f");
        assert!(place.full_name.is_empty());
    }
}
