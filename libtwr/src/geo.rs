//! Location-scoped queries.
//!
//! Place names are resolved with a place search and the first candidate is
//! taken as the match. This is not error proof: a wrong first candidate
//! scopes the query to the wrong place. Callers that know the place id can
//! search with `place:<id>` directly.

use std::fmt;

use tracing::{debug, warn};

use crate::{
    api::{Granularity, Place, PlaceSearch, TwitterApi},
    cursor::Cursor,
    query::query_tweets,
    Error, Limit, Result, Tweet,
};

fn check_place_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::InvalidArgument(
            "At least one place name is required".to_owned(),
        ));
    }
    if names.iter().any(|name| name.as_ref().trim().is_empty()) {
        return Err(Error::InvalidArgument(
            "Place names must not be blank".to_owned(),
        ));
    }
    Ok(())
}

/// One or more place names, never empty and never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceTarget {
    names: Vec<String>,
}

impl PlaceTarget {
    pub fn single(name: impl Into<String>) -> Result<Self> {
        Self::list(vec![name.into()])
    }

    pub fn list(names: Vec<String>) -> Result<Self> {
        check_place_names(&names)?;
        Ok(Self { names })
    }

    /// Builds a target from whichever input was supplied, preferring the
    /// list when both are.
    pub fn from_parts(
        geoloc_list: Option<Vec<String>>,
        single_geoloc: Option<String>,
    ) -> Result<Self> {
        match (
            geoloc_list.filter(|list| !list.is_empty()),
            single_geoloc.filter(|name| !name.trim().is_empty()),
        ) {
            (Some(list), _) => Self::list(list),
            (None, Some(name)) => Self::single(name),
            (None, None) => Err(Error::InvalidArgument(
                "Missing a geoloc_list or single_geoloc input".to_owned(),
            )),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Center and radius of a circular search area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeSpec {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

impl From<(f64, f64, f64)> for GeocodeSpec {
    fn from((latitude, longitude, radius): (f64, f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
            radius,
        }
    }
}

impl fmt::Display for GeocodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.latitude, self.longitude, self.radius)
    }
}

/// Appends `key:value` to a free-text query with the `&` joiner, or uses it
/// alone when there is no query text.
fn scoped_query(prefix: Option<&str>, key: &str, value: &str) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}&{}:{}", prefix, key, value),
        None => format!("{}:{}", key, value),
    }
}

/// Resolves a place name to the id of the first candidate the API offers.
pub fn resolve_place<A>(
    api: &A,
    name: &str,
    granularity: Option<Granularity>,
    limit: Option<Limit>,
) -> Result<Place>
where
    A: TwitterApi + ?Sized,
{
    let search = PlaceSearch {
        query: name.to_owned(),
        max_results: limit.map(Limit::get),
        granularity,
    };
    let candidates = api.geo_search(&search).map_err(Error::Transport)?;
    if candidates.len() > 1 {
        warn!(
            place = name,
            candidates = candidates.len(),
            "ambiguous place name, taking the first candidate"
        );
    }
    let place = candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoPlaceMatch(name.to_owned()))?;
    debug!(place = name, id = %place.id, "resolved place");
    Ok(place)
}

/// Fetches tweets from every target place and merges them into one list,
/// place by place.
///
/// The limit applies to each place separately: two places with a limit of 5
/// return up to 10 tweets.
pub fn geo_tweets<A>(
    api: &A,
    target: &PlaceTarget,
    granularity: Option<Granularity>,
    limit: Option<Limit>,
) -> Result<Vec<Tweet>>
where
    A: TwitterApi + ?Sized,
{
    let mut tweets = Vec::new();
    for name in target.names() {
        let place = resolve_place(api, name, granularity, limit)?;
        let query = scoped_query(None, "place", &place.id);
        for tweet in query_tweets::<_, &str>(api, &query, limit, &[]) {
            tweets.push(tweet?);
        }
    }
    Ok(tweets)
}

/// Resolves each place and returns one lazy cursor per place, in input
/// order, each searching `query` within that place.
///
/// Places are resolved eagerly, so a lookup failure surfaces here before any
/// tweets are fetched.
pub fn place_tweets<'a, A, S>(
    api: &'a A,
    query: Option<&str>,
    places: &[S],
    granularity: Option<Granularity>,
    limit: Option<Limit>,
) -> Result<Vec<Cursor<'a, A>>>
where
    A: TwitterApi + ?Sized,
    S: AsRef<str>,
{
    check_place_names(places)?;
    places
        .iter()
        .map(|name| -> Result<Cursor<'a, A>> {
            let place = resolve_place(api, name.as_ref(), granularity, limit)?;
            let scoped = scoped_query(query, "place", &place.id);
            Ok(query_tweets::<_, &str>(api, &scoped, limit, &[]))
        })
        .collect()
}

/// Returns one lazy cursor per search circle, in input order.
pub fn geocode_tweets<'a, A>(
    api: &'a A,
    query: Option<&str>,
    geocodes: &[GeocodeSpec],
    limit: Option<Limit>,
) -> Result<Vec<Cursor<'a, A>>>
where
    A: TwitterApi + ?Sized,
{
    if geocodes.is_empty() {
        return Err(Error::InvalidArgument(
            "At least one geocode is required".to_owned(),
        ));
    }
    Ok(geocodes
        .iter()
        .map(|geocode| {
            let scoped = scoped_query(query, "geocode", &geocode.to_string());
            query_tweets::<_, &str>(api, &scoped, limit, &[])
        })
        .collect())
}

/// Country or region scoped search. Not supported yet, always fails.
pub fn countrycode_tweets<'a, A>(
    _api: &'a A,
    _country_code: &str,
    _limit: Option<Limit>,
) -> Result<Cursor<'a, A>>
where
    A: TwitterApi + ?Sized,
{
    Err(Error::NotImplemented("countrycode_tweets"))
}
