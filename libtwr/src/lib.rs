//! Retrieval of tweets from the REST API, from dump files, and building word
//! dictionaries over them.
//!
//! Live queries go through any [`TwitterApi`] implementation and come back
//! as lazy [`Cursor`]s. Dump files are read eagerly with
//! [`tweets_from_file`] (concatenated JSON) or lazily with
//! [`tweets_from_file_iter`] (one document per line).

pub mod api;
pub mod corpus;
pub mod cursor;
pub mod dictionary;
mod error;
pub mod file;
pub mod geo;
pub mod json_stream;
mod limit;
pub mod query;
mod tweet;
pub mod util;

pub use api::{Granularity, Page, Place, PlaceSearch, SearchRequest, TwitterApi, UserRef};
pub use corpus::TweetCorpus;
pub use cursor::{Cursor, CursorRequest};
pub use dictionary::{create_dictionary, DictFormat, Dictionary, FilterOptions, Tokenizer};
pub use error::{Error, Result, TransportError};
pub use file::{tweets_from_db, tweets_from_file, tweets_from_file_iter, TweetLines};
pub use geo::{
    countrycode_tweets, geo_tweets, geocode_tweets, place_tweets, resolve_place, GeocodeSpec,
    PlaceTarget,
};
pub use json_stream::{decode_concatenated, ConcatDecoder};
pub use limit::{check_limit, Limit};
pub use query::{query_tweets, user_tweets};
pub use tweet::Tweet;
