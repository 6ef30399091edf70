use tracing::debug;

use crate::{
    api::{SearchRequest, TwitterApi, UserRef},
    cursor::{Cursor, CursorRequest},
    Limit, Result,
};

/// Searches for tweets matching `query`, optionally restricted to
/// `languages`, with entities expanded.
///
/// Without a limit the cursor runs until the API stops returning pages.
pub fn query_tweets<'a, A, S>(
    api: &'a A,
    query: &str,
    limit: Option<Limit>,
    languages: &[S],
) -> Cursor<'a, A>
where
    A: TwitterApi + ?Sized,
    S: AsRef<str>,
{
    let request = SearchRequest::new(query).with_languages(languages);
    debug!(query, ?limit, languages = ?request.languages, "search query");
    Cursor::new(api, CursorRequest::Search(request), limit)
}

/// Reads a user's timeline by numeric id or screen name.
///
/// Fails before touching the API when neither is given; the id wins when
/// both are.
pub fn user_tweets<'a, A>(
    api: &'a A,
    user_id: Option<u64>,
    screen_name: Option<&str>,
    limit: Option<Limit>,
) -> Result<Cursor<'a, A>>
where
    A: TwitterApi + ?Sized,
{
    let user = UserRef::from_parts(user_id, screen_name)?;
    debug!(%user, ?limit, "user timeline query");
    Ok(Cursor::new(api, CursorRequest::Timeline(user), limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockApi};
    use crate::Error;

    #[test]
    fn test_search_request_shape() {
        let api = MockApi::new(3, 10);
        let tweets: Result<Vec<_>> =
            query_tweets(&api, "#nyc", Some(Limit::new(2)), &["en", "es"]).collect();
        assert_eq!(tweets.unwrap().len(), 2);
        match &api.calls()[0] {
            Call::Search { request, page } => {
                assert_eq!(request.query, "#nyc");
                assert_eq!(request.languages, vec!["en", "es"]);
                assert!(request.include_entities);
                assert!(page.is_none());
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_limit_passes_through() {
        for n in [0_u64, 1, 4, 9, 25] {
            let api = MockApi::new(20, 4);
            let cursor = query_tweets::<_, &str>(&api, "q", Some(Limit::new(n)), &[]);
            assert_eq!(cursor.limit(), Some(Limit::new(n)));
            assert_eq!(cursor.count() as u64, n.min(20));
        }
    }

    #[test]
    fn test_user_tweets_by_screen_name() {
        let api = MockApi::new(5, 2);
        let tweets: Result<Vec<_>> = user_tweets(&api, None, Some("smapp"), None)
            .unwrap()
            .collect();
        assert_eq!(tweets.unwrap().len(), 5);
        assert!(api.calls().iter().all(|call| matches!(
            call,
            Call::Timeline { user: UserRef::ScreenName(name), .. } if name == "smapp"
        )));
    }

    #[test]
    fn test_user_tweets_prefers_id() {
        let api = MockApi::new(5, 5);
        let mut cursor = user_tweets(&api, Some(12), Some("smapp"), Some(Limit::new(1))).unwrap();
        assert!(cursor.next().unwrap().is_ok());
        assert!(matches!(
            &api.calls()[0],
            Call::Timeline { user: UserRef::Id(12), .. }
        ));
    }

    #[test]
    fn test_user_tweets_requires_identifier() {
        let api = MockApi::new(5, 5);
        assert!(matches!(
            user_tweets(&api, None, None, Some(Limit::new(3))),
            Err(Error::InvalidArgument(_))
        ));
        assert!(api.calls().is_empty());
    }
}
