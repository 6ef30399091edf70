use std::collections::VecDeque;

use tracing::debug;

use crate::{
    api::{SearchRequest, TwitterApi, UserRef},
    Error, Limit, Result, Tweet,
};

/// What a [`Cursor`] pages through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorRequest {
    Search(SearchRequest),
    Timeline(UserRef),
}

#[derive(Debug)]
enum PageState {
    First,
    Next(String),
    Done,
}

/// Lazy, forward-only iterator over the results of one query.
///
/// Pages are fetched on demand. Iteration stops after `limit` tweets, when
/// the API runs out of pages, or right after the first error is yielded.
/// A finished cursor cannot be rewound; issue the query again instead.
pub struct Cursor<'a, A: ?Sized> {
    api: &'a A,
    request: CursorRequest,
    limit: Option<Limit>,
    remaining: Option<u64>,
    buffer: VecDeque<Tweet>,
    state: PageState,
}

impl<'a, A: TwitterApi + ?Sized> Cursor<'a, A> {
    pub fn new(api: &'a A, request: CursorRequest, limit: Option<Limit>) -> Self {
        Self {
            api,
            request,
            limit,
            remaining: limit.map(Limit::get),
            buffer: VecDeque::new(),
            state: PageState::First,
        }
    }

    pub fn request(&self) -> &CursorRequest {
        &self.request
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    fn finish(&mut self) {
        self.buffer.clear();
        self.state = PageState::Done;
    }

    fn fetch(&mut self) -> Result<()> {
        let token = match std::mem::replace(&mut self.state, PageState::Done) {
            PageState::Done => return Ok(()),
            PageState::First => None,
            PageState::Next(token) => Some(token),
        };
        debug!(request = ?self.request, page = ?token, "fetching page");
        let page = match &self.request {
            CursorRequest::Search(request) => self.api.search(request, token.as_deref()),
            CursorRequest::Timeline(user) => self.api.user_timeline(user, token.as_deref()),
        }
        .map_err(Error::Transport)?;

        if !page.items.is_empty() {
            if let Some(next) = page.next {
                self.state = PageState::Next(next);
            }
        }
        self.buffer.extend(page.items);
        Ok(())
    }
}

impl<A: TwitterApi + ?Sized> Iterator for Cursor<'_, A> {
    type Item = Result<Tweet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                self.finish();
                return None;
            }
            if let Some(tweet) = self.buffer.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(Ok(tweet));
            }
            if matches!(self.state, PageState::Done) {
                return None;
            }
            if let Err(err) = self.fetch() {
                self.finish();
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockApi};

    fn search(api: &MockApi, limit: Option<u64>) -> Cursor<'_, MockApi> {
        Cursor::new(
            api,
            CursorRequest::Search(SearchRequest::new("rust")),
            limit.map(Limit::new),
        )
    }

    #[test]
    fn test_walks_all_pages_without_limit() {
        let api = MockApi::new(7, 3);
        let tweets: Result<Vec<_>> = search(&api, None).collect();
        assert_eq!(tweets.unwrap().len(), 7);
        let pages: Vec<_> = api
            .calls()
            .into_iter()
            .map(|call| match call {
                Call::Search { page, .. } => page,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(pages, vec![None, Some("3".to_owned()), Some("6".to_owned())]);
    }

    #[test]
    fn test_stops_at_limit_without_extra_pages() {
        let api = MockApi::new(100, 10);
        let tweets: Result<Vec<_>> = search(&api, Some(15)).collect();
        assert_eq!(tweets.unwrap().len(), 15);
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn test_zero_limit_never_calls_api() {
        let api = MockApi::new(100, 10);
        assert!(search(&api, Some(0)).next().is_none());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_is_lazy() {
        let api = MockApi::new(100, 10);
        let mut cursor = search(&api, None);
        assert!(api.calls().is_empty());
        cursor.next().unwrap().unwrap();
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_transport_error_yielded_once() {
        let api = MockApi::new(10, 5).failing_on("rust");
        let mut cursor = search(&api, None);
        assert!(matches!(cursor.next(), Some(Err(Error::Transport(_)))));
        assert!(cursor.next().is_none());
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_empty_result_set() {
        let api = MockApi::new(0, 5);
        assert!(search(&api, Some(3)).next().is_none());
    }
}
