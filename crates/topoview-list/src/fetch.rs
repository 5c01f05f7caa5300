use crate::cancellation::CancellationToken;
use crate::filter::ListFilter;
use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// One step of a streamed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent<T, Tok> {
    Item(T),
    /// The page is complete. The token fetches the page after it.
    Complete { next_page_token: Option<Tok> },
    Failed(String),
}

/// Receiving end of a page fetch.
///
/// The stream ends at the first `Complete` or `Failed`. A producer that goes
/// away without sending either is treated as a completed page with no
/// next-page token.
#[derive(Debug)]
pub struct ListStream<T, Tok> {
    events: Receiver<FetchEvent<T, Tok>>,
}

/// Sending end of a page fetch, handed to whatever produces the items.
#[derive(Debug, Clone)]
pub struct ListSink<T, Tok> {
    events: Sender<FetchEvent<T, Tok>>,
}

impl<T, Tok> ListStream<T, Tok> {
    pub fn channel() -> (ListSink<T, Tok>, ListStream<T, Tok>) {
        let (tx, rx) = unbounded();
        (ListSink { events: tx }, ListStream { events: rx })
    }

    /// A stream that already holds a whole page.
    pub fn ready(items: impl IntoIterator<Item = T>, next_page_token: Option<Tok>) -> Self {
        let (sink, stream) = Self::channel();
        for item in items {
            sink.item(item);
        }
        sink.complete(next_page_token);
        stream
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let (sink, stream) = Self::channel();
        sink.fail(message);
        stream
    }

    pub(crate) fn try_next(&self) -> StreamPoll<T, Tok> {
        match self.events.try_recv() {
            Ok(event) => StreamPoll::Event(event),
            Err(TryRecvError::Empty) => StreamPoll::Empty,
            Err(TryRecvError::Disconnected) => StreamPoll::Closed,
        }
    }

    pub(crate) fn next_blocking(&self) -> StreamPoll<T, Tok> {
        match self.events.recv() {
            Ok(event) => StreamPoll::Event(event),
            Err(_) => StreamPoll::Closed,
        }
    }
}

pub(crate) enum StreamPoll<T, Tok> {
    Event(FetchEvent<T, Tok>),
    Empty,
    Closed,
}

impl<T, Tok> ListSink<T, Tok> {
    /// Returns false once the controller stopped listening.
    pub fn item(&self, item: T) -> bool {
        self.events.send(FetchEvent::Item(item)).is_ok()
    }

    pub fn complete(&self, next_page_token: Option<Tok>) -> bool {
        self.events
            .send(FetchEvent::Complete { next_page_token })
            .is_ok()
    }

    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.events.send(FetchEvent::Failed(message.into())).is_ok()
    }
}

/// Starts fetching one page.
///
/// `page_token` is `None` for the first page. The producer should stop once
/// `cancel` reports cancellation.
pub trait ListFetcher<V, T, Tok> {
    fn fetch(
        &mut self,
        filter: &ListFilter<V>,
        page_token: Option<&Tok>,
        cancel: CancellationToken,
    ) -> ListStream<T, Tok>;
}

impl<V, T, Tok, F> ListFetcher<V, T, Tok> for F
where
    F: FnMut(&ListFilter<V>, Option<&Tok>, CancellationToken) -> ListStream<T, Tok>,
{
    fn fetch(
        &mut self,
        filter: &ListFilter<V>,
        page_token: Option<&Tok>,
        cancel: CancellationToken,
    ) -> ListStream<T, Tok> {
        self(filter, page_token, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_stream_order() {
        let stream: ListStream<u32, String> = ListStream::ready([1, 2], Some("t".to_string()));
        let mut events = Vec::new();
        while let StreamPoll::Event(event) = stream.try_next() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                FetchEvent::Item(1),
                FetchEvent::Item(2),
                FetchEvent::Complete {
                    next_page_token: Some("t".to_string())
                },
            ]
        );
        assert!(matches!(stream.try_next(), StreamPoll::Closed));
    }

    #[test]
    fn test_sink_reports_dropped_stream() {
        let (sink, stream) = ListStream::<u32, u32>::channel();
        assert!(sink.item(1));
        drop(stream);
        assert!(!sink.item(2));
    }
}
