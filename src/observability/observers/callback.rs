//! User-supplied async callbacks per event kind.

use super::Observer;
use crate::observability::events::{
    ChatCompleteEvent, ChatErrorEvent, ChatStartEvent, Event, RetryEvent, StreamChunkEvent,
};
use crate::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;

type EventCallback<E> = Box<dyn Fn(E) -> BoxFuture<'static, ()> + Send + Sync>;

/// Forwards events to user-supplied async functions, one slot per event
/// kind; unset kinds are skipped.
///
/// ```rust
/// use forge_llm::observability::observers::CallbackObserver;
///
/// let observer = CallbackObserver::new()
///     .on_complete(|e| async move { println!("done in {:.0}ms", e.latency_ms) });
/// ```
#[derive(Default)]
pub struct CallbackObserver {
    start: Option<EventCallback<ChatStartEvent>>,
    complete: Option<EventCallback<ChatCompleteEvent>>,
    error: Option<EventCallback<ChatErrorEvent>>,
    retry: Option<EventCallback<RetryEvent>>,
    stream_chunk: Option<EventCallback<StreamChunkEvent>>,
}

impl CallbackObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ChatStartEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.start = Some(Box::new(move |e| Box::pin(callback(e))));
        self
    }

    pub fn on_complete<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ChatCompleteEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.complete = Some(Box::new(move |e| Box::pin(callback(e))));
        self
    }

    pub fn on_error<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ChatErrorEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.error = Some(Box::new(move |e| Box::pin(callback(e))));
        self
    }

    pub fn on_retry<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(RetryEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.retry = Some(Box::new(move |e| Box::pin(callback(e))));
        self
    }

    pub fn on_stream_chunk<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(StreamChunkEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stream_chunk = Some(Box::new(move |e| Box::pin(callback(e))));
        self
    }
}

#[async_trait]
impl Observer for CallbackObserver {
    async fn on_event(&self, event: &Event) -> Result<()> {
        match event {
            Event::ChatStart(e) => {
                if let Some(callback) = &self.start {
                    callback(e.clone()).await;
                }
            }
            Event::ChatComplete(e) => {
                if let Some(callback) = &self.complete {
                    callback(e.clone()).await;
                }
            }
            Event::ChatError(e) => {
                if let Some(callback) = &self.error {
                    callback(e.clone()).await;
                }
            }
            Event::Retry(e) => {
                if let Some(callback) = &self.retry {
                    callback(e.clone()).await;
                }
            }
            Event::StreamChunk(e) => {
                if let Some(callback) = &self.stream_chunk {
                    callback(e.clone()).await;
                }
            }
        }
        Ok(())
    }
}
