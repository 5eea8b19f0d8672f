//! In-memory transport replaying scripted command output.

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Sleep;

use super::event::MockEvent;

#[derive(Debug, Default)]
struct MockState {
    /// Bytes ready to be read.
    output: VecDeque<u8>,
    /// Bytes written by the engine.
    input: Vec<u8>,
    /// Events not yet replayed.
    events: VecDeque<MockEvent>,
    /// Pending delay, if a `Delay` event is being replayed.
    delay: Option<Pin<Box<Sleep>>>,
    eof: bool,
    error: Option<String>,
    /// Reader parked on an empty transport.
    waker: Option<Waker>,
}

impl MockState {
    fn wake(&mut self) {
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

/// A mock transport for driving handlers without a process.
///
/// Clones share state, so a test can keep one handle to inspect what the
/// engine wrote while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an empty transport; reads stay pending until output or EOF is queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that replays `events` in order.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = MockEvent>) -> Self {
        let transport = Self::new();
        transport.lock().events.extend(events);
        transport
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue output to be read.
    pub fn queue_output(&self, data: &[u8]) {
        let mut state = self.lock();
        state.events.push_back(MockEvent::output(data));
        state.wake();
    }

    /// Queue a string to be read.
    pub fn queue_output_str(&self, s: &str) {
        self.queue_output(s.as_bytes());
    }

    /// Close the output once everything queued so far has been read.
    pub fn signal_eof(&self) {
        let mut state = self.lock();
        state.events.push_back(MockEvent::Eof);
        state.wake();
    }

    /// Fail the next read that reaches this point in the script.
    pub fn set_error(&self, msg: impl Into<String>) {
        let mut state = self.lock();
        state.events.push_back(MockEvent::error(msg));
        state.wake();
    }

    /// Get data that was written by the engine.
    #[must_use]
    pub fn take_input(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().input)
    }

    /// Get input as a string.
    #[must_use]
    pub fn take_input_str(&self) -> String {
        String::from_utf8_lossy(&self.take_input()).into_owned()
    }

    /// Check if the output has closed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.lock().eof
    }

    /// Check if scripted events remain to be replayed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.events.is_empty() || !state.output.is_empty()
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut guard = self.lock();
        let state = &mut *guard;

        loop {
            if let Some(error) = state.error.take() {
                return Poll::Ready(Err(io::Error::other(error)));
            }

            if !state.output.is_empty() {
                let n = buf.remaining().min(state.output.len());
                let chunk: Vec<u8> = state.output.drain(..n).collect();
                buf.put_slice(&chunk);
                return Poll::Ready(Ok(()));
            }

            if let Some(delay) = state.delay.as_mut() {
                if delay.as_mut().poll(cx).is_pending() {
                    return Poll::Pending;
                }
                state.delay = None;
            }

            match state.events.pop_front() {
                Some(MockEvent::Output(data)) => state.output.extend(data),
                Some(MockEvent::Delay(duration)) => {
                    state.delay = Some(Box::pin(tokio::time::sleep(duration)));
                }
                Some(MockEvent::Eof) => state.eof = true,
                Some(MockEvent::Error(msg)) => state.error = Some(msg),
                None if state.eof => return Poll::Ready(Ok(())),
                None => {
                    state.waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        }
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.lock().input.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
