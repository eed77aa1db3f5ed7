//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::Error;
use crate::retry::Sleeper;
use crate::transport::{RangeResponse, RangeTransport};

pub fn response(status: u16, retry_after: Option<&str>, body: &str) -> RangeResponse {
    RangeResponse {
        status,
        retry_after: retry_after.map(str::to_string),
        body: Box::new(Cursor::new(body.as_bytes().to_vec())),
    }
}

/// Replays a fixed sequence of fetch results.
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Result<RangeResponse, Error>>>,
    calls: Cell<usize>,
    urls: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RangeResponse, Error>>) -> Self {
        Self { script: RefCell::new(script.into()), calls: Cell::new(0), urls: RefCell::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl RangeTransport for ScriptedTransport {
    fn fetch(&self, url: &str) -> Result<RangeResponse, Error> {
        self.calls.set(self.calls.get() + 1);
        self.urls.borrow_mut().push(url.to_string());
        self.script.borrow_mut().pop_front().expect("transport script exhausted")
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

/// A body reader that records when it is dropped.
pub struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    dropped: Arc<AtomicBool>,
}

impl TrackedBody {
    pub fn new(body: &str) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let body = Self { inner: Cursor::new(body.as_bytes().to_vec()), dropped: dropped.clone() };
        (body, dropped)
    }
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
