//! In-memory remote used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::catalog::{ListStatus, WatchlistSnapshot};
use crate::error::{Result, ShelfError};
use crate::remote::{AcceptedCounts, FileIdentification, WatchedBatch, WatchlistRemote};

#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    InvalidToken,
    ServerError,
}

impl<T: Clone> Reply<T> {
    fn resolve(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::InvalidToken => Err(ShelfError::InvalidToken),
            Reply::ServerError => Err(ShelfError::Unexpected {
                status: 500,
                body: "boom".into(),
            }),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeRemote {
    pub snapshot: Mutex<Reply<WatchlistSnapshot>>,
    pub identifications: Mutex<HashMap<String, Reply<Option<FileIdentification>>>>,
    /// Replies to `submit_watched`, consumed in order; zero counts once empty.
    pub accepted: Mutex<VecDeque<Reply<AcceptedCounts>>>,
    pub submitted: Mutex<Vec<WatchedBatch>>,
    pub identify_calls: Mutex<Vec<String>>,
    pub fetch_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(snapshot: WatchlistSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Reply::Ok(snapshot)),
            identifications: Mutex::new(HashMap::new()),
            accepted: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            identify_calls: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_snapshot(&self, reply: Reply<WatchlistSnapshot>) {
        *self.snapshot.lock().expect("lock") = reply;
    }

    pub fn identify(&self, file: &str, reply: Reply<Option<FileIdentification>>) {
        self.identifications
            .lock()
            .expect("lock")
            .insert(file.to_string(), reply);
    }

    pub fn accept(&self, reply: Reply<AcceptedCounts>) {
        self.accepted.lock().expect("lock").push_back(reply);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatchlistRemote for FakeRemote {
    async fn fetch_by_status(&self, _token: &str, _status: ListStatus) -> Result<WatchlistSnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot.lock().expect("lock").resolve()
    }

    async fn identify_by_file(&self, _token: &str, file: &str) -> Result<Option<FileIdentification>> {
        self.identify_calls.lock().expect("lock").push(file.to_string());
        match self.identifications.lock().expect("lock").get(file) {
            Some(reply) => reply.resolve(),
            None => Ok(None),
        }
    }

    async fn submit_watched(&self, _token: &str, batch: &WatchedBatch) -> Result<AcceptedCounts> {
        self.submitted.lock().expect("lock").push(batch.clone());
        match self.accepted.lock().expect("lock").pop_front() {
            Some(reply) => reply.resolve(),
            None => Ok(AcceptedCounts::default()),
        }
    }
}
