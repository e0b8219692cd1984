//! Shared collaborators for integration tests.
//!
//! Every mock appends to one [`Journal`] so tests can assert both what
//! happened and in which order.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use rss_entrypoint::deploy::{DeployCommand, DeployError, DeployOutcome, Deployer};
use rss_entrypoint::readiness::{Endpoint, Probe};
use rss_entrypoint::templating::PropertyStore;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read(PathBuf),
    Write(PathBuf),
    Connect(Endpoint),
    Deploy(DeployCommand),
}

#[derive(Debug, Default)]
pub struct Journal {
    events: Mutex<Vec<Event>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn connects(&self) -> Vec<Endpoint> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Connect(ep) => Some(ep),
                _ => None,
            })
            .collect()
    }

    pub fn deploys(&self) -> Vec<DeployCommand> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Deploy(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Write(_)))
            .count()
    }
}

/// In-memory property files.
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, String>>,
    journal: Arc<Journal>,
}

impl MemoryStore {
    pub fn new(journal: &Arc<Journal>) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            journal: journal.clone(),
        }
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), contents.to_string());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl PropertyStore for MemoryStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.journal.push(Event::Read(path.to_path_buf()));
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.journal.push(Event::Write(path.to_path_buf()));
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// Refuses the first `failures` connections, then accepts.
pub struct ScriptedProbe {
    failures: u32,
    calls: AtomicU32,
    journal: Arc<Journal>,
}

impl ScriptedProbe {
    pub fn new(journal: &Arc<Journal>, failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            journal: journal.clone(),
        }
    }
}

impl Probe for ScriptedProbe {
    async fn connect(&self, endpoint: &Endpoint) -> io::Result<()> {
        self.journal.push(Event::Connect(endpoint.clone()));
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
        } else {
            Ok(())
        }
    }
}

/// Records deploy commands and reports a fixed outcome.
pub struct RecordingDeployer {
    outcome: DeployOutcome,
    journal: Arc<Journal>,
}

impl RecordingDeployer {
    pub fn succeeding(journal: &Arc<Journal>) -> Self {
        Self::with_code(journal, 0)
    }

    pub fn with_code(journal: &Arc<Journal>, code: i32) -> Self {
        Self {
            outcome: DeployOutcome {
                code: Some(code),
                success: code == 0,
                stdout: "Command deploy executed.\n".to_string(),
                stderr: if code == 0 {
                    String::new()
                } else {
                    "remote failure: archive not found\n".to_string()
                },
            },
            journal: journal.clone(),
        }
    }
}

impl Deployer for RecordingDeployer {
    async fn deploy(&self, command: &DeployCommand) -> Result<DeployOutcome, DeployError> {
        self.journal.push(Event::Deploy(command.clone()));
        Ok(self.outcome.clone())
    }
}

pub fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A listener on an ephemeral localhost port.
pub async fn start_database_stub() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A localhost port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let (listener, port) = start_database_stub().await;
    drop(listener);
    port
}
