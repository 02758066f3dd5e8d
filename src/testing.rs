//! Test doubles for the collaborator traits.
//!
//! All fakes write into one shared `Journal` so tests can check the order of
//! side effects across collaborators.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::application::errors::{BotError, TransportError};
use crate::domain::entities::{FileUpload, GroupDestination, Recipient};
use crate::domain::traits::{Bot, BotInfo, ConfigStore, Host, Metric, Monitor, NetworkInfo, TopicChannel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Message { to: String, text: String },
    File { to: String, path: PathBuf, caption: Option<String> },
    Action { to: String, action: String },
    Download(String),
    TopicPost { group: String, thread_id: i64, text: String },
    SaveState,
    Plot(Metric),
    Reboot,
    Exit(i32),
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message { to, text } => Some((to, text)),
                _ => None,
            })
            .collect()
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::File { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn topic_posts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::TopicPost { .. }))
            .count()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|c| *c == wanted).count()
    }
}

/// Scripted failure for the next send.
pub fn connection_error() -> TransportError {
    TransportError::Connection("network unreachable".to_string())
}

pub struct FakeBot {
    journal: Journal,
    failures: Mutex<VecDeque<TransportError>>,
    downloads: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeBot {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            failures: Mutex::new(VecDeque::new()),
            downloads: Mutex::new(HashMap::new()),
        }
    }

    /// Queue failures returned by the next sends, in order.
    pub fn fail_next(self, errors: impl IntoIterator<Item = TransportError>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    pub fn with_download(self, file_id: &str, bytes: &[u8]) -> Self {
        self.downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string(), bytes.to_vec());
        self
    }

    fn next_outcome(&self) -> Result<(), TransportError> {
        match self.failures.lock().unwrap().pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Bot for FakeBot {
    async fn start(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn stop(&self) {}

    async fn send_message(&self, chat: &Recipient, text: &str) -> Result<String, TransportError> {
        self.journal.push(Call::Message {
            to: chat.to_string(),
            text: text.to_string(),
        });
        self.next_outcome().map(|_| "1".to_string())
    }

    async fn send_file(&self, chat: &Recipient, upload: &FileUpload) -> Result<String, TransportError> {
        self.journal.push(Call::File {
            to: chat.to_string(),
            path: upload.path.clone(),
            caption: upload.caption.clone(),
        });
        self.next_outcome().map(|_| "2".to_string())
    }

    async fn send_chat_action(&self, chat: &Recipient, action: &str) -> Result<(), TransportError> {
        self.journal.push(Call::Action {
            to: chat.to_string(),
            action: action.to_string(),
        });
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        self.journal.push(Call::Download(file_id.to_string()));
        self.downloads
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| TransportError::Api {
                status: 400,
                description: "file not found".to_string(),
            })
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "0".to_string(),
            name: "fake".to_string(),
            username: "fake_bot".to_string(),
        }
    }
}

pub struct FakeTopicChannel {
    journal: Journal,
    status: u16,
}

impl FakeTopicChannel {
    /// Answers every post with the given HTTP status.
    pub fn responding(journal: Journal, status: u16) -> Self {
        Self { journal, status }
    }
}

#[async_trait]
impl TopicChannel for FakeTopicChannel {
    async fn post_to_thread(&self, group: &GroupDestination, thread_id: i64, text: &str) -> Result<(), TransportError> {
        self.journal.push(Call::TopicPost {
            group: group.to_string(),
            thread_id,
            text: text.to_string(),
        });
        if (200..300).contains(&self.status) {
            Ok(())
        } else {
            Err(TransportError::Api {
                status: self.status,
                description: "Internal Server Error".to_string(),
            })
        }
    }
}

pub struct FakeHost {
    journal: Journal,
}

impl FakeHost {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn reboot(&self) {
        self.journal.push(Call::Reboot);
    }

    async fn exit(&self, code: i32) {
        self.journal.push(Call::Exit(code));
    }
}

pub struct FakeNetwork;

impl NetworkInfo for FakeNetwork {
    fn local_address(&self) -> String {
        "192.168.1.20".to_string()
    }
}

pub struct FakeMonitor {
    journal: Journal,
    pub log_path: Option<PathBuf>,
    pub plot_dir: PathBuf,
}

impl FakeMonitor {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            log_path: Some(PathBuf::from("monitor.log")),
            plot_dir: PathBuf::from("plots"),
        }
    }

    pub fn without_log(mut self) -> Self {
        self.log_path = None;
        self
    }
}

#[async_trait]
impl Monitor for FakeMonitor {
    async fn last_status(&self) -> String {
        "All quiet: Item X unavailable".to_string()
    }

    async fn status_list(&self) -> String {
        "12:00 unavailable\n12:05 unavailable".to_string()
    }

    async fn proxy_status(&self) -> String {
        "3 proxies left".to_string()
    }

    async fn save_state(&self) -> Result<(), BotError> {
        self.journal.push(Call::SaveState);
        Ok(())
    }

    fn log_file_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }

    async fn plot_over_time(&self, metric: Metric) -> Result<PathBuf, BotError> {
        self.journal.push(Call::Plot(metric));
        Ok(self.plot_dir.join(format!("{}.png", metric.column())))
    }

    async fn start_monitoring(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<(), BotError> {
        Ok(())
    }
}

/// Config store backed by a real file, with a switchable directory check.
pub struct FakeConfigStore {
    path: PathBuf,
    in_app_dir: bool,
}

impl FakeConfigStore {
    pub fn new(path: impl Into<PathBuf>, in_app_dir: bool) -> Self {
        Self {
            path: path.into(),
            in_app_dir,
        }
    }
}

impl ConfigStore for FakeConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_app_directory(&self) -> bool {
        self.in_app_dir
    }

    fn replace(&self, contents: &[u8]) -> Result<PathBuf, BotError> {
        std::fs::write(&self.path, contents)?;
        Ok(self.path.clone())
    }
}

/// Captured `tracing` output for assertions on diagnostics.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's `tracing` events into a buffer until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
