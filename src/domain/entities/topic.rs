use std::collections::HashMap;
use std::fmt;

/// Forum group that hosts the topic threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDestination(String);

impl GroupDestination {
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Topic key -> forum thread id.
///
/// Only positive ids survive construction. The registry is built once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    threads: HashMap<String, i64>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw config values, dropping (and logging) anything that is
    /// not a positive integer.
    pub fn from_raw<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut threads = HashMap::new();
        for (key, value) in entries {
            let key = key.into();
            let raw = value.as_ref().trim();
            match raw.parse::<i64>() {
                Ok(id) if id > 0 => {
                    threads.insert(key, id);
                }
                _ => {
                    tracing::warn!("Ignoring invalid topic id for key '{}': {}", key, raw);
                }
            }
        }
        Self { threads }
    }

    /// Insert an id without validation
    #[cfg(test)]
    pub(crate) fn with_unchecked(mut self, key: &str, thread_id: i64) -> Self {
        self.threads.insert(key.to_string(), thread_id);
        self
    }

    pub fn thread_id(&self, key: &str) -> Option<i64> {
        self.threads.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
