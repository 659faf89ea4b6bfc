//! In-memory registry store, compiled for tests and the `testing` feature.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::store::RegistryStore;

#[derive(Debug, Clone)]
enum Entry {
    Str(String),
    Hash(Vec<(String, String)>),
    Set(Vec<String>),
    List(Vec<String>),
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Entry>,
    published: Vec<(String, String)>,
    failing: HashSet<String>,
}

/// A store holding registry data in process memory.
///
/// Keys enumerate in sorted order. Individual commands can be made to fail
/// with [`MemoryStore::fail_command`] to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_string(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock()
            .entries
            .insert(key.into(), Entry::Str(value.into()));
    }

    /// Set one field of a hash, creating the hash if needed.
    pub fn hset(&self, key: impl Into<String>, field: impl Into<String>, value: impl Into<String>) {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .entry(key.into())
            .or_insert_with(|| Entry::Hash(Vec::new()));
        if let Entry::Hash(fields) = entry {
            let field = field.into();
            let value = value.into();
            match fields.iter_mut().find(|(f, _)| *f == field) {
                Some((_, v)) => *v = value,
                None => fields.push((field, value)),
            }
        }
    }

    /// Add members to a set, creating the set if needed.
    pub fn sadd<I, T>(&self, key: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .entry(key.into())
            .or_insert_with(|| Entry::Set(Vec::new()));
        if let Entry::Set(set) = entry {
            for member in members {
                let member = member.into();
                if !set.contains(&member) {
                    set.push(member);
                }
            }
        }
    }

    /// Prepend items to a list the way `LPUSH` does, one at a time.
    pub fn lpush<I, T>(&self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .entry(key.into())
            .or_insert_with(|| Entry::List(Vec::new()));
        if let Entry::List(list) = entry {
            for item in items {
                list.insert(0, item.into());
            }
        }
    }

    /// Make every later call of `command` (e.g. `"KEYS"`) fail.
    pub fn fail_command(&self, command: &str) {
        self.lock().failing.insert(command.to_ascii_uppercase());
    }

    /// Channel/payload pairs published so far.
    pub fn published(&self) -> Vec<(String, String)> {
        self.lock().published.clone()
    }

    fn check(inner: &Inner, command: &str) -> Result<()> {
        if inner.failing.contains(command) {
            Err(RegistryError::Backend(format!("{command} failed")))
        } else {
            Ok(())
        }
    }

    fn wrong_type(key: &str) -> RegistryError {
        RegistryError::Backend(format!(
            "WRONGTYPE operation against key {key} holding the wrong kind of value"
        ))
    }

    fn range(list: &[String], start: isize, stop: isize) -> Vec<String> {
        let len = list.len() as isize;
        let normalize = |i: isize| if i < 0 { len + i } else { i };
        let start = normalize(start).max(0);
        let stop = normalize(stop).min(len - 1);
        if len == 0 || start > stop {
            return Vec::new();
        }
        list[start as usize..=stop as usize].to_vec()
    }

    fn lrange_locked(inner: &Inner, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        match inner.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(list)) => Ok(Self::range(list, start, stop)),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let inner = self.lock();
        Self::check(&inner, "KEYS")?;
        Ok(inner
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let inner = self.lock();
        Self::check(&inner, "HGETALL")?;
        match inner.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(fields)) => Ok(fields.clone()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let inner = self.lock();
        Self::check(&inner, "HGET")?;
        match inner.entries.get(key) {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(fields
                .iter()
                .find(|(f, _)| f == field)
                .map(|(_, v)| v.clone())),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        let mut inner = self.lock();
        Self::check(&inner, "HDEL")?;
        match inner.entries.get_mut(key) {
            None => Ok(0),
            Some(Entry::Hash(fields)) => {
                let before = fields.len();
                fields.retain(|(f, _)| f != field);
                Ok((before - fields.len()) as u64)
            }
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let inner = self.lock();
        Self::check(&inner, "SMEMBERS")?;
        match inner.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(members)) => Ok(members.clone()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let inner = self.lock();
        Self::check(&inner, "LRANGE")?;
        Self::lrange_locked(&inner, key, start, stop)
    }

    async fn multi_lrange(
        &self,
        keys: &[String],
        start: isize,
        stop: isize,
    ) -> Result<Vec<Vec<String>>> {
        let inner = self.lock();
        Self::check(&inner, "MULTI")?;
        Self::check(&inner, "LRANGE")?;
        keys.iter()
            .map(|key| Self::lrange_locked(&inner, key, start, stop))
            .collect()
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<u64> {
        let mut inner = self.lock();
        Self::check(&inner, "PUBLISH")?;
        inner
            .published
            .push((channel.to_string(), payload.to_string()));
        Ok(0)
    }
}

/// Redis-style glob matching supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
