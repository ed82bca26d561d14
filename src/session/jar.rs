//! Cookie jar capability and its in-memory and on-disk backends.
//!
//! A jar behaves like `document.cookie`: reading yields every live cookie as
//! `name=value` pairs joined by `"; "`, writing takes a single assignment with
//! optional `Expires`/`Max-Age`/`Path` attributes. An assignment whose expiry
//! is already in the past removes the cookie.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::cookie::SetCookie;
use super::error::SessionError;

/// Persistent key-value store the session token lives in.
///
/// Each call is atomic: a reader never observes half of a write.
pub trait CookieJar: Send + Sync {
    /// Live cookies as a `name=value; name=value` string.
    fn cookie_header(&self) -> String;

    /// Apply one `name=value; attr=...` assignment.
    fn set_cookie(&self, assignment: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct CookieTable {
    entries: BTreeMap<String, StoredCookie>,
}

impl CookieTable {
    fn apply(&mut self, cookie: SetCookie, now: DateTime<Utc>) {
        let expires_at = cookie.expiry.resolve(now);
        if expires_at.is_some_and(|at| at <= now) {
            self.entries.remove(&cookie.name);
            return;
        }
        self.entries.insert(
            cookie.name,
            StoredCookie {
                value: cookie.value,
                expires_at,
                path: cookie.path,
            },
        );
    }

    fn header(&self, now: DateTime<Utc>) -> String {
        self.entries
            .iter()
            .filter(|(_, cookie)| cookie.is_live(now))
            .map(|(name, cookie)| format!("{}={}", name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, cookie| cookie.is_live(now));
    }
}

/// Jar that lives only as long as the process.
pub struct MemoryCookieJar {
    table: RwLock<CookieTable>,
    clock: Arc<dyn Clock>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(CookieTable::default()),
            clock,
        }
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self) -> String {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.header(self.clock.now())
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), SessionError> {
        let cookie = SetCookie::parse(assignment)?;
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.apply(cookie, self.clock.now());
        Ok(())
    }
}

/// Jar persisted as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the original,
/// so the file on disk always holds a complete table.
pub struct FileCookieJar {
    path: PathBuf,
    table: Mutex<CookieTable>,
    clock: Arc<dyn Clock>,
}

impl FileCookieJar {
    /// Open the jar at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        let path = path.into();
        let mut table = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => CookieTable::default(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CookieTable::default(),
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        table.purge_expired(clock.now());

        debug!(path = %path.display(), cookies = table.entries.len(), "Cookie jar opened");

        Ok(Self {
            path,
            table: Mutex::new(table),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &CookieTable) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(table).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp: OsString = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl CookieJar for FileCookieJar {
    fn cookie_header(&self) -> String {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.header(self.clock.now())
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), SessionError> {
        let cookie = SetCookie::parse(assignment)?;
        let now = self.clock.now();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        // Only commit in memory once the file holds the new state.
        let mut next = table.clone();
        next.apply(cookie, now);
        next.purge_expired(now);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::ManualClock;
    use chrono::{TimeDelta, TimeZone};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_memory_jar_lists_live_cookies() {
        let jar = MemoryCookieJar::with_clock(clock());
        jar.set_cookie("theme=dark").unwrap();
        jar.set_cookie("token=abc; Max-Age=60; Path=/").unwrap();

        assert_eq!(jar.cookie_header(), "theme=dark; token=abc");
    }

    #[test]
    fn test_memory_jar_overwrites_existing_value() {
        let jar = MemoryCookieJar::with_clock(clock());
        jar.set_cookie("token=first").unwrap();
        jar.set_cookie("token=second").unwrap();

        assert_eq!(jar.cookie_header(), "token=second");
    }

    #[test]
    fn test_memory_jar_hides_expired_cookies() {
        let clock = clock();
        let jar = MemoryCookieJar::with_clock(clock.clone());
        jar.set_cookie("token=abc; Max-Age=60").unwrap();

        clock.advance(TimeDelta::seconds(59));
        assert_eq!(jar.cookie_header(), "token=abc");

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(jar.cookie_header(), "");
    }

    #[test]
    fn test_extreme_max_age_does_not_panic() {
        let clock = clock();
        let jar = MemoryCookieJar::with_clock(clock.clone());
        jar.set_cookie("a=b; Max-Age=9223372036854775807").unwrap();
        jar.set_cookie("c=d; Max-Age=60").unwrap();
        assert_eq!(jar.cookie_header(), "a=b; c=d");

        jar.set_cookie("c=d; Max-Age=-9223372036854775808").unwrap();
        assert_eq!(jar.cookie_header(), "a=b");

        // Capped at 400 days.
        clock.advance(TimeDelta::days(400));
        assert_eq!(jar.cookie_header(), "");
    }

    #[test]
    fn test_file_jar_extreme_max_age_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let clock = clock();

        let jar = FileCookieJar::open_with_clock(&path, clock.clone()).unwrap();
        jar.set_cookie("a=b; Max-Age=9223372036854775807").unwrap();

        let reopened = FileCookieJar::open_with_clock(&path, clock).unwrap();
        assert_eq!(reopened.cookie_header(), "a=b");
    }

    #[test]
    fn test_past_expiry_removes_cookie() {
        let jar = MemoryCookieJar::with_clock(clock());
        jar.set_cookie("token=abc").unwrap();
        jar.set_cookie("other=1").unwrap();
        jar.set_cookie("token=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/")
            .unwrap();

        assert_eq!(jar.cookie_header(), "other=1");
    }

    #[test]
    fn test_invalid_assignment_leaves_jar_untouched() {
        let jar = MemoryCookieJar::with_clock(clock());
        jar.set_cookie("token=abc").unwrap();

        assert!(jar.set_cookie("garbage").is_err());
        assert_eq!(jar.cookie_header(), "token=abc");
    }

    #[test]
    fn test_file_jar_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cookies.json");
        let clock = clock();

        let jar = FileCookieJar::open_with_clock(&path, clock.clone()).unwrap();
        jar.set_cookie("token=T1; Max-Age=3600; Path=/").unwrap();
        jar.set_cookie("lang=en").unwrap();
        drop(jar);

        let reopened = FileCookieJar::open_with_clock(&path, clock).unwrap();
        assert_eq!(reopened.cookie_header(), "lang=en; token=T1");
    }

    #[test]
    fn test_file_jar_drops_expired_entries_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let clock = clock();

        let jar = FileCookieJar::open_with_clock(&path, clock.clone()).unwrap();
        jar.set_cookie("token=T1; Max-Age=10").unwrap();
        drop(jar);

        clock.advance(TimeDelta::seconds(11));
        let reopened = FileCookieJar::open_with_clock(&path, clock).unwrap();
        assert_eq!(reopened.cookie_header(), "");
    }

    #[test]
    fn test_file_jar_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FileCookieJar::open(&path);
        assert!(matches!(result, Err(SessionError::Corrupt { .. })));
    }

    #[test]
    fn test_file_jar_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let jar = FileCookieJar::open(dir.path().join("absent.json")).unwrap();

        assert_eq!(jar.cookie_header(), "");
        assert!(!jar.path().exists());
    }
}
