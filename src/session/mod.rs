//! Client-side session: the bearer token kept in a cookie jar.
//!
//! The jar is injected as a capability ([`CookieJar`]) so callers decide
//! whether the session lives in memory or on disk.

mod clock;
mod cookie;
mod error;
mod jar;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{
    Expiry, SetCookie, TOKEN_COOKIE_NAME, format_http_date, get_cookie, parse_http_date,
};
pub use error::SessionError;
pub use jar::{CookieJar, FileCookieJar, MemoryCookieJar};
pub use store::{DEFAULT_TOKEN_TTL_DAYS, MAX_TOKEN_TTL_DAYS, SessionStore};
