//! Two small IMDb scrapers.
//!
//! `crawl` walks the archived top 250 listing and turns every detail page into a
//! [`MovieRecord`]. `profile` pulls a single profile page through a proxy and digs
//! a caption out of its `__NEXT_DATA__` blob.

pub mod config;
pub mod crawl;
pub mod embedded;
mod error;
mod macros;
mod parse;
pub mod profile;
pub mod record;
pub mod request;

pub use error::{Error, Result};
#[doc(hidden)]
pub use macros::log_line;
pub use record::MovieRecord;

pub const SEED_URL: &str =
    "https://web.archive.org/web/20200715000935/https://www.imdb.com/search/title/?groups=top_250&sort=user_rating";
pub const ALLOWED_DOMAIN: &str = "web.archive.org";
pub const CRAWL_USER_AGENT: &str = "Your User-Agent";
/// Max number of pages fetched at the same time during a crawl.
pub const CRAWL_CONCURRENCY: usize = 8;
pub const MOVIES_FILE_PATH: &str = "best_movies.jsonl";

pub const PROFILE_URL: &str =
    "https://m.imdb.com/name/nm0000129/?ref_=nv_sr_srsg_0_tt_0_nm_8_in_0_q_TOM%2520";
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const HTML_FILE_PATH: &str = "profile.html";
pub const JSON_FILE_PATH: &str = "profile.json";
/// How much of a failed response body ends up in the error message.
pub const EXCERPT_LEN: usize = 500;
