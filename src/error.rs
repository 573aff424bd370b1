use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("Couldn't send a record through a channel.")]
    RuntimeSendError,

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Proxy Error: {0}")]
    Proxy(reqwest::Error),
    #[error("Failed to fetch page. Status Code: {status}\nResponse Content: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("Script tag `{0}` not found.")]
    MissingEmbeddedJson(String),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Key not found in JSON: {0}")]
    MissingKey(String),

    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Config Error: {0}")]
    Config(String),
}
