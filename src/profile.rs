use chrono::Local;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::{fs, task::spawn_blocking};

use crate::config::ProfileConfig;
use crate::embedded::{display_value, extract_embedded_json, lookup, CAPTION_PATH, NEXT_DATA_ID};
use crate::request::{classify_send_error, excerpt, profile_client};
use crate::{info_time, warn_time, Error, Result};

/// What a successful profile fetch left behind.
#[derive(Debug)]
pub struct ProfileSnapshot {
    pub data: Value,
    /// The caption, or the `MissingKey` error naming where the path broke off.
    pub caption: Result<String>,
}

/// Fetches the profile page once, writes the HTML and the `__NEXT_DATA__` JSON to disk
/// and looks up the caption.
///
/// Anything but a 200 aborts before a file is written. A missing caption does not fail
/// the fetch, the JSON file is already on disk by then.
pub async fn fetch_profile(config: &ProfileConfig) -> Result<ProfileSnapshot> {
    let client = profile_client(config)?;
    let proxied = config.proxy.is_some();

    let res = client
        .get(&config.url)
        .send()
        .await
        .map_err(|e| classify_send_error(e, proxied))?;
    let status = res.status();
    let body = res.text().await?;

    if status != StatusCode::OK {
        return Err(Error::Status {
            status: status.as_u16(),
            excerpt: excerpt(&body),
        });
    }
    info_time!("IMDb Page fetched successfully.");
    fs::write(&config.html_path, &body).await?;

    // Html isn't Send, so parse off the runtime like the crawler does.
    let data = spawn_blocking(move || extract_embedded_json(&body, NEXT_DATA_ID)).await??;

    fs::write(&config.json_path, serde_json::to_string_pretty(&data)?).await?;
    info_time!("Saved {} and {}", config.html_path.display(), config.json_path.display());

    let caption = lookup(&data, CAPTION_PATH).map(display_value);
    Ok(ProfileSnapshot { data, caption })
}

/// Runs the profile fetch and reports the outcome on the console. Never fails.
pub async fn run_profile(config: &ProfileConfig) {
    let start_time = Local::now();
    match &config.proxy {
        Some(proxy) => info_time!("Fetching {} through {}", config.url, proxy.url()),
        None => warn_time!("No proxy configured, fetching {} directly", config.url),
    }

    match report_line(&fetch_profile(config).await) {
        Ok(line) => info_time!(start_time, "{}", line),
        Err(line) => warn_time!("{}", line),
    }
}

/// Console line for a fetch outcome, `Err` when it belongs on stderr.
fn report_line(outcome: &Result<ProfileSnapshot>) -> core::result::Result<String, String> {
    match outcome {
        Ok(ProfileSnapshot {
            caption: Ok(caption),
            ..
        }) => Ok(format!("Caption Text: {caption}")),
        Ok(ProfileSnapshot { caption: Err(e), .. }) => Err(e.to_string()),
        Err(e @ (Error::Proxy(_) | Error::MissingEmbeddedJson(_))) => Err(e.to_string()),
        Err(e) => Err(format!("Error: {e}")),
    }
}
