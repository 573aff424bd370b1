//! Hydration state embedded in server rendered pages.
//!
//! Next.js pages ship their props as JSON inside `<script id="__NEXT_DATA__">`. This module finds
//! that blob and walks fixed paths through it.

use std::fmt;

use scraper::Html;
use serde_json::Value;

use crate::parse::create_selector;
use crate::{Error, Result};

pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

/// One step of a path into a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "'{key}'"),
            PathSegment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

use PathSegment::{Index, Key};

/// Caption of the 7th main image on a profile page.
pub const CAPTION_PATH: &[PathSegment] = &[
    Key("props"),
    Key("pageProps"),
    Key("mainColumnData"),
    Key("titleMainImages"),
    Key("edges"),
    Index(6),
    Key("node"),
    Key("caption"),
    Key("plainText"),
];

/// Finds the script tag with the given `id` and parses its content as JSON.
pub fn extract_embedded_json(html: &str, script_id: &str) -> Result<Value> {
    let doc = Html::parse_document(html);
    let selector = create_selector(&format!(r#"script[id="{script_id}"]"#))?;
    let script = doc
        .select(&selector)
        .next()
        .ok_or_else(|| Error::MissingEmbeddedJson(script_id.to_string()))?;
    let content = script.text().collect::<String>();
    Ok(serde_json::from_str(&content)?)
}

/// Walks `path` through `value`. The error names the first segment that wasn't there.
pub fn lookup<'a>(value: &'a Value, path: &[PathSegment]) -> Result<&'a Value> {
    path.iter().try_fold(value, |current, segment| {
        let next = match segment {
            Key(key) => current.get(*key),
            Index(idx) => current.get(*idx),
        };
        next.ok_or_else(|| Error::MissingKey(segment.to_string()))
    })
}

/// Strings come back bare, everything else in its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
