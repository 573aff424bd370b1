use serde::{Deserialize, Serialize};

/// One movie as read off a detail page.
///
/// Every scraped field is optional: a page that lacks the element simply yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: Option<String>,
    pub year: Option<String>,
    pub duration: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub movie_url: String,
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl MovieRecord {
    /// Number of scraped fields that came back empty.
    pub fn missing_fields(&self) -> usize {
        [
            &self.title,
            &self.year,
            &self.duration,
            &self.genre,
            &self.rating,
        ]
        .iter()
        .filter(|f| f.is_none())
        .count()
    }

    /// Single JSON Lines entry, newline included.
    pub fn to_json_line(&self) -> crate::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
