use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::{Error, MovieRecord, Result};

/// Movie title anchors on a listing page.
pub(crate) const TITLE_LINK_SELECTOR: &str = r#"h3[class="lister-item-header"] > a"#;
/// Pagination anchor. The listing renders the pager twice, the second one is the one followed.
pub(crate) const NEXT_PAGE_SELECTOR: &str = r#"a[class="lister-page-next next-page"]"#;

const TITLE_SELECTOR: &str = r#"div[class="title_wrapper"] > h1"#;
const YEAR_SELECTOR: &str = r#"span[id="titleYear"] > a"#;
const DURATION_SELECTOR: &str = "time";
const GENRE_SELECTOR: &str = r#"div[class="subtext"] > a"#;
const RATING_SELECTOR: &str = r#"span[itemprop="ratingValue"]"#;

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

/// Where on a page a rule looks for links.
#[derive(Debug, Clone)]
pub(crate) struct LinkPattern {
    selector: Selector,
    /// Only keep the nth (0-based) match instead of all of them.
    nth: Option<usize>,
}

impl LinkPattern {
    pub(crate) fn all(sel_str: &str) -> Result<Self> {
        Ok(Self {
            selector: create_selector(sel_str)?,
            nth: None,
        })
    }

    pub(crate) fn nth(sel_str: &str, nth: usize) -> Result<Self> {
        Ok(Self {
            selector: create_selector(sel_str)?,
            nth: Some(nth),
        })
    }

    /// Lazily yields the raw `href` of every matching anchor.
    pub(crate) fn hrefs<'a>(&'a self, doc: &'a Html) -> impl Iterator<Item = &'a str> + 'a {
        let take = if self.nth.is_some() { 1 } else { usize::MAX };
        doc.select(&self.selector)
            .skip(self.nth.unwrap_or(0))
            .take(take)
            .filter_map(|a| a.value().attr("href"))
    }

    /// Like `hrefs`, resolved against the page url. Non http(s) targets are dropped.
    pub(crate) fn links<'a>(
        &'a self,
        doc: &'a Html,
        base: &'a Url,
    ) -> impl Iterator<Item = Url> + 'a {
        self.hrefs(doc)
            .filter_map(move |href| base.join(href.trim()).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .map(|mut url| {
                url.set_fragment(None);
                url
            })
    }
}

/// Reads the five movie fields off a detail page. Never fails on a missing field.
pub(crate) fn parse_movie(doc: &Html, movie_url: &Url, user_agent: &str) -> Result<MovieRecord> {
    let title_sel = create_selector(TITLE_SELECTOR)?;
    let year_sel = create_selector(YEAR_SELECTOR)?;
    let duration_sel = create_selector(DURATION_SELECTOR)?;
    let genre_sel = create_selector(GENRE_SELECTOR)?;
    let rating_sel = create_selector(RATING_SELECTOR)?;

    let duration = doc
        .select(&duration_sel)
        .next()
        .and_then(|time| own_text(time).next())
        .map(normalize_space)
        .filter(|d| !d.is_empty());

    Ok(MovieRecord {
        title: first_text(doc, &title_sel),
        year: first_text(doc, &year_sel),
        duration,
        genre: first_text(doc, &genre_sel),
        rating: first_text(doc, &rating_sel),
        movie_url: movie_url.to_string(),
        user_agent: user_agent.to_string(),
    })
}

/// First text node directly under any element matching `selector`, trimmed.
fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .flat_map(own_text)
        .next()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Text children of an element, descendants excluded.
fn own_text<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    el.children().filter_map(|node| node.value().as_text().map(|t| &**t))
}

fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
