//! HTML extraction for search result pages and subtitle detail pages
//!
//! Every search result is split by the site's template into two sibling
//! blocks: a "menu" (`div#menu_detalle_buscador`) holding the title anchor and
//! a "body" (`div#buscador_detalle`) holding description and counters. Both
//! lists come out in the same document order and are paired by index.
//!
//! The markup is not under our control, so anomalies degrade instead of
//! failing: unmatched trailing sections are dropped, a missing pager means
//! zero pages and an unreadable counter means zero downloads.

use crate::types::{ParsedPage, Subtitle};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static MENU_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("div#menu_detalle_buscador"));
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("div#buscador_detalle"));
static PAGINATION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("div.pagination"));
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static PRIMARY_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a.link1"));
static DETAIL_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a.detalle_link"));

/// Label that precedes the download counter in a result body
const DOWNLOADS_LABEL: &str = "downloads";

// Only called with the literal selectors above.
#[allow(clippy::expect_used)]
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Extract every subtitle record and the total page count from a result page
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let menus: Vec<ElementRef<'_>> = document.select(&MENU_SELECTOR).collect();
    let bodies: Vec<ElementRef<'_>> = document.select(&BODY_SELECTOR).collect();

    if menus.len() != bodies.len() {
        warn!(
            menus = menus.len(),
            bodies = bodies.len(),
            "mismatched result sections, dropping unpaired trailing sections"
        );
    }

    let subtitles = menus
        .iter()
        .zip(bodies.iter())
        .filter_map(|(menu, body)| parse_record(*menu, *body))
        .collect::<Vec<_>>();

    let total_pages = parse_total_pages(&document);

    debug!(
        records = subtitles.len(),
        total_pages, "parsed search result page"
    );

    ParsedPage {
        subtitles,
        total_pages,
    }
}

/// Build one record from a paired menu and body section
fn parse_record(menu: ElementRef<'_>, body: ElementRef<'_>) -> Option<Subtitle> {
    let Some(anchor) = menu.select(&ANCHOR_SELECTOR).next() else {
        warn!("result section without title anchor, skipping");
        return None;
    };

    let link = anchor.value().attr("href").unwrap_or_default().trim();
    if link.is_empty() {
        warn!("result section without link, skipping");
        return None;
    }

    let title = anchor.text().collect::<String>().trim().to_string();

    // First child division holds the free-text description. Spacing inside
    // it is significant, only the surrounding line breaks are markup.
    let description = body
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "div")
        .map(|div| {
            div.text()
                .collect::<String>()
                .trim_matches(['\r', '\n'])
                .to_string()
        })
        .unwrap_or_default();

    let downloads = parse_downloads(body.text());

    Some(Subtitle::new(title, description, downloads, link))
}

/// Read the download counter from the text fragments of a result body
///
/// The counter is the fragment right after the first one containing
/// "downloads" (case-insensitive), with every non-digit removed. Returns 0
/// when there is no label or the following fragment holds no number.
pub fn parse_downloads<'a, I>(fragments: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fragments = fragments.into_iter();

    let has_label = fragments
        .by_ref()
        .any(|fragment| fragment.to_lowercase().contains(DOWNLOADS_LABEL));
    if !has_label {
        return 0;
    }

    let Some(value) = fragments.next() else {
        return 0;
    };

    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    match digits.parse() {
        Ok(downloads) => downloads,
        Err(_) => {
            debug!(fragment = value, "unreadable download counter");
            0
        }
    }
}

/// Read the total page count from the last pager block
///
/// The pager ends with a "next" anchor, so the last numbered page is the
/// second-to-last anchor. Returns 0 when there is no pager or it is too short.
fn parse_total_pages(document: &Html) -> u32 {
    let Some(pager) = document.select(&PAGINATION_SELECTOR).last() else {
        return 0;
    };

    let anchors: Vec<ElementRef<'_>> = pager.select(&ANCHOR_SELECTOR).collect();
    if anchors.len() < 2 {
        return 0;
    }

    let text = anchors[anchors.len() - 2].text().collect::<String>();
    match text.trim().parse() {
        Ok(pages) => pages,
        Err(_) => {
            debug!(text = text.trim(), "non-numeric last page anchor");
            0
        }
    }
}

/// Find the archive link on a subtitle detail page
///
/// The primary download button (`a.link1`) wins. Otherwise the last
/// `a.detalle_link` whose text reads "download" is used. Relative links are
/// joined with `origin`.
pub fn parse_download_link(html: &str, origin: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    let primary = document
        .select(&PRIMARY_LINK_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty());

    if let Some(href) = primary {
        return join(origin, href);
    }

    let fallback = document
        .select(&DETAIL_LINK_SELECTOR)
        .filter(|anchor| {
            anchor
                .text()
                .collect::<String>()
                .trim()
                .eq_ignore_ascii_case("download")
        })
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .last()?;

    join(origin, fallback)
}

fn join(origin: &Url, href: &str) -> Option<String> {
    match origin.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(href, error = %e, "unusable download link");
            None
        }
    }
}
