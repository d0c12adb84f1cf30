use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::source::EssaySource;

/// One chapter link from the index page, in document order (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub url: String,
}

/// Recovers the ordered list of essay links from the index page.
///
/// The index lays its chapter list out as a table nested inside the page
/// table. A cell counts as a chapter cell when it carries the site's small
/// bullet icon (both declared dimensions at most 15) next to a `<font>`
/// wrapped link. Pages without the nested-table structure yield an empty
/// list, which is a degenerate but valid result.
pub fn parse_index(source: &EssaySource, html: &str) -> Vec<TocEntry> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse("table table td").expect("cell selector must parse");
    let img_selector = Selector::parse("img").expect("img selector must parse");
    let link_selector = Selector::parse("font a[href]").expect("link selector must parse");

    let base = Url::parse(&source.base_url).ok();

    let mut entries = Vec::new();
    for cell in document.select(&cell_selector) {
        if !has_bullet_icon(&cell, &img_selector) {
            continue;
        }
        let Some(link) = cell.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let Some(url) = resolve_href(base.as_ref(), href) else {
            tracing::debug!(href, "skipping chapter link with unresolvable href");
            continue;
        };

        entries.push(TocEntry {
            title: link.text().collect::<String>(),
            url,
        });
    }

    entries
}

fn has_bullet_icon(cell: &ElementRef<'_>, img_selector: &Selector) -> bool {
    let Some(img) = cell.select(img_selector).next() else {
        return false;
    };
    matches!(
        (
            declared_dimension(&img, "width"),
            declared_dimension(&img, "height"),
        ),
        (Some(width), Some(height)) if width <= 15 && height <= 15
    )
}

fn declared_dimension(img: &ElementRef<'_>, attr: &str) -> Option<u32> {
    match img.value().attr(attr) {
        Some(value) => value.trim().parse().ok(),
        None => Some(0),
    }
}

fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(|url| url.to_string()),
        None => Url::parse(href).ok().map(|url| url.to_string()),
    }
}
