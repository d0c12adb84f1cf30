use std::fs::File;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context as _;
use regex::Regex;
use serde::Serialize;

use crate::cli::FetchArgs;
use crate::convert::{Html2mdConverter, HtmlToMarkdown, decode_page};
use crate::date::{HeuristicDates, InferDate, resolve_date};
use crate::error::FetchError;
use crate::footnotes::rewrite_footnotes;
use crate::normalize::reflow;
use crate::source::{AUTHOR, EssaySource};
use crate::toc::{TocEntry, parse_index};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Older index snapshots carry links with a second scheme embedded after the
/// site's own origin; everything up through that origin is dropped.
const MALFORMED_URL_PREFIX: &str = "http://www.paulgraham.com/https://";

/// Converter artifact: the "back to index" link every essay page starts with.
const INDEX_BACKLINK_ARTIFACT: &str = "[](index.html)  \n  \n";

const CSV_HEADER: [&str; 7] = [
    "Article no.",
    "Title",
    "Description",
    "Date",
    "Author",
    "URL",
    "Filename",
];

/// One row of the CSV index; written once per successfully converted essay.
#[derive(Debug, Clone, Serialize)]
pub struct EssayRecord {
    #[serde(rename = "Article no.")]
    pub index: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Filename")]
    pub filename: String,
}

/// Per-item status sink, injected so runs can be observed in tests without
/// capturing stdout.
pub trait Reporter {
    fn line(&mut self, message: &str);
}

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn line(&mut self, message: &str) {
        println!("{message}");
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub output_dir: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub delay: Duration,
}

pub fn run(args: &FetchArgs) -> anyhow::Result<usize> {
    let root = crate::workspace::resolve_root(args.root.as_deref())?;
    let csv_path = if args.no_csv {
        None
    } else {
        Some(
            args.csv_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| root.join("essays.csv")),
        )
    };
    let options = FetchOptions {
        output_dir: root.join("essays"),
        csv_path,
        delay: Duration::from_millis(args.delay_ms),
    };
    let source = EssaySource::new(args.base_url.clone(), args.articles_url.clone());

    let count = fetch_essays(
        &options,
        &source,
        &Html2mdConverter,
        &HeuristicDates,
        &mut ConsoleReporter,
    )?;
    Ok(count)
}

/// Drives the whole pipeline: fetch the index, then fetch, convert and write
/// each essay in ascending chronological order. Only configuration and
/// index-fetch failures abort the run; anything that goes wrong on a single
/// essay is reported and skipped, and its index stays consumed so filenames
/// are stable across reruns of the same index snapshot.
///
/// Returns the number of successfully processed essays.
pub fn fetch_essays(
    options: &FetchOptions,
    source: &EssaySource,
    converter: &dyn HtmlToMarkdown,
    dates: &dyn InferDate,
    reporter: &mut dyn Reporter,
) -> Result<usize, FetchError> {
    source.validate()?;

    std::fs::create_dir_all(&options.output_dir)?;
    if let Some(csv_path) = &options.csv_path
        && csv_path.exists()
    {
        std::fs::remove_file(csv_path)?;
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(FetchError::Client)?;

    let index_url = source.index_url();
    let response = client
        .get(&index_url)
        .send()
        .map_err(|source| FetchError::IndexRequest {
            url: index_url.clone(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::IndexStatus {
            url: index_url,
            status: status.as_u16(),
        });
    }
    let index_html = response.text().map_err(|source| FetchError::IndexRequest {
        url: index_url.clone(),
        source,
    })?;

    // The site lists newest first; reversing assigns ascending chronological
    // indices starting at 1.
    let mut toc = parse_index(source, &index_html);
    toc.reverse();
    reporter.line(&format!("Found {} essays.", toc.len()));

    let mut csv_writer = match &options.csv_path {
        Some(csv_path) => {
            let file = File::create(csv_path)?;
            let mut writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .terminator(csv::Terminator::Any(b'\n'))
                .has_headers(false)
                .from_writer(file);
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
            Some(writer)
        }
        None => None,
    };

    let mut success_count = 0usize;
    for (position, entry) in toc.iter().enumerate() {
        let index = position + 1;
        match process_entry(
            options,
            &client,
            converter,
            dates,
            index,
            entry,
            csv_writer.as_mut(),
        ) {
            Ok(()) => {
                reporter.line(&format!("✅ {index:03} {}", entry.title));
                success_count += 1;
            }
            Err(err) => {
                tracing::debug!(index, title = %entry.title, ?err, "essay failed");
                reporter.line(&format!("❌ {index:03} {}, ({err:#})", entry.title));
            }
        }
        std::thread::sleep(options.delay);
    }

    reporter.line(&format!("Downloaded {success_count} essays."));
    Ok(success_count)
}

fn process_entry(
    options: &FetchOptions,
    client: &reqwest::blocking::Client,
    converter: &dyn HtmlToMarkdown,
    dates: &dyn InferDate,
    index: usize,
    entry: &TocEntry,
    csv_writer: Option<&mut csv::Writer<File>>,
) -> anyhow::Result<()> {
    let url = normalize_essay_url(&entry.url);

    let response = client.get(&url).send().with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned status {status}");
    }
    let bytes = response.bytes().context("read page body")?;
    let content = decode_page(bytes.as_ref());

    let parsed = converter.convert(&content);
    let date = resolve_date(&content, dates);
    let description = extract_description(&parsed);

    let filename = format!("{index:03}_{}.md", slugify(&entry.title));
    let output_path = options.output_dir.join(&filename);

    let body = parsed.replace(INDEX_BACKLINK_ARTIFACT, "");
    let body = rewrite_footnotes(&reflow(&body));

    let mut document = front_matter(&entry.title, &description, date.as_deref());
    document.push_str(&format!("# {index:03} {}\n\n", entry.title));
    document.push_str(&body);

    std::fs::write(&output_path, document)
        .with_context(|| format!("write essay: {}", output_path.display()))?;

    if let Some(writer) = csv_writer {
        writer
            .serialize(EssayRecord {
                index: format!("{index:03}"),
                title: entry.title.clone(),
                description,
                date: date.unwrap_or_default(),
                author: AUTHOR.to_owned(),
                url,
                filename,
            })
            .context("append csv row")?;
        writer.flush().context("flush csv row")?;
    }

    Ok(())
}

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\W\s]+").expect("slug pattern must compile"));

/// Filesystem-safe derivation of a title: lower-cased, words joined with
/// underscores, everything that is not a word character removed. Idempotent.
pub fn slugify(title: &str) -> String {
    let joined = title.split(' ').collect::<Vec<_>>().join("_").to_lowercase();
    NON_WORD.replace_all(&joined, "").into_owned()
}

fn normalize_essay_url(url: &str) -> String {
    if url.contains(MALFORMED_URL_PREFIX) {
        url.replace(MALFORMED_URL_PREFIX, "https://")
    } else {
        url.to_owned()
    }
}

/// First line of the converted text long enough to work as a description.
fn extract_description(parsed: &str) -> String {
    parsed
        .lines()
        .map(str::trim)
        .find(|line| line.chars().count() >= 20)
        .map(str::to_owned)
        .unwrap_or_default()
}

fn front_matter(title: &str, description: &str, date: Option<&str>) -> String {
    format!(
        "---\ntitle: \"{}\"\ndescription: \"{}\"\ndate: \"{}\"\nauthor: \"{AUTHOR}\"\n---\n",
        escape(title),
        escape(description),
        escape(date.unwrap_or_default()),
    )
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
