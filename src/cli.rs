use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the essays as markdown files.
    Fetch(FetchArgs),
    /// Remove generated files.
    Clean(RootArgs),
    /// Merge all essays into a single markdown file using pandoc.
    Merge(RootArgs),
    /// Create an EPUB using pandoc.
    Epub(RootArgs),
    /// Create a PDF via calibre's ebook-convert.
    Pdf(RootArgs),
    /// Count total words and articles.
    Wordcount(RootArgs),
    /// Run clean, fetch, merge, epub, and wordcount.
    All(FetchArgs),
}

#[derive(Debug, Args)]
pub struct RootArgs {
    /// Project root where outputs are stored (default: current directory).
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Project root where outputs are stored (default: current directory).
    #[arg(long)]
    pub root: Option<String>,

    /// Delay after each request (politeness).
    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Skip writing the `essays.csv` metadata index.
    #[arg(long)]
    pub no_csv: bool,

    /// Optional path for the CSV export (default: `<root>/essays.csv`).
    #[arg(long)]
    pub csv_path: Option<String>,

    /// Base URL of the essay collection (must end with `/`).
    #[arg(long, default_value = "https://paulgraham.com/")]
    pub base_url: String,

    /// Index page path, relative to the base URL.
    #[arg(long, default_value = "articles.html")]
    pub articles_url: String,
}
