use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use essaybook::cli::{Cli, Command, FetchArgs, RootArgs};

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    essaybook::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Fetch(args) => {
            essaybook::fetch::run(&args).context("fetch")?;
        }
        Command::Clean(args) => {
            essaybook::workspace::clean(&root(&args)?).context("clean")?;
            println!("Cleaned generated files.");
        }
        Command::Merge(args) => {
            essaybook::export::merge(&root(&args)?).context("merge")?;
            println!("Wrote graham.md.");
        }
        Command::Epub(args) => {
            essaybook::export::epub(&root(&args)?).context("epub")?;
            println!("Wrote graham.epub.");
        }
        Command::Pdf(args) => {
            essaybook::export::pdf(&root(&args)?).context("pdf")?;
            println!("Wrote graham.pdf.");
        }
        Command::Wordcount(args) => {
            print_wordcount(&root(&args)?)?;
        }
        Command::All(args) => {
            run_all(&args).context("all")?;
        }
    }

    Ok(())
}

fn root(args: &RootArgs) -> anyhow::Result<std::path::PathBuf> {
    essaybook::workspace::resolve_root(args.root.as_deref())
}

fn print_wordcount(root: &std::path::Path) -> anyhow::Result<()> {
    let count = essaybook::workspace::wordcount(root).context("wordcount")?;
    println!("Total words: {}", count.words);
    println!("Total articles: {}", count.articles);
    Ok(())
}

fn run_all(args: &FetchArgs) -> anyhow::Result<()> {
    let root = essaybook::workspace::resolve_root(args.root.as_deref())?;
    essaybook::workspace::clean(&root).context("clean")?;
    essaybook::fetch::run(args).context("fetch")?;
    essaybook::export::merge(&root).context("merge")?;
    essaybook::export::epub(&root).context("epub")?;
    print_wordcount(&root)
}
