use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;

use crate::workspace::sorted_markdown_files;

/// Concatenates all essays into `graham.md` via pandoc, in filename order.
pub fn merge(root: &Path) -> anyhow::Result<()> {
    let inputs = essay_inputs(root)?;
    let out = root.join("graham.md");
    tracing::info!(out = %out.display(), essays = inputs.len(), "merge via pandoc");

    run_tool("pandoc", &input_args(&inputs, &out))
}

/// Builds `graham.epub` via pandoc. The book metadata descriptor and cover
/// image are expected at fixed paths under the project root.
pub fn epub(root: &Path) -> anyhow::Result<()> {
    let inputs = essay_inputs(root)?;
    let out = root.join("graham.epub");
    let metadata = root.join("metadata.yaml");
    let cover = root.join("cover.png");
    tracing::info!(out = %out.display(), essays = inputs.len(), "epub via pandoc");

    let mut args = input_args(&inputs, &out);
    args.push(OsString::from("-t"));
    args.push(OsString::from("epub3"));
    args.push(OsString::from("-f"));
    args.push(OsString::from("markdown"));
    args.push(OsString::from("--metadata-file"));
    args.push(metadata.into_os_string());
    args.push(OsString::from("--toc"));
    args.push(OsString::from("--toc-depth=1"));
    args.push(OsString::from("--epub-cover-image"));
    args.push(cover.into_os_string());

    run_tool("pandoc", &args)
}

/// Converts the pre-built EPUB to `graham.pdf` via calibre's ebook-convert.
pub fn pdf(root: &Path) -> anyhow::Result<()> {
    let epub_path = root.join("graham.epub");
    if !epub_path.exists() {
        anyhow::bail!(
            "epub not found: {} (run epub first)",
            epub_path.display()
        );
    }
    let out = root.join("graham.pdf");
    tracing::info!(out = %out.display(), "pdf via ebook-convert");

    run_tool(
        "ebook-convert",
        &[epub_path.into_os_string(), out.into_os_string()],
    )
}

fn essay_inputs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let essays_dir = root.join("essays");
    if !essays_dir.exists() {
        anyhow::bail!(
            "essays directory not found: {} (run fetch first)",
            essays_dir.display()
        );
    }
    let inputs = sorted_markdown_files(&essays_dir)?;
    if inputs.is_empty() {
        anyhow::bail!("no essays to export in {}", essays_dir.display());
    }
    Ok(inputs)
}

fn input_args(inputs: &[PathBuf], out: &Path) -> Vec<OsString> {
    let mut args = inputs
        .iter()
        .map(|path| path.as_os_str().to_owned())
        .collect::<Vec<_>>();
    args.push(OsString::from("-o"));
    args.push(out.as_os_str().to_owned());
    args
}

fn run_tool(tool: &str, args: &[OsString]) -> anyhow::Result<()> {
    let output = match Command::new(tool).args(args).output() {
        Ok(output) => output,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            anyhow::bail!("missing required tool: {tool}; install it and ensure it is on PATH");
        }
        Err(err) => return Err(err).with_context(|| format!("run {tool}")),
    };

    if !output.status.success() {
        anyhow::bail!(
            "{tool} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_require_the_essays_directory() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        assert!(merge(temp.path()).is_err());
        assert!(epub(temp.path()).is_err());
    }

    #[test]
    fn pdf_requires_a_prebuilt_epub() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        let err = pdf(temp.path()).unwrap_err();
        assert!(err.to_string().contains("run epub first"));
    }

    #[test]
    fn merge_passes_only_inputs_and_the_output_flag() {
        let inputs = vec![PathBuf::from("001_a.md"), PathBuf::from("002_b.md")];
        let args = input_args(&inputs, Path::new("graham.md"));
        assert_eq!(
            args,
            vec![
                OsString::from("001_a.md"),
                OsString::from("002_b.md"),
                OsString::from("-o"),
                OsString::from("graham.md"),
            ]
        );
    }

    #[test]
    fn empty_essay_directories_are_rejected() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir(temp.path().join("essays"))?;
        assert!(essay_inputs(temp.path()).is_err());
        Ok(())
    }
}
