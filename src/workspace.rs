use std::path::{Path, PathBuf};

use anyhow::Context as _;

pub fn resolve_root(root: Option<&str>) -> anyhow::Result<PathBuf> {
    match root {
        Some(path) => Ok(PathBuf::from(path)),
        None => std::env::current_dir().context("resolve current directory"),
    }
}

/// Removes everything a run generates under the project root. Idempotent.
pub fn clean(root: &Path) -> anyhow::Result<()> {
    let essays_dir = root.join("essays");
    if essays_dir.is_dir() {
        std::fs::remove_dir_all(&essays_dir)
            .with_context(|| format!("remove {}", essays_dir.display()))?;
    }

    for name in ["graham.epub", "graham.pdf", "graham.md", "essays.csv"] {
        let path = root.join(name);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct WordCount {
    pub words: usize,
    pub articles: usize,
}

pub fn wordcount(root: &Path) -> anyhow::Result<WordCount> {
    let essays_dir = root.join("essays");
    if !essays_dir.exists() {
        anyhow::bail!(
            "essays directory not found: {} (run fetch first)",
            essays_dir.display()
        );
    }

    let files = sorted_markdown_files(&essays_dir)?;
    let mut words = 0usize;
    for path in &files {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        words += contents.split_whitespace().count();
    }

    Ok(WordCount {
        words,
        articles: files.len(),
    })
}

/// Markdown files in a directory, sorted by filename. The fetch step embeds
/// the chronological index in each name, so this is also corpus order.
pub fn sorted_markdown_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry.context("read dir entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_generated_files_and_is_idempotent() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir(temp.path().join("essays"))?;
        std::fs::write(temp.path().join("essays").join("001_a.md"), "# 001 A\n")?;
        std::fs::write(temp.path().join("graham.md"), "merged")?;
        std::fs::write(temp.path().join("essays.csv"), "header")?;

        clean(temp.path())?;
        assert!(!temp.path().join("essays").exists());
        assert!(!temp.path().join("graham.md").exists());
        assert!(!temp.path().join("essays.csv").exists());

        clean(temp.path())?;
        Ok(())
    }

    #[test]
    fn wordcount_sums_words_across_essays() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let essays_dir = temp.path().join("essays");
        std::fs::create_dir(&essays_dir)?;
        std::fs::write(essays_dir.join("001_a.md"), "one two three")?;
        std::fs::write(essays_dir.join("002_b.md"), "four five")?;
        std::fs::write(essays_dir.join("notes.txt"), "not counted")?;

        let count = wordcount(temp.path())?;
        assert_eq!(count.words, 5);
        assert_eq!(count.articles, 2);
        Ok(())
    }

    #[test]
    fn wordcount_requires_the_essays_directory() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        assert!(wordcount(temp.path()).is_err());
    }

    #[test]
    fn markdown_files_come_back_in_filename_order() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("002_b.md"), "")?;
        std::fs::write(temp.path().join("001_a.md"), "")?;
        std::fs::write(temp.path().join("010_c.md"), "")?;

        let names = sorted_markdown_files(temp.path())?
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["001_a.md", "002_b.md", "010_c.md"]);
        Ok(())
    }
}
