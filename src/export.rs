use crate::hash::content_hash;
use crate::models::{Book, Books};
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

const BULLET_PREFIX: &str = "- ";
const CONTINUATION_INDENT: &str = "  ";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNKNOWN_DATE: &str = "unknown";
const FRONT_MATTER_FENCE: &str = "---\n";
const FRONT_MATTER_CLOSE: &str = "\n---\n";

pub const DEFAULT_TEMPLATE: &str = "---
title: \"{{title}}\"
author: \"{{author}}\"
first_highlight: {{first_highlight}}
last_highlight: {{last_highlight}}
---

# {{title}}

{{highlights}}";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to list output directory {path}: {source}")]
    ListFailed {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExportError {
    fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> ExportError + 'a {
        move |source| ExportError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Content hashes of the bullets already present in each output file, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingIndex {
    files: HashMap<String, HashSet<String>>,
}

impl ExistingIndex {
    pub fn get(&self, filename: &str) -> Option<&HashSet<String>> {
        self.files.get(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportSummary {
    pub created: usize,
    pub appended: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppendReport {
    pub written: usize,
    pub skipped: usize,
}

/// Scans `*.md` files directly inside `output_dir`. A missing directory yields an empty index.
pub fn read_existing_export(output_dir: &Path) -> Result<ExistingIndex, ExportError> {
    let mut index = ExistingIndex::default();

    if !output_dir.exists() {
        return Ok(index);
    }

    for entry in WalkDir::new(output_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ExportError::ListFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(ExportError::io("read", path))?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        index.files.insert(filename, scan_bullets(&content));
    }

    if !index.is_empty() {
        info!(books = index.len(), dir = %output_dir.display(), "found existing books in output directory");
    }

    Ok(index)
}

/// Hashes every `- ` bullet, folding indented continuation lines into it.
pub fn scan_bullets(content: &str) -> HashSet<String> {
    let mut hashes = HashSet::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(BULLET_PREFIX) {
            if let Some(done) = current.replace(rest.to_string()) {
                hashes.insert(content_hash(done.trim()));
            }
        } else if current.is_some() && line.starts_with(CONTINUATION_INDENT) {
            if let Some(item) = current.as_mut() {
                item.push('\n');
                item.push_str(&line[CONTINUATION_INDENT.len()..]);
            }
        } else if let Some(done) = current.take() {
            hashes.insert(content_hash(done.trim()));
        }
    }

    if let Some(done) = current {
        hashes.insert(content_hash(done.trim()));
    }

    hashes
}

/// One highlight as a Markdown bullet; extra lines are indented under it.
pub fn render_bullet(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for (i, line) in text.lines().enumerate() {
        out.push_str(if i == 0 { BULLET_PREFIX } else { CONTINUATION_INDENT });
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Escapes a value for a double-quoted YAML scalar.
fn yaml_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn fill(part: &str, book: &Book, highlights: &str, escape: bool) -> String {
    let (title, author) = if escape {
        (yaml_escape(&book.title), yaml_escape(&book.author))
    } else {
        (book.title.clone(), book.author.clone())
    };

    part.replace("{{title}}", &title)
        .replace("{{author}}", &author)
        .replace("{{first_highlight}}", &format_date(book.first_highlight_date))
        .replace("{{last_highlight}}", &format_date(book.last_highlight_date))
        .replace("{{highlights}}", highlights)
}

/// Fills the template; values inside a leading `---` front matter block are YAML-escaped.
pub fn render_book(book: &Book, template: &str) -> String {
    let highlights: String = book.highlights.iter().map(|h| render_bullet(&h.text)).collect();

    let front_matter_end = template
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|rest| rest.find(FRONT_MATTER_CLOSE))
        .map(|pos| FRONT_MATTER_FENCE.len() + pos + FRONT_MATTER_CLOSE.len());

    match front_matter_end {
        Some(end) => {
            let (front, body) = template.split_at(end);
            fill(front, book, &highlights, true) + &fill(body, book, &highlights, false)
        }
        None => fill(template, book, &highlights, false),
    }
}

/// Writes a fresh file for the book, replacing anything at that path.
pub fn create_full(output_dir: &Path, book: &Book, template: &str) -> Result<(), ExportError> {
    let path = output_dir.join(&book.filename);
    let mut file = File::create(&path).map_err(ExportError::io("create", &path))?;

    file.write_all(render_book(book, template).as_bytes())
        .map_err(ExportError::io("write", &path))?;

    info!(file = %book.filename, highlights = book.highlights.len(), "created book");
    Ok(())
}

/// Appends the book's highlights whose hash is not in `existing`.
pub fn append_new(
    output_dir: &Path,
    book: &Book,
    existing: &HashSet<String>,
) -> Result<AppendReport, ExportError> {
    let path = output_dir.join(&book.filename);
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(&path)
        .map_err(ExportError::io("open", &path))?;

    info!(file = %book.filename, highlights = book.highlights.len(), "found highlights");

    let mut needs_newline = !ends_with_newline(&mut file).map_err(ExportError::io("read", &path))?;

    let mut report = AppendReport::default();
    for highlight in &book.highlights {
        let hash = content_hash(&highlight.text);
        if existing.contains(&hash) {
            report.skipped += 1;
            continue;
        }

        if needs_newline {
            file.write_all(b"\n").map_err(ExportError::io("write", &path))?;
            needs_newline = false;
        }

        file.write_all(render_bullet(&highlight.text).as_bytes())
            .map_err(ExportError::io("write", &path))?;
        report.written += 1;
        debug!(%hash, file = %book.filename, "appended highlight");
    }

    if report.skipped > 0 {
        info!(file = %book.filename, skipped = report.skipped, "skipped highlights");
    }

    Ok(report)
}

/// An empty file counts as terminated.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;

    Ok(last[0] == b'\n')
}

pub fn write_books(
    output_dir: &Path,
    books: &Books,
    existing: &ExistingIndex,
    template: &str,
) -> Result<ExportSummary, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(ExportError::io("create directory", output_dir))?;

    let mut summary = ExportSummary::default();
    for book in books.iter() {
        match existing.get(&book.filename) {
            Some(hashes) => {
                let report = append_new(output_dir, book, hashes)?;
                summary.appended += report.written;
                summary.skipped += report.skipped;
            }
            None => {
                create_full(output_dir, book, template)?;
                summary.created += 1;
            }
        }
    }

    Ok(summary)
}

/// Reads a template file, or falls back to [`DEFAULT_TEMPLATE`].
pub fn load_template(path: Option<&Path>) -> Result<String, ExportError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(ExportError::io("read template", path)),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Highlight;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn make_book(texts: &[&str]) -> Book {
        let date = NaiveDate::from_ymd_opt(2013, 12, 1)
            .unwrap()
            .and_hms_opt(19, 49, 48);
        Book {
            title: "Book One".to_string(),
            author: "Author A".to_string(),
            filename: "Book One - Author A.md".to_string(),
            first_highlight_date: date,
            last_highlight_date: None,
            highlights: texts
                .iter()
                .map(|t| Highlight {
                    date,
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_default_template() {
        let rendered = render_book(&make_book(&["one", "two\nlines"]), DEFAULT_TEMPLATE);

        assert_eq!(
            rendered,
            "---\ntitle: \"Book One\"\nauthor: \"Author A\"\nfirst_highlight: 2013-12-01 19:49:48\n\
last_highlight: unknown\n---\n\n# Book One\n\n- one\n- two\n  lines\n"
        );
    }

    #[test]
    fn test_front_matter_values_are_escaped() {
        let mut book = make_book(&["one"]);
        book.title = r#"The "Quoted" \ Title"#.to_string();

        let rendered = render_book(&book, DEFAULT_TEMPLATE);

        assert!(rendered.contains(r#"title: "The \"Quoted\" \\ Title""#));
        assert!(rendered.contains(r#"# The "Quoted" \ Title"#));
    }

    #[test]
    fn test_template_without_front_matter_is_not_escaped() {
        let mut book = make_book(&["one"]);
        book.title = r#"A "B""#.to_string();

        assert_eq!(render_book(&book, "{{title}}\n{{highlights}}"), "A \"B\"\n- one\n");
    }

    #[test]
    fn test_scan_bullets_ignores_other_lines() {
        let hashes = scan_bullets("# Title\n\nsome prose\n-not a bullet\n- kept  \n");

        assert_eq!(hashes.len(), 1);
        assert!(hashes.contains(&content_hash("kept")));
    }

    #[test]
    fn test_scan_bullets_folds_continuation_lines() {
        let text = "first\n\nthird";
        let hashes = scan_bullets(&format!("# T\n{}- next\n", render_bullet(text)));

        assert!(hashes.contains(&content_hash(text)));
        assert!(hashes.contains(&content_hash("next")));
        assert_eq!(hashes.len(), 2);
    }

    #[test]
    fn test_read_existing_export_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();

        let index = read_existing_export(&dir.path().join("nope")).unwrap();

        assert!(index.is_empty());
    }

    #[test]
    fn test_read_existing_export_only_markdown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A - B.md"), "- one\n- two\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "- ignored\n").unwrap();

        let index = read_existing_export(dir.path()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("A - B.md").unwrap().len(), 2);
    }

    #[test]
    fn test_create_full_then_rescan_matches_all() {
        let dir = TempDir::new().unwrap();
        let book = make_book(&["one", "two\n\nparagraphs"]);

        create_full(dir.path(), &book, DEFAULT_TEMPLATE).unwrap();
        let index = read_existing_export(dir.path()).unwrap();

        let hashes = index.get(&book.filename).unwrap();
        for h in &book.highlights {
            assert!(hashes.contains(&content_hash(&h.text)));
        }
    }

    #[test]
    fn test_append_new_skips_known_hashes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Book One - Author A.md");
        fs::write(&path, "# Book One\n\n- one\n").unwrap();
        let existing = scan_bullets(&fs::read_to_string(&path).unwrap());

        let report = append_new(dir.path(), &make_book(&["one", "two"]), &existing).unwrap();

        assert_eq!(report, AppendReport { written: 1, skipped: 1 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Book One\n\n- one\n- two\n");
    }

    #[test]
    fn test_append_new_terminates_last_line_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Book One - Author A.md");
        fs::write(&path, "# Book One\n\n- old").unwrap();
        let existing = scan_bullets(&fs::read_to_string(&path).unwrap());

        let report = append_new(dir.path(), &make_book(&["old", "new text"]), &existing).unwrap();

        assert_eq!(report, AppendReport { written: 1, skipped: 1 });
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Book One\n\n- old\n- new text\n"
        );
    }

    #[test]
    fn test_append_new_leaves_unterminated_file_alone_when_nothing_new() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Book One - Author A.md");
        fs::write(&path, "- old").unwrap();
        let existing = scan_bullets("- old");

        append_new(dir.path(), &make_book(&["old"]), &existing).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "- old");
    }

    #[test]
    fn test_append_new_to_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Book One - Author A.md");
        fs::write(&path, "").unwrap();

        append_new(dir.path(), &make_book(&["new"]), &HashSet::new()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "- new\n");
    }

    #[test]
    fn test_append_new_missing_file_is_error() {
        let dir = TempDir::new().unwrap();

        let result = append_new(dir.path(), &make_book(&["one"]), &HashSet::new());

        assert!(matches!(result, Err(ExportError::Io { op: "open", .. })));
    }

    #[test]
    fn test_write_books_picks_mode_per_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("highlights");
        let mut other = make_book(&["x"]);
        other.title = "Other".to_string();
        other.filename = "Other - Author A.md".to_string();
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("Other - Author A.md"), "- x\n").unwrap();
        let existing = read_existing_export(&out).unwrap();

        let books = Books(vec![make_book(&["one"]), other]);
        let summary = write_books(&out, &books, &existing, DEFAULT_TEMPLATE).unwrap();

        assert_eq!(summary, ExportSummary { created: 1, appended: 0, skipped: 1 });
        assert!(out.join("Book One - Author A.md").exists());
    }

    #[test]
    fn test_load_template_default_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tmpl");
        fs::write(&path, "{{title}}\n{{highlights}}").unwrap();

        assert_eq!(load_template(None).unwrap(), DEFAULT_TEMPLATE);
        assert_eq!(load_template(Some(&path)).unwrap(), "{{title}}\n{{highlights}}");
        assert!(load_template(Some(&dir.path().join("missing"))).is_err());
    }
}
