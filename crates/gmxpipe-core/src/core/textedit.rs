use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextEditError {
    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Anchor line '{anchor}' not found in '{path}'", path = path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    #[error("Line index {index} is out of range for '{path}' ({count} lines)", path = path.display())]
    LineOutOfRange {
        path: PathBuf,
        index: usize,
        count: usize,
    },

    #[error("Malformed coordinate file '{path}': {reason}", path = path.display())]
    MalformedCoordinates { path: PathBuf, reason: String },
}

/// A single mutation of a text file in the working directory.
///
/// Paths are stored relative to the working directory and resolved when the
/// edit is applied, since most target files only come into existence while
/// the pipeline is running.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEdit {
    /// Append a block of text at the end of the file. Applying the same
    /// append twice duplicates the block; callers own deduplication.
    AppendBlock { path: String, text: String },
    /// Insert a block after the first line equal to `anchor`. A missing
    /// anchor is a hard error, not a silent no-op.
    InsertAfter {
        path: String,
        anchor: String,
        text: String,
    },
    /// Replace line `index` (0-based), keeping every other line untouched.
    ReplaceLine {
        path: String,
        index: usize,
        text: String,
    },
    /// Replace every literal occurrence of `token`. Zero occurrences leaves
    /// the file byte-identical.
    SubstituteToken {
        path: String,
        token: String,
        value: String,
    },
    /// Splice the atom records of a `.gro` coordinate file into another,
    /// inserting them ahead of the box line and fixing the atom-count line.
    MergeCoordinates { target: String, source: String },
}

impl TextEdit {
    pub fn apply(&self, dir: &Path) -> Result<(), TextEditError> {
        match self {
            TextEdit::AppendBlock { path, text } => append_block(&dir.join(path), text),
            TextEdit::InsertAfter { path, anchor, text } => {
                insert_after(&dir.join(path), anchor, text)
            }
            TextEdit::ReplaceLine { path, index, text } => {
                replace_line(&dir.join(path), *index, text)
            }
            TextEdit::SubstituteToken { path, token, value } => {
                substitute_token(&dir.join(path), token, value)
            }
            TextEdit::MergeCoordinates { target, source } => {
                merge_coordinates(&dir.join(target), &dir.join(source))
            }
        }
    }

    /// One-line human-readable description, used by plan printing and logs.
    pub fn describe(&self) -> String {
        match self {
            TextEdit::AppendBlock { path, .. } => format!("append block to '{}'", path),
            TextEdit::InsertAfter { path, anchor, .. } => {
                format!("insert into '{}' after '{}'", path, anchor)
            }
            TextEdit::ReplaceLine { path, index, .. } => {
                format!("replace line {} of '{}'", index, path)
            }
            TextEdit::SubstituteToken { path, token, value } => {
                format!("substitute '{}' -> '{}' in '{}'", token, value, path)
            }
            TextEdit::MergeCoordinates { target, source } => {
                format!("merge coordinates of '{}' into '{}'", source, target)
            }
        }
    }
}

fn read(path: &Path) -> Result<String, TextEditError> {
    fs::read_to_string(path).map_err(|source| TextEditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), TextEditError> {
    fs::write(path, content).map_err(|source| TextEditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits content into lines, each retaining its own terminator.
fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(String::from).collect()
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

pub fn append_block(path: &Path, text: &str) -> Result<(), TextEditError> {
    let mut content = read(path)?;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(text);
    if !text.ends_with('\n') {
        content.push('\n');
    }
    write(path, &content)
}

pub fn insert_after(path: &Path, anchor: &str, text: &str) -> Result<(), TextEditError> {
    let content = read(path)?;
    let mut lines = split_lines(&content);
    let position = lines
        .iter()
        .position(|line| strip_terminator(line) == anchor)
        .ok_or_else(|| TextEditError::AnchorNotFound {
            path: path.to_path_buf(),
            anchor: anchor.to_string(),
        })?;

    let mut block = text.to_string();
    if !block.ends_with('\n') {
        block.push('\n');
    }
    // The anchor may be the last line of a file without a trailing newline.
    if !lines[position].ends_with('\n') {
        lines[position].push('\n');
    }
    lines.insert(position + 1, block);
    write(path, &lines.concat())
}

pub fn replace_line(path: &Path, index: usize, text: &str) -> Result<(), TextEditError> {
    let content = read(path)?;
    let mut lines = split_lines(&content);
    if index >= lines.len() {
        return Err(TextEditError::LineOutOfRange {
            path: path.to_path_buf(),
            index,
            count: lines.len(),
        });
    }
    let terminator = if lines[index].ends_with('\n') { "\n" } else { "" };
    lines[index] = format!("{}{}", text, terminator);
    write(path, &lines.concat())
}

pub fn substitute_token(path: &Path, token: &str, value: &str) -> Result<(), TextEditError> {
    let content = read(path)?;
    if !content.contains(token) {
        return Ok(());
    }
    write(path, &content.replace(token, value))
}

/// Atom-record span of a `.gro` file: title line, count line, `count` atom
/// records, then the box line.
fn gro_atom_lines(path: &Path, content: &str) -> Result<(usize, Vec<String>), TextEditError> {
    let lines = split_lines(content);
    let malformed = |reason: &str| TextEditError::MalformedCoordinates {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    if lines.len() < 3 {
        return Err(malformed("fewer than three lines"));
    }
    let count: usize = strip_terminator(&lines[1])
        .trim()
        .parse()
        .map_err(|_| malformed("atom-count line is not an integer"))?;
    if lines.len() < count + 3 {
        return Err(malformed("fewer atom records than the count line declares"));
    }
    Ok((count, lines[2..2 + count].to_vec()))
}

pub fn merge_coordinates(target: &Path, source: &Path) -> Result<(), TextEditError> {
    let source_content = read(source)?;
    let (source_count, source_atoms) = gro_atom_lines(source, &source_content)?;

    let target_content = read(target)?;
    let (target_count, _) = gro_atom_lines(target, &target_content)?;

    let mut lines = split_lines(&target_content);
    let box_line = lines.len() - 1;
    for (offset, atom) in source_atoms.into_iter().enumerate() {
        let mut atom = atom;
        if !atom.ends_with('\n') {
            atom.push('\n');
        }
        lines.insert(box_line + offset, atom);
    }

    let terminator = if lines[1].ends_with('\n') { "\n" } else { "" };
    lines[1] = format!("{:>5}{}", target_count + source_count, terminator);
    write(target, &lines.concat())
}
