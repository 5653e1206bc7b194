use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

/// Reads a text file and returns its non-blank lines.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Drops lines that are empty once trimmed
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Creates the parent directory of `path` if it has one and it is missing.
///
/// `data/babbler.db` → creates `data/`
pub(crate) fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
	match path.as_ref().parent() {
		Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
		_ => Ok(()),
	}
}

/// Lists the stems of all files with a given extension in a directory.
///
/// `quotes/alice.txt` + `"txt"` → `"alice"`
pub(crate) fn list_stems<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut stems = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(stem) = path.file_stem() {
				stems.push(stem.to_string_lossy().to_string());
			}
		}
	}

	stems.sort();
	Ok(stems)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn read_lines_skips_blank_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("alice.txt");
		fs::write(&path, "hello world\n\n   \nhello there\r\n").unwrap();
		assert_eq!(read_lines(&path).unwrap(), vec!["hello world", "hello there"]);
	}

	#[test]
	fn list_stems_filters_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("bob.txt"), "x").unwrap();
		fs::write(dir.path().join("alice.txt"), "x").unwrap();
		fs::write(dir.path().join("notes.md"), "x").unwrap();
		assert_eq!(list_stems(dir.path(), "txt").unwrap(), vec!["alice", "bob"]);
	}

	#[test]
	fn ensure_parent_dir_creates_nested_dirs() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("a").join("b").join("babbler.db");
		ensure_parent_dir(&path).unwrap();
		assert!(dir.path().join("a").join("b").is_dir());
		ensure_parent_dir("babbler.db").unwrap();
	}
}
