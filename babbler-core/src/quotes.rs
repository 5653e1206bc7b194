//! Historical lines used to backfill a speaker when it is first created.

use std::path::{Path, PathBuf};

use crate::error::BabblerError;
use crate::io::{list_stems, read_lines};

/// External supplier of lines attributed to a speaker.
///
/// An unknown speaker is an empty result, not an error.
pub trait QuoteSource {
	fn quotes(&self, speaker: &str) -> Result<Vec<String>, BabblerError>;
}

/// Knows no quotes for anyone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoQuotes;

impl QuoteSource for NoQuotes {
	fn quotes(&self, _speaker: &str) -> Result<Vec<String>, BabblerError> {
		Ok(Vec::new())
	}
}

/// Reads `<dir>/<speaker>.txt`, one quote per line.
#[derive(Debug, Clone)]
pub struct FileQuotes {
	dir: PathBuf,
}

impl FileQuotes {
	pub fn new<P: AsRef<Path>>(dir: P) -> Self {
		Self { dir: dir.as_ref().to_path_buf() }
	}

	/// Names of the speakers with a quote file, sorted.
	pub fn speakers(&self) -> Result<Vec<String>, BabblerError> {
		if !self.dir.is_dir() {
			return Ok(Vec::new());
		}
		Ok(list_stems(&self.dir, "txt")?)
	}
}

impl QuoteSource for FileQuotes {
	fn quotes(&self, speaker: &str) -> Result<Vec<String>, BabblerError> {
		// Names come from chat and must stay inside the quotes directory.
		if speaker.is_empty() || speaker.contains(['/', '\\']) || speaker.starts_with('.') {
			return Ok(Vec::new());
		}
		let path = self.dir.join(format!("{speaker}.txt"));
		if !path.is_file() {
			return Ok(Vec::new());
		}
		Ok(read_lines(path)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn missing_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let quotes = FileQuotes::new(dir.path());
		assert!(quotes.quotes("nobody").unwrap().is_empty());
	}

	#[test]
	fn reads_one_quote_per_line() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("seabass.txt"), "fish are friends\n\nnot food\n").unwrap();
		let quotes = FileQuotes::new(dir.path());
		assert_eq!(quotes.quotes("seabass").unwrap(), vec!["fish are friends", "not food"]);
		assert_eq!(quotes.speakers().unwrap(), vec!["seabass"]);
	}

	#[test]
	fn path_like_names_are_ignored() {
		let dir = tempfile::tempdir().unwrap();
		let quotes = FileQuotes::new(dir.path().join("quotes"));
		assert!(quotes.quotes("../secrets").unwrap().is_empty());
		assert!(quotes.speakers().unwrap().is_empty());
	}

	#[test]
	fn no_quotes_is_always_empty() {
		assert!(NoQuotes.quotes("anyone").unwrap().is_empty());
	}
}
