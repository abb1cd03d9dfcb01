//! Header detection and tokenisation for `.xyz` style exports.

use std::fs;
use std::path::Path;

use regex::Regex;
use ttemkit_core_common::{
    RawRecord, RawTable, SourcePosition, SpatialFormatReadError, SpatialFormatResult,
    TableReader,
};

/// Header marker of a sounding export: the row that starts with `ID`.
pub const SOUNDING_HEADER_PATTERN: &str = r"^/?\s*ID\b";

/// Header marker of a DOI export: the row that starts with `UTMX`.
pub const DOI_HEADER_PATTERN: &str = r"^/?\s*UTMX\b";

/// Options for reading `.xyz` exports.
#[derive(Debug, Clone)]
pub struct XyzReaderOptions {
    /// Regular expression matched against each left-trimmed line; the first
    /// match is the header row.
    pub header_pattern: Regex,
    /// Prefix marking metadata and comment lines.
    pub comment_prefix: char,
}

impl XyzReaderOptions {
    /// Options with a custom header pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialFormatReadError::Other`] if `pattern` is not a valid
    /// regular expression.
    pub fn with_header_pattern(pattern: &str) -> SpatialFormatResult<Self> {
        let header_pattern = Regex::new(pattern).map_err(|e| SpatialFormatReadError::Other {
            message: format!("invalid header pattern '{pattern}': {e}"),
        })?;
        Ok(Self {
            header_pattern,
            comment_prefix: '/',
        })
    }

    /// Set the comment prefix
    #[must_use]
    pub fn with_comment_prefix(mut self, prefix: char) -> Self {
        self.comment_prefix = prefix;
        self
    }
}

/// Reader for whitespace separated exports preceded by metadata lines.
#[derive(Debug, Clone)]
pub struct XyzReader {
    options: XyzReaderOptions,
}

impl XyzReader {
    /// Creates a reader with the given options.
    #[must_use]
    pub fn new(options: XyzReaderOptions) -> Self {
        Self { options }
    }

    /// Reader for sounding exports (header row starting with `ID`).
    ///
    /// # Errors
    ///
    /// Never fails for the built-in pattern; the `Result` mirrors
    /// [`XyzReaderOptions::with_header_pattern`].
    pub fn sounding() -> SpatialFormatResult<Self> {
        Ok(Self::new(XyzReaderOptions::with_header_pattern(
            SOUNDING_HEADER_PATTERN,
        )?))
    }

    /// Reader for DOI exports (header row starting with `UTMX`).
    ///
    /// # Errors
    ///
    /// Same as [`XyzReader::sounding`].
    pub fn doi() -> SpatialFormatResult<Self> {
        Ok(Self::new(XyzReaderOptions::with_header_pattern(
            DOI_HEADER_PATTERN,
        )?))
    }

    /// Returns the reader options.
    #[must_use]
    pub fn options(&self) -> &XyzReaderOptions {
        &self.options
    }

    /// Parses export text.
    ///
    /// Lines before the header are ignored. After the header, blank lines and
    /// lines starting with the comment prefix are skipped; every other line
    /// must have exactly as many fields as the header.
    ///
    /// # Arguments
    ///
    /// * `text` - Full file contents
    /// * `context` - Name of the source used in errors and in [`RawTable::source`]
    ///
    /// # Errors
    ///
    /// Returns [`SpatialFormatReadError::MissingHeader`] if no line matches the
    /// header pattern and [`SpatialFormatReadError::Parse`] for rows with the
    /// wrong number of fields.
    pub fn parse_str(&self, text: &str, context: &str) -> SpatialFormatResult<RawTable> {
        let prefix = self.options.comment_prefix;
        let mut lines = text.lines().enumerate();

        let headers = loop {
            let Some((_, line)) = lines.next() else {
                return Err(SpatialFormatReadError::MissingHeader {
                    expected: format!(
                        "a line matching '{}'",
                        self.options.header_pattern.as_str()
                    ),
                    context: Some(context.to_string()),
                });
            };
            let trimmed = line.trim_start();
            if self.options.header_pattern.is_match(trimmed) {
                break trimmed
                    .trim_start_matches(prefix)
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
            }
        };

        let mut records = Vec::new();
        for (index, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(prefix) {
                continue;
            }
            let line_no = index as u64 + 1;
            let fields: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
            if fields.len() != headers.len() {
                return Err(SpatialFormatReadError::Parse {
                    message: format!(
                        "expected {} fields, found {}",
                        headers.len(),
                        fields.len()
                    ),
                    position: Some(SourcePosition::at_line(line_no)),
                    context: Some(context.to_string()),
                });
            }
            records.push(RawRecord::new(fields).with_line(line_no));
        }

        log::debug!(
            "Read {} rows with {} columns from {context}",
            records.len(),
            headers.len()
        );
        Ok(RawTable::new(headers, records).with_source(context))
    }
}

impl TableReader for XyzReader {
    fn read_path(&self, path: &Path) -> SpatialFormatResult<RawTable> {
        let context = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| SpatialFormatReadError::Io {
            source,
            context: Some(context.clone()),
        })?;
        self.parse_str(&text, &context)
    }
}
