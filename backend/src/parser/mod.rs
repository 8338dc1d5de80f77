//! Source table reader with encoding and delimiter auto-detection.
//!
//! Turns the raw bytes of a flat catalog export into typed [`SourceRow`]s.
//! Missing or unreadable data never fails a row: nulls and unparseable
//! values become `None`. Only an unreadable file or a header lacking one of
//! the [`SourceRow::COLUMNS`] is fatal.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::SourceRow;

/// Field values treated as null, matched exactly as read.
pub const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA",
];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed source rows, in file order
    pub rows: Vec<SourceRow>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used field delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
    /// Numeric or boolean fields that could not be parsed and became null
    pub coerced_nulls: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if decoded.contains('\u{0}') {
        return Err(CsvError::Encoding(format!(
            "decoded content ({}) contains NUL bytes",
            encoding
        )));
    }
    Ok(decoded)
}

/// Detect the field delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse a source file, auto-detecting encoding and, unless given, the delimiter.
pub fn parse_source_file<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_source_bytes(&bytes, delimiter)
}

/// Parse source bytes, auto-detecting encoding and, unless given, the delimiter.
pub fn parse_source_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    // chardet guesses Latin-1 for short UTF-8 text with a few accents.
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    let content = decode_content(bytes, &encoding)?;
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    parse_source_str(&content, delimiter, encoding)
}

/// Parse already-decoded CSV text with an explicit delimiter.
pub fn parse_source_str(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if !delimiter.is_ascii() {
        return Err(CsvError::Parse {
            line: 1,
            message: format!("delimiter '{}' is not an ASCII character", delimiter),
        });
    }
    let delimiter_byte = delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut coerced_nulls = 0;

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut decoder = RowDecoder {
            record: &record,
            columns: &columns,
            coerced: 0,
        };
        rows.push(decoder.decode());
        coerced_nulls += decoder.coerced;
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
        coerced_nulls,
    })
}

/// Position of each required column in the header.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> CsvResult<Self> {
        let mut positions = HashMap::new();
        for &column in SourceRow::COLUMNS.iter() {
            let pos = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| CsvError::MissingColumn(column.to_string()))?;
            positions.insert(column, pos);
        }
        Ok(Self { positions })
    }

    fn get(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

struct RowDecoder<'a> {
    record: &'a csv::StringRecord,
    columns: &'a ColumnIndex,
    coerced: usize,
}

impl<'a> RowDecoder<'a> {
    fn decode(&mut self) -> SourceRow {
        SourceRow {
            track_id: self.text("track_id"),
            track_name: self.text("track_name"),
            album_name: self.text("album_name"),
            artists: self.text("artists"),
            popularity: self.int("popularity"),
            duration_ms: self.int("duration_ms"),
            explicit: self.boolean("explicit"),
            danceability: self.float("danceability"),
            energy: self.float("energy"),
            key: self.int("key"),
            loudness: self.float("loudness"),
            mode: self.int("mode"),
            speechiness: self.float("speechiness"),
            acousticness: self.float("acousticness"),
            instrumentalness: self.float("instrumentalness"),
            liveness: self.float("liveness"),
            valence: self.float("valence"),
            tempo: self.float("tempo"),
            time_signature: self.int("time_signature"),
        }
    }

    /// Raw field, `None` when absent or a null marker. Text keeps its
    /// original spacing.
    fn raw(&self, column: &str) -> Option<&'a str> {
        let record: &'a csv::StringRecord = self.record;
        let value = self.columns.get(column).and_then(|i| record.get(i))?;
        if is_null(value) {
            None
        } else {
            Some(value)
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        self.raw(column).map(str::to_string)
    }

    fn int(&mut self, column: &str) -> Option<i64> {
        let raw = self.raw(column)?;
        let parsed = parse_int(raw);
        if parsed.is_none() {
            self.coerced += 1;
        }
        parsed
    }

    fn float(&mut self, column: &str) -> Option<f64> {
        let raw = self.raw(column)?;
        let parsed = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        if parsed.is_none() {
            self.coerced += 1;
        }
        parsed
    }

    fn boolean(&mut self, column: &str) -> Option<bool> {
        let raw = self.raw(column)?;
        let parsed = parse_bool(raw);
        if parsed.is_none() {
            self.coerced += 1;
        }
        parsed
    }
}

/// Whether a raw field counts as null.
pub fn is_null(value: &str) -> bool {
    NULL_MARKERS.contains(&value)
}

/// Parse an integer, accepting integral float text such as `"42.0"`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parse a boolean from the spellings catalog exports use.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}
