//! High-level pipeline API: source file → normalized CSVs + SQL script.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackdb::{normalize_file, RunOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RunOptions::new("dataset.csv", "out");
//!     let summary = normalize_file(&options)?;
//!     println!("{} tracks", summary.counts.tracks);
//!     Ok(())
//! }
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::normalizer::{normalize, NormalizeOptions, NormalizeStats, DEFAULT_ARTIST_DELIMITER};
use crate::error::{EmitResult, PipelineResult};
use crate::export::write_tables;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{Catalog, TableCounts};
use crate::parser::{parse_source_bytes, parse_source_file, ParseResult};
use crate::sql::writer::write_script;

/// Default name of the SQL script
pub const DEFAULT_SQL_FILE: &str = "create_and_insert_tables.sql";

/// Options for a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Source table
    pub input: PathBuf,

    /// Directory receiving the CSV files and the SQL script
    pub output_dir: PathBuf,

    /// Separator between artist names in the `artists` field
    pub artist_delimiter: char,

    /// Field delimiter of the source table (auto-detect if `None`)
    pub field_delimiter: Option<char>,

    /// Write one CSV file per table
    pub write_csv: bool,

    /// Write the SQL script
    pub write_sql: bool,

    /// File name of the SQL script inside `output_dir`
    pub sql_file_name: String,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            artist_delimiter: self.artist_delimiter,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("dataset.csv"),
            output_dir: PathBuf::from("."),
            artist_delimiter: DEFAULT_ARTIST_DELIMITER,
            field_delimiter: None,
            write_csv: true,
            write_sql: true,
            sql_file_name: DEFAULT_SQL_FILE.to_string(),
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Source path, when read from a file
    pub input: Option<String>,
    pub encoding: String,
    pub delimiter: char,
    pub source_rows: usize,
    /// Fields that were present but unparseable and became null
    pub coerced_nulls: usize,
    pub counts: TableCounts,
    pub stats: NormalizeStats,
    pub warnings: Vec<String>,
    /// Files written, in write order
    pub files: Vec<String>,
    pub generated_at: String,
}

/// Normalize a source file and write the requested outputs.
pub fn normalize_file(options: &RunOptions) -> PipelineResult<RunSummary> {
    log_info(format!("📖 Reading {}", options.input.display()));
    let parse_result = parse_source_file(&options.input, options.field_delimiter)?;

    let (catalog, mut summary) = normalize_parsed(
        parse_result,
        &options.normalize_options(),
        Some(&options.input),
    );

    if options.write_csv || options.write_sql {
        fs::create_dir_all(&options.output_dir)?;
    }

    if options.write_csv {
        log_info("💾 Writing CSV tables...");
        for path in write_tables(&catalog, &options.output_dir)? {
            log_info_indent(path.display().to_string(), 1);
            summary.files.push(path.display().to_string());
        }
    }

    if options.write_sql {
        let path = options.output_dir.join(&options.sql_file_name);
        log_info("🗄️  Writing SQL script...");
        write_sql_file(&catalog, &path)?;
        log_info_indent(path.display().to_string(), 1);
        summary.files.push(path.display().to_string());
    }

    log_success(format!("Wrote {} file(s)", summary.files.len()));
    Ok(summary)
}

/// Normalize source bytes in memory.
pub fn normalize_bytes(
    bytes: &[u8],
    options: &NormalizeOptions,
    field_delimiter: Option<char>,
) -> PipelineResult<(Catalog, RunSummary)> {
    let parse_result = parse_source_bytes(bytes, field_delimiter)?;
    Ok(normalize_parsed(parse_result, options, None))
}

/// Write the SQL script to `path`.
pub fn write_sql_file(catalog: &Catalog, path: &Path) -> EmitResult<PathBuf> {
    let mut out = BufWriter::new(File::create(path)?);
    write_script(catalog, &mut out)?;
    Ok(path.to_path_buf())
}

fn normalize_parsed(
    parse_result: ParseResult,
    options: &NormalizeOptions,
    input: Option<&Path>,
) -> (Catalog, RunSummary) {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!(
        "Field delimiter: '{}'",
        format_delimiter(parse_result.delimiter)
    ));
    log_success(format!("Read {} rows", parse_result.rows.len()));

    log_info(format!(
        "⚙️  Normalizing (artist delimiter '{}')...",
        format_delimiter(options.artist_delimiter)
    ));
    let (catalog, stats) = normalize(&parse_result.rows, options);
    let counts = catalog.counts();

    let warnings = collect_warnings(&stats, parse_result.coerced_nulls);
    for warning in &warnings {
        log_warning(warning.clone());
    }

    log_success(format!(
        "{} artists, {} albums, {} tracks, {} audio feature rows",
        counts.artists, counts.albums, counts.tracks, counts.audio_features
    ));
    log_success(format!(
        "{} album-artist links, {} track-artist links",
        counts.album_artists, counts.track_artists
    ));

    let summary = RunSummary {
        input: input.map(|p| p.display().to_string()),
        encoding: parse_result.encoding,
        delimiter: parse_result.delimiter,
        source_rows: parse_result.rows.len(),
        coerced_nulls: parse_result.coerced_nulls,
        counts,
        stats,
        warnings,
        files: Vec::new(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    (catalog, summary)
}

/// Data-quality findings worth surfacing. None of them stop the run.
fn collect_warnings(stats: &NormalizeStats, coerced_nulls: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    if stats.null_key_rows > 0 {
        warnings.push(format!(
            "{} rows dropped (missing track_id, track_name or album_name)",
            stats.null_key_rows
        ));
    }
    if stats.duplicate_rows > 0 {
        warnings.push(format!("{} duplicate rows dropped", stats.duplicate_rows));
    }
    if stats.rows_without_artists > 0 {
        warnings.push(format!(
            "{} tracks have no artist name",
            stats.rows_without_artists
        ));
    }
    if stats.join_misses() > 0 {
        warnings.push(format!(
            "{} link rows dropped: {} artist names and {} album names had no id",
            stats.join_misses(),
            stats.artist_join_misses,
            stats.album_join_misses
        ));
    }
    if stats.duplicate_tracks > 0 {
        warnings.push(format!(
            "{} tracks repeat an earlier (track_id, track_name) on another album",
            stats.duplicate_tracks
        ));
    }
    if coerced_nulls > 0 {
        warnings.push(format!(
            "{} unparseable numeric or boolean values loaded as NULL",
            coerced_nulls
        ));
    }

    warnings
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ALBUM_ARTISTS_FILE, ARTISTS_FILE, TRACKS_FILE};
    use tempfile::tempdir;

    const SAMPLE: &str = "\
,track_id,artists,album_name,track_name,popularity,duration_ms,explicit,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,time_signature,track_genre
0,t1,A1;A2,X,Don't Stop,0,230666,False,0.676,0.461,1,-6.746,0,0.143,0.0322,1.01e-06,0.358,0.715,87.917,4,acoustic
1,t2,A2,X,Two,100,149610,False,0.42,0.166,1,-17.235,1,0.0763,0.924,5.56e-06,0.101,0.267,77.489,4,acoustic
2,t2,A2,X,Two,100,149610,False,0.42,0.166,1,-17.235,1,0.0763,0.924,5.56e-06,0.101,0.267,77.489,4,acoustic
3,t3,A3,,Orphan,10,1000,True,0.5,0.5,1,-5.0,1,0.1,0.1,0.0,0.1,0.1,100.0,4,acoustic
";

    fn quiet() {
        crate::logs::RUN_LOG.set_quiet(true);
    }

    #[test]
    fn test_default_options() {
        let opts = RunOptions::default();
        assert_eq!(opts.artist_delimiter, ';');
        assert!(opts.write_csv);
        assert!(opts.write_sql);
        assert_eq!(opts.sql_file_name, "create_and_insert_tables.sql");
        assert_eq!(opts.field_delimiter, None);
    }

    #[test]
    fn test_normalize_bytes_summary() {
        quiet();
        let (catalog, summary) =
            normalize_bytes(SAMPLE.as_bytes(), &NormalizeOptions::default(), None).unwrap();

        assert_eq!(summary.source_rows, 4);
        assert_eq!(summary.stats.null_key_rows, 1);
        assert_eq!(summary.stats.duplicate_rows, 1);
        assert_eq!(summary.counts.albums, 1);
        assert_eq!(summary.counts.artists, 2);
        assert_eq!(summary.counts.album_artists, 2);
        assert_eq!(summary.counts.tracks, 2);
        assert_eq!(summary.counts.track_artists, 3);
        assert_eq!(catalog.tracks[0].track_name, "Don't Stop");
        assert_eq!(summary.warnings.len(), 2);
        assert!(summary.input.is_none());
    }

    #[test]
    fn test_normalize_file_writes_outputs() {
        quiet();
        let dir = tempdir().unwrap();
        let input = dir.path().join("dataset.csv");
        fs::write(&input, SAMPLE).unwrap();
        let out = dir.path().join("out");

        let options = RunOptions::new(&input, &out);
        let summary = normalize_file(&options).unwrap();

        assert_eq!(summary.files.len(), 7);
        let tracks = fs::read_to_string(out.join(TRACKS_FILE)).unwrap();
        assert!(tracks.starts_with("track_id,track_name,album_id,popularity,duration_ms,explicit\n"));
        assert!(tracks.contains("t1,Don't Stop,ALB000001,0,230666,false"));

        let links = fs::read_to_string(out.join(ALBUM_ARTISTS_FILE)).unwrap();
        assert_eq!(
            links,
            "album_id,artist_id\nALB000001,ART000001\nALB000001,ART000002\n"
        );

        let sql = fs::read_to_string(out.join(DEFAULT_SQL_FILE)).unwrap();
        assert!(sql.contains("VALUES ('t1', 'Don''t Stop', 'ALB000001', 0, 230666, false) ON CONFLICT DO NOTHING;"));
    }

    #[test]
    fn test_utf8_names_survive_to_outputs() {
        quiet();
        let dir = tempdir().unwrap();
        let input = dir.path().join("dataset.csv");
        fs::write(
            &input,
            "track_id,artists,album_name,track_name,popularity,duration_ms,explicit,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,time_signature\n\
             t1,Beyoncé;Sigur Rós,Ágætis byrjun,Svefn-g-englar,50,600000,False,,,,,,,,,,,,\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        let summary = normalize_file(&RunOptions::new(&input, &out)).unwrap();
        assert_eq!(summary.encoding, "utf-8");

        let artists = fs::read_to_string(out.join(ARTISTS_FILE)).unwrap();
        assert_eq!(
            artists,
            "artist_id,artist_name\nART000001,Beyoncé\nART000002,Sigur Rós\n"
        );

        let sql = fs::read_to_string(out.join(DEFAULT_SQL_FILE)).unwrap();
        assert!(sql.contains("'Beyoncé'"));
        assert!(sql.contains("'Sigur Rós'"));
        assert!(sql.contains("'Ágætis byrjun'"));
    }

    #[test]
    fn test_sql_only_run() {
        quiet();
        let dir = tempdir().unwrap();
        let input = dir.path().join("dataset.csv");
        fs::write(&input, SAMPLE).unwrap();

        let options = RunOptions {
            write_csv: false,
            sql_file_name: "load.sql".into(),
            ..RunOptions::new(&input, dir.path())
        };
        let summary = normalize_file(&options).unwrap();

        assert_eq!(summary.files.len(), 1);
        assert!(dir.path().join("load.sql").exists());
        assert!(!dir.path().join(TRACKS_FILE).exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        quiet();
        let dir = tempdir().unwrap();
        let options = RunOptions::new(dir.path().join("nope.csv"), dir.path());
        let err = normalize_file(&options).unwrap_err();
        assert!(err.to_string().contains("CSV error"));
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        quiet();
        let dir = tempdir().unwrap();
        let input = dir.path().join("dataset.csv");
        fs::write(&input, SAMPLE).unwrap();
        // A regular file where the output directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let options = RunOptions::new(&input, &blocker);
        assert!(normalize_file(&options).is_err());
    }
}
