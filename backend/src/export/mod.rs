//! CSV export of the normalized tables.
//!
//! One file per table, header row first, columns in struct field order.
//! Nulls are written as empty fields.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::EmitResult;
use crate::models::Catalog;

pub const ARTISTS_FILE: &str = "artists.csv";
pub const ALBUMS_FILE: &str = "albums.csv";
pub const ALBUM_ARTISTS_FILE: &str = "album_artists.csv";
pub const TRACKS_FILE: &str = "tracks.csv";
pub const TRACK_ARTISTS_FILE: &str = "track_artists.csv";
pub const AUDIO_FEATURES_FILE: &str = "audio_features.csv";

/// Serialize rows as CSV into any writer.
///
/// An empty table still gets its header line.
pub fn write_table<T: Serialize, W: Write>(rows: &[T], out: W, header: &[&str]) -> EmitResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_table_file<T: Serialize>(
    dir: &Path,
    file_name: &str,
    rows: &[T],
    header: &[&str],
) -> EmitResult<PathBuf> {
    let path = dir.join(file_name);
    let file = BufWriter::new(File::create(&path)?);
    write_table(rows, file, header)?;
    Ok(path)
}

/// Write all six tables into `dir`, returning the written paths in
/// dependency order.
pub fn write_tables(catalog: &Catalog, dir: &Path) -> EmitResult<Vec<PathBuf>> {
    use crate::sql::schema::{
        ALBUMS, ALBUM_ARTISTS, ARTISTS, AUDIO_FEATURES, TRACKS, TRACK_ARTISTS,
    };

    Ok(vec![
        write_table_file(dir, ARTISTS_FILE, &catalog.artists, &ARTISTS.column_names())?,
        write_table_file(dir, ALBUMS_FILE, &catalog.albums, &ALBUMS.column_names())?,
        write_table_file(
            dir,
            ALBUM_ARTISTS_FILE,
            &catalog.album_artists,
            &ALBUM_ARTISTS.column_names(),
        )?,
        write_table_file(dir, TRACKS_FILE, &catalog.tracks, &TRACKS.column_names())?,
        write_table_file(
            dir,
            TRACK_ARTISTS_FILE,
            &catalog.track_artists,
            &TRACK_ARTISTS.column_names(),
        )?,
        write_table_file(
            dir,
            AUDIO_FEATURES_FILE,
            &catalog.audio_features,
            &AUDIO_FEATURES.column_names(),
        )?,
    ])
}
