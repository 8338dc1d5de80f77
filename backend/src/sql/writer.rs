//! INSERT statement rendering and full script emission.
//!
//! Literal encoding:
//!
//! | value            | literal                          |
//! |------------------|----------------------------------|
//! | null             | `NULL`                           |
//! | text             | `'...'` with `'` doubled to `''` |
//! | int/float/bool   | default `Display`, unquoted      |
//!
//! Every row becomes
//! `INSERT INTO <table> (<cols>) VALUES (<values>) ON CONFLICT DO NOTHING;`
//! on its own line, so re-running the script against a database that
//! enforces the declared keys changes nothing.

use std::fmt;
use std::io::{self, Write};

use super::schema::{
    schema_ddl, TableSchema, ALBUMS, ALBUM_ARTISTS, ALL_TABLES, ARTISTS, AUDIO_FEATURES, TRACKS,
    TRACK_ARTISTS,
};
use crate::models::{Album, AlbumArtist, Artist, AudioFeatures, Catalog, Track, TrackArtist};

/// A single SQL literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlValue<'a> {
    Null,
    Text(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for SqlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Int(v) => write!(f, "{}", v),
            // NaN and infinities have no SQL literal; they load as NULL.
            SqlValue::Float(v) if !v.is_finite() => f.write_str("NULL"),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(v: &'a str) -> Self {
        SqlValue::Text(v)
    }
}

impl<'a> From<&'a String> for SqlValue<'a> {
    fn from(v: &'a String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<i64> for SqlValue<'_> {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue<'_> {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue<'_> {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl<'a, T: Into<SqlValue<'a>>> From<Option<T>> for SqlValue<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// A table row that knows its schema and its column values.
pub trait SqlRow {
    fn schema() -> &'static TableSchema;

    /// Values in schema column order.
    fn values(&self) -> Vec<SqlValue<'_>>;
}

impl SqlRow for Artist {
    fn schema() -> &'static TableSchema {
        &ARTISTS
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![(&self.artist_id).into(), (&self.artist_name).into()]
    }
}

impl SqlRow for Album {
    fn schema() -> &'static TableSchema {
        &ALBUMS
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![(&self.album_id).into(), (&self.album_name).into()]
    }
}

impl SqlRow for AlbumArtist {
    fn schema() -> &'static TableSchema {
        &ALBUM_ARTISTS
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![(&self.album_id).into(), (&self.artist_id).into()]
    }
}

impl SqlRow for Track {
    fn schema() -> &'static TableSchema {
        &TRACKS
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            (&self.track_id).into(),
            (&self.track_name).into(),
            (&self.album_id).into(),
            self.popularity.into(),
            self.duration_ms.into(),
            self.explicit.into(),
        ]
    }
}

impl SqlRow for TrackArtist {
    fn schema() -> &'static TableSchema {
        &TRACK_ARTISTS
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![(&self.track_id).into(), (&self.artist_id).into()]
    }
}

impl SqlRow for AudioFeatures {
    fn schema() -> &'static TableSchema {
        &AUDIO_FEATURES
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            (&self.track_id).into(),
            self.danceability.into(),
            self.energy.into(),
            self.key.into(),
            self.loudness.into(),
            self.mode.into(),
            self.speechiness.into(),
            self.acousticness.into(),
            self.instrumentalness.into(),
            self.liveness.into(),
            self.valence.into(),
            self.tempo.into(),
            self.time_signature.into(),
        ]
    }
}

/// Render one idempotent INSERT statement, newline included.
pub fn insert_statement<T: SqlRow>(row: &T) -> String {
    let schema = T::schema();
    let values = row
        .values()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING;\n",
        schema.name,
        schema.column_names().join(", "),
        values
    )
}

/// Write the INSERT block of one table.
pub fn write_inserts<T: SqlRow, W: Write>(rows: &[T], out: &mut W) -> io::Result<()> {
    let schema = T::schema();
    writeln!(out, "-- Insert Data into {} Table", schema.label)?;
    for row in rows {
        out.write_all(insert_statement(row).as_bytes())?;
    }
    Ok(())
}

/// Write the whole script: header, every CREATE block, then every INSERT
/// block, both in dependency order.
pub fn write_script<W: Write>(catalog: &Catalog, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- trackdb catalog load script")?;
    writeln!(
        out,
        "-- Tables: {}",
        ALL_TABLES
            .iter()
            .map(|t| t.name)
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    writeln!(out)?;

    out.write_all(schema_ddl().as_bytes())?;

    writeln!(out)?;
    write_inserts(&catalog.artists, out)?;
    writeln!(out)?;
    write_inserts(&catalog.albums, out)?;
    writeln!(out)?;
    write_inserts(&catalog.album_artists, out)?;
    writeln!(out)?;
    write_inserts(&catalog.tracks, out)?;
    writeln!(out)?;
    write_inserts(&catalog.track_artists, out)?;
    writeln!(out)?;
    write_inserts(&catalog.audio_features, out)?;

    out.flush()
}

/// The script as a string.
pub fn render_script(catalog: &Catalog) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_script(catalog, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
