//! Static schema of the six catalog tables.
//!
//! Each [`TableSchema`] carries its columns (type plus inline constraints),
//! table-level constraints and indexes. [`TableSchema::create_statement`]
//! renders the DDL; the column names are also the INSERT column lists.

use std::fmt::Write as _;

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Varchar(u16),
    Int,
    Float,
    Boolean,
}

impl SqlType {
    pub fn render(&self) -> String {
        match self {
            SqlType::Varchar(n) => format!("VARCHAR({})", n),
            SqlType::Int => "INT".to_string(),
            SqlType::Float => "FLOAT".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
        }
    }
}

/// Inline CHECK constraint on a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Inclusive range, bounds written as SQL literals.
    Between(&'static str, &'static str),
    /// Strictly greater than zero.
    Positive,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    /// Inline constraint keywords, e.g. `PRIMARY KEY` or `UNIQUE NOT NULL`.
    pub constraint: Option<&'static str>,
    pub check: Option<Check>,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            constraint: None,
            check: None,
        }
    }

    pub const fn with(name: &'static str, sql_type: SqlType, constraint: &'static str) -> Self {
        Self {
            name,
            sql_type,
            constraint: Some(constraint),
            check: None,
        }
    }

    pub const fn checked(name: &'static str, sql_type: SqlType, check: Check) -> Self {
        Self {
            name,
            sql_type,
            constraint: None,
            check: Some(check),
        }
    }

    fn render(&self) -> String {
        let mut out = format!("{} {}", self.name, self.sql_type.render());
        if let Some(constraint) = self.constraint {
            out.push(' ');
            out.push_str(constraint);
        }
        match self.check {
            Some(Check::Between(lo, hi)) => {
                let _ = write!(out, " CHECK ({0} >= {1} AND {0} <= {2})", self.name, lo, hi);
            }
            Some(Check::Positive) => {
                let _ = write!(out, " CHECK ({} > 0)", self.name);
            }
            None => {}
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    /// Human label used in script comments.
    pub label: &'static str,
    pub columns: &'static [Column],
    /// Composite primary key, when not declared inline.
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub indexes: &'static [Index],
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// `CREATE TABLE` followed by the table's `CREATE INDEX` statements.
    pub fn create_statement(&self) -> String {
        let mut lines: Vec<String> = self.columns.iter().map(Column::render).collect();

        if !self.primary_key.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        for fk in self.foreign_keys {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE CASCADE",
                fk.column, fk.references_table, fk.references_column
            ));
        }

        let mut out = format!("CREATE TABLE IF NOT EXISTS {} (\n", self.name);
        out.push_str(
            &lines
                .iter()
                .map(|l| format!("    {}", l))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        out.push_str("\n);\n");

        for index in self.indexes {
            let _ = writeln!(
                out,
                "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
                index.name, self.name, index.column
            );
        }
        out
    }
}

// =============================================================================
// Tables (dependency order)
// =============================================================================

const SHORT_ID: SqlType = SqlType::Varchar(10);
const TRACK_ID: SqlType = SqlType::Varchar(30);
const NAME: SqlType = SqlType::Varchar(255);
const UNIT: Check = Check::Between("0.0", "1.0");

pub static ARTISTS: TableSchema = TableSchema {
    name: "Artists",
    label: "Artists",
    columns: &[
        Column::with("artist_id", SHORT_ID, "PRIMARY KEY"),
        Column::with("artist_name", NAME, "UNIQUE NOT NULL"),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index {
        name: "idx_artist_name",
        column: "artist_name",
    }],
};

pub static ALBUMS: TableSchema = TableSchema {
    name: "Albums",
    label: "Albums",
    columns: &[
        Column::with("album_id", SHORT_ID, "PRIMARY KEY"),
        Column::with("album_name", NAME, "UNIQUE NOT NULL"),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index {
        name: "idx_album_name",
        column: "album_name",
    }],
};

pub static ALBUM_ARTISTS: TableSchema = TableSchema {
    name: "AlbumArtists",
    label: "Album-Artists",
    columns: &[
        Column::with("album_id", SHORT_ID, "NOT NULL"),
        Column::with("artist_id", SHORT_ID, "NOT NULL"),
    ],
    primary_key: &["album_id", "artist_id"],
    foreign_keys: &[
        ForeignKey {
            column: "album_id",
            references_table: "Albums",
            references_column: "album_id",
        },
        ForeignKey {
            column: "artist_id",
            references_table: "Artists",
            references_column: "artist_id",
        },
    ],
    indexes: &[],
};

pub static TRACKS: TableSchema = TableSchema {
    name: "Tracks",
    label: "Tracks",
    columns: &[
        Column::with("track_id", TRACK_ID, "PRIMARY KEY"),
        Column::with("track_name", NAME, "NOT NULL"),
        Column::with("album_id", SHORT_ID, "NOT NULL"),
        Column::checked("popularity", SqlType::Int, Check::Between("0", "100")),
        Column::checked("duration_ms", SqlType::Int, Check::Positive),
        Column::with("explicit", SqlType::Boolean, "NOT NULL"),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey {
        column: "album_id",
        references_table: "Albums",
        references_column: "album_id",
    }],
    indexes: &[
        Index {
            name: "idx_track_name",
            column: "track_name",
        },
        Index {
            name: "idx_album_id",
            column: "album_id",
        },
    ],
};

pub static TRACK_ARTISTS: TableSchema = TableSchema {
    name: "TrackArtists",
    label: "Track-Artists",
    columns: &[
        Column::with("track_id", TRACK_ID, "NOT NULL"),
        Column::with("artist_id", SHORT_ID, "NOT NULL"),
    ],
    primary_key: &["track_id", "artist_id"],
    foreign_keys: &[
        ForeignKey {
            column: "track_id",
            references_table: "Tracks",
            references_column: "track_id",
        },
        ForeignKey {
            column: "artist_id",
            references_table: "Artists",
            references_column: "artist_id",
        },
    ],
    indexes: &[],
};

pub static AUDIO_FEATURES: TableSchema = TableSchema {
    name: "AudioFeatures",
    label: "Audio Features",
    columns: &[
        Column::with("track_id", TRACK_ID, "PRIMARY KEY"),
        Column::checked("danceability", SqlType::Float, UNIT),
        Column::checked("energy", SqlType::Float, UNIT),
        Column::new("key", SqlType::Int),
        Column::new("loudness", SqlType::Float),
        Column::new("mode", SqlType::Int),
        Column::checked("speechiness", SqlType::Float, UNIT),
        Column::checked("acousticness", SqlType::Float, UNIT),
        Column::checked("instrumentalness", SqlType::Float, UNIT),
        Column::checked("liveness", SqlType::Float, UNIT),
        Column::checked("valence", SqlType::Float, UNIT),
        Column::new("tempo", SqlType::Float),
        Column::new("time_signature", SqlType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[
        Index {
            name: "idx_audio_features_danceability",
            column: "danceability",
        },
        Index {
            name: "idx_audio_features_energy",
            column: "energy",
        },
    ],
};

/// All tables, parents before children.
pub static ALL_TABLES: &[&TableSchema] = &[
    &ARTISTS,
    &ALBUMS,
    &ALBUM_ARTISTS,
    &TRACKS,
    &TRACK_ARTISTS,
    &AUDIO_FEATURES,
];

pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// DDL for every table, each block preceded by a `-- Create ... Table` comment.
pub fn schema_ddl() -> String {
    ALL_TABLES
        .iter()
        .map(|t| format!("-- Create {} Table\n{}", t.label, t.create_statement()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artists_ddl() {
        let ddl = ARTISTS.create_statement();
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS Artists (\n    artist_id VARCHAR(10) PRIMARY KEY,\n    artist_name VARCHAR(255) UNIQUE NOT NULL\n);\nCREATE INDEX IF NOT EXISTS idx_artist_name ON Artists (artist_name);\n"
        );
    }

    #[test]
    fn test_tracks_checks() {
        let ddl = TRACKS.create_statement();
        assert!(ddl.contains("popularity INT CHECK (popularity >= 0 AND popularity <= 100)"));
        assert!(ddl.contains("duration_ms INT CHECK (duration_ms > 0)"));
        assert!(ddl.contains("explicit BOOLEAN NOT NULL"));
        assert!(ddl.contains("FOREIGN KEY (album_id) REFERENCES Albums(album_id) ON DELETE CASCADE"));
    }

    #[test]
    fn test_link_table_composite_key() {
        let ddl = TRACK_ARTISTS.create_statement();
        assert!(ddl.contains("PRIMARY KEY (track_id, artist_id)"));
        assert!(ddl.contains("REFERENCES Tracks(track_id)"));
        assert!(ddl.contains("REFERENCES Artists(artist_id)"));
    }

    #[test]
    fn test_unit_interval_checks() {
        let ddl = AUDIO_FEATURES.create_statement();
        assert!(ddl.contains("valence FLOAT CHECK (valence >= 0.0 AND valence <= 1.0)"));
        assert!(ddl.contains("tempo FLOAT,"));
        assert_eq!(AUDIO_FEATURES.columns.len(), 13);
    }

    #[test]
    fn test_dependency_order() {
        let names: Vec<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "Artists",
                "Albums",
                "AlbumArtists",
                "Tracks",
                "TrackArtists",
                "AudioFeatures"
            ]
        );
        // Every referenced table appears before the referencing one.
        for (i, table) in ALL_TABLES.iter().enumerate() {
            for fk in table.foreign_keys {
                let parent = names.iter().position(|n| *n == fk.references_table).unwrap();
                assert!(parent < i, "{} references later table {}", table.name, fk.references_table);
            }
        }
    }

    #[test]
    fn test_get_table() {
        assert_eq!(get_table("Tracks").map(|t| t.label), Some("Tracks"));
        assert!(get_table("Playlists").is_none());
    }
}
