//! Domain models for the trackdb normalization pipeline.
//!
//! - [`SourceRow`] - one denormalized input row (one per track occurrence)
//! - [`Artist`], [`Album`] - entities keyed by generated surrogate ids
//! - [`AlbumArtist`], [`TrackArtist`] - many-to-many link rows
//! - [`Track`] - track keyed by its source id
//! - [`AudioFeatures`] - numeric descriptors keyed by track id
//! - [`Catalog`] - the six normalized tables of one run
//!
//! Field order of every table struct is its column order, both in the CSV
//! export and in the SQL script.

use serde::{Deserialize, Serialize};

// =============================================================================
// Source
// =============================================================================

/// A raw row of the flat catalog, after null-marker handling and typing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub track_id: Option<String>,
    pub track_name: Option<String>,
    pub album_name: Option<String>,
    /// Delimiter-joined artist names, split by the normalizer.
    pub artists: Option<String>,
    pub popularity: Option<i64>,
    pub duration_ms: Option<i64>,
    pub explicit: Option<bool>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<i64>,
    pub loudness: Option<f64>,
    pub mode: Option<i64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i64>,
}

impl SourceRow {
    /// Column names the source table must provide, in their canonical order.
    pub const COLUMNS: [&'static str; 19] = [
        "track_id",
        "track_name",
        "album_name",
        "artists",
        "popularity",
        "duration_ms",
        "explicit",
        "danceability",
        "energy",
        "key",
        "loudness",
        "mode",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
        "tempo",
        "time_signature",
    ];

    /// `(track_id, track_name, album_name)`, the three fields a row needs to
    /// take part in normalization. `None` if any is null.
    pub fn required_keys(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.track_id.as_deref()?,
            self.track_name.as_deref()?,
            self.album_name.as_deref()?,
        ))
    }
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub artist_id: String,
    pub artist_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub album_id: String,
    pub album_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub album_id: String,
    pub artist_id: String,
}

/// A track row. Popularity and duration are passed through unchecked;
/// the CHECK constraints of the SQL schema reject out-of-range values at
/// load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub track_name: String,
    pub album_id: String,
    pub popularity: Option<i64>,
    pub duration_ms: Option<i64>,
    pub explicit: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackArtist {
    pub track_id: String,
    pub artist_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub track_id: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<i64>,
    pub loudness: Option<f64>,
    pub mode: Option<i64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i64>,
}

impl AudioFeatures {
    /// Project the audio descriptors of a source row.
    pub fn from_source(track_id: String, row: &SourceRow) -> Self {
        Self {
            track_id,
            danceability: row.danceability,
            energy: row.energy,
            key: row.key,
            loudness: row.loudness,
            mode: row.mode,
            speechiness: row.speechiness,
            acousticness: row.acousticness,
            instrumentalness: row.instrumentalness,
            liveness: row.liveness,
            valence: row.valence,
            tempo: row.tempo,
            time_signature: row.time_signature,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The normalized tables produced by one run, in dependency order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub album_artists: Vec<AlbumArtist>,
    pub tracks: Vec<Track>,
    pub track_artists: Vec<TrackArtist>,
    pub audio_features: Vec<AudioFeatures>,
}

/// Row counts of a [`Catalog`], used in run summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCounts {
    pub artists: usize,
    pub albums: usize,
    pub album_artists: usize,
    pub tracks: usize,
    pub track_artists: usize,
    pub audio_features: usize,
}

impl Catalog {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            artists: self.artists.len(),
            albums: self.albums.len(),
            album_artists: self.album_artists.len(),
            tracks: self.tracks.len(),
            track_artists: self.track_artists.len(),
            audio_features: self.audio_features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.albums.is_empty() && self.audio_features.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_keys() {
        let mut row = SourceRow {
            track_id: Some("t1".into()),
            track_name: Some("Song".into()),
            album_name: Some("Album".into()),
            ..Default::default()
        };
        assert_eq!(row.required_keys(), Some(("t1", "Song", "Album")));

        row.album_name = None;
        assert_eq!(row.required_keys(), None);
    }

    #[test]
    fn test_audio_features_projection() {
        let row = SourceRow {
            track_id: Some("t1".into()),
            danceability: Some(0.5),
            key: Some(7),
            tempo: Some(120.0),
            ..Default::default()
        };
        let features = AudioFeatures::from_source("t1".into(), &row);
        assert_eq!(features.track_id, "t1");
        assert_eq!(features.danceability, Some(0.5));
        assert_eq!(features.key, Some(7));
        assert_eq!(features.tempo, Some(120.0));
        assert_eq!(features.energy, None);
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        let json = serde_json::to_string(&catalog.counts()).unwrap();
        assert!(json.contains("albumArtists"));
        assert!(json.contains("audioFeatures"));
    }
}
