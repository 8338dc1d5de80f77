//! Flat rows → relational tables.
//!
//! # Steps
//!
//! ```text
//! source rows ──▶ drop null keys ──▶ dedupe (id, name, album) ──▶ split artists
//!                                                                    │
//!        ┌───────────────┬───────────────┬──────────────┬───────────┴───┐
//!        ▼               ▼               ▼              ▼               ▼
//!     Artists         Albums       AlbumArtists      Tracks       TrackArtists
//!                                                                  AudioFeatures
//! ```
//!
//! Ids are handed out in first-seen order over the cleaned rows. Link tables
//! are resolved by name through the registries; a name without an id is
//! dropped from the link table (inner-join semantics) and counted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ids::{IdSequence, KeyRegistry, ALBUM_PREFIX, ARTIST_PREFIX};
use crate::models::{
    Album, AlbumArtist, Artist, AudioFeatures, Catalog, SourceRow, Track, TrackArtist,
};

/// Default separator inside the `artists` field.
pub const DEFAULT_ARTIST_DELIMITER: char = ';';

/// Options for the normalization stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Separator between artist names in the `artists` field
    pub artist_delimiter: char,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            artist_delimiter: DEFAULT_ARTIST_DELIMITER,
        }
    }
}

/// What the normalizer filtered out, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeStats {
    pub input_rows: usize,
    /// Rows without track_id, track_name or album_name.
    pub null_key_rows: usize,
    /// Rows repeating an earlier (track_id, track_name, album_name).
    pub duplicate_rows: usize,
    /// Cleaned rows that carry no artist name at all.
    pub rows_without_artists: usize,
    /// Link rows dropped because an artist name had no id.
    pub artist_join_misses: usize,
    /// Rows dropped because an album name had no id.
    pub album_join_misses: usize,
    /// Track rows repeating an earlier (track_id, track_name).
    pub duplicate_tracks: usize,
    /// Audio feature rows repeating an earlier track_id.
    pub duplicate_audio_features: usize,
}

impl NormalizeStats {
    pub fn join_misses(&self) -> usize {
        self.artist_join_misses + self.album_join_misses
    }
}

/// A row that survived key filtering and deduplication.
struct CleanRow<'a> {
    track_id: &'a str,
    track_name: &'a str,
    album_name: &'a str,
    artists: Vec<&'a str>,
    source: &'a SourceRow,
}

/// Normalize source rows into the six catalog tables.
pub fn normalize(rows: &[SourceRow], options: &NormalizeOptions) -> (Catalog, NormalizeStats) {
    let mut stats = NormalizeStats {
        input_rows: rows.len(),
        ..Default::default()
    };

    let cleaned = clean_rows(rows, options.artist_delimiter, &mut stats);

    let artists = register_artists(&cleaned);
    let albums = register_albums(&cleaned);

    let album_artists = build_album_artists(&cleaned, &artists, &albums, &mut stats);
    let tracks = build_tracks(&cleaned, &albums, &mut stats);
    let track_artists = build_track_artists(&cleaned, &artists, &mut stats);
    let audio_features = build_audio_features(&cleaned, &mut stats);

    let catalog = Catalog {
        artists: artists
            .into_entries()
            .into_iter()
            .map(|(artist_id, artist_name)| Artist {
                artist_id,
                artist_name,
            })
            .collect(),
        albums: albums
            .into_entries()
            .into_iter()
            .map(|(album_id, album_name)| Album {
                album_id,
                album_name,
            })
            .collect(),
        album_artists,
        tracks,
        track_artists,
        audio_features,
    };

    (catalog, stats)
}

/// Split a delimiter-joined artist field. Empty segments are skipped and
/// names are kept verbatim.
pub fn split_artists(field: Option<&str>, delimiter: char) -> Vec<&str> {
    match field {
        Some(field) => field.split(delimiter).filter(|name| !name.is_empty()).collect(),
        None => Vec::new(),
    }
}

fn clean_rows<'a>(
    rows: &'a [SourceRow],
    delimiter: char,
    stats: &mut NormalizeStats,
) -> Vec<CleanRow<'a>> {
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
    let mut cleaned = Vec::new();

    for row in rows {
        let Some((track_id, track_name, album_name)) = row.required_keys() else {
            stats.null_key_rows += 1;
            continue;
        };

        if !seen.insert((track_id, track_name, album_name)) {
            stats.duplicate_rows += 1;
            continue;
        }

        let artists = split_artists(row.artists.as_deref(), delimiter);
        if artists.is_empty() {
            stats.rows_without_artists += 1;
        }

        cleaned.push(CleanRow {
            track_id,
            track_name,
            album_name,
            artists,
            source: row,
        });
    }

    cleaned
}

fn register_artists(rows: &[CleanRow<'_>]) -> KeyRegistry {
    let mut registry = KeyRegistry::new(IdSequence::new(ARTIST_PREFIX));
    for name in rows.iter().flat_map(|r| r.artists.iter()) {
        registry.register(name);
    }
    registry
}

fn register_albums(rows: &[CleanRow<'_>]) -> KeyRegistry {
    let mut registry = KeyRegistry::new(IdSequence::new(ALBUM_PREFIX));
    for row in rows {
        registry.register(row.album_name);
    }
    registry
}

fn build_album_artists(
    rows: &[CleanRow<'_>],
    artists: &KeyRegistry,
    albums: &KeyRegistry,
    stats: &mut NormalizeStats,
) -> Vec<AlbumArtist> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for row in rows {
        for name in &row.artists {
            let Some(artist_id) = artists.get(name) else {
                stats.artist_join_misses += 1;
                continue;
            };
            let Some(album_id) = albums.get(row.album_name) else {
                stats.album_join_misses += 1;
                continue;
            };
            let link = AlbumArtist {
                album_id: album_id.to_string(),
                artist_id: artist_id.to_string(),
            };
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

fn build_tracks(
    rows: &[CleanRow<'_>],
    albums: &KeyRegistry,
    stats: &mut NormalizeStats,
) -> Vec<Track> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut tracks = Vec::new();

    for row in rows {
        let Some(album_id) = albums.get(row.album_name) else {
            stats.album_join_misses += 1;
            continue;
        };
        if !seen.insert((row.track_id, row.track_name)) {
            stats.duplicate_tracks += 1;
            continue;
        }
        tracks.push(Track {
            track_id: row.track_id.to_string(),
            track_name: row.track_name.to_string(),
            album_id: album_id.to_string(),
            popularity: row.source.popularity,
            duration_ms: row.source.duration_ms,
            explicit: row.source.explicit,
        });
    }

    tracks
}

fn build_track_artists(
    rows: &[CleanRow<'_>],
    artists: &KeyRegistry,
    stats: &mut NormalizeStats,
) -> Vec<TrackArtist> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for row in rows {
        for name in &row.artists {
            let Some(artist_id) = artists.get(name) else {
                stats.artist_join_misses += 1;
                continue;
            };
            let link = TrackArtist {
                track_id: row.track_id.to_string(),
                artist_id: artist_id.to_string(),
            };
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

fn build_audio_features(rows: &[CleanRow<'_>], stats: &mut NormalizeStats) -> Vec<AudioFeatures> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut features = Vec::new();

    for row in rows {
        if !seen.insert(row.track_id) {
            stats.duplicate_audio_features += 1;
            continue;
        }
        features.push(AudioFeatures::from_source(row.track_id.to_string(), row.source));
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(track_id: &str, track_name: &str, album: &str, artists: &str) -> SourceRow {
        SourceRow {
            track_id: Some(track_id.into()),
            track_name: Some(track_name.into()),
            album_name: Some(album.into()),
            artists: Some(artists.into()),
            popularity: Some(50),
            duration_ms: Some(200_000),
            explicit: Some(false),
            danceability: Some(0.5),
            ..Default::default()
        }
    }

    fn run(rows: &[SourceRow]) -> (Catalog, NormalizeStats) {
        normalize(rows, &NormalizeOptions::default())
    }

    #[test]
    fn test_shared_album_scenario() {
        let rows = vec![row("t1", "One", "X", "A1;A2"), row("t2", "Two", "X", "A2")];
        let (catalog, stats) = run(&rows);

        assert_eq!(catalog.albums.len(), 1);
        assert_eq!(catalog.albums[0].album_id, "ALB000001");
        assert_eq!(catalog.artists.len(), 2);
        assert_eq!(catalog.artists[0].artist_id, "ART000001");
        assert_eq!(catalog.artists[0].artist_name, "A1");
        assert_eq!(catalog.artists[1].artist_name, "A2");

        assert_eq!(
            catalog.album_artists,
            vec![
                AlbumArtist {
                    album_id: "ALB000001".into(),
                    artist_id: "ART000001".into()
                },
                AlbumArtist {
                    album_id: "ALB000001".into(),
                    artist_id: "ART000002".into()
                },
            ]
        );

        assert_eq!(catalog.tracks.len(), 2);
        assert!(catalog.tracks.iter().all(|t| t.album_id == "ALB000001"));

        let pairs: Vec<(&str, &str)> = catalog
            .track_artists
            .iter()
            .map(|l| (l.track_id.as_str(), l.artist_id.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("t1", "ART000001"),
                ("t1", "ART000002"),
                ("t2", "ART000002")
            ]
        );
        assert_eq!(stats.join_misses(), 0);
    }

    #[test]
    fn test_null_keys_dropped_before_id_generation() {
        let mut orphan = row("t0", "Zero", "Ghost", "Nobody");
        orphan.album_name = None;
        let rows = vec![orphan, row("t1", "One", "X", "A1")];
        let (catalog, stats) = run(&rows);

        assert_eq!(stats.null_key_rows, 1);
        assert_eq!(catalog.artists.len(), 1);
        assert_eq!(catalog.artists[0].artist_name, "A1");
        assert_eq!(catalog.artists[0].artist_id, "ART000001");
        assert!(catalog.audio_features.iter().all(|f| f.track_id != "t0"));
    }

    #[test]
    fn test_composite_duplicates_removed() {
        let rows = vec![
            row("t1", "One", "X", "A1"),
            row("t1", "One", "X", "A1"),
            row("t1", "One", "Y", "A1"),
        ];
        let (catalog, stats) = run(&rows);

        assert_eq!(stats.duplicate_rows, 1);
        assert_eq!(catalog.albums.len(), 2);
        // Same (track_id, track_name) on two albums keeps the first.
        assert_eq!(catalog.tracks.len(), 1);
        assert_eq!(catalog.tracks[0].album_id, "ALB000001");
        assert_eq!(stats.duplicate_tracks, 1);
        assert_eq!(catalog.audio_features.len(), 1);
        assert_eq!(catalog.album_artists.len(), 2);
    }

    #[test]
    fn test_names_unique_and_links_resolve() {
        let rows = vec![
            row("t1", "One", "X", "A;B"),
            row("t2", "Two", "Y", "B;C"),
            row("t3", "Three", "X", "C;A"),
            row("t4", "Four", "Z", "A"),
        ];
        let (catalog, _) = run(&rows);

        let artist_names: HashSet<_> = catalog.artists.iter().map(|a| &a.artist_name).collect();
        assert_eq!(artist_names.len(), catalog.artists.len());
        let album_names: HashSet<_> = catalog.albums.iter().map(|a| &a.album_name).collect();
        assert_eq!(album_names.len(), catalog.albums.len());

        let artist_ids: HashSet<_> = catalog.artists.iter().map(|a| &a.artist_id).collect();
        let album_ids: HashSet<_> = catalog.albums.iter().map(|a| &a.album_id).collect();
        let track_ids: HashSet<_> = catalog.tracks.iter().map(|t| &t.track_id).collect();

        for link in &catalog.album_artists {
            assert!(album_ids.contains(&link.album_id));
            assert!(artist_ids.contains(&link.artist_id));
        }
        for link in &catalog.track_artists {
            assert!(track_ids.contains(&link.track_id));
            assert!(artist_ids.contains(&link.artist_id));
        }
        assert_eq!(catalog.track_artists.len(), 7);
    }

    #[test]
    fn test_every_track_has_one_audio_feature_row() {
        let rows = vec![
            row("t1", "One", "X", "A"),
            row("t1", "One (Remastered)", "X", "A"),
            row("t2", "Two", "Y", "B"),
        ];
        let (catalog, stats) = run(&rows);

        assert_eq!(catalog.tracks.len(), 3 - stats.duplicate_tracks);
        assert_eq!(stats.duplicate_audio_features, 1);
        for track in &catalog.tracks {
            let n = catalog
                .audio_features
                .iter()
                .filter(|f| f.track_id == track.track_id)
                .count();
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn test_malformed_artist_fields() {
        let mut no_artist = row("t3", "Three", "X", "");
        no_artist.artists = None;
        let rows = vec![
            row("t1", "One", "X", "Solo Artist"),
            row("t2", "Two", "X", "A;;B;"),
            no_artist,
        ];
        let (catalog, stats) = run(&rows);

        let names: Vec<&str> = catalog
            .artists
            .iter()
            .map(|a| a.artist_name.as_str())
            .collect();
        assert_eq!(names, vec!["Solo Artist", "A", "B"]);
        assert_eq!(stats.rows_without_artists, 1);
        // The track without artists is still a track.
        assert_eq!(catalog.tracks.len(), 3);
    }

    #[test]
    fn test_custom_delimiter_and_verbatim_names() {
        let rows = vec![row("t1", "One", "X", "A1, A2")];
        let options = NormalizeOptions {
            artist_delimiter: ',',
        };
        let (catalog, _) = normalize(&rows, &options);

        let names: Vec<&str> = catalog
            .artists
            .iter()
            .map(|a| a.artist_name.as_str())
            .collect();
        assert_eq!(names, vec!["A1", " A2"]);
    }

    #[test]
    fn test_popularity_bounds_pass_through() {
        let mut low = row("t1", "One", "X", "A");
        low.popularity = Some(0);
        let mut high = row("t2", "Two", "X", "A");
        high.popularity = Some(100);
        let mut out = row("t3", "Three", "X", "A");
        out.popularity = Some(101);
        let (catalog, _) = run(&[low, high, out]);

        let pops: Vec<Option<i64>> = catalog.tracks.iter().map(|t| t.popularity).collect();
        assert_eq!(pops, vec![Some(0), Some(100), Some(101)]);
    }

    #[test]
    fn test_empty_input() {
        let (catalog, stats) = run(&[]);
        assert!(catalog.is_empty());
        assert_eq!(stats, NormalizeStats::default());
    }
}
