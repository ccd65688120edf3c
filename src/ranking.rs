//! Play counting and top-track ranking.

use std::collections::HashMap;

use serde::Serialize;

use crate::history::ListenLog;

pub const DEFAULT_TOP_N: usize = 10;

/// Play count for one artist/track pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateUnit {
    /// Spelling of the first listen seen for this pair
    pub artist_name: String,
    pub track_name: String,
    pub count: usize,
}

/// Most-played tracks over a window
#[derive(Debug, Clone, Serialize)]
pub struct RankedReport {
    pub total_listens: usize,
    pub tracks: Vec<AggregateUnit>,
}

/// Case-insensitive identity of a track
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
struct TrackKey {
    artist: String,
    track: String,
}

impl TrackKey {
    fn new(artist: &str, track: &str) -> Self {
        Self {
            artist: artist.to_lowercase(),
            track: track.to_lowercase(),
        }
    }
}

/// Count plays per artist/track pair, ignoring case.
///
/// Units come back in order of first appearance in the log.
pub fn tally(log: &ListenLog) -> Vec<AggregateUnit> {
    let mut index: HashMap<TrackKey, usize> = HashMap::new();
    let mut units: Vec<AggregateUnit> = Vec::new();

    for listen in log {
        let key = TrackKey::new(listen.artist_name(), listen.track_name());
        match index.get(&key) {
            Some(&pos) => units[pos].count += 1,
            None => {
                index.insert(key, units.len());
                units.push(AggregateUnit {
                    artist_name: listen.artist_name().to_string(),
                    track_name: listen.track_name().to_string(),
                    count: 1,
                });
            }
        }
    }

    units
}

/// Rank the log's tracks by play count and keep at most `limit` of them.
///
/// Equal counts are ordered by artist, then track, compared case-insensitively.
pub fn rank(log: &ListenLog, limit: usize) -> RankedReport {
    let mut keyed: Vec<(TrackKey, AggregateUnit)> = tally(log)
        .into_iter()
        .map(|unit| (TrackKey::new(&unit.artist_name, &unit.track_name), unit))
        .collect();

    keyed.sort_by(|(a_key, a), (b_key, b)| b.count.cmp(&a.count).then_with(|| a_key.cmp(b_key)));
    keyed.truncate(limit);

    RankedReport {
        total_listens: log.count(),
        tracks: keyed.into_iter().map(|(_, unit)| unit).collect(),
    }
}
