use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body of the ListenBrainz listens endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListensEnvelope {
    pub payload: Page,
}

/// One page of listen history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub listens: Vec<ListenRecord>,
}

/// A single recorded play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenRecord {
    /// Seconds since the Unix epoch; absent for "playing now" entries
    #[serde(default)]
    pub listened_at: Option<i64>,
    #[serde(default)]
    pub recording_msid: String,
    pub track_metadata: TrackMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadata {
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
}

/// Enrichment fields submitted alongside a listen. Not used for ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_mbid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artist_mbids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_mbid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_msid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group_mbid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_msid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_mbid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracknumber: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_mbids: Vec<String>,
    /// Any other submitted keys, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListenRecord {
    pub fn new(listened_at: i64, artist_name: &str, track_name: &str) -> Self {
        Self {
            listened_at: Some(listened_at),
            recording_msid: String::new(),
            track_metadata: TrackMetadata {
                artist_name: artist_name.to_string(),
                track_name: track_name.to_string(),
                additional_info: AdditionalInfo::default(),
            },
        }
    }

    pub fn artist_name(&self) -> &str {
        &self.track_metadata.artist_name
    }

    pub fn track_name(&self) -> &str {
        &self.track_metadata.track_name
    }
}

impl Page {
    pub fn new(listens: Vec<ListenRecord>) -> Self {
        Self {
            count: listens.len(),
            listens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listens.is_empty()
    }

    /// Most recent timestamp carried by any record on the page
    pub fn latest_timestamp(&self) -> Option<i64> {
        self.listens.iter().filter_map(|l| l.listened_at).max()
    }
}
