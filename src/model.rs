use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scrobble {
    pub id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    #[serde(serialize_with = "serialize_instant")]
    pub timestamp: OffsetDateTime,
}

impl Scrobble {
    pub fn new(artist: String, album: String, title: String, timestamp: OffsetDateTime) -> Self {
        let id = crate::identity::track_id(&artist, &title);
        Self {
            id,
            artist,
            album,
            title,
            timestamp,
        }
    }

    pub fn to_record(&self) -> Result<ScrobbleRecord> {
        Ok(ScrobbleRecord {
            id: self.id.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            title: self.title.clone(),
            timestamp: format_instant(self.timestamp)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleRecord {
    pub id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub timestamp: String,
}

impl ScrobbleRecord {
    pub fn into_scrobble(self) -> Result<Scrobble> {
        let timestamp = parse_instant(&self.timestamp)?;
        Ok(Scrobble {
            id: self.id,
            artist: self.artist,
            album: self.album,
            title: self.title,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackAggregate {
    pub id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub plays: Vec<OffsetDateTime>,
}

impl TrackAggregate {
    pub fn from_scrobble(scrobble: &Scrobble) -> Self {
        Self {
            id: scrobble.id.clone(),
            artist: scrobble.artist.clone(),
            album: scrobble.album.clone(),
            title: scrobble.title.clone(),
            plays: Vec::new(),
        }
    }

    pub fn to_record(&self) -> Result<TrackRecord> {
        let plays = self
            .plays
            .iter()
            .map(|play| format_instant(*play))
            .collect::<Result<Vec<_>>>()?;
        Ok(TrackRecord {
            id: self.id.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            title: self.title.clone(),
            plays,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub plays: Vec<String>,
}

impl TrackRecord {
    pub fn into_aggregate(self) -> Result<TrackAggregate> {
        let plays = self
            .plays
            .iter()
            .map(|play| parse_instant(play))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("bad play timestamp for track {}", self.id))?;
        Ok(TrackAggregate {
            id: self.id,
            artist: self.artist,
            album: self.album,
            title: self.title,
            plays,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStats {
    pub id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    #[serde(serialize_with = "serialize_instants")]
    pub plays: Vec<OffsetDateTime>,
    #[serde(serialize_with = "serialize_instant")]
    pub first_play: OffsetDateTime,
    #[serde(serialize_with = "serialize_instant")]
    pub last_play: OffsetDateTime,
    pub play_window_seconds: i64,
    pub spring_weight: f64,
    pub summer_weight: f64,
    pub autumn_weight: f64,
    pub winter_weight: f64,
}

impl TrackStats {
    pub fn play_count(&self) -> usize {
        self.plays.len()
    }

    pub fn weight(&self, season: Season) -> f64 {
        match season {
            Season::Spring => self.spring_weight,
            Season::Summer => self.summer_weight,
            Season::Autumn => self.autumn_weight,
            Season::Winter => self.winter_weight,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    pub fn label(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsBundle {
    pub stats: BTreeMap<String, TrackStats>,
    pub scrobbles: Vec<Scrobble>,
}

pub fn format_instant(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339)
        .with_context(|| format!("failed to format timestamp {at}"))
}

pub fn parse_instant(text: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .with_context(|| format!("failed to parse timestamp {text:?}"))
}

fn serialize_instant<S>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = at.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

fn serialize_instants<S>(plays: &[OffsetDateTime], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let texts = plays
        .iter()
        .map(|at| at.format(&Rfc3339))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::ser::Error::custom)?;
    serializer.collect_seq(texts)
}
