use crate::model::{Scrobble, TrackAggregate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    tracks: BTreeMap<String, TrackAggregate>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, scrobble: &Scrobble) {
        let track = self
            .tracks
            .entry(scrobble.id.clone())
            .or_insert_with(|| TrackAggregate::from_scrobble(scrobble));
        track.plays.push(scrobble.timestamp);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn into_tracks(self) -> BTreeMap<String, TrackAggregate> {
        self.tracks
    }
}

pub fn aggregate(scrobbles: &[Scrobble]) -> BTreeMap<String, TrackAggregate> {
    let mut aggregator = Aggregator::new();
    for scrobble in scrobbles {
        aggregator.observe(scrobble);
    }
    aggregator.into_tracks()
}
