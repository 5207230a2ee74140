use crate::aggregate::aggregate;
use crate::cache::{CacheStore, FileCacheStore, Memoizer};
use crate::config::{self, StatsConfig};
use crate::model::{
    Scrobble, ScrobbleRecord, StatisticsBundle, TrackAggregate, TrackRecord, TrackStats,
};
use crate::{parser, rank, season};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::UtcOffset;

pub struct StatsPipeline<S> {
    log_path: PathBuf,
    utc_offset: UtcOffset,
    memo: Memoizer<S>,
}

impl StatsPipeline<FileCacheStore> {
    pub fn from_config(config: &StatsConfig) -> Self {
        Self::with_store(
            config.log_path.clone(),
            config.utc_offset,
            FileCacheStore::new(&config.cache_dir),
        )
    }
}

impl<S: CacheStore> StatsPipeline<S> {
    pub fn with_store(log_path: PathBuf, utc_offset: UtcOffset, store: S) -> Self {
        Self {
            log_path,
            utc_offset,
            memo: Memoizer::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.memo.store()
    }

    pub fn load_scrobbles(&self) -> Result<Vec<Scrobble>> {
        let records: Vec<ScrobbleRecord> = self.memo.cached_json(config::RECORDS_CACHE, || {
            log::info!("Reading {}", self.log_path.display());
            parser::read_log(&self.log_path, self.utc_offset)?
                .iter()
                .map(Scrobble::to_record)
                .collect()
        })?;

        records
            .into_iter()
            .map(ScrobbleRecord::into_scrobble)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("bad entry in {}", config::RECORDS_CACHE))
    }

    pub fn load_tracks(&self, scrobbles: &[Scrobble]) -> Result<BTreeMap<String, TrackAggregate>> {
        let records: BTreeMap<String, TrackRecord> =
            self.memo.cached_json(config::TRACKS_CACHE, || {
                log::info!("Processing data...");
                aggregate(scrobbles)
                    .into_iter()
                    .map(|(id, track)| track.to_record().map(|record| (id, record)))
                    .collect()
            })?;

        records
            .into_iter()
            .map(|(id, record)| record.into_aggregate().map(|track| (id, track)))
            .collect::<Result<BTreeMap<_, _>>>()
            .with_context(|| format!("bad entry in {}", config::TRACKS_CACHE))
    }

    pub fn compute_statistics(&self) -> Result<StatisticsBundle> {
        let scrobbles = self.load_scrobbles()?;
        let tracks = self.load_tracks(&scrobbles)?;

        let stats = tracks
            .into_iter()
            .map(|(id, track)| season::analyze(track).map(|stats| (id, stats)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        log::info!(
            "{} scrobbles across {} tracks",
            scrobbles.len(),
            stats.len()
        );

        Ok(StatisticsBundle { stats, scrobbles })
    }
}

pub fn multiplays(bundle: &StatisticsBundle) -> Vec<TrackStats> {
    bundle
        .stats
        .values()
        .filter(|track| rank::is_multiplay(track))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use std::fs;
    use tempfile::tempdir;

    const LOG: &str = "\
Neon,Skyline,Night Drive,14 Mar 2021 18:30
Neon,Skyline,Night Drive,20 Apr 2021 08:00
Blue,Harbor,Ocean Room,01 Jul 2021 12:00
Neon,Live,Night Drive,02 May 2021 21:15
Old,Tape,Placeholder,01 Jan 1999 00:00
Blue,Harbor,Ocean Room,
";

    fn pipeline_with_log(log: &str) -> (tempfile::TempDir, StatsPipeline<MemoryCacheStore>) {
        let dir = tempdir().expect("tempdir");
        let log_path = dir.path().join("log.csv");
        fs::write(&log_path, log).expect("write log");
        let pipeline = StatsPipeline::with_store(log_path, UtcOffset::UTC, MemoryCacheStore::new());
        (dir, pipeline)
    }

    #[test]
    fn groups_valid_rows_by_track() {
        let (_dir, pipeline) = pipeline_with_log(LOG);

        let bundle = pipeline.compute_statistics().expect("bundle");

        assert_eq!(bundle.scrobbles.len(), 4);
        assert_eq!(bundle.stats.len(), 2);
        let night = &bundle.stats[&bundle.scrobbles[0].id];
        assert_eq!(night.play_count(), 3);
        assert_eq!(night.album, "Skyline");
        assert!(bundle.stats.values().all(|track| track.title != "Placeholder"));
    }

    #[test]
    fn fills_both_cache_slots() {
        let (_dir, pipeline) = pipeline_with_log(LOG);

        pipeline.compute_statistics().expect("bundle");

        assert!(pipeline.store().contains(config::RECORDS_CACHE));
        assert!(pipeline.store().contains(config::TRACKS_CACHE));
    }

    #[test]
    fn second_run_does_not_touch_the_log() {
        let (dir, pipeline) = pipeline_with_log(LOG);

        let first = pipeline.compute_statistics().expect("first");
        fs::remove_file(dir.path().join("log.csv")).expect("remove log");
        let second = pipeline.compute_statistics().expect("second");

        assert_eq!(first, second);
    }

    #[test]
    fn missing_log_is_fatal_on_cold_cache() {
        let dir = tempdir().expect("tempdir");
        let pipeline = StatsPipeline::with_store(
            dir.path().join("absent.csv"),
            UtcOffset::UTC,
            MemoryCacheStore::new(),
        );

        assert!(pipeline.compute_statistics().is_err());
        assert!(!pipeline.store().contains(config::RECORDS_CACHE));
    }

    #[test]
    fn multiplays_need_more_than_three_plays() {
        let mut log = String::new();
        for day in 1..=4 {
            log.push_str(&format!("Neon,Skyline,Night Drive,0{day} Mar 2021 18:30\n"));
        }
        for day in 1..=3 {
            log.push_str(&format!("Blue,Harbor,Ocean Room,0{day} Jul 2021 12:00\n"));
        }
        let (_dir, pipeline) = pipeline_with_log(&log);

        let bundle = pipeline.compute_statistics().expect("bundle");
        let tracks = multiplays(&bundle);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Night Drive");
    }
}
