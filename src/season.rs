use crate::model::{Season, TrackAggregate, TrackStats};
use anyhow::{Result, bail};
use std::collections::HashMap;
use time::{Month, OffsetDateTime};

const MIN_SEASON_PLAYS: usize = 2;
const MIN_SEASON_YEARS: usize = 2;

impl Season {
    pub fn of_month(month: Month) -> Self {
        match month {
            Month::March | Month::April | Month::May => Self::Spring,
            Month::June | Month::July | Month::August => Self::Summer,
            Month::September | Month::October | Month::November => Self::Autumn,
            Month::December | Month::January | Month::February => Self::Winter,
        }
    }

    pub fn contains(self, at: OffsetDateTime) -> bool {
        Self::of_month(at.month()) == self
    }
}

/// Calendar year, except December rolls into the next year's winter.
pub fn season_year(at: OffsetDateTime) -> i32 {
    if at.month() == Month::December {
        at.year() + 1
    } else {
        at.year()
    }
}

pub fn seasonal_weight(plays: &[OffsetDateTime], season: Season) -> f64 {
    if plays.is_empty() {
        return 0.0;
    }

    let totals = count_by_season_year(plays.iter().copied());
    let in_season = count_by_season_year(plays.iter().copied().filter(|at| season.contains(*at)));

    let recurring_years = in_season
        .iter()
        .filter(|(year, count)| {
            let total = totals.get(*year).copied().unwrap_or_default();
            **count >= MIN_SEASON_PLAYS && **count >= total.div_ceil(2)
        })
        .count();
    if recurring_years < MIN_SEASON_YEARS {
        return 0.0;
    }

    let season_plays: usize = in_season.values().sum();
    season_plays as f64 / plays.len() as f64
}

fn count_by_season_year(plays: impl Iterator<Item = OffsetDateTime>) -> HashMap<i32, usize> {
    let mut counts = HashMap::new();
    for at in plays {
        *counts.entry(season_year(at)).or_insert(0) += 1;
    }
    counts
}

pub fn percent_of_plays_in(plays: &[OffsetDateTime], season: Season) -> u32 {
    if plays.is_empty() {
        return 0;
    }
    let in_season = plays.iter().filter(|at| season.contains(**at)).count();
    ((in_season * 100) / plays.len()) as u32
}

pub fn analyze(track: TrackAggregate) -> Result<TrackStats> {
    let (Some(first_play), Some(last_play)) =
        (track.plays.iter().min().copied(), track.plays.iter().max().copied())
    else {
        bail!("track {} has no plays", track.id);
    };

    let spring_weight = seasonal_weight(&track.plays, Season::Spring);
    let summer_weight = seasonal_weight(&track.plays, Season::Summer);
    let autumn_weight = seasonal_weight(&track.plays, Season::Autumn);
    let winter_weight = seasonal_weight(&track.plays, Season::Winter);

    Ok(TrackStats {
        id: track.id,
        artist: track.artist,
        album: track.album,
        title: track.title,
        plays: track.plays,
        first_play,
        last_play,
        play_window_seconds: (last_play - first_play).whole_seconds(),
        spring_weight,
        summer_weight,
        autumn_weight,
        winter_weight,
    })
}
