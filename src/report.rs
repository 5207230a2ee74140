use crate::duration::format_interval;
use crate::model::{Season, TrackStats};
use crate::rank::{intersection_of_ids, is_heavily_played, top_n};
use crate::season::percent_of_plays_in;
use anyhow::{Result, bail};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLimits {
    pub most_played: usize,
    pub per_season: usize,
    pub play_window: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            most_played: 5,
            per_season: 20,
            play_window: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayCountLine {
    pub name: String,
    pub plays: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalLine {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub percent: u32,
    pub plays: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalRanking {
    pub season: Season,
    pub lines: Vec<SeasonalLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayWindowLine {
    pub name: String,
    pub window: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub most_played: Vec<PlayCountLine>,
    pub seasonal: Vec<SeasonalRanking>,
    pub play_windows: Vec<PlayWindowLine>,
}

pub fn build_report(tracks: &[TrackStats], limits: ReportLimits) -> Result<Report> {
    let most_played = top_n(tracks, limits.most_played, |track| track.play_count())
        .into_iter()
        .map(|track| PlayCountLine {
            name: track.display_name(),
            plays: track.play_count(),
        })
        .collect();

    let heavy: Vec<&TrackStats> = tracks.iter().filter(|track| is_heavily_played(track)).collect();
    let seasonal_tracks: Vec<Vec<&TrackStats>> = Season::ALL
        .iter()
        .map(|season| {
            top_n(heavy.iter().copied(), limits.per_season, |track| track.weight(*season))
                .into_iter()
                .filter(|track| track.weight(*season) > 0.0)
                .collect()
        })
        .collect();

    let duplicates = intersection_of_ids(&seasonal_tracks);
    if !duplicates.is_empty() {
        bail!(
            "internal invariant violated: tracks ranked in every season: {}",
            duplicates.join(", ")
        );
    }

    let seasonal = Season::ALL
        .iter()
        .zip(&seasonal_tracks)
        .map(|(season, ranked)| SeasonalRanking {
            season: *season,
            lines: ranked
                .iter()
                .map(|track| SeasonalLine {
                    id: track.id.clone(),
                    name: track.display_name(),
                    weight: track.weight(*season),
                    percent: percent_of_plays_in(&track.plays, *season),
                    plays: track.play_count(),
                })
                .collect(),
        })
        .collect();

    let play_windows = top_n(tracks, limits.play_window, |track| track.play_window_seconds)
        .into_iter()
        .map(|track| {
            format_interval(track.first_play, track.last_play).map(|window| PlayWindowLine {
                name: track.display_name(),
                window,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Report {
        most_played,
        seasonal,
        play_windows,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Most played:")?;
        for line in &self.most_played {
            writeln!(f)?;
            writeln!(f, "{}", line.name)?;
            writeln!(f, "{} plays", line.plays)?;
        }

        for ranking in &self.seasonal {
            writeln!(f)?;
            writeln!(f, "Most played in {}:", ranking.season.label())?;
            writeln!(f)?;
            for line in &ranking.lines {
                writeln!(f, "{} ({}% of {} total plays)", line.name, line.percent, line.plays)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Biggest play window:")?;
        for line in &self.play_windows {
            writeln!(f)?;
            writeln!(f, "{}", line.name)?;
            writeln!(f, "{}", line.window)?;
        }
        Ok(())
    }
}
