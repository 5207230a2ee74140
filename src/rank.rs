use crate::model::TrackStats;
use std::cmp::Ordering;

pub const MULTIPLAY_THRESHOLD: usize = 3;
pub const HEAVY_PLAY_THRESHOLD: usize = 5;

pub fn is_multiplay(track: &TrackStats) -> bool {
    track.play_count() > MULTIPLAY_THRESHOLD
}

pub fn is_heavily_played(track: &TrackStats) -> bool {
    track.play_count() > HEAVY_PLAY_THRESHOLD
}

/// The `n` items with the largest key, largest first. Items with equal keys
/// keep their original relative order.
pub fn top_n<T, K, F>(items: impl IntoIterator<Item = T>, n: usize, mut key: F) -> Vec<T>
where
    F: FnMut(&T) -> K,
    K: PartialOrd,
{
    let mut keyed: Vec<(K, T)> = items.into_iter().map(|item| (key(&item), item)).collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    keyed.truncate(n);
    keyed.into_iter().map(|(_, item)| item).collect()
}

pub fn intersection_of_ids(lists: &[Vec<&TrackStats>]) -> Vec<String> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for track in first {
        if ids.contains(&track.id) {
            continue;
        }
        if rest
            .iter()
            .all(|list| list.iter().any(|other| other.id == track.id))
        {
            ids.push(track.id.clone());
        }
    }
    ids
}
