#![no_main]

use libfuzzer_sys::fuzz_target;
use scrobstat::aggregate::aggregate;
use scrobstat::parser::{is_plausible_timestamp, parse_rows};
use time::UtcOffset;

fuzz_target!(|data: &[u8]| {
    let Ok(scrobbles) = parse_rows(data, UtcOffset::UTC) else {
        return;
    };
    assert!(scrobbles.iter().all(|scrobble| is_plausible_timestamp(scrobble.timestamp)));

    let tracks = aggregate(&scrobbles);
    let plays: usize = tracks.values().map(|track| track.plays.len()).sum();
    assert_eq!(plays, scrobbles.len());
});
