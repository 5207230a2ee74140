use crate::model::Scrobble;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use time::format_description::BorrowedFormatItem;
use time::macros::{date, format_description};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Export format of the listening log, e.g. `14 Mar 2021 18:30`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:short] [year] [hour padding:none]:[minute]");

const ARTIST_COLUMN: usize = 0;
const ALBUM_COLUMN: usize = 1;
const TITLE_COLUMN: usize = 2;
const TIMESTAMP_COLUMN: usize = 3;

pub fn read_log(path: &Path, offset: UtcOffset) -> Result<Vec<Scrobble>> {
    let file =
        File::open(path).with_context(|| format!("failed to open log {}", path.display()))?;
    parse_rows(file, offset).with_context(|| format!("failed to parse log {}", path.display()))
}

pub fn parse_rows<R: Read>(reader: R, offset: UtcOffset) -> Result<Vec<Scrobble>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut scrobbles = Vec::new();
    let mut missing = 0_usize;
    let mut too_early = 0_usize;

    for (index, record) in reader.byte_records().enumerate() {
        let row = index + 1;
        let record = record.with_context(|| format!("failed to read row {row}"))?;
        let field = |column: usize| {
            record
                .get(column)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };

        let raw_timestamp = field(TIMESTAMP_COLUMN);
        let raw_timestamp = raw_timestamp.trim();
        if raw_timestamp.is_empty() {
            missing += 1;
            continue;
        }

        let timestamp = parse_timestamp(raw_timestamp, offset)
            .with_context(|| format!("bad timestamp on row {row}"))?;
        if !is_plausible_timestamp(timestamp) {
            too_early += 1;
            continue;
        }

        scrobbles.push(Scrobble::new(
            field(ARTIST_COLUMN),
            field(ALBUM_COLUMN),
            field(TITLE_COLUMN),
            timestamp,
        ));
    }

    log::debug!(
        "parsed {} scrobbles, skipped {missing} without timestamp and {too_early} before the floor",
        scrobbles.len()
    );
    Ok(scrobbles)
}

pub fn parse_timestamp(text: &str, offset: UtcOffset) -> Result<OffsetDateTime> {
    let local = PrimitiveDateTime::parse(text.trim(), TIMESTAMP_FORMAT)
        .with_context(|| format!("{text:?} is not in \"dd MMM yyyy HH:mm\" form"))?;
    Ok(local.assume_offset(offset))
}

/// Anything before 2000-02-01 (in the play's own offset) is a placeholder date.
pub fn is_plausible_timestamp(at: OffsetDateTime) -> bool {
    let floor = date!(2000-02-01).midnight().assume_offset(at.offset());
    at >= floor
}
