use anyhow::{Context, Result, bail};
use time::{Month, OffsetDateTime};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarSpan {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarSpan {
    fn units(&self) -> [(i64, &'static str, &'static str); 6] {
        [
            (self.years, "year", "years"),
            (self.months, "month", "months"),
            (self.days, "day", "days"),
            (self.hours, "hour", "hours"),
            (self.minutes, "minute", "minutes"),
            (self.seconds, "second", "seconds"),
        ]
    }
}

pub fn calendar_span(start: OffsetDateTime, end: OffsetDateTime) -> Result<CalendarSpan> {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let end = end.to_offset(start.offset());

    let mut years = i64::from(end.year() - start.year());
    if add_months(start, years * 12)? > end {
        years -= 1;
    }
    let cursor = add_months(start, years * 12)?;

    let mut months = i64::from(end.year() - cursor.year()) * 12
        + i64::from(end.month() as u8)
        - i64::from(cursor.month() as u8);
    if add_months(cursor, months)? > end {
        months -= 1;
    }
    let cursor = add_months(cursor, months)?;

    let mut rest = (end - cursor).whole_seconds();
    let days = rest / SECONDS_PER_DAY;
    rest %= SECONDS_PER_DAY;
    let hours = rest / SECONDS_PER_HOUR;
    rest %= SECONDS_PER_HOUR;

    Ok(CalendarSpan {
        years,
        months,
        days,
        hours,
        minutes: rest / SECONDS_PER_MINUTE,
        seconds: rest % SECONDS_PER_MINUTE,
    })
}

fn add_months(at: OffsetDateTime, months: i64) -> Result<OffsetDateTime> {
    let index = i64::from(at.year()) * 12 + i64::from(at.month() as u8 - 1) + months;
    let year = i32::try_from(index.div_euclid(12)).context("year out of range")?;
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8)?;
    let day = at.day().min(days_in_month(year, month));
    let date = time::Date::from_calendar_date(year, month, day)?;
    Ok(at.replace_date(date))
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

pub fn format_span(span: &CalendarSpan) -> Result<String> {
    let units = span.units();
    let last_pair = units.len() - 2;
    let first = units
        .iter()
        .position(|(value, _, _)| *value != 0)
        .map_or(last_pair, |index| index.min(last_pair));

    let formatted = units[first..first + 2]
        .iter()
        .map(|(value, singular, plural)| {
            let unit = if *value == 1 { singular } else { plural };
            format!("{value} {unit}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    if formatted.is_empty() {
        bail!("internal invariant violated: empty duration for {span:?}");
    }
    Ok(formatted)
}

pub fn format_interval(start: OffsetDateTime, end: OffsetDateTime) -> Result<String> {
    format_span(&calendar_span(start, end)?)
}

pub fn format_since(at: OffsetDateTime, now: OffsetDateTime) -> Result<String> {
    Ok(format!("{} ago", format_interval(at, now)?))
}
