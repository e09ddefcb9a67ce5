//! `%!TIMESTAMP!` and `%!DELTA!`.
//!
//! Both take 100 ns ticks. Timestamps count from 1601-01-01 00:00 UTC
//! (FILETIME); deltas are signed durations.

use core::fmt::Write as _;

use crate::appender::TraceWrite;
use crate::args::{ArgCursor, IntWidth};
use crate::dispatch::RenderContext;

const TICKS_PER_MS: u64 = 10_000;
const SECS_PER_DAY: u64 = 86_400;

/// Days from 1601-01-01 to 1970-01-01.
const DAYS_1601_TO_1970: i64 = 134_774;

/// A broken-down calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    /// Full year.
    pub year: i64,
    /// Month, 1..=12.
    pub month: u32,
    /// Day of month, 1..=31.
    pub day: u32,
    /// Hour, 0..=23.
    pub hour: u32,
    /// Minute, 0..=59.
    pub minute: u32,
    /// Second, 0..=59.
    pub second: u32,
    /// Millisecond, 0..=999.
    pub millis: u32,
}

impl CivilTime {
    /// Breaks a FILETIME tick count down into calendar fields.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "all remainders are small")]
    #[expect(clippy::cast_possible_wrap, reason = "u64::MAX ticks is under 2^43 days")]
    pub fn from_filetime(ticks: u64) -> Self {
        let total_ms = ticks / TICKS_PER_MS;
        let secs = total_ms / 1000;
        let day_secs = secs % SECS_PER_DAY;
        let (year, month, day) = civil_from_days((secs / SECS_PER_DAY) as i64 - DAYS_1601_TO_1970);
        Self {
            year,
            month,
            day,
            hour: (day_secs / 3600) as u32,
            minute: (day_secs / 60 % 60) as u32,
            second: (day_secs % 60) as u32,
            millis: (total_ms % 1000) as u32,
        }
    }
}

/// Converts days since 1970-01-01 to a proleptic Gregorian `(year, month, day)`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "month and day are small")]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

pub(super) fn decode_timestamp(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, ctx: &RenderContext<'_>) {
    let ticks = args.next_int(IntWidth::LongLong);
    let local = (ctx.local_bias)(ticks).and_then(|bias| ticks.checked_add_signed(bias));
    let Some(t) = local.map(CivilTime::from_filetime).filter(|t| (1601..=9999).contains(&t.year)) else {
        let _ = write!(out, "0x{ticks:x}");
        return;
    };
    let _ = write!(
        out,
        "{:02}/{:02}/{:04}-{:02}:{:02}:{:02}.{:03}",
        t.month, t.day, t.year, t.hour, t.minute, t.second, t.millis
    );
}

pub(super) fn decode_delta(out: &mut dyn TraceWrite, args: &mut ArgCursor<'_>, _ctx: &RenderContext<'_>) {
    let ticks = args.next_signed(IntWidth::LongLong);
    if ticks < 0 {
        out.push_byte(b'-');
    }
    let total_ms = ticks.unsigned_abs() / TICKS_PER_MS;
    let ms = total_ms % 1000;
    let secs = total_ms / 1000;
    let (days, hours, minutes, seconds) = (secs / SECS_PER_DAY, secs / 3600 % 24, secs / 60 % 60, secs % 60);

    let _ = if days > 0 {
        write!(out, "{days}~{hours}:{minutes:02}:{seconds:02}.{ms:03}s")
    } else if hours > 0 {
        write!(out, "{hours}:{minutes:02}:{seconds:02}.{ms:03}s")
    } else if minutes > 0 {
        write!(out, "{minutes}:{seconds:02}.{ms:03}s")
    } else {
        write!(out, "{seconds}.{ms:03}s")
    };
}
