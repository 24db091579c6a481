/// Largest magnitude a cue time may take, in ms. Keeps every value exactly
/// representable when handed out as `f64` seconds.
pub const MAX_MS: i64 = 1 << 53;

/// Seconds from an import or playback collaborator, rounded to whole ms.
pub fn secs_to_ms(secs: f64) -> Option<i64> {
    let ms = (secs * 1000.0).round();
    (ms.is_finite() && ms.abs() <= MAX_MS as f64).then_some(ms as i64)
}

pub fn ms_to_secs(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

/// Renders ms as `hh:mm:ss.mmm`. Negative values clamp to zero.
pub fn format_timestamp(ms_in: i64) -> String {
    let ms = ms_in.max(0);

    let total_seconds = ms / 1000;
    let milli = ms % 1000;

    let sec = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let min = total_minutes % 60;
    let hour = total_minutes / 60;

    format!("{hour:02}:{min:02}:{sec:02}.{milli:03}")
}

/// Parses what a user types into a timing field, in ms.
///
/// Accepts plain seconds (`7`, `7.25`) and clock forms `mm:ss` or
/// `hh:mm:ss`, each with an optional `.` or `,` fraction. Returns `None`
/// for anything else, including values outside `±MAX_MS`.
pub fn parse_ms(s: &str) -> Option<i64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if !t.contains(':') {
        let secs = t.replace(',', ".").parse::<f64>().ok()?;
        return secs_to_ms(secs);
    }

    let (hms, frac) = match t.split_once(['.', ',']) {
        Some((a, b)) => (a, Some(b)),
        None => (t, None),
    };

    let parts: Vec<&str> = hms.split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [m, s] => (0, parse_unit(m)?, parse_unit(s)?),
        [h, m, s] => (parse_unit(h)?, parse_unit(m)?, parse_unit(s)?),
        _ => return None,
    };
    if m >= 60 || sec >= 60 {
        return None;
    }

    let mut ms = h
        .checked_mul(60)?
        .checked_add(m)?
        .checked_mul(60)?
        .checked_add(sec)?
        .checked_mul(1000)?;

    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut frac_s: String = frac.chars().take(3).collect();
        while frac_s.len() < 3 {
            frac_s.push('0');
        }
        ms = ms.checked_add(frac_s.parse().ok()?)?;
    }

    (ms <= MAX_MS).then_some(ms)
}

fn parse_unit(part: &str) -> Option<i64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
