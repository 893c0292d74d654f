//! Weekly RRULE subset: `FREQ=WEEKLY;BYDAY=..;BYHOUR=h;BYMINUTE=m[;DURATION_MINUTES=d]`.

use airwave_core::{ClockTime, DayOfWeek};

/// Block length when `DURATION_MINUTES` is absent.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Longest block a weekly rule may describe.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Parsed form of a supported weekly rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRule {
    pub days: Vec<DayOfWeek>,
    pub start: ClockTime,
    pub duration_minutes: u32,
}

/// Parse an RRULE string in the supported weekly subset.
///
/// Keys are case-insensitive and may appear in any order; an `RRULE:` prefix
/// is tolerated. `BYDAY` may list several days. `INTERVAL=1` is accepted;
/// any other key is unsupported.
pub fn parse_weekly_rrule(expr: &str) -> Result<WeeklyRule, String> {
    let body = expr.trim();
    let body = body
        .strip_prefix("RRULE:")
        .or_else(|| body.strip_prefix("rrule:"))
        .unwrap_or(body);

    let mut freq = None;
    let mut days = None;
    let mut hour = None;
    let mut minute = None;
    let mut duration = None;

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("malformed RRULE part '{part}'"))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();
        let duplicate = || format!("RRULE key {key} appears more than once");

        match key.as_str() {
            "FREQ" => {
                if freq.replace(value.to_ascii_uppercase()).is_some() {
                    return Err(duplicate());
                }
            }
            "BYDAY" => {
                let parsed = value
                    .split(',')
                    .map(|code| {
                        DayOfWeek::from_rrule_code(code.trim())
                            .ok_or_else(|| format!("unsupported BYDAY value '{}'", code.trim()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if days.replace(parsed).is_some() {
                    return Err(duplicate());
                }
            }
            "BYHOUR" => {
                if hour.replace(parse_bounded(&key, value, 0, 23)?).is_some() {
                    return Err(duplicate());
                }
            }
            "BYMINUTE" => {
                if minute.replace(parse_bounded(&key, value, 0, 59)?).is_some() {
                    return Err(duplicate());
                }
            }
            "DURATION_MINUTES" => {
                let d = parse_bounded(&key, value, 1, MAX_DURATION_MINUTES)?;
                if duration.replace(d).is_some() {
                    return Err(duplicate());
                }
            }
            "INTERVAL" if value == "1" => {}
            other => return Err(format!("unsupported RRULE key {other}")),
        }
    }

    match freq.as_deref() {
        Some("WEEKLY") => {}
        Some(other) => return Err(format!("only FREQ=WEEKLY is supported, got FREQ={other}")),
        None => return Err("RRULE is missing FREQ=".to_string()),
    }
    let days = days.ok_or("RRULE is missing BYDAY")?;
    let hour = hour.ok_or("RRULE is missing BYHOUR")?;
    let minute = minute.ok_or("RRULE is missing BYMINUTE")?;
    let start = ClockTime::from_hm(hour, minute).ok_or("RRULE time is out of range")?;

    let mut days = days;
    days.sort();
    days.dedup();

    Ok(WeeklyRule {
        days,
        start,
        duration_minutes: duration.unwrap_or(DEFAULT_DURATION_MINUTES),
    })
}

fn parse_bounded(key: &str, value: &str, min: u32, max: u32) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(v) if (min..=max).contains(&v) => Ok(v),
        _ => Err(format!("{key} must be a single number in {min}..={max}, got '{value}'")),
    }
}

/// Render a weekly rule for one day. The default duration is left implicit.
pub fn to_rrule(day: DayOfWeek, start: ClockTime, duration_minutes: Option<u32>) -> String {
    let mut rule = format!(
        "FREQ=WEEKLY;BYDAY={};BYHOUR={};BYMINUTE={}",
        day.rrule_code(),
        start.hour(),
        start.minute()
    );
    if let Some(d) = duration_minutes.filter(|d| *d != DEFAULT_DURATION_MINUTES) {
        rule.push_str(&format!(";DURATION_MINUTES={d}"));
    }
    rule
}
