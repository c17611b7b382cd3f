use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Date/time parsing seam. The bundled implementation covers the phrasing a
/// clinic caller actually produces; anything broader is the collaborator's
/// problem, not the core's.
pub trait DateTimeParser: Send + Sync {
    fn parse(&self, text: &str, tz: Tz) -> Option<NaiveDateTime>;
}

/// Canonicalize a raw date fragment and time fragment into a calendar date
/// and clock time in the clinic's zone. The fragments are joined with one
/// space and parsed once; parse failure maps uniformly to `None` and never
/// propagates past this boundary.
pub fn normalize(
    parser: &dyn DateTimeParser,
    date_text: &str,
    time_text: &str,
    tz: Tz,
) -> Option<(NaiveDate, NaiveTime)> {
    let combined = format!("{} {}", date_text.trim(), time_text.trim());
    let combined = combined.trim();
    if combined.is_empty() {
        return None;
    }

    let dt = parser.parse(combined, tz)?;
    Some((dt.date(), dt.time()))
}

/// Rule-based parser resolving relative wording against the current instant
/// in the target zone. Handles "today"/"tomorrow", weekday names with an
/// optional "next"/"this"/"on", ISO and day-first numeric dates, month-name
/// dates, and 12/24-hour clock times.
pub struct SystemDateTimeParser;

impl DateTimeParser for SystemDateTimeParser {
    fn parse(&self, text: &str, tz: Tz) -> Option<NaiveDateTime> {
        let now = Utc::now().with_timezone(&tz).naive_local();
        parse_with_reference(text, now)
    }
}

fn parse_with_reference(text: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let (time, time_span) = find_time(&tokens);
    let date = find_date(&tokens, &time_span, reference.date());

    match (date, time) {
        (None, None) => None,
        // missing pieces fill in from the reference date / midnight
        (date, time) => Some(NaiveDateTime::new(
            date.unwrap_or_else(|| reference.date()),
            time.unwrap_or(NaiveTime::MIN),
        )),
    }
}

// ── time ──

/// Scan for a clock time; returns the parsed time and the token indexes it
/// consumed so the date scan can skip them.
fn find_time(tokens: &[&str]) -> (Option<NaiveTime>, Vec<usize>) {
    for (i, token) in tokens.iter().enumerate() {
        // meridiem as its own token first ("2:30 pm"), so the bare form
        // cannot swallow "2:30" and leave the "pm" behind
        if i + 1 < tokens.len() {
            if let Some(meridiem) = parse_meridiem(tokens[i + 1]) {
                if let Some(t) = parse_clock(token, Some(meridiem)) {
                    return (Some(t), vec![i, i + 1]);
                }
            }
        }
        // meridiem attached or absent: "2:30pm", "7pm", "14:30"
        if let Some(t) = parse_clock(token, None) {
            return (Some(t), vec![i]);
        }
        match *token {
            "noon" | "midday" => {
                return (NaiveTime::from_hms_opt(12, 0, 0), vec![i]);
            }
            "midnight" => return (Some(NaiveTime::MIN), vec![i]),
            _ => {}
        }
    }
    (None, vec![])
}

#[derive(Clone, Copy, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

fn parse_meridiem(token: &str) -> Option<Meridiem> {
    match token.trim_end_matches('.') {
        "am" | "a" => Some(Meridiem::Am),
        "pm" | "p" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// "14:30", "2:30pm", "7pm", "1430". A bare "1430" only counts as a time
/// when it cannot be a year.
fn parse_clock(token: &str, trailing_meridiem: Option<Meridiem>) -> Option<NaiveTime> {
    let (body, meridiem) = match trailing_meridiem {
        Some(m) => (token, Some(m)),
        None => {
            if let Some(stripped) = token.strip_suffix("am").or_else(|| token.strip_suffix("a.m.")) {
                (stripped, Some(Meridiem::Am))
            } else if let Some(stripped) =
                token.strip_suffix("pm").or_else(|| token.strip_suffix("p.m."))
            {
                (stripped, Some(Meridiem::Pm))
            } else {
                (token, None)
            }
        }
    };
    let body = body.trim_end_matches('.');
    if body.is_empty() {
        return None;
    }

    let (hour, minute): (u32, u32) = if let Some((h, m)) = body.split_once(':') {
        (h.parse().ok()?, m.parse().ok()?)
    } else if meridiem.is_some() {
        // bare hour with meridiem: "7pm"
        (body.parse().ok()?, 0)
    } else if body.len() == 4 && body.chars().all(|c| c.is_ascii_digit()) {
        let compact: u32 = body.parse().ok()?;
        let (h, m) = (compact / 100, compact % 100);
        // "1900" is more likely a year than seven in the evening
        if !(0..=23).contains(&h) || m > 59 || (1900..=2099).contains(&compact) {
            return None;
        }
        (h, m)
    } else {
        return None;
    };

    let hour = match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ── date ──

fn find_date(tokens: &[&str], skip: &[usize], today: NaiveDate) -> Option<NaiveDate> {
    let remaining: Vec<(usize, &str)> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .map(|(i, t)| (i, *t))
        .collect();

    for (pos, (_, token)) in remaining.iter().enumerate() {
        match *token {
            "today" | "tonight" => return Some(today),
            "tomorrow" => return Some(today + Duration::days(1)),
            _ => {}
        }

        if let Some(weekday) = parse_weekday(token) {
            return Some(upcoming(weekday, today));
        }

        // explicit formats anchored at this token
        if let Some(date) = parse_explicit_date(token) {
            return Some(date);
        }

        // month-name forms: "march 5 2025", "5 march", "march 5"
        if let Some(date) = parse_month_name_date(&remaining, pos, today) {
            return Some(date);
        }
    }
    None
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next occurrence of the weekday, counting today when it matches.
fn upcoming(weekday: Weekday, today: NaiveDate) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    today + Duration::days(ahead as i64)
}

/// "2025-03-01" and day-first "01/03/2025" (or "1/3/25").
fn parse_explicit_date(token: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Some(date);
    }
    let parts: Vec<&str> = token.split('/').collect();
    if parts.len() == 3 {
        let day: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let mut year: i32 = parts[2].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

fn parse_month(token: &str) -> Option<u32> {
    let month = match token.trim_end_matches('.') {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_day_number(token: &str) -> Option<u32> {
    let body = token
        .trim_end_matches("st")
        .trim_end_matches("nd")
        .trim_end_matches("rd")
        .trim_end_matches("th");
    let day: u32 = body.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_month_name_date(
    remaining: &[(usize, &str)],
    pos: usize,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let token = remaining[pos].1;
    let next = remaining.get(pos + 1).map(|(_, t)| *t);
    let after = remaining.get(pos + 2).map(|(_, t)| *t);

    // "march 5" / "march 5 2025"
    if let Some(month) = parse_month(token) {
        let day = next.and_then(parse_day_number)?;
        let year = after
            .and_then(|t| t.parse::<i32>().ok())
            .filter(|y| (1900..=2099).contains(y))
            .unwrap_or(today.year());
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // "5 march" / "5th of march" / "5 march 2025"
    if let Some(day) = parse_day_number(token) {
        let (month_token, year_token) = if next == Some("of") {
            (
                remaining.get(pos + 2).map(|(_, t)| *t),
                remaining.get(pos + 3).map(|(_, t)| *t),
            )
        } else {
            (next, after)
        };
        let month = month_token.and_then(parse_month)?;
        let year = year_token
            .and_then(|t| t.parse::<i32>().ok())
            .filter(|y| (1900..=2099).contains(y))
            .unwrap_or(today.year());
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDateTime {
        // Saturday 2025-03-01, mid-morning
        NaiveDateTime::parse_from_str("2025-03-01 09:15", "%Y-%m-%d %H:%M").unwrap()
    }

    fn parse(text: &str) -> Option<NaiveDateTime> {
        parse_with_reference(text, reference())
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_iso_date_and_24h_time() {
        assert_eq!(parse("2025-03-01 14:30"), Some(dt("2025-03-01 14:30")));
    }

    #[test]
    fn test_slashed_date_is_day_first() {
        assert_eq!(parse("05/04/2025 2pm"), Some(dt("2025-04-05 14:00")));
    }

    #[test]
    fn test_meridiem_forms() {
        assert_eq!(parse("tomorrow 2:30 pm"), Some(dt("2025-03-02 14:30")));
        assert_eq!(parse("tomorrow 2:30pm"), Some(dt("2025-03-02 14:30")));
        assert_eq!(parse("tomorrow 12am"), Some(dt("2025-03-02 00:00")));
        assert_eq!(parse("tomorrow 12pm"), Some(dt("2025-03-02 12:00")));
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(parse("today 7pm"), Some(dt("2025-03-01 19:00")));
        assert_eq!(parse("tomorrow noon"), Some(dt("2025-03-02 12:00")));
    }

    #[test]
    fn test_weekday_resolves_to_upcoming_occurrence() {
        // reference is a Saturday
        assert_eq!(parse("next tuesday 3pm"), Some(dt("2025-03-04 15:00")));
        assert_eq!(parse("saturday 3pm"), Some(dt("2025-03-01 15:00")));
        assert_eq!(parse("on friday at 4pm"), Some(dt("2025-03-07 16:00")));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(parse("march 5 2pm"), Some(dt("2025-03-05 14:00")));
        assert_eq!(parse("5th of march 2pm"), Some(dt("2025-03-05 14:00")));
        assert_eq!(parse("march 5 2026 2pm"), Some(dt("2026-03-05 14:00")));
    }

    #[test]
    fn test_time_only_falls_back_to_reference_date() {
        assert_eq!(parse("14:30"), Some(dt("2025-03-01 14:30")));
    }

    #[test]
    fn test_date_only_falls_back_to_midnight() {
        assert_eq!(parse("2025-03-05"), Some(dt("2025-03-05 00:00")));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse("whenever works for you"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_year_is_not_a_compact_time() {
        // "2025" alone must not parse as 20:25
        assert_eq!(parse("2025"), None);
    }

    #[test]
    fn test_normalize_joins_fragments() {
        struct Fixed;
        impl DateTimeParser for Fixed {
            fn parse(&self, text: &str, _tz: Tz) -> Option<NaiveDateTime> {
                parse_with_reference(text, reference())
            }
        }

        // word-number times are beyond the bundled parser; the date still
        // resolves and the missing time falls back to midnight
        let normalized = normalize(&Fixed, "next tuesday", "two thirty pm", Tz::UTC);
        assert_eq!(
            normalized,
            Some((
                NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                NaiveTime::MIN
            ))
        );

        let normalized = normalize(&Fixed, "next tuesday", "2:30 pm", Tz::UTC);
        assert_eq!(
            normalized,
            Some((
                NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                NaiveTime::from_hms_opt(14, 30, 0).unwrap()
            ))
        );

        assert_eq!(normalize(&Fixed, "", "", Tz::UTC), None);
    }
}
