//! Pure, side-effect-free views over a [`ForecastPayload`].
//!
//! Everything here is recomputed from the payload on demand. Absent or empty
//! input degrades to empty results, never to an error.

use chrono::{NaiveDate, Offset, Utc};

use crate::model::{ForecastPayload, RawSample};

/// Days retained by [`group_by_day`]; later days are silently dropped.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Samples projected by [`hourly_window`], roughly the next 24 hours.
pub const HOURLY_WINDOW: usize = 8;

/// Per-day summary derived from the payload's 3-hour samples.
#[derive(Debug, Clone)]
pub struct DailyAggregate {
    /// Calendar date string, "YYYY-MM-DD". Uniquely identifies the day.
    pub day_key: String,
    /// e.g. "Thu 6 Aug"
    pub label: String,
    /// e.g. "Thu"
    pub short_label: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub representative_icon: String,
    pub representative_description: String,
    /// The day's samples, in original payload order.
    pub samples: Vec<RawSample>,
}

/// Near-term entry projected for display.
#[derive(Debug, Clone)]
pub struct HourlyEntry {
    /// "HH:MM" in the forecast location's UTC offset.
    pub display_time: String,
    pub rounded_temperature: i32,
    pub condition_icon: String,
    pub condition_description: String,
}

/// One vertex of the temperature-over-time polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Chronologically first sample of the payload. A snapshot, not a "now"
/// computation.
pub fn current_sample(payload: Option<&ForecastPayload>) -> Option<&RawSample> {
    payload.and_then(|p| p.samples.first())
}

/// Groups samples into at most [`MAX_FORECAST_DAYS`] per-day aggregates,
/// preserving first-seen order of distinct day keys.
pub fn group_by_day(payload: Option<&ForecastPayload>) -> Vec<DailyAggregate> {
    let Some(payload) = payload else {
        return Vec::new();
    };

    // Association list keeps insertion order without a secondary sort.
    let mut groups: Vec<(String, Vec<&RawSample>)> = Vec::new();
    for sample in &payload.samples {
        let key = sample.day_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(sample),
            None => groups.push((key, vec![sample])),
        }
    }
    groups.truncate(MAX_FORECAST_DAYS);

    groups
        .into_iter()
        .filter_map(|(day_key, bucket)| {
            let representative = representative_sample(&bucket)?;
            let min_temperature = bucket
                .iter()
                .map(|s| s.temperature_min)
                .fold(f64::INFINITY, f64::min);
            let max_temperature = bucket
                .iter()
                .map(|s| s.temperature_max)
                .fold(f64::NEG_INFINITY, f64::max);
            let (label, short_label) = day_labels(&day_key);

            Some(DailyAggregate {
                day_key,
                label,
                short_label,
                min_temperature,
                max_temperature,
                representative_icon: representative.condition_icon.clone(),
                representative_description: representative.condition_description.clone(),
                samples: bucket.into_iter().cloned().collect(),
            })
        })
        .collect()
}

/// First midday sample wins; otherwise the day's first sample.
///
/// A deliberate heuristic: with a 3-hour cadence a day is not guaranteed to
/// contain a midday sample at all.
fn representative_sample<'a>(samples: &[&'a RawSample]) -> Option<&'a RawSample> {
    samples
        .iter()
        .find(|s| s.is_midday())
        .or_else(|| samples.first())
        .copied()
}

/// Labels are formatted from the day key itself, so re-parsing cannot drift
/// across a date boundary.
fn day_labels(day_key: &str) -> (String, String) {
    match NaiveDate::parse_from_str(day_key, "%Y-%m-%d") {
        Ok(date) => (
            date.format("%a %-d %b").to_string(),
            date.format("%a").to_string(),
        ),
        Err(_) => (day_key.to_string(), day_key.to_string()),
    }
}

/// First [`HOURLY_WINDOW`] samples verbatim, truncated, never padded.
pub fn hourly_window(payload: Option<&ForecastPayload>) -> Vec<HourlyEntry> {
    let Some(payload) = payload else {
        return Vec::new();
    };

    payload
        .samples
        .iter()
        .take(HOURLY_WINDOW)
        .map(|sample| HourlyEntry {
            display_time: display_time(sample, payload.utc_offset_secs),
            rounded_temperature: round_half_up(sample.temperature),
            condition_icon: sample.condition_icon.clone(),
            condition_description: sample.condition_description.clone(),
        })
        .collect()
}

fn display_time(sample: &RawSample, utc_offset_secs: i32) -> String {
    let offset = chrono::FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix());
    sample
        .time_utc()
        .with_timezone(&offset)
        .format("%H:%M")
        .to_string()
}

/// Round-half-up to the nearest integer: 17.5 → 18, 17.4 → 17, -17.5 → -17.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Maps the given samples onto a polyline: x distributed linearly across
/// `[padding, width - padding]`, y inverse-linear in temperature across
/// `[padding, height - padding]`.
///
/// The temperature range is taken over the given subset, not the whole
/// payload. Both denominators floor at 1, so a single sample or a flat
/// temperature profile cannot divide by zero.
pub fn temperature_curve(
    samples: &[RawSample],
    width: f64,
    height: f64,
    padding: f64,
) -> Vec<CurvePoint> {
    if samples.is_empty() {
        return Vec::new();
    }

    let min_temp = samples
        .iter()
        .map(|s| s.temperature)
        .fold(f64::INFINITY, f64::min);
    let max_temp = samples
        .iter()
        .map(|s| s.temperature)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = (max_temp - min_temp).max(1.0);
    let span = ((samples.len() as f64) - 1.0).max(1.0);

    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| CurvePoint {
            x: padding + (index as f64) * (width - padding * 2.0) / span,
            y: padding + (max_temp - sample.temperature) * (height - padding * 2.0) / range,
        })
        .collect()
}

/// Aggregate matching `key`, falling back to the first one. The selection is
/// advisory, not authoritative.
pub fn select_day<'a>(
    days: &'a [DailyAggregate],
    key: Option<&str>,
) -> Option<&'a DailyAggregate> {
    match key {
        Some(key) => days.iter().find(|d| d.day_key == key).or_else(|| days.first()),
        None => days.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_at;

    // 2026-08-06 00:00:00 UTC
    const DAY_ONE: i64 = 1_785_974_400;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;

    fn payload_with(samples: Vec<RawSample>) -> ForecastPayload {
        ForecastPayload {
            location_name: "Lyon".to_string(),
            utc_offset_secs: 0,
            samples,
        }
    }

    fn three_hourly(start: i64, count: usize) -> Vec<RawSample> {
        (0..count)
            .map(|i| sample_at(start + (i as i64) * 3 * HOUR))
            .collect()
    }

    #[test]
    fn current_sample_is_first() {
        let payload = payload_with(three_hourly(DAY_ONE, 4));
        let current = current_sample(Some(&payload)).expect("non-empty payload");
        assert_eq!(current.dt, DAY_ONE);
    }

    #[test]
    fn current_sample_absent_payload() {
        assert!(current_sample(None).is_none());
        let empty = payload_with(Vec::new());
        assert!(current_sample(Some(&empty)).is_none());
    }

    #[test]
    fn groups_span_distinct_days_in_order() {
        // 16 samples at 3h spacing starting 09:00 cover three calendar days.
        let payload = payload_with(three_hourly(DAY_ONE + 9 * HOUR, 16));
        let days = group_by_day(Some(&payload));

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day_key, "2026-08-06");
        assert_eq!(days[1].day_key, "2026-08-07");
        assert_eq!(days[2].day_key, "2026-08-08");
        for day in &days {
            assert!(day.min_temperature <= day.max_temperature);
        }
    }

    #[test]
    fn groups_cap_at_five_days() {
        // 6 days of midnight samples; the sixth is dropped, not an error.
        let samples: Vec<RawSample> = (0..6).map(|i| sample_at(DAY_ONE + i * DAY)).collect();
        let days = group_by_day(Some(&payload_with(samples)));

        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        assert_eq!(days[0].day_key, "2026-08-06");
        assert_eq!(days[4].day_key, "2026-08-10");
    }

    #[test]
    fn group_by_day_empty_and_absent() {
        assert!(group_by_day(None).is_empty());
        assert!(group_by_day(Some(&payload_with(Vec::new()))).is_empty());
    }

    #[test]
    fn min_max_cover_all_samples_of_the_day() {
        let mut samples = three_hourly(DAY_ONE, 3);
        samples[0].temperature_min = 11.0;
        samples[1].temperature_min = 9.5;
        samples[2].temperature_max = 27.0;
        let days = group_by_day(Some(&payload_with(samples)));

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].min_temperature, 9.5);
        assert_eq!(days[0].max_temperature, 27.0);
    }

    #[test]
    fn representative_prefers_midday() {
        let mut samples = vec![
            sample_at(DAY_ONE + 9 * HOUR),
            sample_at(DAY_ONE + 12 * HOUR),
            sample_at(DAY_ONE + 15 * HOUR),
        ];
        samples[0].condition_icon = "A".to_string();
        samples[1].condition_icon = "B".to_string();
        samples[2].condition_icon = "C".to_string();

        let days = group_by_day(Some(&payload_with(samples)));
        assert_eq!(days[0].representative_icon, "B");
    }

    #[test]
    fn representative_falls_back_to_first_sample() {
        let mut samples = vec![sample_at(DAY_ONE + 9 * HOUR), sample_at(DAY_ONE + 15 * HOUR)];
        samples[0].condition_icon = "A".to_string();
        samples[0].condition_description = "morning mist".to_string();
        samples[1].condition_icon = "C".to_string();

        let days = group_by_day(Some(&payload_with(samples)));
        assert_eq!(days[0].representative_icon, "A");
        assert_eq!(days[0].representative_description, "morning mist");
    }

    #[test]
    fn day_labels_from_day_key() {
        let days = group_by_day(Some(&payload_with(vec![sample_at(DAY_ONE)])));
        assert_eq!(days[0].label, "Thu 6 Aug");
        assert_eq!(days[0].short_label, "Thu");
    }

    #[test]
    fn hourly_window_caps_at_eight() {
        let payload = payload_with(three_hourly(DAY_ONE, 12));
        assert_eq!(hourly_window(Some(&payload)).len(), HOURLY_WINDOW);

        let short = payload_with(three_hourly(DAY_ONE, 3));
        assert_eq!(hourly_window(Some(&short)).len(), 3);

        assert!(hourly_window(None).is_empty());
    }

    #[test]
    fn hourly_window_rounds_half_up() {
        let mut samples = three_hourly(DAY_ONE, 2);
        samples[0].temperature = 17.5;
        samples[1].temperature = 17.4;
        let entries = hourly_window(Some(&payload_with(samples)));

        assert_eq!(entries[0].rounded_temperature, 18);
        assert_eq!(entries[1].rounded_temperature, 17);
    }

    #[test]
    fn hourly_window_display_time_uses_payload_offset() {
        let mut payload = payload_with(vec![sample_at(DAY_ONE + 9 * HOUR)]);
        payload.utc_offset_secs = 2 * 3600;
        let entries = hourly_window(Some(&payload));

        assert_eq!(entries[0].display_time, "11:00");
    }

    #[test]
    fn round_half_up_matches_display_convention() {
        assert_eq!(round_half_up(17.5), 18);
        assert_eq!(round_half_up(17.4), 17);
        assert_eq!(round_half_up(-17.5), -17);
        assert_eq!(round_half_up(-17.6), -18);
    }

    #[test]
    fn curve_single_sample_yields_single_point() {
        let samples = vec![sample_at(DAY_ONE)];
        let points = temperature_curve(&samples, 520.0, 170.0, 20.0);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 20.0);
        assert_eq!(points[0].y, 20.0);
    }

    #[test]
    fn curve_flat_temperatures_keep_constant_height() {
        let samples = three_hourly(DAY_ONE, 5);
        let points = temperature_curve(&samples, 520.0, 170.0, 20.0);

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.y == points[0].y));
        assert_eq!(points[0].x, 20.0);
        assert_eq!(points[4].x, 500.0);
    }

    #[test]
    fn curve_spans_padded_box() {
        let mut samples = three_hourly(DAY_ONE, 3);
        samples[0].temperature = 10.0;
        samples[1].temperature = 15.0;
        samples[2].temperature = 20.0;
        let points = temperature_curve(&samples, 520.0, 170.0, 20.0);

        // Warmest sample sits at the top of the box, coldest at the bottom.
        assert_eq!(points[2].y, 20.0);
        assert_eq!(points[0].y, 150.0);
        assert_eq!(points[1].y, 85.0);
    }

    #[test]
    fn curve_empty_input() {
        assert!(temperature_curve(&[], 520.0, 170.0, 20.0).is_empty());
    }

    #[test]
    fn select_day_falls_back_to_first() {
        let payload = payload_with(three_hourly(DAY_ONE + 9 * HOUR, 16));
        let days = group_by_day(Some(&payload));

        let picked = select_day(&days, Some("2026-08-07")).expect("day exists");
        assert_eq!(picked.day_key, "2026-08-07");

        let fallback = select_day(&days, Some("1999-01-01")).expect("falls back");
        assert_eq!(fallback.day_key, "2026-08-06");

        let unset = select_day(&days, None).expect("first day");
        assert_eq!(unset.day_key, "2026-08-06");

        assert!(select_day(&[], Some("2026-08-06")).is_none());
    }
}
