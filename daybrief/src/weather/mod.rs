/*!
daybrief/src/weather/mod.rs

Typed weather observations and the insight extraction pass.

The extractor reduces a day of hourly readings to the handful of facts a
briefing actually needs: peak UV hour, peak temperature hour and a rain
window. It is a pure pass over input already normalized at the ingestion
boundary (see `client`), with rain probabilities in percent and timestamps
valid. No state survives between calls.
*/

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub mod client;

/// One hour of forecast, as normalized at the ingestion boundary.
/// `rain_chance` is always a percentage in 0..=100 by the time it gets here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyObservation {
    pub time: DateTime<Utc>,
    pub uv_index: f64,
    pub temperature: f64,
    pub rain_chance: f64,
}

/// Same-day summary carried through to the output unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day_condition: String,
    pub night_condition: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub uv_index: f64,
}

/// A single peak reading: when it happened and how high it got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakReading {
    #[serde(with = "hhmm_opt")]
    pub time: Option<NaiveTime>,
    pub value: f64,
}

/// The contiguous span of notable rain risk, if any hour qualified.
///
/// `start`/`end` are null on a dry day, but `peak_time`/`peak_chance` still
/// report the single wettest hour found, so the caller always gets an
/// answer to "when is rain most likely".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainWindow {
    #[serde(with = "hhmm_opt")]
    pub start: Option<NaiveTime>,
    #[serde(with = "hhmm_opt")]
    pub end: Option<NaiveTime>,
    #[serde(with = "hhmm_opt")]
    pub peak_time: Option<NaiveTime>,
    pub peak_chance: f64,
}

/// The derived facts for one day. Built fresh on every extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInsights {
    pub max_uv: PeakReading,
    pub max_temp: PeakReading,
    pub rain_window: RainWindow,
    pub daily_summary: DailySummary,
}

/// Rain probability (percent) at or above which an hour counts as notable
/// when no threshold is configured.
pub const DEFAULT_RAIN_THRESHOLD_PCT: f64 = 30.0;

/// Reduce a day of hourly observations to its derived facts.
///
/// All three trackers use a strictly-greater comparison, so on an exact tie
/// the earliest hour wins and is never displaced by a later equal reading.
/// The UV tracker starts at zero with no time: a day of all-zero UV reports
/// no peak hour. The temperature tracker starts at negative infinity so any
/// real reading qualifies, including sub-zero ones.
pub fn derive_insights(
    daily: &DailySummary,
    hours: &[HourlyObservation],
    rain_threshold_pct: f64,
) -> WeatherInsights {
    let mut max_uv = PeakReading {
        time: None,
        value: 0.0,
    };
    let mut max_temp = PeakReading {
        time: None,
        value: f64::NEG_INFINITY,
    };

    // The absolute peak is tracked across every hour regardless of the
    // threshold, so a dry day still reports its wettest hour.
    let mut absolute_peak = PeakReading {
        time: None,
        value: 0.0,
    };
    let mut notable: Vec<&HourlyObservation> = Vec::new();

    for hour in hours {
        let local = hour.time.time();

        if hour.rain_chance > absolute_peak.value {
            absolute_peak = PeakReading {
                time: Some(local),
                value: hour.rain_chance,
            };
        }

        if hour.uv_index > max_uv.value {
            max_uv = PeakReading {
                time: Some(local),
                value: hour.uv_index,
            };
        }

        if hour.temperature > max_temp.value {
            max_temp = PeakReading {
                time: Some(local),
                value: hour.temperature,
            };
        }

        if hour.rain_chance >= rain_threshold_pct {
            notable.push(hour);
        }
    }

    let rain_window = if notable.is_empty() {
        RainWindow {
            start: None,
            end: None,
            peak_time: absolute_peak.time,
            peak_chance: absolute_peak.value,
        }
    } else {
        // Sort by timestamp so start/end and the first-max scan are
        // chronological even if the input arrived out of order.
        notable.sort_by_key(|h| h.time);

        let mut peak = notable[0];
        for hour in &notable[1..] {
            if hour.rain_chance > peak.rain_chance {
                peak = hour;
            }
        }

        RainWindow {
            start: Some(notable[0].time.time()),
            end: Some(notable[notable.len() - 1].time.time()),
            peak_time: Some(peak.time.time()),
            peak_chance: peak.rain_chance,
        }
    };

    WeatherInsights {
        max_uv,
        max_temp,
        rain_window,
        daily_summary: daily.clone(),
    }
}

/// Serialize `Option<NaiveTime>` as "HH:MM" strings, null when absent.
mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => NaiveTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32, uv: f64, temp: f64, rain: f64) -> HourlyObservation {
        HourlyObservation {
            time: Utc.with_ymd_and_hms(2026, 8, 26, h, 0, 0).unwrap(),
            uv_index: uv,
            temperature: temp,
            rain_chance: rain,
        }
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn uv_tie_keeps_first_hour() {
        let hours = vec![hour(8, 5.0, 20.0, 0.0), hour(9, 5.0, 21.0, 0.0)];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.max_uv.time, Some(t(8)));
        assert_eq!(insights.max_uv.value, 5.0);
    }

    #[test]
    fn all_zero_uv_reports_no_time() {
        let hours = vec![hour(8, 0.0, 20.0, 0.0), hour(9, 0.0, 21.0, 0.0)];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.max_uv.time, None);
        assert_eq!(insights.max_uv.value, 0.0);
    }

    #[test]
    fn sub_zero_temperatures_still_tracked() {
        let hours = vec![hour(3, 0.0, -7.5, 0.0), hour(14, 0.0, -2.0, 0.0)];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.max_temp.time, Some(t(14)));
        assert_eq!(insights.max_temp.value, -2.0);
    }

    #[test]
    fn notable_rain_window_spans_threshold_hours() {
        let hours = vec![
            hour(0, 0.0, 15.0, 10.0),
            hour(6, 1.0, 16.0, 35.0),
            hour(12, 4.0, 20.0, 60.0),
            hour(18, 2.0, 18.0, 40.0),
            hour(23, 0.0, 14.0, 5.0),
        ];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.rain_window.start, Some(t(6)));
        assert_eq!(insights.rain_window.end, Some(t(18)));
        assert_eq!(insights.rain_window.peak_time, Some(t(12)));
        assert_eq!(insights.rain_window.peak_chance, 60.0);
    }

    #[test]
    fn rain_peak_tie_keeps_first_hour() {
        let hours = vec![
            hour(6, 0.0, 15.0, 40.0),
            hour(9, 0.0, 16.0, 60.0),
            hour(12, 0.0, 17.0, 60.0),
        ];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.rain_window.peak_time, Some(t(9)));
        assert_eq!(insights.rain_window.peak_chance, 60.0);
    }

    #[test]
    fn dry_day_falls_back_to_absolute_peak() {
        let hours = vec![
            hour(9, 0.0, 18.0, 12.0),
            hour(15, 0.0, 22.0, 22.0),
            hour(20, 0.0, 19.0, 8.0),
        ];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.rain_window.start, None);
        assert_eq!(insights.rain_window.end, None);
        assert_eq!(insights.rain_window.peak_time, Some(t(15)));
        assert_eq!(insights.rain_window.peak_chance, 22.0);
    }

    #[test]
    fn empty_hours_leave_initial_state() {
        let daily = DailySummary {
            day_condition: "Sunny".to_string(),
            night_condition: "Clear".to_string(),
            temp_max: Some(24.0),
            temp_min: Some(12.0),
            uv_index: 6.0,
        };
        let insights = derive_insights(&daily, &[], 30.0);
        assert_eq!(insights.max_uv.time, None);
        assert_eq!(insights.max_uv.value, 0.0);
        assert_eq!(insights.max_temp.time, None);
        assert_eq!(insights.max_temp.value, f64::NEG_INFINITY);
        assert_eq!(insights.rain_window.start, None);
        assert_eq!(insights.rain_window.peak_time, None);
        assert_eq!(insights.rain_window.peak_chance, 0.0);
        assert_eq!(insights.daily_summary, daily);
    }

    #[test]
    fn out_of_order_input_still_yields_chronological_window() {
        let hours = vec![
            hour(12, 0.0, 20.0, 60.0),
            hour(6, 0.0, 16.0, 35.0),
        ];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        assert_eq!(insights.rain_window.start, Some(t(6)));
        assert_eq!(insights.rain_window.end, Some(t(12)));
    }

    #[test]
    fn insight_times_serialize_as_hhmm() {
        let hours = vec![hour(8, 5.0, 20.0, 45.0)];
        let insights = derive_insights(&DailySummary::default(), &hours, 30.0);
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["max_uv"]["time"], "08:00");
        assert_eq!(json["rain_window"]["start"], "08:00");
        let dry = derive_insights(&DailySummary::default(), &[], 30.0);
        let json = serde_json::to_value(&dry).unwrap();
        assert!(json["rain_window"]["start"].is_null());
    }
}
