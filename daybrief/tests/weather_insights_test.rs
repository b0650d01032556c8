use chrono::NaiveTime;
use daybrief::weather::client::{decode_daily_json, decode_hourly_json};
use daybrief::weather::derive_insights;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn daily_payload_decodes_to_summary() {
    let body = r#"{
        "forecastDays": [{
            "daytimeForecast": {
                "weatherCondition": { "description": { "text": "Partly cloudy" } },
                "uvIndex": 6
            },
            "nighttimeForecast": {
                "weatherCondition": { "description": { "text": "Clear" } }
            },
            "maxTemperature": { "degrees": 24.5 },
            "minTemperature": { "degrees": 12.0 }
        }]
    }"#;

    let daily = decode_daily_json(body).expect("decode daily");
    assert_eq!(daily.day_condition, "Partly cloudy");
    assert_eq!(daily.night_condition, "Clear");
    assert_eq!(daily.temp_max, Some(24.5));
    assert_eq!(daily.temp_min, Some(12.0));
    assert_eq!(daily.uv_index, 6.0);
}

#[test]
fn missing_daily_pieces_degrade_to_defaults() {
    let daily = decode_daily_json(r#"{"forecastDays": [{}]}"#).expect("decode daily");
    assert_eq!(daily.day_condition, "Unknown");
    assert_eq!(daily.night_condition, "Unknown");
    assert_eq!(daily.temp_max, None);
    assert_eq!(daily.temp_min, None);
    assert_eq!(daily.uv_index, 0.0);

    let empty = decode_daily_json(r#"{}"#).expect("decode empty");
    assert_eq!(empty.day_condition, "Unknown");
}

#[test]
fn object_probability_passes_through_as_percent() {
    let body = r#"{
        "forecastHours": [{
            "interval": { "startTime": "2026-08-26T09:00:00Z" },
            "uvIndex": 2,
            "temperature": { "degrees": 18.0 },
            "precipitation": { "probability": { "percent": 45 } }
        }]
    }"#;

    let hours = decode_hourly_json(body).expect("decode hourly");
    assert_eq!(hours.len(), 1);
    assert_eq!(hours[0].rain_chance, 45.0);
    assert_eq!(hours[0].uv_index, 2.0);
    assert_eq!(hours[0].temperature, 18.0);
}

#[test]
fn fractional_probability_normalizes_to_percent() {
    let body = r#"{
        "forecastHours": [{
            "interval": { "startTime": "2026-08-26T09:00:00Z" },
            "precipitation": { "probability": 0.6 }
        }]
    }"#;

    let hours = decode_hourly_json(body).expect("decode hourly");
    assert_eq!(hours.len(), 1);
    assert_eq!(hours[0].rain_chance, 60.0);

    // A normalized fraction crosses the percent threshold like any other
    // percent value.
    let daily = decode_daily_json(r#"{}"#).expect("decode daily");
    let insights = derive_insights(&daily, &hours, 30.0);
    assert_eq!(insights.rain_window.start, Some(t(9, 0)));
    assert_eq!(insights.rain_window.peak_chance, 60.0);
}

#[test]
fn hours_without_timestamps_are_skipped() {
    let body = r#"{
        "forecastHours": [
            { "interval": { "startTime": "2026-08-26T08:00:00Z" }, "uvIndex": 3 },
            { "uvIndex": 9 },
            { "interval": {}, "uvIndex": 9 },
            { "interval": { "startTime": "not a timestamp" }, "uvIndex": 9 },
            { "interval": { "startTime": "2026-08-26T10:00:00Z" }, "uvIndex": 4 }
        ]
    }"#;

    let hours = decode_hourly_json(body).expect("decode hourly");
    assert_eq!(hours.len(), 2);
    assert_eq!(hours[0].uv_index, 3.0);
    assert_eq!(hours[1].uv_index, 4.0);

    // The skipped hours never reach the trackers.
    let daily = decode_daily_json(r#"{}"#).expect("decode daily");
    let insights = derive_insights(&daily, &hours, 30.0);
    assert_eq!(insights.max_uv.value, 4.0);
    assert_eq!(insights.max_uv.time, Some(t(10, 0)));
}

#[test]
fn missing_numeric_fields_default_to_zero() {
    let body = r#"{
        "forecastHours": [{
            "interval": { "startTime": "2026-08-26T07:00:00Z" }
        }]
    }"#;

    let hours = decode_hourly_json(body).expect("decode hourly");
    assert_eq!(hours.len(), 1);
    assert_eq!(hours[0].uv_index, 0.0);
    assert_eq!(hours[0].temperature, 0.0);
    assert_eq!(hours[0].rain_chance, 0.0);
}

#[test]
fn full_payload_reduces_to_expected_insights() {
    let body = r#"{
        "forecastHours": [
            { "interval": { "startTime": "2026-08-26T00:00:00Z" },
              "uvIndex": 0, "temperature": { "degrees": 15.0 },
              "precipitation": { "probability": { "percent": 10 } } },
            { "interval": { "startTime": "2026-08-26T06:00:00Z" },
              "uvIndex": 1, "temperature": { "degrees": 16.0 },
              "precipitation": { "probability": { "percent": 35 } } },
            { "interval": { "startTime": "2026-08-26T12:00:00Z" },
              "uvIndex": 4, "temperature": { "degrees": 20.0 },
              "precipitation": { "probability": { "percent": 60 } } },
            { "interval": { "startTime": "2026-08-26T18:00:00Z" },
              "uvIndex": 2, "temperature": { "degrees": 18.0 },
              "precipitation": { "probability": { "percent": 40 } } },
            { "interval": { "startTime": "2026-08-26T23:00:00Z" },
              "uvIndex": 0, "temperature": { "degrees": 14.0 },
              "precipitation": { "probability": { "percent": 5 } } }
        ]
    }"#;

    let hours = decode_hourly_json(body).expect("decode hourly");
    let daily = decode_daily_json(r#"{}"#).expect("decode daily");
    let insights = derive_insights(&daily, &hours, 30.0);

    assert_eq!(insights.rain_window.start, Some(t(6, 0)));
    assert_eq!(insights.rain_window.end, Some(t(18, 0)));
    assert_eq!(insights.rain_window.peak_time, Some(t(12, 0)));
    assert_eq!(insights.rain_window.peak_chance, 60.0);
    assert_eq!(insights.max_uv.time, Some(t(12, 0)));
    assert_eq!(insights.max_uv.value, 4.0);
    assert_eq!(insights.max_temp.time, Some(t(12, 0)));
    assert_eq!(insights.max_temp.value, 20.0);
}

#[test]
fn invalid_json_is_an_error_not_a_panic() {
    assert!(decode_daily_json("not json").is_err());
    assert!(decode_hourly_json("[1, 2, 3]").is_err());
}
