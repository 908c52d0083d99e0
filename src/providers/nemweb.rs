use crate::core::error::SeriesError;
use crate::core::series::{Observation, Series};
use crate::providers::http::HttpClient;
use crate::providers::parse_finite;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const ADAPTER: &str = "victoria_hub";
const REPORT_PATH: &str = "/REPORTS/CURRENT/VicGas/INT310_V4_PRICE_AND_WITHDRAWALS_1.CSV";
const TIMESTAMP_COLUMN: &str = "gas_date";
const VALUE_COLUMN: &str = "price_value";

// Year-first slash dates only: `05/03/2024` is ambiguous between day-first and month-first.
const DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%d %b %Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Victorian gas market price report, one row per reading.
pub struct NemwebProvider {
    base_url: String,
    http: HttpClient,
}

impl NemwebProvider {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        NemwebProvider {
            base_url: base_url.to_string(),
            http,
        }
    }

    #[instrument(name = "NemwebFetch", skip(self))]
    pub async fn fetch(&self) -> Result<Series, SeriesError> {
        let url = format!("{}{}", self.base_url, REPORT_PATH);
        let body = self.http.get_text(&url, &[]).await?;

        let readings = parse_readings(&body)?;
        let daily = daily_means(&readings);
        let series = month_end_means(&daily);
        debug!(
            readings = readings.len(),
            days = daily.len(),
            months = series.len(),
            "Resampled Victoria hub prices"
        );

        if series.is_empty() {
            return Err(SeriesError::parse(ADAPTER, "report contains no readings"));
        }
        Ok(series)
    }
}

pub fn parse_readings(body: &str) -> Result<Vec<(NaiveDateTime, f64)>, SeriesError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SeriesError::parse(ADAPTER, format!("failed to read CSV headers: {e}")))?;
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| SeriesError::parse(ADAPTER, format!("missing column '{name}'")))
    };
    let timestamp_idx = column(TIMESTAMP_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| SeriesError::parse(ADAPTER, format!("invalid CSV at line {line}: {e}")))?;

        let timestamp_str = record.get(timestamp_idx).unwrap_or_default();
        let value_str = record.get(value_idx).unwrap_or_default();
        if value_str.is_empty() {
            debug!("Skipping reading without price at line {}", line);
            continue;
        }

        let timestamp = parse_timestamp(timestamp_str).ok_or_else(|| {
            SeriesError::parse(ADAPTER, format!("invalid timestamp '{timestamp_str}' at line {line}"))
        })?;
        let value = parse_finite(value_str).map_err(|e| {
            SeriesError::parse(ADAPTER, format!("invalid price '{value_str}' at line {line}: {e}"))
        })?;
        readings.push((timestamp, value));
    }
    Ok(readings)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Average of all readings on each calendar day.
pub fn daily_means(readings: &[(NaiveDateTime, f64)]) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (timestamp, value) in readings {
        let entry = sums.entry(timestamp.date()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(day, (sum, count))| (day, sum / count as f64))
        .collect()
}

/// Averages daily values per month, labelled with the month's last day and
/// rounded to two decimals. Months without readings are omitted.
pub fn month_end_means(daily: &BTreeMap<NaiveDate, f64>) -> Series {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for (day, value) in daily {
        let entry = months.entry((day.year(), day.month())).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let observations = months
        .into_iter()
        .filter_map(|((year, month), (sum, count))| {
            month_end(year, month).map(|date| Observation::new(date, round2(sum / count as f64)))
        })
        .collect();
    Series::from_unsorted(observations)
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::HttpConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_CSV: &str = "\
gas_date,price_value,administered_price,total_gas_withdrawals
30 Jan 2024 06:00:00,10,,100
30 Jan 2024 10:00:00,12,,100
31 Jan 2024 06:00:00,14,,100
01 Feb 2024 06:00:00,9.331,,100
02 Feb 2024 06:00:00,9.345,,100
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_readings_are_averaged() {
        let readings = parse_readings(SAMPLE_CSV).unwrap();
        let daily = daily_means(&readings);

        assert_eq!(daily.get(&date(2024, 1, 30)), Some(&11.0));
        assert_eq!(daily.get(&date(2024, 1, 31)), Some(&14.0));
        assert_eq!(daily.len(), 4);
    }

    #[test]
    fn test_month_end_resample_rounds_and_descends() {
        let readings = parse_readings(SAMPLE_CSV).unwrap();
        let series = month_end_means(&daily_means(&readings));

        assert_eq!(
            series.observations(),
            &[
                Observation::new(date(2024, 2, 29), 9.34),
                Observation::new(date(2024, 1, 31), 12.5),
            ]
        );
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        assert_eq!(month_end(2023, 12), Some(date(2023, 12, 31)));
        assert_eq!(month_end(2023, 2), Some(date(2023, 2, 28)));
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            date(2024, 3, 5).and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2024/03/05 13:30:00"),
            date(2024, 3, 5).and_hms_opt(13, 30, 0)
        );
        assert_eq!(
            parse_timestamp("05 Mar 2024 06:00:00"),
            date(2024, 3, 5).and_hms_opt(6, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_ambiguous_slash_dates_are_rejected() {
        assert_eq!(parse_timestamp("05/03/2024 13:30:00"), None);
        assert_eq!(parse_timestamp("05/03/2024"), None);
        let err = parse_readings("gas_date,price_value\n05/03/2024,3\n").unwrap_err();
        assert!(err.to_string().contains("invalid timestamp '05/03/2024' at line 2"));
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let err = parse_readings("gas_date,withdrawals\n01 Feb 2024,3\n").unwrap_err();
        assert_eq!(
            err,
            SeriesError::parse(ADAPTER, "missing column 'price_value'")
        );
    }

    #[test]
    fn test_invalid_timestamp_is_parse_error() {
        let err = parse_readings("gas_date,price_value\nsoon,3\n").unwrap_err();
        assert!(err.to_string().contains("invalid timestamp 'soon' at line 2"));
    }

    #[test]
    fn test_non_finite_price_is_parse_error() {
        let err = parse_readings("gas_date,price_value\n01 Feb 2024 06:00:00,NaN\n").unwrap_err();
        assert_eq!(
            err,
            SeriesError::parse(ADAPTER, "invalid price 'NaN' at line 2: not a finite number")
        );
    }

    #[tokio::test]
    async fn test_successful_nemweb_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPORT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_CSV))
            .mount(&mock_server)
            .await;

        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        let provider = NemwebProvider::new(&mock_server.uri(), http);
        let series = provider.fetch().await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.observations()[0].date, date(2024, 2, 29));
    }

    #[tokio::test]
    async fn test_report_without_readings_is_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPORT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("gas_date,price_value\n"))
            .mount(&mock_server)
            .await;

        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        let provider = NemwebProvider::new(&mock_server.uri(), http);

        assert_eq!(
            provider.fetch().await.unwrap_err(),
            SeriesError::parse(ADAPTER, "report contains no readings")
        );
    }
}
