use crate::core::error::SeriesError;
use crate::core::series::{DATE_FORMAT, Observation, Series};
use crate::providers::http::HttpClient;
use crate::providers::parse_finite;
use chrono::NaiveDate;
use tracing::{debug, instrument};

const ADAPTER: &str = "fred";

/// FRED marks missing observations with a single dot.
const MISSING_VALUE: &str = ".";

/// Date-indexed CSV download from the St. Louis Fed graph endpoint.
pub struct FredProvider {
    base_url: String,
    http: HttpClient,
}

impl FredProvider {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        FredProvider {
            base_url: base_url.to_string(),
            http,
        }
    }

    #[instrument(name = "FredFetch", skip(self), fields(id = %id))]
    pub async fn fetch(
        &self,
        id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Series, SeriesError> {
        let url = format!("{}/graph/fredgraph.csv", self.base_url);
        let params = [
            ("id", id.to_string()),
            ("cosd", start_date.format(DATE_FORMAT).to_string()),
            ("coed", end_date.format(DATE_FORMAT).to_string()),
        ];

        let body = self.http.get_text(&url, &params).await?;
        let series = parse_csv(&body)?;
        debug!("Parsed {} observations for {}", series.len(), id);
        Ok(series)
    }
}

/// First column is the date, last column the value.
pub fn parse_csv(body: &str) -> Result<Series, SeriesError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SeriesError::parse(ADAPTER, format!("failed to read CSV headers: {e}")))?;
    if headers.len() < 2 {
        return Err(SeriesError::parse(
            ADAPTER,
            format!("expected a date and a value column, found {} columns", headers.len()),
        ));
    }
    let value_column = headers.len() - 1;

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| SeriesError::parse(ADAPTER, format!("invalid CSV at line {line}: {e}")))?;

        let date_str = record.get(0).unwrap_or_default();
        let value_str = record.get(value_column).unwrap_or_default();
        if value_str.is_empty() || value_str == MISSING_VALUE {
            debug!("Skipping missing value at line {} ({})", line, date_str);
            continue;
        }

        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
            SeriesError::parse(ADAPTER, format!("invalid date '{date_str}' at line {line}: {e}"))
        })?;
        let value = parse_finite(value_str).map_err(|e| {
            SeriesError::parse(ADAPTER, format!("invalid value '{value_str}' at line {line}: {e}"))
        })?;
        observations.push(Observation::new(date, value));
    }

    if observations.is_empty() {
        return Err(SeriesError::parse(ADAPTER, "response contains no observations"));
    }
    Ok(Series::from_unsorted(observations))
}
