use crate::core::error::SeriesError;
use crate::core::series::{Observation, Series};
use crate::providers::http::HttpClient;
use crate::providers::parse_finite;
use chrono::{Month, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

const ADAPTER: &str = "alberta_hub";
const PAGE_PATH: &str = "/alberta-natural-gas-reference-price.aspx";

/// Monthly reference prices published as a month-by-year HTML table.
pub struct AlbertaProvider {
    base_url: String,
    http: HttpClient,
}

impl AlbertaProvider {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        AlbertaProvider {
            base_url: base_url.to_string(),
            http,
        }
    }

    #[instrument(name = "AlbertaFetch", skip(self))]
    pub async fn fetch(&self) -> Result<Series, SeriesError> {
        let url = format!("{}{}", self.base_url, PAGE_PATH);
        let body = self.http.get_text(&url, &[]).await?;
        let series = parse_html(&body)?;
        debug!("Parsed {} monthly prices", series.len());
        Ok(series)
    }
}

/// Unpivots the first table whose header cells after the first are years and
/// whose rows start with a month name. Blank cells are dropped.
pub fn parse_html(body: &str) -> Result<Series, SeriesError> {
    let document = Html::parse_document(body);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    for (index, table) in document.select(&table_selector).enumerate() {
        let rows: Vec<Vec<String>> = table
            .select(&row_selector)
            .map(|row| row.select(&cell_selector).map(cell_text).collect())
            .collect();

        if let Some(years) = year_header(&rows) {
            debug!("Found month-by-year table at position {}", index);
            return unpivot(&years, &rows[1..]);
        }
    }

    Err(SeriesError::parse(ADAPTER, "no month-by-year table found"))
}

fn selector(css: &str) -> Result<Selector, SeriesError> {
    Selector::parse(css).map_err(|e| SeriesError::parse(ADAPTER, format!("invalid selector {css}: {e:?}")))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn year_header(rows: &[Vec<String>]) -> Option<Vec<i32>> {
    let (header, body) = rows.split_first()?;
    if header.len() < 2 {
        return None;
    }
    let years = header[1..]
        .iter()
        .map(|cell| cell.parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;

    let has_month_rows = body
        .iter()
        .any(|row| row.first().is_some_and(|c| c.parse::<Month>().is_ok()));
    has_month_rows.then_some(years)
}

fn unpivot(years: &[i32], rows: &[Vec<String>]) -> Result<Series, SeriesError> {
    let mut observations = Vec::new();

    for row in rows {
        let Some((label, cells)) = row.split_first() else {
            continue;
        };
        let Ok(month) = label.parse::<Month>() else {
            debug!("Skipping non-month row '{}'", label);
            continue;
        };

        for (year, cell) in years.iter().zip(cells) {
            let Some(value) = parse_price(cell)? else {
                continue;
            };
            let date = NaiveDate::from_ymd_opt(*year, month.number_from_month(), 1).ok_or_else(
                || SeriesError::parse(ADAPTER, format!("invalid date {} {}", year, label)),
            )?;
            observations.push(Observation::new(date, value));
        }
    }

    if observations.is_empty() {
        return Err(SeriesError::parse(ADAPTER, "price table contains no values"));
    }
    Ok(Series::from_unsorted(observations))
}

fn parse_price(cell: &str) -> Result<Option<f64>, SeriesError> {
    let cleaned = cell.trim_start_matches('$').replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" || cleaned == "—" || cleaned.eq_ignore_ascii_case("n/a")
    {
        return Ok(None);
    }
    parse_finite(cleaned)
        .map(Some)
        .map_err(|e| SeriesError::parse(ADAPTER, format!("invalid price '{cell}': {e}")))
}
