pub mod alberta;
pub mod fred;
pub mod http;
pub mod nemweb;

use crate::core::config::AppConfig;
use crate::core::error::SeriesError;
use crate::core::series::{Series, SeriesQuery, SeriesSource};
use alberta::AlbertaProvider;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use fred::FredProvider;
use http::HttpClient;
use nemweb::NemwebProvider;

/// Parses a numeric cell. `NaN` and infinities are rejected because the store
/// cannot represent them.
pub(crate) fn parse_finite(text: &str) -> Result<f64, String> {
    let value: f64 = text.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("not a finite number".to_string())
    }
}

/// Routes each query to the provider that serves it.
pub struct Providers {
    fred: FredProvider,
    alberta: AlbertaProvider,
    nemweb: NemwebProvider,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(&config.http)?;
        Ok(Self {
            fred: FredProvider::new(config.fred_base_url(), http.clone()),
            alberta: AlbertaProvider::new(config.alberta_base_url(), http.clone()),
            nemweb: NemwebProvider::new(config.nemweb_base_url(), http),
        })
    }
}

#[async_trait]
impl SeriesSource for Providers {
    async fn fetch_series(
        &self,
        query: &SeriesQuery,
        as_of: NaiveDate,
    ) -> Result<Series, SeriesError> {
        match query {
            SeriesQuery::Fred {
                id,
                start_date,
                end_date,
            } => {
                self.fred
                    .fetch(id, *start_date, end_date.unwrap_or(as_of))
                    .await
            }
            SeriesQuery::AlbertaHub => self.alberta.fetch().await,
            SeriesQuery::VictoriaHub => self.nemweb.fetch().await,
        }
    }
}
