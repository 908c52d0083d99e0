//! Series registry: which series to collect and with which adapter.

use crate::core::series::{DATE_FORMAT, SeriesQuery};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_START_DATE: &str = "1999-01-01";

/// A registry record as written in the configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SeriesDefinition {
    pub name: String,
    pub adapter: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SeriesDefinition {
    pub fn new(name: &str, adapter: &str, params: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            adapter: adapter.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Fred,
    FredFx,
    FredGdp,
    AlbertaHub,
    VictoriaHub,
}

impl Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AdapterKind::Fred => "fred",
                AdapterKind::FredFx => "fred_fx",
                AdapterKind::FredGdp => "fred_gdp",
                AdapterKind::AlbertaHub => "alberta_hub",
                AdapterKind::VictoriaHub => "victoria_hub",
            }
        )
    }
}

impl FromStr for AdapterKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fred" => Ok(AdapterKind::Fred),
            "fred_fx" => Ok(AdapterKind::FredFx),
            "fred_gdp" => Ok(AdapterKind::FredGdp),
            "alberta_hub" => Ok(AdapterKind::AlbertaHub),
            "victoria_hub" => Ok(AdapterKind::VictoriaHub),
            _ => Err(anyhow!("Unknown adapter: {}", s)),
        }
    }
}

impl AdapterKind {
    fn allowed_params(&self) -> &'static [&'static str] {
        match self {
            AdapterKind::Fred => &["id", "start_date", "end_date"],
            AdapterKind::FredFx => &["currency_from", "currency_to", "start_date", "end_date"],
            AdapterKind::FredGdp => &["start_date", "end_date"],
            AdapterKind::AlbertaHub | AdapterKind::VictoriaHub => &[],
        }
    }
}

/// A validated registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub adapter: AdapterKind,
    pub query: SeriesQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Validates definitions against the known adapters before anything is fetched.
    pub fn from_definitions(definitions: &[SeriesDefinition]) -> Result<Self> {
        if definitions.is_empty() {
            bail!("Registry defines no series");
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if !seen.insert(definition.name.as_str()) {
                bail!("Duplicate series name in registry: {}", definition.name);
            }
            let entry = resolve(definition)
                .with_context(|| format!("Invalid registry entry '{}'", definition.name))?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn resolve(definition: &SeriesDefinition) -> Result<RegistryEntry> {
    let adapter: AdapterKind = definition.adapter.parse()?;
    let params = &definition.params;

    if let Some(unknown) = params
        .keys()
        .find(|k| !adapter.allowed_params().contains(&k.as_str()))
    {
        bail!("Unknown parameter '{}' for adapter {}", unknown, adapter);
    }

    let query = match adapter {
        AdapterKind::Fred => {
            let id = params
                .get("id")
                .ok_or_else(|| anyhow!("Adapter {} requires parameter 'id'", adapter))?;
            fred_query(id.clone(), params)?
        }
        AdapterKind::FredFx => {
            let from = params.get("currency_from").map_or("US", String::as_str);
            let to = params.get("currency_to").map_or("UK", String::as_str);
            fred_query(format!("EX{from}{to}"), params)?
        }
        AdapterKind::FredGdp => fred_query("GDPDEF".to_string(), params)?,
        AdapterKind::AlbertaHub => SeriesQuery::AlbertaHub,
        AdapterKind::VictoriaHub => SeriesQuery::VictoriaHub,
    };

    Ok(RegistryEntry {
        name: definition.name.clone(),
        adapter,
        query,
    })
}

fn fred_query(id: String, params: &BTreeMap<String, String>) -> Result<SeriesQuery> {
    let start_date = parse_date(params.get("start_date").map_or(DEFAULT_START_DATE, String::as_str))?;
    let end_date = params.get("end_date").map(|d| parse_date(d)).transpose()?;
    Ok(SeriesQuery::Fred {
        id,
        start_date,
        end_date,
    })
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .with_context(|| format!("Failed to parse date: {date_str}"))
}

/// Series collected when the configuration does not list any.
pub fn default_definitions() -> Vec<SeriesDefinition> {
    vec![
        SeriesDefinition::new(
            "FX US->EU",
            "fred_fx",
            &[("currency_from", "US"), ("currency_to", "EU")],
        ),
        SeriesDefinition::new(
            "FX US->UK",
            "fred_fx",
            &[("currency_from", "US"), ("currency_to", "UK")],
        ),
        SeriesDefinition::new(
            "FX CA->US",
            "fred_fx",
            &[("currency_from", "CA"), ("currency_to", "US")],
        ),
        SeriesDefinition::new(
            "FX US->AL",
            "fred_fx",
            &[("currency_from", "US"), ("currency_to", "AL")],
        ),
        SeriesDefinition::new("GDP US", "fred_gdp", &[]),
        SeriesDefinition::new("Alberta Hub", "alberta_hub", &[]),
        SeriesDefinition::new("Victoria Hub", "victoria_hub", &[]),
    ]
}
