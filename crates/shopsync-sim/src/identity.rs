//! Fake customer identities with realistic US locations.

use std::path::Path;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use shopsync_shopify::{CustomerAddressInput, CustomerInput};

use crate::error::SimError;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark",
    "Sandra", "Steven", "Ashley", "Andrew", "Emily", "Joshua", "Michelle", "Kevin", "Amanda",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
];

const STREET_NAMES: &[&str] = &[
    "Main", "Oak", "Pine", "Maple", "Cedar", "Elm", "Washington", "Lake", "Hill", "Park",
    "Walnut", "Sunset", "Lincoln", "Jackson", "Church", "Highland", "Mill", "River",
];

const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Rd", "Blvd", "Ln", "Dr", "Ct", "Way"];

/// One row of a `uszips.csv`-style location table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZipRow {
    pub zip: String,
    pub city: String,
    pub state_id: String,
    #[serde(default)]
    pub population: Option<f64>,
}

/// Locations sampled in proportion to population.
#[derive(Debug, Clone)]
pub struct ZipTable {
    rows: Vec<ZipRow>,
    weights: Option<WeightedIndex<f64>>,
}

impl ZipTable {
    /// Builds a table from rows. Missing or negative populations count as zero;
    /// when every weight is zero, rows are sampled uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyZipTable`] if `rows` is empty.
    pub fn new(rows: Vec<ZipRow>, source: &str) -> Result<Self, SimError> {
        if rows.is_empty() {
            return Err(SimError::EmptyZipTable(source.to_owned()));
        }
        let weights = WeightedIndex::new(
            rows.iter()
                .map(|r| r.population.filter(|p| p.is_finite() && *p > 0.0).unwrap_or(0.0)),
        )
        .ok();
        Ok(Self { rows, weights })
    }

    /// Loads a CSV with at least `zip,city,state_id,population` columns.
    /// Zip codes are read as text so leading zeros survive.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ZipTable`] on I/O or parse failure and
    /// [`SimError::EmptyZipTable`] if the file has no data rows.
    pub fn from_csv_path(path: &Path) -> Result<Self, SimError> {
        let source = path.display().to_string();
        let map_err = |e| SimError::ZipTable {
            path: source.clone(),
            source: e,
        };
        let mut reader = csv::Reader::from_path(path).map_err(map_err)?;
        let rows = reader
            .deserialize::<ZipRow>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_err)?;
        tracing::debug!(path = %source, rows = rows.len(), "zip table loaded");
        Self::new(rows, &source)
    }

    /// A handful of large US cities, used when no zip file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let row = |zip: &str, city: &str, state: &str, population: f64| ZipRow {
            zip: zip.to_owned(),
            city: city.to_owned(),
            state_id: state.to_owned(),
            population: Some(population),
        };
        let rows = vec![
            row("10025", "New York", "NY", 94_600.0),
            row("60629", "Chicago", "IL", 110_000.0),
            row("90011", "Los Angeles", "CA", 108_000.0),
            row("77084", "Houston", "TX", 110_000.0),
            row("85032", "Phoenix", "AZ", 68_000.0),
            row("53202", "Milwaukee", "WI", 24_000.0),
            row("02134", "Boston", "MA", 20_000.0),
            row("98103", "Seattle", "WA", 50_000.0),
        ];
        let weights = WeightedIndex::new(rows.iter().map(|r| r.population.unwrap_or(0.0))).ok();
        Self { rows, weights }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> &ZipRow {
        match &self.weights {
            Some(dist) => &self.rows[dist.sample(rng)],
            None => &self.rows[rng.random_range(0..self.rows.len())],
        }
    }
}

/// A generated person with a mailing address. Country is always `US`.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

impl FakeIdentity {
    pub fn generate<R: Rng>(rng: &mut R, zips: &ZipTable) -> Self {
        let first_name = pick(rng, FIRST_NAMES);
        let last_name = pick(rng, LAST_NAMES);
        let email = format!(
            "{}.{}{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            rng.random_range(1..=9_999)
        );
        let address1 = format!(
            "{} {} {}",
            rng.random_range(1..=9_999),
            pick(rng, STREET_NAMES),
            pick(rng, STREET_SUFFIXES)
        );
        let location = zips.sample(rng);

        Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email,
            address1,
            city: location.city.clone(),
            province: location.state_id.clone(),
            country: "US".to_owned(),
            zip: location.zip.clone(),
        }
    }

    #[must_use]
    pub fn to_customer_input(&self) -> CustomerInput {
        CustomerInput {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: None,
            addresses: vec![CustomerAddressInput {
                address1: self.address1.clone(),
                city: self.city.clone(),
                province: self.province.clone(),
                country: self.country.clone(),
                zip: self.zip.clone(),
            }],
        }
    }
}

fn pick<R: Rng>(rng: &mut R, options: &'static [&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}
