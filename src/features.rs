use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

/// One customer's aggregated purchase history, as sent to `POST /predict`.
///
/// Every field is required. Counts accept any non-negative JSON integer, or a
/// float with no fractional part; strings and negative values are rejected
/// while the request body is being deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    #[serde(deserialize_with = "deserialize_count")]
    pub frequency: u64,
    pub monetary: f64,
    pub avg_payment_value: f64,
    pub avg_items_per_order: f64,
    pub avg_freight_value: f64,
    #[serde(deserialize_with = "deserialize_count")]
    pub n_unique_categories: u64,
    pub main_category: String,
}

/// Column order of the numeric part of an encoded row.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "frequency",
    "monetary",
    "avg_payment_value",
    "avg_items_per_order",
    "avg_freight_value",
    "n_unique_categories",
];

struct CountVisitor;

impl Visitor<'_> for CountVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        // 2^64 is exactly representable, u64::MAX is not.
        if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 {
            Ok(v as u64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    deserializer.deserialize_any(CountVisitor)
}

impl CustomerFeatures {
    pub fn numeric_values(&self) -> [f64; 6] {
        [
            self.frequency as f64,
            self.monetary,
            self.avg_payment_value,
            self.avg_items_per_order,
            self.avg_freight_value,
            self.n_unique_categories as f64,
        ]
    }

    /// Payload used in the API documentation.
    pub fn example() -> Self {
        Self {
            frequency: 1,
            monetary: 59.90,
            avg_payment_value: 59.90,
            avg_items_per_order: 1.0,
            avg_freight_value: 15.50,
            n_unique_categories: 1,
            main_category: "sports_leisure".to_string(),
        }
    }
}
