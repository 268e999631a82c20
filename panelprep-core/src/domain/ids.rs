use super::{CleanPriceTable, ReturnTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic content hash of a dense table (BLAKE3, hex).
///
/// Two runs over the same raw table and parameters must produce equal hashes;
/// the manifest records them so reruns can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableHash(pub String);

impl TableHash {
    pub fn of_prices(table: &CleanPriceTable) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"clean_prices");
        for date in table.dates() {
            hasher.update(date.to_string().as_bytes());
        }
        for (ticker, column) in table.columns() {
            hasher.update(ticker.as_bytes());
            for v in column {
                hasher.update(&v.to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn of_returns(table: &ReturnTable) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"log_returns");
        for date in table.dates() {
            hasher.update(date.to_string().as_bytes());
        }
        for (ticker, column) in table.columns() {
            hasher.update(ticker.as_bytes());
            for v in column {
                hasher.update(&v.to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for TableHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
