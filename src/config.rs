use crate::error::{RaterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maps each semantic listing field to a column name in the source file.
///
/// Stored as a JSON object on disk; omitted keys fall back to the column
/// names of the public NYC listings dump:
/// ```json
/// {
///   "borough": "neighbourhood_group",
///   "availability": "availability_365"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: String,
    pub borough: String,
    pub neighbourhood: String,
    pub price: String,
    pub availability: String,
    pub reviews: String,
    pub minimum_nights: String,
    pub room_type: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "id".into(),
            borough: "neighbourhood_group".into(),
            neighbourhood: "neighbourhood".into(),
            price: "price".into(),
            availability: "availability_365".into(),
            reviews: "number_of_reviews".into(),
            minimum_nights: "minimum_nights".into(),
            room_type: "room_type".into(),
        }
    }
}

impl ColumnMapping {
    /// Loads the mapping from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_err = |message: String| RaterError::Config {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| config_err(e.to_string()))
    }
}
