//! CSV reader for listing tables.

use crate::config::ColumnMapping;
use crate::error::{RaterError, Result};
use crate::listing::Listing;
use csv::{StringRecord, StringRecordsIter};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Header positions of the mapped fields, plus every unmapped column.
struct ColumnIndex {
    id: usize,
    borough: usize,
    neighbourhood: usize,
    price: usize,
    availability: usize,
    reviews: usize,
    minimum_nights: usize,
    room_type: usize,
    extra: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, mapping: &ColumnMapping) -> Result<Self> {
        let find = |field: &'static str, column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| RaterError::Schema {
                    field,
                    column: column.to_string(),
                })
        };

        let mut index = ColumnIndex {
            id: find("id", &mapping.id)?,
            borough: find("borough", &mapping.borough)?,
            neighbourhood: find("neighbourhood", &mapping.neighbourhood)?,
            price: find("price", &mapping.price)?,
            availability: find("availability", &mapping.availability)?,
            reviews: find("reviews", &mapping.reviews)?,
            minimum_nights: find("minimum_nights", &mapping.minimum_nights)?,
            room_type: find("room_type", &mapping.room_type)?,
            extra: Vec::new(),
        };

        let mapped = [
            index.id,
            index.borough,
            index.neighbourhood,
            index.price,
            index.availability,
            index.reviews,
            index.minimum_nights,
            index.room_type,
        ];
        index.extra = (0..headers.len()).filter(|i| !mapped.contains(i)).collect();

        Ok(index)
    }
}

/// Loads every listing row from a CSV file, optionally gzip-compressed
/// (detected by a `.gz` extension).
///
/// # Errors
///
/// [`RaterError::DataLoad`] if the file cannot be opened or is not valid CSV,
/// [`RaterError::Schema`] if a mapped column is absent and
/// [`RaterError::MalformedValue`] if a numeric cell holds non-numeric text.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_listings(path: impl AsRef<Path>, mapping: &ColumnMapping) -> Result<Vec<Listing>> {
    let path = path.as_ref();
    let load_err = |source: csv::Error| RaterError::DataLoad {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| load_err(e.into()))?;
    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Opened listing source");

    let listings = if gzipped {
        read_listings(GzDecoder::new(file), mapping)
    } else {
        read_listings(file, mapping)
    }
    .map_err(|e| match e {
        RaterError::DataLoad { source, .. } => load_err(source),
        other => other,
    })?;

    info!(rows = listings.len(), "Listings loaded");
    Ok(listings)
}

/// Parses listing rows from any reader producing CSV with a header row.
///
/// `DataLoad` errors raised here carry an empty path; [`load_listings`]
/// fills in the real one.
pub fn read_listings<R: Read>(reader: R, mapping: &ColumnMapping) -> Result<Vec<Listing>> {
    let load_err = |source: csv::Error| RaterError::DataLoad {
        path: Default::default(),
        source,
    };

    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(load_err)?.clone();
    let index = ColumnIndex::resolve(&headers, mapping)?;

    parse_records(rdr.records(), &headers, &index)
}

fn parse_records<R: Read>(
    records: StringRecordsIter<'_, R>,
    headers: &StringRecord,
    index: &ColumnIndex,
) -> Result<Vec<Listing>> {
    let mut rows = Vec::new();

    for (idx, result) in records.enumerate() {
        let record = result.map_err(|source| RaterError::DataLoad {
            path: Default::default(),
            source,
        })?;
        let line = record.position().map_or(idx as u64 + 2, |p| p.line());
        let cell = Cell {
            record: &record,
            headers,
            line,
        };

        let price: Option<f64> = cell.number(index.price)?;
        if let Some(p) = price {
            if !p.is_finite() {
                return Err(cell.malformed(index.price));
            }
        }

        rows.push(Listing {
            id: cell.text(index.id),
            borough: cell.text(index.borough),
            neighbourhood: cell.text(index.neighbourhood),
            price,
            availability: cell.count(index.availability)?,
            reviews: cell.count(index.reviews)?,
            minimum_nights: cell.count(index.minimum_nights)?,
            room_type: cell.text(index.room_type),
            extra: index
                .extra
                .iter()
                .map(|&i| record.get(i).unwrap_or_default().to_string())
                .collect(),
        });
    }

    Ok(rows)
}

struct Cell<'a> {
    record: &'a StringRecord,
    headers: &'a StringRecord,
    line: u64,
}

impl Cell<'_> {
    fn raw(&self, idx: usize) -> Option<&str> {
        self.record.get(idx).filter(|s| !s.trim().is_empty())
    }

    fn text(&self, idx: usize) -> Option<String> {
        self.raw(idx).map(str::to_string)
    }

    fn number<T: FromStr>(&self, idx: usize) -> Result<Option<T>> {
        match self.raw(idx) {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.malformed(idx)),
        }
    }

    /// Non-negative whole number; accepts a float spelling such as `3.0`.
    fn count<T: TryFrom<u64>>(&self, idx: usize) -> Result<Option<T>> {
        let Some(value) = self.number::<f64>(idx)? else {
            return Ok(None);
        };
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
            return Err(self.malformed(idx));
        }

        T::try_from(value as u64)
            .map(Some)
            .map_err(|_| self.malformed(idx))
    }

    fn malformed(&self, idx: usize) -> RaterError {
        RaterError::MalformedValue {
            line: self.line,
            column: self.headers.get(idx).unwrap_or_default().to_string(),
            value: self.record.get(idx).unwrap_or_default().to_string(),
        }
    }
}
