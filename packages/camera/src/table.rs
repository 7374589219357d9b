//! The static camera reference table.
//!
//! The dataset is a JSON object mapping canonical address keys to camera
//! records:
//!
//! ```json
//! { "Broadway_42nd_St": { "camera_id": "...", "latitude": 40.75, "longitude": -73.98 } }
//! ```
//!
//! Object order is significant: suggestions are returned in the order the
//! addresses appear in the file, so the table keeps insertion order rather
//! than sorting by key.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use parking_spotter_camera_models::CameraLocationRecord;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::CameraError;
use crate::address;

/// Dataset compiled into the binary, used when no file is supplied.
const EMBEDDED_DATASET: &str = include_str!("../data/camera_locations.json");

/// A camera entry as it appears in the dataset file.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    camera_id: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

/// Dataset entries in file order.
struct OrderedEntries(Vec<(String, RawRecord)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping address keys to camera records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, record)) = map.next_entry::<String, RawRecord>()? {
                    entries.push((key, record));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A record together with its precomputed match form.
#[derive(Debug, Clone)]
struct Entry {
    record: CameraLocationRecord,
    match_key: String,
}

/// Immutable, insertion-ordered mapping of address key to camera record.
#[derive(Debug, Clone, Default)]
pub struct CameraTable {
    entries: Vec<Entry>,
    index: BTreeMap<String, usize>,
}

impl CameraTable {
    /// Parses a dataset from its JSON text.
    ///
    /// A key that appears twice keeps its first position and its last
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Json`] if the text is not a JSON object of
    /// camera records, or [`CameraError::InvalidRecord`] if an entry has an
    /// empty key or out-of-range coordinates.
    pub fn from_json_str(json: &str) -> Result<Self, CameraError> {
        let OrderedEntries(raw) = serde_json::from_str(json)?;

        let mut table = Self {
            entries: Vec::with_capacity(raw.len()),
            index: BTreeMap::new(),
        };

        for (address_key, raw) in raw {
            let record = validate(address_key, raw)?;
            let entry = Entry {
                match_key: address::normalize_for_match(&record.address_key),
                record,
            };
            if let Some(&existing) = table.index.get(&entry.record.address_key) {
                log::warn!(
                    "Duplicate camera address '{}' in dataset, keeping the later record",
                    entry.record.address_key
                );
                table.entries[existing] = entry;
            } else {
                table
                    .index
                    .insert(entry.record.address_key.clone(), table.entries.len());
                table.entries.push(entry);
            }
        }

        Ok(table)
    }

    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, CameraError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} camera locations from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Returns the dataset compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded dataset is malformed. The file is fixed at
    /// compile time, so this cannot happen in a released binary.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json_str(EMBEDDED_DATASET)
            .unwrap_or_else(|e| panic!("Failed to parse embedded camera dataset: {e}"))
    }

    /// Number of cameras in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no cameras.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a camera by its canonical address key.
    #[must_use]
    pub fn get(&self, address_key: &str) -> Option<&CameraLocationRecord> {
        self.index
            .get(address_key)
            .map(|&idx| &self.entries[idx].record)
    }

    /// Whether `address_key` is a known canonical key.
    #[must_use]
    pub fn contains_key(&self, address_key: &str) -> bool {
        self.index.contains_key(address_key)
    }

    /// Iterates records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &CameraLocationRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Iterates canonical address keys in dataset order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.record.address_key.as_str())
    }

    /// Iterates `(address_key, match_key)` pairs in dataset order.
    pub(crate) fn match_candidates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.record.address_key.as_str(), e.match_key.as_str()))
    }
}

fn validate(address_key: String, raw: RawRecord) -> Result<CameraLocationRecord, CameraError> {
    if address_key.trim().is_empty() {
        return Err(CameraError::InvalidRecord {
            address_key,
            message: "address key is empty".to_string(),
        });
    }

    if let Some(lat) = raw.latitude.filter(|lat| !(-90.0..=90.0).contains(lat)) {
        return Err(CameraError::InvalidRecord {
            address_key,
            message: format!("latitude {lat} is out of range"),
        });
    }

    if let Some(lng) = raw.longitude.filter(|lng| !(-180.0..=180.0).contains(lng)) {
        return Err(CameraError::InvalidRecord {
            address_key,
            message: format!("longitude {lng} is out of range"),
        });
    }

    Ok(CameraLocationRecord {
        address_key,
        camera_id: raw.camera_id.unwrap_or_default(),
        latitude: raw.latitude,
        longitude: raw.longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Zeta_St": { "camera_id": "z", "latitude": 40.70, "longitude": -73.90 },
        "Alpha_Ave": { "camera_id": "a", "latitude": null, "longitude": null },
        "Mid_Blvd": { "latitude": 40.75 }
    }"#;

    #[test]
    fn embedded_dataset_loads() {
        let table = CameraTable::embedded();
        assert!(!table.is_empty());
        assert!(table.contains_key("Broadway_42nd_St"));
    }

    #[test]
    fn preserves_insertion_order() {
        let table = CameraTable::from_json_str(SAMPLE).unwrap();
        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, vec!["Zeta_St", "Alpha_Ave", "Mid_Blvd"]);
    }

    #[test]
    fn missing_fields_default() {
        let table = CameraTable::from_json_str(SAMPLE).unwrap();
        let record = table.get("Mid_Blvd").unwrap();
        assert_eq!(record.camera_id, "");
        assert_eq!(record.latitude, Some(40.75));
        assert_eq!(record.longitude, None);
    }

    #[test]
    fn null_coordinates_are_none() {
        let table = CameraTable::from_json_str(SAMPLE).unwrap();
        let record = table.get("Alpha_Ave").unwrap();
        assert!(record.coordinate().is_none());
    }

    #[test]
    fn duplicate_key_keeps_first_position_and_last_value() {
        let json = r#"{
            "A_St": { "camera_id": "first" },
            "B_St": { "camera_id": "b" },
            "A_St": { "camera_id": "second" }
        }"#;
        let table = CameraTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.keys().next(), Some("A_St"));
        assert_eq!(table.get("A_St").unwrap().camera_id, "second");
    }

    #[test]
    fn rejects_empty_key() {
        let err = CameraTable::from_json_str(r#"{ " ": { "camera_id": "x" } }"#).unwrap_err();
        assert!(matches!(err, CameraError::InvalidRecord { .. }));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err =
            CameraTable::from_json_str(r#"{ "A_St": { "latitude": 140.0, "longitude": 0.0 } }"#)
                .unwrap_err();
        assert!(matches!(err, CameraError::InvalidRecord { .. }));
    }

    #[test]
    fn rejects_non_object() {
        let err = CameraTable::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CameraError::Json(_)));
    }

    #[test]
    fn unknown_key_is_none() {
        let table = CameraTable::from_json_str(SAMPLE).unwrap();
        assert!(table.get("Nowhere_Rd").is_none());
    }
}
