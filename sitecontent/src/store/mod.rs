use crate::error::{ContentError, Result};
use crate::record::ValidatedRecord;
use crate::schema::CollectionDefinition;
use crate::validation::{self, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// The in-memory content index: every collection's validated records, in
/// source order, queried by collection name at render time.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    collections: BTreeMap<String, Vec<ValidatedRecord>>,
}

impl ContentStore {
    /// Load every collection under `root`. Fails if any collection fails;
    /// nothing is published from a partially valid build. Every collection is
    /// still attempted so the error covers all of them.
    pub fn load(root: &Path, definitions: &[CollectionDefinition]) -> Result<Self> {
        let mut collections = BTreeMap::new();
        let mut failures = Vec::new();
        for definition in definitions {
            match load_collection(root, definition) {
                Ok(records) => {
                    collections.insert(definition.name.clone(), records);
                }
                Err(e) => failures.push(e),
            }
        }

        if failures.len() == 1 {
            return Err(failures.remove(0));
        }
        if !failures.is_empty() {
            return Err(ContentError::InvalidContent(failures));
        }

        Ok(ContentStore {
            root: root.to_path_buf(),
            collections,
        })
    }

    /// Check every collection without stopping at the first failure.
    pub fn check(root: &Path, definitions: &[CollectionDefinition]) -> CheckReport {
        let collections = definitions
            .iter()
            .map(|definition| check_collection(root, definition))
            .collect();
        CheckReport { collections }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// All records of a collection in source order.
    pub fn collection(&self, name: &str) -> Result<&[ValidatedRecord]> {
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ContentError::CollectionNotFound(name.to_string()))
    }

    pub fn entry(&self, collection: &str, id: &str) -> Result<&ValidatedRecord> {
        self.collection(collection)?
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| ContentError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    pub fn filter<F>(&self, collection: &str, predicate: F) -> Result<Vec<&ValidatedRecord>>
    where
        F: Fn(&ValidatedRecord) -> bool,
    {
        Ok(self
            .collection(collection)?
            .iter()
            .filter(|r| predicate(*r))
            .collect())
    }

    /// Records of a collection deserialized into a caller-defined type.
    pub fn entries<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.collection(collection)?
            .iter()
            .map(ValidatedRecord::deserialize)
            .collect()
    }

    pub fn entry_as<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        self.entry(collection, id)?.deserialize()
    }

    /// The whole index as `{ collection: [record, ...] }`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.collections)?)
    }
}

/// Load and validate one collection. Any invalid record fails the
/// collection, and the error lists every violation across all records.
pub fn load_collection(root: &Path, definition: &CollectionDefinition) -> Result<Vec<ValidatedRecord>> {
    let raws = definition.loader.load(root)?;
    let (records, errors) = validation::validate_records(&definition.schema, &raws);

    if !errors.is_empty() {
        return Err(ContentError::InvalidCollection {
            collection: definition.name.clone(),
            errors,
        });
    }

    ensure_unique_ids(&definition.name, &records)?;
    log::info!(
        "Loaded {} entries into collection '{}'",
        records.len(),
        definition.name
    );
    Ok(records)
}

fn ensure_unique_ids(collection: &str, records: &[ValidatedRecord]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for record in records {
        if let Some(first) = seen.insert(record.id(), record.source()) {
            return Err(ContentError::DuplicateId {
                collection: collection.to_string(),
                id: record.id().to_string(),
                first: first.to_string(),
                second: record.source().to_string(),
            });
        }
    }
    Ok(())
}

/// Outcome of checking one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionCheck {
    pub collection: String,
    /// Number of files discovered, including ones that failed to parse.
    pub total: usize,
    pub issues: Vec<ValidationError>,
    /// Failures not tied to a single field (unreadable or unparseable file,
    /// duplicate id, bad glob).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CollectionCheck {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub collections: Vec<CollectionCheck>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.collections.iter().all(CollectionCheck::is_ok)
    }

    pub fn issue_count(&self) -> usize {
        self.collections
            .iter()
            .map(|c| c.issues.len() + c.errors.len())
            .sum()
    }
}

fn check_collection(root: &Path, definition: &CollectionDefinition) -> CollectionCheck {
    let mut check = CollectionCheck {
        collection: definition.name.clone(),
        total: 0,
        issues: Vec::new(),
        errors: Vec::new(),
    };

    let results = match definition.loader.load_each(root) {
        Ok(results) => results,
        Err(e) => {
            check.errors.push(e.to_string());
            return check;
        }
    };

    check.total = results.len();
    let mut raws = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(raw) => raws.push(raw),
            Err(e) => check.errors.push(e.to_string()),
        }
    }

    let (records, errors) = validation::validate_records(&definition.schema, &raws);
    check.issues = errors;
    if let Err(e) = ensure_unique_ids(&definition.name, &records) {
        check.errors.push(e.to_string());
    }
    check
}
