//! JSONL storage for metadata
//!
//! Metadata is stored in `.catcombo/metadata.jsonl` with one JSON object per
//! line, tagged by `kind`. Uses file locking for concurrent access safety.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Catalog, Category, CategoryCombo, CategoryOption, CategoryOptionCombo, DataElement, Uid,
};

/// One line of the metadata store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    CategoryOption(CategoryOption),
    Category(Category),
    CategoryCombo(CategoryCombo),
    CategoryOptionCombo(CategoryOptionCombo),
    DataElement(DataElement),
}

impl Record {
    pub fn uid(&self) -> &Uid {
        match self {
            Record::CategoryOption(o) => &o.uid,
            Record::Category(c) => &c.uid,
            Record::CategoryCombo(c) => &c.uid,
            Record::CategoryOptionCombo(c) => &c.uid,
            Record::DataElement(e) => &e.uid,
        }
    }

    /// Load order: everything a record refers to comes before it
    fn rank(&self) -> u8 {
        match self {
            Record::CategoryOption(_) => 0,
            Record::Category(_) => 1,
            Record::CategoryCombo(_) => 2,
            Record::CategoryOptionCombo(_) => 3,
            Record::DataElement(_) => 4,
        }
    }

    fn key(&self) -> (u8, Uid) {
        (self.rank(), self.uid().clone())
    }
}

/// Flattens a catalog into records in load order
pub fn catalog_records(catalog: &Catalog) -> Vec<Record> {
    catalog
        .options()
        .cloned()
        .map(Record::CategoryOption)
        .chain(catalog.categories().cloned().map(Record::Category))
        .chain(catalog.combos().cloned().map(Record::CategoryCombo))
        .chain(catalog.option_combos().cloned().map(Record::CategoryOptionCombo))
        .chain(catalog.data_elements().cloned().map(Record::DataElement))
        .collect()
}

/// Store for metadata in JSONL format
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Creates a new metadata store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".catcombo").join("metadata.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records, later lines replacing earlier ones with the same kind and UID
    pub fn read_records(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open metadata store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on metadata store")?;

        let reader = BufReader::new(&file);
        let mut records = BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;

            records.insert(record.key(), record);
        }

        // Lock is released when file is dropped
        Ok(records.into_values().collect())
    }

    /// Loads the store into a catalog
    pub fn load(&self) -> Result<Catalog> {
        let mut catalog = Catalog::new();

        for record in self.read_records()? {
            let uid = record.uid().clone();
            let inserted = match record {
                Record::CategoryOption(o) => catalog.insert_option(o),
                Record::Category(c) => catalog.insert_category(c),
                Record::CategoryCombo(c) => catalog.insert_combo(c),
                Record::CategoryOptionCombo(c) => catalog.insert_option_combo(c),
                Record::DataElement(e) => catalog.insert_data_element(e),
            };
            inserted.with_context(|| {
                format!("Inconsistent record {} in {}", uid, self.path.display())
            })?;
        }

        Ok(catalog)
    }

    /// Writes the whole catalog to the store (full rewrite)
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        self.write_records(&catalog_records(catalog))
    }

    /// Writes records sorted by kind then UID
    pub fn write_records(&self, records: &[Record]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on metadata store")?;

            let mut writer = BufWriter::new(&file);

            let mut sorted: Vec<_> = records.iter().collect();
            sorted.sort_by_key(|r| r.key());

            for record in sorted {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush metadata store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record (used for quick adds without full rewrite)
    pub fn append(&self, record: &Record) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open metadata store: {}", self.path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on metadata store")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(writer, "{}", line).context("Failed to write record")?;

        writer.flush().context("Failed to flush metadata store")?;

        Ok(())
    }

    /// Compacts the store (drops superseded lines, rewrites clean)
    pub fn compact(&self) -> Result<usize> {
        let records = self.read_records()?;
        let count = records.len();
        self.write_records(&records)?;
        Ok(count)
    }
}
