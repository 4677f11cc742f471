//! Prize tables and their alignment onto the interactome index.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use pcsf_common::{DuplicatePrizePolicy, ForestError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::interactome::Interactome;
use crate::tsv;

/// One `nodeName\tprize` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeRecord {
    pub name: String,
    pub prize: f64,
    /// Source file label
    pub source: String,
    pub line: Option<u64>,
}

impl PrizeRecord {
    pub fn new(name: impl Into<String>, prize: f64) -> Self {
        Self {
            name: name.into(),
            prize,
            source: String::new(),
            line: None,
        }
    }
}

/// A prize row whose name is absent from the interactome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTerminal {
    pub name: String,
    pub prize: f64,
    pub source: String,
    pub line: Option<u64>,
}

/// Prizes aligned to node IDs.
#[derive(Debug, Clone, Default)]
pub struct PrizeMapping {
    /// One entry per node, 0 where no prize was given
    pub prizes: Vec<f64>,
    /// Sorted IDs of nodes with a resolved prize row
    pub terminals: Vec<usize>,
    pub missing: Vec<MissingTerminal>,
}

impl PrizeMapping {
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_terminal(&self, id: usize) -> bool {
        self.terminals.binary_search(&id).is_ok()
    }
}

/// Ordered prize rows from one or more files.
#[derive(Debug, Clone, Default)]
pub struct PrizeTable {
    records: Vec<PrizeRecord>,
}

impl PrizeTable {
    pub fn new(records: Vec<PrizeRecord>) -> Self {
        Self { records }
    }

    /// Parse a headerless 2-column TSV.
    pub fn from_reader<R: Read>(input: R, label: &str) -> Result<Self> {
        let mut reader = tsv::reader(input);
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result.map_err(|e| tsv::read_error(label, e))?;
            let line = tsv::line_of(&row);

            if row.len() != 2 {
                return Err(ForestError::malformed(
                    label,
                    line,
                    format!("expected 2 tab-separated columns (name, prize), found {}", row.len()),
                ));
            }
            if row[0].is_empty() {
                return Err(ForestError::malformed(label, line, "empty node name"));
            }
            let prize = tsv::parse_number(label, line, "prize", &row[1])?;

            records.push(PrizeRecord {
                name: row[0].to_string(),
                prize,
                source: label.to_string(),
                line: Some(line),
            });
        }

        debug!(file = label, rows = records.len(), "Read prize records");
        Ok(Self { records })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ForestError::io(path, e))?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn records(&self) -> &[PrizeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append another table; its rows count as later records for duplicate resolution.
    pub fn merge(mut self, other: PrizeTable) -> PrizeTable {
        self.records.extend(other.records);
        self
    }

    /// Align onto the interactome. Unresolvable names are returned in `missing`.
    pub fn map_onto(&self, interactome: &Interactome, policy: DuplicatePrizePolicy) -> PrizeMapping {
        let n = interactome.node_count();
        let mut prizes = vec![0.0f64; n];
        let mut assigned = vec![false; n];
        let mut missing = Vec::new();
        let mut duplicates = 0usize;

        for rec in &self.records {
            let Some(id) = interactome.node_id(&rec.name) else {
                missing.push(MissingTerminal {
                    name: rec.name.clone(),
                    prize: rec.prize,
                    source: rec.source.clone(),
                    line: rec.line,
                });
                continue;
            };

            if assigned[id] {
                duplicates += 1;
                debug!(name = %rec.name, ?policy, "Repeated prize name");
                prizes[id] = match policy {
                    DuplicatePrizePolicy::Last => rec.prize,
                    DuplicatePrizePolicy::Sum => prizes[id] + rec.prize,
                    DuplicatePrizePolicy::Max => prizes[id].max(rec.prize),
                };
            } else {
                prizes[id] = rec.prize;
                assigned[id] = true;
            }
        }

        let terminals: Vec<usize> = assigned
            .iter()
            .enumerate()
            .filter_map(|(id, &a)| a.then_some(id))
            .collect();

        if duplicates > 0 {
            warn!(duplicates, ?policy, "Prize table repeats node names");
        }
        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                "Prize names not found in interactome"
            );
        }
        info!(terminals = terminals.len(), nodes = n, "Prizes mapped onto interactome");

        PrizeMapping { prizes, terminals, missing }
    }
}
