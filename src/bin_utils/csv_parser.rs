use std::{collections::HashMap, io::Read};

use anyhow::Context;
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::{Deserialize, Serialize};

use crate::receiver::{AddressResolver, LookupError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Deposit,
    Withdraw,
    Send,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Open,
    Close,
    Balance,
    Decimals,
    Precision,
    Fee,
    Amount,
    Receiver,
    Memo,
    Tick,
    Confirm,
}

/// One line of an event script.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    pub form: FormKind,
    pub event: EventKind,
    pub value: Option<String>,
    /// Milliseconds since the script started.
    pub at_ms: u64,
}

/// Parses an event script in CSV format, yielding each event with the line
/// it was read from.
pub struct CsvEventParser<R> {
    iter: DeserializeRecordsIntoIter<R, ScriptEvent>,
}

impl<R> CsvEventParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        // values are keystrokes, so they are kept as typed
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvEventParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<ScriptEvent>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    name: String,
    address: String,
}

/// Name service backed by a fixed `name,address` table.
#[derive(Debug, Default, Clone)]
pub struct NameDirectory {
    names: HashMap<String, String>,
}

impl NameDirectory {
    pub fn read<R: Read>(source: R) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(source);
        let mut names = HashMap::new();
        for (idx, row) in reader.deserialize::<NameRecord>().enumerate() {
            let record = row.with_context(|| format!("Failed to parse name record {}", idx + 1))?;
            names.insert(record.name, record.address);
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AddressResolver for NameDirectory {
    fn resolve(&mut self, name: &str) -> Result<Option<String>, LookupError> {
        Ok(self.names.get(name).cloned())
    }
}
