//! Bootstraps [`wallet_forms`](crate) for the replay binary: an event script
//! goes in, confirmed forms come out as CSV. Kept inside the library so the
//! integration test can drive it too.

use std::{
    io::{Read, Write},
    time::Instant,
};

use anyhow::{Context, Result};
use csv_parser::{CsvEventParser, NameDirectory};
use csv_printer::print_confirmations;
use session::{FormSession, ScriptError};

use crate::form::FormConfig;

pub mod csv_parser;
pub mod csv_printer;
pub mod session;

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub names: NameDirectory,
    pub config: FormConfig,
    pub error_printer: Box<dyn FnMut(u64, ScriptError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvEventParser::new(self.input);
        let mut session = FormSession::new(self.config, self.names, Instant::now());

        let mut confirmations = Vec::new();
        for (line, row) in parser {
            let event = row.with_context(|| format!("Failed to parse event at line {line}"))?;
            match session.apply(&event) {
                Ok(Some(confirmation)) => confirmations.push(confirmation),
                Ok(None) => {}
                Err(err) => (self.error_printer)(line, err),
            }
        }

        print_confirmations(self.output, confirmations.into_iter())
    }
}
