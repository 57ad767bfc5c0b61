use std::io::Write;

use csv::Writer;
use serde::Serialize;

use super::csv_parser::FormKind;

/// A confirmed form, as printed by the replay service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Confirmation {
    pub form: FormKind,
    pub receiver: String,
    pub amount: String,
    pub memo: String,
}

pub fn print_confirmations<W>(
    output: &mut W,
    confirmations: impl Iterator<Item = Confirmation>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for confirmation in confirmations {
        if let Err(err) = writer.serialize(confirmation) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
