//! The `history` command: show recent run records.

use crate::cli::HistoryArgs;
use crate::config::JobsConfig;
use crate::error::{Result, SolorunError};
use crate::history;

pub fn cmd_history(args: HistoryArgs) -> Result<()> {
    let file = match args.file {
        Some(path) => path,
        None => {
            let config = JobsConfig::resolve(args.config.as_deref())?;
            config.history_file.ok_or_else(|| {
                SolorunError::UserError(
                    "no history file configured. Set history_file in the config or pass --file <path>."
                        .to_string(),
                )
            })?
        }
    };

    // A history file only appears once something has been recorded.
    if !file.exists() {
        println!("No run history yet.");
        return Ok(());
    }

    let records = history::read_records(&file)?;
    if records.is_empty() {
        println!("No run history yet.");
        return Ok(());
    }

    let start = records.len().saturating_sub(args.tail);
    for record in &records[start..] {
        println!("{}", history::render_line(record));
    }

    Ok(())
}
