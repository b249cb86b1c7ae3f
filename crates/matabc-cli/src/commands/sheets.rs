use matabc_core::error::MatAbcError;
use matabc_core::table::xlsx::{default_sheet, sheet_names};
use std::path::Path;

pub fn run(input_file: &Path) -> Result<(), MatAbcError> {
    let bytes = std::fs::read(input_file)?;
    let names = sheet_names(&bytes)?;
    let default = default_sheet(&names);

    for name in &names {
        let marker = if Some(name.as_str()) == default { "  (default)" } else { "" };
        println!("{name}{marker}");
    }
    Ok(())
}
