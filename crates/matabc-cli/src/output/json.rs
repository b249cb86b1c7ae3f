use matabc_core::classify::outcome::AnalysisResult;
use matabc_core::error::MatAbcError;

pub fn print(result: &AnalysisResult) -> Result<(), MatAbcError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
