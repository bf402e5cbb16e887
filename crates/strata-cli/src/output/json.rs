use serde::Serialize;
use strata_core::error::StrataError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), StrataError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
