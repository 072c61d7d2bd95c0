//! `sortid inspect` command.

use crate::generator::resolution::Resolution;
use crate::generator::IdParts;

/// Splits `id` and renders its parts as JSON.
///
/// # Errors
///
/// Returns an error string if `id` was not minted for `machine_id` at `resolution`.
pub fn render(id: &str, machine_id: &str, resolution: Resolution) -> Result<String, String> {
    let parts = IdParts::parse(id, machine_id, resolution).ok_or_else(|| {
        format!("`{id}` is not a {resolution:?} identifier for machine id `{machine_id}`")
    })?;
    serde_json::to_string_pretty(&parts).map_err(|e| format!("Failed to encode id parts: {e}"))
}

/// Execute the `inspect` command.
///
/// # Errors
///
/// Same as [`render`].
pub fn run(id: &str, machine_id: &str, resolution: Resolution) -> Result<(), String> {
    println!("{}", render(id, machine_id, resolution)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_parts() {
        let json = render("19700101000001m0420", "m", Resolution::Seconds).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["window"], "19700101000001");
        assert_eq!(value["sequence"], 42);
        assert_eq!(value["mark"], 0);
        assert_eq!(value["resolution"], "seconds");
    }

    #[test]
    fn rejects_foreign_id() {
        let err = render("19700101000001m0420", "x", Resolution::Seconds).unwrap_err();
        assert!(err.contains("machine id `x`"));
    }
}
