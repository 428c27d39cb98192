//! Module identifier normalisation and validation

use crate::module::error::{ModuleError, ModuleResult};

/// Owner id used for content the host registers itself
pub const HOST_OWNER_ID: &str = "host";

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Normalise a declared id: trim, then collapse internal whitespace runs to `_`
pub fn clean_id(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Normalise a list of ids, dropping entries that are empty once cleaned
pub fn clean_ids<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = Vec::new();
    for id in raw {
        let id = clean_id(id.as_ref());
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Check the shape of a clean id without regard to what is loaded
pub fn validate_format(clean: &str) -> ModuleResult<()> {
    if clean.is_empty() {
        return Err(ModuleError::invalid_identifier(
            clean,
            "module identifier must not be empty",
        ));
    }
    if !clean.chars().all(is_id_char) {
        return Err(ModuleError::invalid_identifier(
            clean,
            format!(
                "module identifier '{}' may only contain letters, digits, '_' and '-'",
                clean
            ),
        ));
    }
    if clean.eq_ignore_ascii_case(HOST_OWNER_ID) {
        return Err(ModuleError::invalid_identifier(
            clean,
            format!("module identifier '{}' is reserved", clean),
        ));
    }
    Ok(())
}

/// Full validation before a load: shape, then uniqueness among loaded modules
pub fn validate_for_load(clean: &str, already_loaded: bool) -> ModuleResult<()> {
    validate_format(clean)?;
    if already_loaded {
        return Err(ModuleError::invalid_identifier(
            clean,
            format!("a module with identifier '{}' is already loaded", clean),
        ));
    }
    Ok(())
}
