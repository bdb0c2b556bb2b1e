//! Fixed catalog of platform modules an access token can be scoped to.

/// Every module identifier the platform exposes. Compiled in; there is no
/// runtime registration.
pub const MODULE_CATALOG: &[&str] = &[
    "incorporation",
    "compliance",
    "accounting",
    "tax",
    "payroll",
    "hr",
    "legal",
    "finance",
    "marketing",
    "documents",
];

pub fn is_known_module(module: &str) -> bool {
    MODULE_CATALOG.contains(&module)
}

/// Requested modules missing from the catalog, in request order, deduplicated.
pub fn unknown_modules<'a>(requested: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut invalid: Vec<String> = Vec::new();
    for module in requested {
        if !is_known_module(module) && !invalid.iter().any(|m| m == module) {
            invalid.push(module.to_string());
        }
    }
    invalid
}

pub fn catalog() -> Vec<String> {
    MODULE_CATALOG.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_unknown_module_once() {
        let invalid = unknown_modules(["hr", "crm", "finance", "crm", "HR"]);
        assert_eq!(invalid, vec!["crm".to_string(), "HR".to_string()]);
    }

    #[test]
    fn catalog_has_no_duplicates() {
        let mut modules = catalog();
        modules.sort();
        modules.dedup();
        assert_eq!(modules.len(), MODULE_CATALOG.len());
    }
}
