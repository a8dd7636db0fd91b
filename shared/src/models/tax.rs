//! Tax rule models

use serde::{Deserialize, Serialize};

/// Id of the synthetic "no tax" rule
pub const NO_TAX_ID: &str = "no_tax";

/// How a tax rule's value is applied to a price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaxKind {
    Percent,
    Flat,
}

/// A tax rule as served by the tax API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaxKind,
    /// Decimal value as a string, e.g. "10" or "2.5"
    pub value: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TaxRule {
    /// The always-available "no tax" option
    pub fn no_tax() -> Self {
        Self {
            id: NO_TAX_ID.to_string(),
            name: "No Tax".to_string(),
            kind: TaxKind::Flat,
            value: "0".to_string(),
            is_active: true,
        }
    }

    pub fn is_no_tax(&self) -> bool {
        self.id == NO_TAX_ID
    }
}

/// Prepend the synthetic `no_tax` rule to a fetched list
///
/// Inactive rules are dropped and a `no_tax` entry coming from the API is
/// not duplicated.
pub fn with_no_tax(fetched: Vec<TaxRule>) -> Vec<TaxRule> {
    let mut rules = Vec::with_capacity(fetched.len() + 1);
    rules.push(TaxRule::no_tax());
    rules.extend(
        fetched
            .into_iter()
            .filter(|rule| rule.is_active && !rule.is_no_tax()),
    );
    rules
}

/// Returns true if the id denotes "no tax" (absent or the synthetic id)
pub fn is_no_tax_id(tax_id: Option<&str>) -> bool {
    match tax_id.map(str::trim) {
        None | Some("") => true,
        Some(id) => id == NO_TAX_ID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, kind: TaxKind, value: &str, active: bool) -> TaxRule {
        TaxRule {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
            value: value.to_string(),
            is_active: active,
        }
    }

    #[test]
    fn test_no_tax_always_first() {
        let rules = with_no_tax(vec![rule("vat", TaxKind::Percent, "10", true)]);
        assert_eq!(rules.len(), 2);
        assert!(rules[0].is_no_tax());
        assert_eq!(rules[1].id, "vat");
    }

    #[test]
    fn test_no_tax_on_empty_list() {
        let rules = with_no_tax(Vec::new());
        assert_eq!(rules, vec![TaxRule::no_tax()]);
    }

    #[test]
    fn test_inactive_and_duplicate_no_tax_dropped() {
        let rules = with_no_tax(vec![
            rule(NO_TAX_ID, TaxKind::Flat, "0", true),
            rule("old", TaxKind::Percent, "5", false),
            rule("eco", TaxKind::Flat, "15", true),
        ]);
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![NO_TAX_ID, "eco"]);
    }

    #[test]
    fn test_tax_rule_wire_format() {
        let json = r#"{"id":"vat","name":"VAT","type":"percent","value":"10","isActive":true}"#;
        let parsed: TaxRule = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, TaxKind::Percent);
        assert!(is_no_tax_id(None));
        assert!(is_no_tax_id(Some(NO_TAX_ID)));
        assert!(!is_no_tax_id(Some("vat")));
    }
}
