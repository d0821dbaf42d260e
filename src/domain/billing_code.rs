//! Billing code table mapping appointment types to CPT procedure codes.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{Amount, AppError};

/// One entry of the billing code table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingCode {
    pub procedure_code: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub charge_amount: Option<Amount>,
}

/// Billing codes keyed by appointment type, loaded from `billing_codes.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BillingCodeTable {
    codes: BTreeMap<String, BillingCode>,
}

impl BillingCodeTable {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Look up the code for an appointment type; missing mappings are errors.
    pub fn lookup(&self, appointment_type: &str) -> Result<&BillingCode, AppError> {
        self.codes
            .get(appointment_type)
            .ok_or_else(|| AppError::BillingCodeMissing(appointment_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BillingCodeTable {
        serde_json::from_str(
            r#"{
                "annual_physical": {
                    "procedure_code": "99396",
                    "display": "Preventive visit, established patient",
                    "charge_amount": "180.00"
                },
                "sick_visit": { "procedure_code": "99213" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_table_with_optional_fields() {
        let table = table();
        assert_eq!(table.len(), 2);
        let physical = table.lookup("annual_physical").unwrap();
        assert_eq!(physical.procedure_code, "99396");
        assert_eq!(physical.charge_amount.unwrap().cents(), 18000);
        let sick = table.lookup("sick_visit").unwrap();
        assert!(sick.display.is_none());
        assert!(sick.charge_amount.is_none());
    }

    #[test]
    fn missing_mapping_is_an_error() {
        let err = table().lookup("telehealth").unwrap_err();
        assert!(err.to_string().contains("telehealth"));
    }

    #[test]
    fn rejects_non_object_tables() {
        assert!(serde_json::from_str::<BillingCodeTable>(r#"[{"procedure_code": "1"}]"#).is_err());
    }
}
