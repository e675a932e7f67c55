//! Income source model
//!
//! A period's expected income is the sum of its named income sources.
//! Names are labels only; two sources may share one.

use serde::{Deserialize, Serialize};

use super::allocation::validate_name;
use super::ids::IncomeSourceId;
use super::money::Money;
use crate::error::{BudgetError, BudgetResult};

/// A named expected income amount, e.g. "Salary" or "Freelance"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IncomeSourceRecord")]
pub struct IncomeSource {
    id: IncomeSourceId,
    name: String,
    amount: Money,
}

#[derive(Deserialize)]
struct IncomeSourceRecord {
    id: IncomeSourceId,
    name: String,
    amount: Money,
}

impl TryFrom<IncomeSourceRecord> for IncomeSource {
    type Error = BudgetError;

    fn try_from(record: IncomeSourceRecord) -> BudgetResult<Self> {
        let source = Self {
            id: record.id,
            name: record.name,
            amount: record.amount,
        };
        source.validate()?;
        Ok(source)
    }
}

impl IncomeSource {
    /// Create a new income source
    pub fn new(name: &str, amount: Money) -> BudgetResult<Self> {
        Ok(Self {
            id: IncomeSourceId::new(),
            name: validate_name(name)?,
            amount: amount.ensure_non_negative("income")?,
        })
    }

    pub fn id(&self) -> IncomeSourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Copy with a new expected amount
    pub fn with_amount(&self, amount: Money) -> BudgetResult<Self> {
        Ok(Self {
            amount: amount.ensure_non_negative("income")?,
            ..self.clone()
        })
    }

    /// Same name and amount under a fresh id
    pub(crate) fn carried_forward(&self) -> Self {
        Self {
            id: IncomeSourceId::new(),
            ..self.clone()
        }
    }

    /// Validate a source that did not come through a constructor
    pub fn validate(&self) -> BudgetResult<()> {
        validate_name(&self.name)?;
        self.amount.ensure_non_negative("income")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn test_new_income_source() {
        let salary = IncomeSource::new("Salary", Money::new(500000, Currency::USD)).unwrap();
        assert_eq!(salary.name(), "Salary");
        assert_eq!(salary.amount().minor_units(), 500000);
    }

    #[test]
    fn test_validation_negative_amount() {
        let result = IncomeSource::new("Salary", Money::new(-100, Currency::USD));
        assert!(matches!(result, Err(BudgetError::InvalidAmount(_))));
    }

    #[test]
    fn test_validation_empty_name() {
        let result = IncomeSource::new(" ", Money::new(100, Currency::USD));
        assert!(matches!(result, Err(BudgetError::InvalidName(_))));
    }

    #[test]
    fn test_with_amount() {
        let salary = IncomeSource::new("Salary", Money::new(500000, Currency::USD)).unwrap();
        let raised = salary.with_amount(Money::new(550000, Currency::USD)).unwrap();
        assert_eq!(raised.id(), salary.id());
        assert_eq!(raised.amount().minor_units(), 550000);
        assert_eq!(salary.amount().minor_units(), 500000);
    }

    #[test]
    fn test_serialization() {
        let salary = IncomeSource::new("Salary", Money::new(500000, Currency::USD)).unwrap();
        let json = serde_json::to_string(&salary).unwrap();
        let deserialized: IncomeSource = serde_json::from_str(&json).unwrap();
        assert_eq!(salary, deserialized);
    }

    #[test]
    fn test_deserialize_rejects_negative_amount() {
        let salary = IncomeSource::new("Salary", Money::new(500000, Currency::USD)).unwrap();
        let mut value = serde_json::to_value(&salary).unwrap();
        value["amount"]["minor_units"] = serde_json::json!(-100);

        assert!(serde_json::from_value::<IncomeSource>(value).is_err());
    }
}
