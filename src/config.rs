use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ServicingError};

/// servicing configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServicingConfig {
    pub credit_limits: CreditLimits,
    pub schedule: ScheduleConfig,
    pub overdue: OverdueConfig,
    pub ledger: LedgerConfig,
}

/// bounds applied to credit terms at origination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLimits {
    pub minimum_principal: Money,
    /// largest principal a credit may carry
    pub maximum_principal: Money,
    pub min_installments: u32,
    pub max_installments: u32,
    pub min_annual_rate: Rate,
    pub max_annual_rate: Rate,
}

/// amortization schedule shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// days between consecutive due dates
    pub cadence_days: u32,
    /// installment values are rounded to a multiple of this many major units
    pub rounding_unit: u32,
}

/// overdue interest terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueConfig {
    /// annual rate applied when the caller does not supply one
    pub default_annual_rate: Rate,
    /// days per year used to prorate the annual rate
    pub day_basis: u32,
}

/// payment ledger policy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// reject payments larger than the installment's pending balance
    pub reject_overpayment: bool,
}

impl Default for CreditLimits {
    fn default() -> Self {
        Self {
            minimum_principal: Money::from_major(100_000),
            maximum_principal: Money::from_decimal(dec!(9999999999.99)),
            min_installments: 1,
            max_installments: 60,
            min_annual_rate: Rate::from_decimal(dec!(0.01)),
            max_annual_rate: Rate::from_decimal(dec!(1.00)),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cadence_days: 30,
            rounding_unit: 10,
        }
    }
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            default_annual_rate: Rate::from_decimal(dec!(0.02)),
            day_basis: 365,
        }
    }
}

impl ServicingConfig {
    /// defaults with the overpayment guard switched on
    pub fn strict() -> Self {
        Self {
            ledger: LedgerConfig {
                reject_overpayment: true,
            },
            ..Self::default()
        }
    }

    /// parse and validate a json document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ServicingConfig = serde_json::from_str(json)
            .map_err(|e| ServicingError::validation(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// check that the limits are internally consistent
    pub fn validate(&self) -> Result<()> {
        let limits = &self.credit_limits;

        if limits.minimum_principal.is_negative() {
            return Err(ServicingError::validation("minimum principal cannot be negative"));
        }
        if limits.maximum_principal < limits.minimum_principal {
            return Err(ServicingError::validation(format!(
                "invalid principal bounds: {}..{}",
                limits.minimum_principal, limits.maximum_principal
            )));
        }
        if limits.min_installments == 0 || limits.min_installments > limits.max_installments {
            return Err(ServicingError::validation(format!(
                "invalid installment bounds: {}..{}",
                limits.min_installments, limits.max_installments
            )));
        }
        if limits.min_annual_rate > limits.max_annual_rate || limits.min_annual_rate < Rate::ZERO {
            return Err(ServicingError::validation(format!(
                "invalid rate bounds: {}..{}",
                limits.min_annual_rate, limits.max_annual_rate
            )));
        }
        if self.schedule.cadence_days == 0 {
            return Err(ServicingError::validation("schedule cadence must be at least one day"));
        }
        if self.overdue.day_basis == 0 {
            return Err(ServicingError::validation("overdue day basis must be positive"));
        }
        if self.overdue.default_annual_rate < Rate::ZERO {
            return Err(ServicingError::validation("overdue rate cannot be negative"));
        }

        Ok(())
    }
}
