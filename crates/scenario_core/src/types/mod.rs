//! Core value types shared by the calculator, analytics and forecasting.

pub mod error;
pub mod financials;
pub mod period;

pub use error::{BaselineError, ForecastError, ImpactError, PeriodParseError, QualityError};
pub use financials::{
    FinancialBaseline, ScenarioParameters, DEFAULT_FX_RATE, DEFAULT_TAX_RATE_PCT,
};
pub use period::{AmountRecord, FiscalQuarter};
