//! Arithmetic operations that record themselves in a [`JournalStore`].
//!
//! The free functions are the plain computations with input validation. [`Calculator`] wraps
//! them and, when given a non-blank tracking id, journals each successful call.

use crate::entry::JournalEntry;
use crate::index::is_blank_key;
use crate::store::JournalStore;
use std::sync::Arc;

/// Result type for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;

/// Input validation failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Wrong number of operands, negative square root, non-finite input.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Divisor was zero.
    #[error("divisor cannot be zero")]
    DivisionByZero,
}

impl CalcError {
    /// Stable machine-readable code for API layers.
    pub fn code(&self) -> &'static str {
        match self {
            CalcError::InvalidArguments(_) => "InvalidArguments",
            CalcError::DivisionByZero => "DivisionByZero",
        }
    }
}

fn ensure_finite(values: &[f64]) -> CalcResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CalcError::InvalidArguments(
            "operands must be finite numbers".into(),
        ))
    }
}

/// Sum of at least two addends.
pub fn add(addends: &[f64]) -> CalcResult<f64> {
    if addends.len() < 2 {
        return Err(CalcError::InvalidArguments(
            "at least two addends are required".into(),
        ));
    }
    ensure_finite(addends)?;
    Ok(addends.iter().sum())
}

/// `minuend` minus every subtrahend in turn.
pub fn sub(minuend: f64, subtrahends: &[f64]) -> CalcResult<f64> {
    if subtrahends.is_empty() {
        return Err(CalcError::InvalidArguments(
            "at least one subtrahend is required".into(),
        ));
    }
    ensure_finite(&[minuend])?;
    ensure_finite(subtrahends)?;
    Ok(subtrahends.iter().fold(minuend, |acc, s| acc - s))
}

/// Product of at least two factors.
pub fn mul(factors: &[f64]) -> CalcResult<f64> {
    if factors.len() < 2 {
        return Err(CalcError::InvalidArguments(
            "at least two factors are required".into(),
        ));
    }
    ensure_finite(factors)?;
    Ok(factors.iter().product())
}

/// Floored quotient and remainder (`dividend % divisor`).
pub fn div(dividend: f64, divisor: f64) -> CalcResult<(f64, f64)> {
    ensure_finite(&[dividend, divisor])?;
    if divisor == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    Ok(((dividend / divisor).floor(), dividend % divisor))
}

/// Square root of a non-negative number.
pub fn sqrt(number: f64) -> CalcResult<f64> {
    ensure_finite(&[number])?;
    if number < 0.0 {
        return Err(CalcError::InvalidArguments(
            "cannot calculate the square root of a negative number".into(),
        ));
    }
    Ok(number.sqrt())
}

fn join(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Calculator that journals successful operations under the caller's tracking id.
#[derive(Clone)]
pub struct Calculator {
    journal: Arc<JournalStore>,
}

impl Calculator {
    /// Calculator recording into `journal`.
    pub fn new(journal: Arc<JournalStore>) -> Self {
        Self { journal }
    }

    /// The journal this calculator records into.
    pub fn journal(&self) -> &JournalStore {
        &self.journal
    }

    /// See [`add`]. Journals as `Add`, e.g. `"5 + 7 = 12"`.
    pub fn add(&self, addends: &[f64], tracking_id: Option<&str>) -> CalcResult<f64> {
        let sum = add(addends)?;
        self.record(tracking_id, "Add", || {
            format!("{} = {sum}", join(addends, " + "))
        });
        Ok(sum)
    }

    /// See [`sub`]. Journals as `Sub`, e.g. `"10 - 3 - 2 = 5"`.
    pub fn sub(
        &self,
        minuend: f64,
        subtrahends: &[f64],
        tracking_id: Option<&str>,
    ) -> CalcResult<f64> {
        let difference = sub(minuend, subtrahends)?;
        self.record(tracking_id, "Sub", || {
            format!("{minuend} - {} = {difference}", join(subtrahends, " - "))
        });
        Ok(difference)
    }

    /// See [`mul`]. Journals as `Mul`, e.g. `"2 * 3 = 6"`.
    pub fn mul(&self, factors: &[f64], tracking_id: Option<&str>) -> CalcResult<f64> {
        let product = mul(factors)?;
        self.record(tracking_id, "Mul", || {
            format!("{} = {product}", join(factors, " * "))
        });
        Ok(product)
    }

    /// See [`div`]. Journals as `Div`, e.g. `"7 ÷ 2 = 3, remainder 1"`.
    pub fn div(
        &self,
        dividend: f64,
        divisor: f64,
        tracking_id: Option<&str>,
    ) -> CalcResult<(f64, f64)> {
        let (quotient, remainder) = div(dividend, divisor)?;
        self.record(tracking_id, "Div", || {
            format!("{dividend} ÷ {divisor} = {quotient}, remainder {remainder}")
        });
        Ok((quotient, remainder))
    }

    /// See [`sqrt`]. Journals as `Sqrt`, e.g. `"√16 = 4"`.
    pub fn sqrt(&self, number: f64, tracking_id: Option<&str>) -> CalcResult<f64> {
        let root = sqrt(number)?;
        self.record(tracking_id, "Sqrt", || format!("√{number} = {root}"));
        Ok(root)
    }

    fn record(
        &self,
        tracking_id: Option<&str>,
        operation: &str,
        calculation: impl FnOnce() -> String,
    ) {
        let Some(id) = tracking_id.filter(|id| !is_blank_key(id)) else {
            return;
        };
        self.journal.append(id, JournalEntry::new(operation, calculation()));
    }
}
