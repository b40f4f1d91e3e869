use crate::{db::DbPool, errors::ServiceError, events::EventSender};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use validator::ValidationError;

/// Command trait for implementing the Command Pattern
///
/// This trait allows for encapsulating all the logic needed to execute a business operation
/// into a single object that can be validated, executed, and produce events.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish domain events
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod audits;
pub mod movements;
pub mod nonconformities;
pub mod returns;
pub mod tco;
pub mod toners;
pub mod warranties;

/// Field validator for weights, prices and other amounts.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

pub fn valid_percentage(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value)?;
    if *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percentage");
        err.message = Some("must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_validators() {
        assert!(non_negative(&dec!(0)).is_ok());
        assert!(non_negative(&dec!(12.5)).is_ok());
        assert!(non_negative(&dec!(-0.01)).is_err());
        assert!(valid_percentage(&dec!(100)).is_ok());
        assert!(valid_percentage(&dec!(100.1)).is_err());
    }
}
