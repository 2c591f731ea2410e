use crate::browser::page::{DriverError, ElementHandle, PageDriver};
use crate::utils::PlateValue;
use std::time::Duration;
use thiserror::Error;

const PER_CHAR_DELAY: Duration = Duration::from_millis(40);

#[derive(Debug, Error)]
pub enum FormError {
    #[error("value did not register in the input")]
    ValueNotTaken,

    #[error("activation did not register: {0}")]
    Activation(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Clears the input and assigns the plate directly; when the value does
/// not read back (or the call errors), falls back to per-character typing;
/// some provider widgets only react to genuine input events.
pub async fn fill(
    page: &dyn PageDriver,
    input: ElementHandle,
    plate: &PlateValue,
) -> Result<(), FormError> {
    let _ = page.clear_value(input).await;

    let direct_ok = match page.set_value(input, plate.as_str()).await {
        Ok(()) => page
            .value(input)
            .await
            .map(|v| v.eq_ignore_ascii_case(plate.as_str()))
            .unwrap_or(false),
        Err(_) => false,
    };
    if direct_ok {
        return Ok(());
    }

    tracing::debug!("Direct value set did not take, typing character by character");
    let _ = page.clear_value(input).await;
    page.type_text(input, plate.as_str(), PER_CHAR_DELAY).await?;

    let read_back = page.value(input).await.unwrap_or_default();
    if read_back.eq_ignore_ascii_case(plate.as_str()) {
        Ok(())
    } else {
        Err(FormError::ValueNotTaken)
    }
}

/// Clicks the submit control; an intercepted click gets one forced
/// (scripted) retry. Failure here is a distinct condition from "button
/// not found"; the classifier treats them differently.
pub async fn submit(page: &dyn PageDriver, button: ElementHandle) -> Result<(), FormError> {
    match page.click(button).await {
        Ok(()) => Ok(()),
        Err(DriverError::Interaction(reason)) => {
            tracing::debug!("Click intercepted ({}), forcing", reason);
            page.force_click(button)
                .await
                .map_err(|e| FormError::Activation(e.to_string()))
        }
        Err(e) => Err(FormError::Activation(e.to_string())),
    }
}
