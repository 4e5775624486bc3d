pub mod composite;
pub mod geolocate;
pub mod overlay;
pub mod resolve;
pub mod retention;

use std::path::PathBuf;

use crate::error::{AppError, CompositeError};
use crate::state::AppState;

/// Looks up `address` and renders its video, waiting for a free encoder slot
/// first. Returns the path of the output video.
pub async fn generate(state: &AppState, address: &str) -> Result<PathBuf, AppError> {
    let config = state.config();

    let record = geolocate::lookup(
        state.http(),
        &config.ipinfo_base_url,
        &config.ipinfo_token,
        address,
    )
    .await?;

    let _permit = tokio::time::timeout(config.encode_queue_timeout, state.encode_slots().acquire_owned())
        .await
        .map_err(|_| CompositeError::Busy(config.encode_queue_timeout))?
        .map_err(|_| CompositeError::Busy(config.encode_queue_timeout))?;

    Ok(composite::composite(address, &record, config).await?)
}
