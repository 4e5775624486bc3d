use reqwest::{StatusCode, Url};

use crate::error::LookupError;
use crate::types::geo::GeoRecord;

/// Builds `{base}/{address}/json` with the address as an escaped path segment.
pub fn lookup_url(base_url: &str, address: &str) -> Result<Url, LookupError> {
    let mut url =
        Url::parse(base_url).map_err(|err| LookupError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| LookupError::InvalidBaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .push(address)
        .push("json");
    Ok(url)
}

/// Fetches location metadata for `address`. Anything but a 200 is a failure.
pub async fn lookup(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    address: &str,
) -> Result<GeoRecord, LookupError> {
    let url = lookup_url(base_url, address)?;
    tracing::info!("Looking up {} via {}", address, url);

    let response = client
        .get(url)
        .query(&[("token", token)])
        .send()
        .await
        .map_err(LookupError::Transport)?;

    if response.status() != StatusCode::OK {
        return Err(LookupError::Status(response.status().as_u16()));
    }

    let record: GeoRecord = response.json().await.map_err(LookupError::Decode)?;
    tracing::info!(
        "IPInfo data for {}: {}, {}, {}",
        address,
        record.city,
        record.region,
        record.country
    );
    Ok(record)
}
