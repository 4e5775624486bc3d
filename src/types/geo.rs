use serde::{Deserialize, Serialize};

/// Location metadata returned by the lookup service for one address.
///
/// `city`, `region` and `country` are required; a response without them is
/// treated as a failed lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRecord {
    #[serde(default)]
    pub ip: Option<String>,
    pub city: String,
    pub region: String,
    pub country: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub loc: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub postal: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl GeoRecord {
    /// Text block drawn on the overlay, one field per line.
    pub fn overlay_lines(&self, address: &str) -> [String; 4] {
        [
            format!("IP: {}", address),
            format!("City: {}", self.city),
            format!("Region: {}", self.region),
            format!("Country: {}", self.country),
        ]
    }
}

/// Address with every non-alphanumeric character removed, used to name the
/// overlay image and the output video.
pub fn file_stem(address: &str) -> String {
    address.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
