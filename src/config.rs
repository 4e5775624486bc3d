use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ipinfo_token: String,
    pub ipinfo_base_url: String,
    /// Public address substituted for private/reserved client addresses.
    pub fallback_address: String,
    pub background_image: PathBuf,
    pub template_video: PathBuf,
    pub static_dir: PathBuf,
    pub overlay_temp_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub lookup_timeout: Duration,
    pub encode_timeout: Duration,
    pub max_concurrent_encodes: usize,
    pub encode_queue_timeout: Duration,
    /// Output videos older than this are removed. Zero keeps them forever.
    pub output_ttl: Duration,
    pub retention_sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            ipinfo_token: String::new(),
            ipinfo_base_url: "https://ipinfo.io".to_string(),
            fallback_address: "8.8.8.8".to_string(),
            background_image: PathBuf::from("image.png"),
            template_video: PathBuf::from("video.mp4"),
            static_dir: PathBuf::from("static"),
            overlay_temp_dir: std::env::temp_dir(),
            ffmpeg_bin: "ffmpeg".to_string(),
            lookup_timeout: Duration::from_secs(10),
            encode_timeout: Duration::from_secs(120),
            max_concurrent_encodes: 2,
            encode_queue_timeout: Duration::from_secs(30),
            output_ttl: Duration::from_secs(24 * 3600),
            retention_sweep_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let ipinfo_token = std::env::var("IPINFO_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing("IPINFO_TOKEN"))?;

        let defaults = Self::default();

        Ok(Self {
            port: parse_env("PORT").unwrap_or(defaults.port),
            ipinfo_token,
            ipinfo_base_url: string_env("IPINFO_BASE_URL").unwrap_or(defaults.ipinfo_base_url),
            fallback_address: string_env("FALLBACK_ADDRESS").unwrap_or(defaults.fallback_address),
            background_image: string_env("BACKGROUND_IMAGE")
                .map(PathBuf::from)
                .unwrap_or(defaults.background_image),
            template_video: string_env("TEMPLATE_VIDEO")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_video),
            static_dir: string_env("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            overlay_temp_dir: string_env("OVERLAY_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.overlay_temp_dir),
            ffmpeg_bin: string_env("FFMPEG_BIN").unwrap_or(defaults.ffmpeg_bin),
            lookup_timeout: seconds_env("LOOKUP_TIMEOUT_SECONDS").unwrap_or(defaults.lookup_timeout),
            encode_timeout: seconds_env("ENCODE_TIMEOUT_SECONDS").unwrap_or(defaults.encode_timeout),
            max_concurrent_encodes: parse_env::<usize>("MAX_CONCURRENT_ENCODES")
                .map(|n| n.max(1))
                .unwrap_or(defaults.max_concurrent_encodes),
            encode_queue_timeout: seconds_env("ENCODE_QUEUE_TIMEOUT_SECONDS")
                .unwrap_or(defaults.encode_queue_timeout),
            output_ttl: seconds_env("OUTPUT_TTL_SECONDS").unwrap_or(defaults.output_ttl),
            retention_sweep_interval: seconds_env("RETENTION_SWEEP_SECONDS")
                .filter(|interval| !interval.is_zero())
                .unwrap_or(defaults.retention_sweep_interval),
        })
    }
}

fn string_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn seconds_env(key: &str) -> Option<Duration> {
    parse_env::<u64>(key).map(Duration::from_secs)
}
