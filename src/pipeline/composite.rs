use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::config::Config;
use crate::error::CompositeError;
use crate::pipeline::overlay::{self, OverlayImage};
use crate::types::geo::{file_stem, GeoRecord};

/// Overlay filter placing the image at the top-left corner of every frame.
pub const OVERLAY_FILTER: &str = "[0:v][1:v] overlay=0:0";

/// Suffix shared by every video this service writes.
pub const OUTPUT_SUFFIX: &str = "_output_video.mp4";

pub fn output_file_name(address: &str) -> String {
    format!("{}{}", file_stem(address), OUTPUT_SUFFIX)
}

pub fn output_path(config: &Config, address: &str) -> PathBuf {
    config.static_dir.join(output_file_name(address))
}

/// Arguments passed to ffmpeg: two inputs, overlay filter, x264 video with
/// copied audio, forced overwrite of `output`.
pub fn ffmpeg_args(template: &Path, image: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(16);
    args.extend(["-y", "-i"].map(OsString::from));
    args.push(template.into());
    args.push(OsString::from("-i"));
    args.push(image.into());
    args.extend(
        [
            "-filter_complex",
            OVERLAY_FILTER,
            "-c:v",
            "libx264",
            "-c:a",
            "copy",
            "-preset",
            "ultrafast",
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

/// Renders the overlay for `address` and burns it into the template video.
///
/// Returns the path of the written video. The overlay image is removed on
/// every exit path.
pub async fn composite(
    address: &str,
    record: &GeoRecord,
    config: &Config,
) -> Result<PathBuf, CompositeError> {
    if !tokio::fs::try_exists(&config.template_video).await.unwrap_or(false) {
        return Err(CompositeError::TemplateMissing(
            config.template_video.display().to_string(),
        ));
    }

    let image = {
        let address = address.to_string();
        let record = record.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || overlay::generate_overlay(&address, &record, &config))
            .await??
    };

    tokio::fs::create_dir_all(&config.static_dir).await?;
    let output = output_path(config, address);

    run_ffmpeg(config, &image, &output).await?;

    image.remove()?;
    tracing::info!("Generated {} for {}", output.display(), address);
    Ok(output)
}

async fn run_ffmpeg(
    config: &Config,
    image: &OverlayImage,
    output: &Path,
) -> Result<(), CompositeError> {
    let mut command = tokio::process::Command::new(&config.ffmpeg_bin);
    command
        .args(ffmpeg_args(&config.template_video, image.path(), output))
        .stdin(Stdio::null())
        .kill_on_drop(true);

    tracing::debug!("Running {:?}", command);

    let result = tokio::time::timeout(config.encode_timeout, command.output()).await;
    let output = match result {
        Ok(output) => output.map_err(|source| CompositeError::Spawn {
            bin: config.ffmpeg_bin.clone(),
            source,
        })?,
        Err(_) => return Err(CompositeError::TimedOut(config.encode_timeout)),
    };

    if !output.status.success() {
        return Err(CompositeError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}
