use std::cell::RefCell;
use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use crate::config::Config;
use crate::error::OverlayError;
use crate::types::geo::{file_stem, GeoRecord};

const TEXT_X: u32 = 50;
const TEXT_Y: u32 = 50;
const FONT_SIZE: u32 = 16;
const LINE_HEIGHT: f32 = 1.25;

thread_local! {
    static FONT_DB: RefCell<usvg::fontdb::Database> = RefCell::new(load_font_db());
}

/// Rendered overlay on disk. The file is removed when this value is dropped.
#[derive(Debug)]
pub struct OverlayImage {
    path: TempPath,
}

impl OverlayImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file, reporting failures instead of ignoring them.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}

fn load_font_db() -> usvg::fontdb::Database {
    let mut fontdb = usvg::fontdb::Database::new();
    for path in [
        "./assets/fonts/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ] {
        let _ = fontdb.load_font_file(path);
    }
    fontdb.load_system_fonts();
    fontdb
}

/// Draws the address and location block onto the background image and writes
/// it to a temporary PNG named after the address.
pub fn generate_overlay(
    address: &str,
    record: &GeoRecord,
    config: &Config,
) -> Result<OverlayImage, OverlayError> {
    let png = FONT_DB.with(|fontdb| {
        let fontdb = fontdb.borrow();
        render_overlay_png(&config.background_image, &record.overlay_lines(address), &fontdb)
    })?;

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}_image", file_stem(address)))
        .suffix(".png")
        .tempfile_in(&config.overlay_temp_dir)?;
    file.write_all(&png)?;
    file.flush()?;

    let path = file.into_temp_path();
    tracing::debug!("Wrote overlay image {}", path.display());
    Ok(OverlayImage { path })
}

fn render_overlay_png(
    background: &Path,
    lines: &[String],
    fontdb: &usvg::fontdb::Database,
) -> Result<Vec<u8>, OverlayError> {
    let display = background.display().to_string();
    let bytes = std::fs::read(background).map_err(|source| OverlayError::BackgroundMissing {
        path: display.clone(),
        source,
    })?;
    let mut pixmap = tiny_skia::Pixmap::decode_png(&bytes).map_err(|err| {
        OverlayError::BackgroundUnreadable {
            path: display,
            reason: err.to_string(),
        }
    })?;

    let svg = text_block_svg(pixmap.width(), pixmap.height(), lines);
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg, &options, fontdb)
        .map_err(|e| OverlayError::RenderFailed(format!("Failed to parse SVG: {}", e)))?;

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| OverlayError::RenderFailed(format!("Failed to encode PNG: {}", e)))
}

fn text_block_svg(width: u32, height: u32, lines: &[String]) -> String {
    let line_step = FONT_SIZE as f32 * LINE_HEIGHT;
    let spans: String = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            // y is the baseline; the block's top edge sits at TEXT_Y.
            let y = TEXT_Y as f32 + FONT_SIZE as f32 + idx as f32 * line_step;
            format!(
                "<tspan x=\"{TEXT_X}\" y=\"{y:.1}\">{}</tspan>",
                htmlescape::encode_minimal(line)
            )
        })
        .collect();

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\
<text font-family=\"DejaVu Sans, Arial, sans-serif\" font-size=\"{FONT_SIZE}\" fill=\"white\" xml:space=\"preserve\">{spans}</text></svg>"
    )
}
