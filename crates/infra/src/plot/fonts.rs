//! Font discovery for the bitmap renderer
//!
//! plotters is built without system font lookup, so a TrueType file has to be
//! registered before any text is drawn. Registration happens once per
//! process.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use vstlog_core::domain::plot::{PlotError, Result};

/// Family name every chart element asks for
pub const FONT_FAMILY: &str = "sans-serif";

/// Well-known locations of a regular sans-serif font
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "C:/Windows/Fonts/segoeui.ttf",
];

static REGISTERED: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// Register a font for `FONT_FAMILY`, trying `preferred` first.
///
/// Only the first call searches; later calls return its outcome.
pub fn ensure_font(preferred: Option<&Path>) -> Result<()> {
    let outcome = REGISTERED.get_or_init(|| register_first_available(preferred));

    match outcome {
        Ok(path) => {
            debug!(path = %path.display(), "Using registered font");
            Ok(())
        }
        Err(reason) => Err(PlotError::BackendUnavailable(reason.clone())),
    }
}

/// Candidate font files in search order
pub fn candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

fn register_first_available(preferred: Option<&Path>) -> std::result::Result<PathBuf, String> {
    for path in candidates(preferred) {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };

        // plotters keeps a reference to the font data for the whole process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!(path = %path.display(), "Registered plot font");
                return Ok(path);
            }
            Err(_) => warn!(path = %path.display(), "Font file rejected"),
        }
    }

    Err("no usable TrueType font found (set plots.font_path in the config)".to_string())
}
