//! Writes a rendered SVG document to disk as SVG, PNG or PDF.

use std::path::Path;
use std::sync::Arc;

use resvg::usvg;
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};
use tracing::info;

const LOCAL_FONTS_DIR: &str = "fonts";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output file has no extension")]
    MissingExtension,

    #[error("Unsupported output format: .{0} (use .svg, .png or .pdf)")]
    UnsupportedFormat(String),

    #[error("Invalid --png-scale value: {0}")]
    InvalidScale(f32),

    #[error("Failed to parse SVG: {0}")]
    Parse(String),

    #[error("Failed to create pixmap")]
    Pixmap,

    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: OutputFormat,
        message: String,
    },

    #[error("Failed to write {format}: {source}")]
    Write {
        format: OutputFormat,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Svg => "SVG",
            OutputFormat::Png => "PNG",
            OutputFormat::Pdf => "PDF",
        })
    }
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, OutputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(OutputError::MissingExtension)?
            .to_ascii_lowercase();

        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(OutputError::UnsupportedFormat(ext)),
        }
    }
}

/// Encode `svg` according to the extension of `path` and write it there.
pub fn write_output(path: &Path, svg: &str, png_scale: f32) -> Result<OutputFormat, OutputError> {
    let format = OutputFormat::from_path(path)?;
    let bytes = match format {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Png => svg_to_png(svg, png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(svg)?,
    };
    std::fs::write(path, bytes).map_err(|source| OutputError::Write { format, source })?;
    info!(path = %path.display(), %format, "surface written");
    Ok(format)
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, OutputError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(OutputError::InvalidScale(scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        let fallbacks = FontFallbacks::pick(
            fontdb
                .faces()
                .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
        );
        if let Some(family) = fallbacks.sans {
            fontdb.set_sans_serif_family(family);
        }
        if let Some(family) = fallbacks.serif {
            fontdb.set_serif_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| OutputError::Parse(e.to_string()))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(OutputError::Pixmap)?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| OutputError::Encode {
        format: OutputFormat::Png,
        message: e.to_string(),
    })
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, OutputError> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new(LOCAL_FONTS_DIR);
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    let fallbacks = FontFallbacks::pick(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
    );
    if let Some(family) = fallbacks.sans {
        fontdb.set_sans_serif_family(family);
    }
    if let Some(family) = fallbacks.serif {
        fontdb.set_serif_family(family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: Arc::new(fontdb),
        ..Default::default()
    };
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| OutputError::Parse(e.to_string()))?;

    // Labels become paths so the PDF never depends on font embedding.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default()).map_err(|e| {
        OutputError::Encode {
            format: OutputFormat::Pdf,
            message: e.to_string(),
        }
    })
}

/// Generic family names resolved against whatever fonts are installed.
/// Both rasterizers carry their own `fontdb`, so only the choice is shared.
#[derive(Debug, Default, PartialEq, Eq)]
struct FontFallbacks {
    sans: Option<String>,
    serif: Option<String>,
}

impl FontFallbacks {
    fn pick<'a>(families: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sans: Option<&str> = None;
        let mut serif: Option<&str> = None;
        let mut first: Option<&str> = None;

        for family in families {
            first.get_or_insert(family);
            let lower = family.to_ascii_lowercase();
            if sans.is_none() && lower.contains("sans") {
                sans = Some(family);
            }
            if serif.is_none() && lower.contains("serif") && !lower.contains("sans") {
                serif = Some(family);
            }
        }

        Self {
            sans: sans.or(first).map(str::to_string),
            serif: serif.or(first).map(str::to_string),
        }
    }
}
