use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};

/// Encode `img` at `path`.
///
/// `.ppm` paths, and paths whose extension names no known format, get binary PPM (`P6`).
/// Any other recognised extension goes through the `image` encoder for that format.
pub fn write_image(img: &RgbImage, path: &Path) -> Result<()> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Pnm) | Err(_) => write_ppm(img, path),
        Ok(format) => img.save_with_format(path, format).with_context(|| format!("writing {}", path.display())),
    }
}

pub fn write_ppm(img: &RgbImage, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .with_context(|| format!("encoding {}", path.display()))?;
    out.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
