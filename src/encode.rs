//! Still-image encoding.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::error::VidsnapError;

/// Encode `image` as a JPEG at the given quality and write it to `path`.
///
/// `DynamicImage::save` always uses the encoder defaults, so quality-95
/// output needs an explicit encoder.
pub fn save_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), VidsnapError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality);
    image.write_with_encoder(encoder)?;
    Ok(())
}
