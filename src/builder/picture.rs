use std::collections::HashMap;
use std::io::Cursor;

use image::ImageFormat;

use crate::error::Error;
use crate::model::{EmbeddedPicture, PictureFormat, picture_reference};

/// EMU per twip (dxa).
pub const EMU_PER_TWIP: f64 = 635.0;

/// Appended to the text of a picture reference that lands in a table cell.
pub const PICTURE_IN_TABLE_NOTE: &str = "(Cannot add picture inside table)";

/// `.jpeg` is deliberately absent: only `.jpg` names a JPEG picture.
const RECOGNIZED_EXTENSIONS: [(&str, PictureFormat); 6] = [
    ("png", PictureFormat::Png),
    ("jpg", PictureFormat::Jpeg),
    ("gif", PictureFormat::Gif),
    ("bmp", PictureFormat::Bmp),
    ("tif", PictureFormat::Tiff),
    ("tiff", PictureFormat::Tiff),
];

pub fn picture_format(name: &str) -> Option<PictureFormat> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    RECOGNIZED_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, f)| *f)
}

pub fn is_picture_reference(text: &str) -> bool {
    picture_reference(text).and_then(picture_format).is_some()
}

/// Pixel length to embed units. The doubling is part of the format's visual
/// calibration and must stay.
pub fn pixels_to_emu(pixels: u32) -> u64 {
    (EMU_PER_TWIP * pixels as f64).round() as u64 * 2
}

fn embeddable_format(format: ImageFormat) -> Option<PictureFormat> {
    match format {
        ImageFormat::Png => Some(PictureFormat::Png),
        ImageFormat::Jpeg => Some(PictureFormat::Jpeg),
        ImageFormat::Gif => Some(PictureFormat::Gif),
        ImageFormat::Bmp => Some(PictureFormat::Bmp),
        ImageFormat::Tiff => Some(PictureFormat::Tiff),
        _ => None,
    }
}

/// Looks up picture references in the request's picture map.
pub struct PictureResolver<'a> {
    pictures: &'a HashMap<String, Vec<u8>>,
}

impl<'a> PictureResolver<'a> {
    pub fn new(pictures: &'a HashMap<String, Vec<u8>>) -> Self {
        Self { pictures }
    }

    /// Resolves a `${name}` text. Unwrapped text is looked up as-is.
    pub fn resolve(&self, text: &str) -> Result<EmbeddedPicture, Error> {
        let name = picture_reference(text).unwrap_or_else(|| text.trim());
        self.resolve_name(name)
    }

    /// The embedded format follows the bytes. A name whose extension
    /// disagrees with the content is logged and embedded as what it is.
    pub fn resolve_name(&self, name: &str) -> Result<EmbeddedPicture, Error> {
        let named =
            picture_format(name).ok_or_else(|| Error::UnsupportedPictureType(name.to_string()))?;

        if self.pictures.is_empty() {
            log::warn!("Picture '{name}' is referenced but no pictures were supplied");
            return Err(Error::PictureNotFound(name.to_string()));
        }
        let data = self
            .pictures
            .get(name)
            .ok_or_else(|| Error::PictureNotFound(name.to_string()))?;

        let reader = image::ImageReader::new(Cursor::new(data.as_slice())).with_guessed_format()?;
        let format = match reader.format() {
            None => named,
            Some(detected) => {
                let Some(format) = embeddable_format(detected) else {
                    return Err(Error::UnsupportedPictureType(name.to_string()));
                };
                if format != named {
                    log::warn!(
                        "Picture '{name}' holds {} data, embedding it as .{}",
                        format.content_type(),
                        format.extension()
                    );
                }
                format
            }
        };
        let (pixel_width, pixel_height) = reader.into_dimensions()?;

        log::debug!("PICTURE name={name} px={pixel_width}x{pixel_height} format={format:?}");

        Ok(EmbeddedPicture {
            name: name.to_string(),
            data: data.clone(),
            format,
            pixel_width,
            pixel_height,
            width_emu: pixels_to_emu(pixel_width),
            height_emu: pixels_to_emu(pixel_height),
        })
    }
}
