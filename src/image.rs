use std::path::Path;

use image::{DynamicImage, GenericImage};

use crate::{Error, array2d::Array2d, vec::Color3};

/// Quantize a color channel clamped to [0, 1], without any transfer function
#[must_use]
pub fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Save an image, the format is picked from the extension of `path`
pub fn image_save(path: &str, data: &Array2d<Color3>) -> crate::Result<()> {
    let output_ext = Path::new(path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| Error::MissingExtension(path.to_string()))?;

    if output_ext == "exr" {
        let mut image_hdr = DynamicImage::new_rgb32f(data.size_x(), data.size_y()).to_rgb32f();
        for x in 0..data.size_x() {
            for y in 0..data.size_y() {
                let p = data.at(x, y);
                image_hdr.put_pixel(x, y, image::Rgb([p[0] as f32, p[1] as f32, p[2] as f32]));
            }
        }
        image_hdr
            .save(Path::new(path))
            .map_err(|e| Error::Other(Box::new(e)))?;
    } else {
        let mut image_ldr = DynamicImage::new_rgb8(data.size_x(), data.size_y());
        for x in 0..data.size_x() {
            for y in 0..data.size_y() {
                let p = data.at(x, y);
                image_ldr.put_pixel(
                    x,
                    y,
                    image::Rgba([to_u8(p[0]), to_u8(p[1]), to_u8(p[2]), 255]),
                );
            }
        }
        image_ldr
            .save(Path::new(path))
            .map_err(|e| Error::Other(Box::new(e)))?;
    }
    Ok(())
}
