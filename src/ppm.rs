//! Plain-text PPM serialization and PNG export

use std::io::{self, Write};
use std::path::Path;

use image::{ImageError, RgbImage};

use crate::render::Image;
use crate::utils;

/// Serialize the image as a `P3` plain-text PPM
///
/// Header `P3\n{width} {height}\n255\n`, then one `r g b` line per pixel,
/// top scanline first, left to right. Each channel is averaged over the
/// sample count and gamma-corrected before quantization.
pub fn ppm_string(image: &Image, samples_per_pixel: usize) -> String {
    let mut out = format!("P3\n{} {}\n255\n", image.width, image.height);
    for color in &image.pixels {
        let pixel = utils::get_pixel(color, samples_per_pixel);
        out.push_str(&format!("{} {} {}\n", pixel[0], pixel[1], pixel[2]));
    }
    out
}

/// Write the PPM rendition of the image to `out`
pub fn write_ppm<W: Write>(
    out: &mut W,
    image: &Image,
    samples_per_pixel: usize,
) -> io::Result<()> {
    out.write_all(ppm_string(image, samples_per_pixel).as_bytes())
}

/// Save the image as a PNG
pub fn save_png<P: AsRef<Path>>(
    image: &Image,
    samples_per_pixel: usize,
    path: P,
) -> Result<(), ImageError> {
    let mut png = RgbImage::new(image.width as u32, image.height as u32);
    for (idx, color) in image.pixels.iter().enumerate() {
        let x = (idx % image.width) as u32;
        let y = (idx / image.width) as u32;
        png.put_pixel(x, y, utils::get_pixel(color, samples_per_pixel));
    }
    png.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn ppm_has_header_and_one_line_per_pixel() {
        let image = Image {
            width: 2,
            height: 1,
            pixels: vec![Color::zeros(), Color::new(1.0, 1.0, 1.0)],
        };
        assert_eq!(ppm_string(&image, 1), "P3\n2 1\n255\n0 0 0\n255 255 255\n");
    }

    #[test]
    fn channels_are_averaged_and_gamma_corrected() {
        // Four samples summing to (1,1,1) average to 0.25; gamma-2 lifts
        // that to 0.5
        let image = Image {
            width: 1,
            height: 1,
            pixels: vec![Color::new(1.0, 1.0, 1.0)],
        };
        assert_eq!(ppm_string(&image, 4), "P3\n1 1\n255\n128 128 128\n");
    }

    #[test]
    fn write_ppm_matches_string_form() {
        let image = Image {
            width: 1,
            height: 2,
            pixels: vec![Color::new(0.25, 0.0, 1.0), Color::zeros()],
        };
        let mut buf = Vec::new();
        write_ppm(&mut buf, &image, 1).unwrap();
        assert_eq!(buf, ppm_string(&image, 1).into_bytes());
    }
}
