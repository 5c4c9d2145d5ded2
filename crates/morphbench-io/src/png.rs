use std::{fs::File, io::BufWriter, path::Path};

use png::{BitDepth, ColorType, Encoder};

use morphbench_image::Image;

use crate::error::IoError;

/// Writes the given PNG _(grayscale)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the pixel data.
pub fn write_image_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    let image_size = image.size();
    let file = File::create(file_path)?;
    let writer = BufWriter::new(file);

    let mut encoder = Encoder::new(writer, image_size.width as u32, image_size.height as u32);
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image.as_slice())
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphbench_image::ImageSize;

    #[test]
    fn write_png_gray8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("out.png");

        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0, 64, 128, 255],
        )
        .unwrap();

        write_image_png_gray8(&file_path, &image)?;
        assert!(file_path.exists());

        Ok(())
    }
}
