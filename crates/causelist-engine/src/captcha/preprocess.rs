use image::{GrayImage, Luma};

/// Decode a screenshot and reduce it to a black-on-white bitmap: pixels whose
/// luminance is above `threshold` become white, everything else black.
pub fn binarize_png(png: &[u8], threshold: u8) -> Result<GrayImage, image::ImageError> {
    let gray = image::load_from_memory(png)?.to_luma8();
    Ok(binarize(gray, threshold))
}

pub fn binarize(mut image: GrayImage, threshold: u8) -> GrayImage {
    for pixel in image.pixels_mut() {
        let Luma([value]) = *pixel;
        *pixel = Luma([if value > threshold { 255 } else { 0 }]);
    }
    image
}

/// Keep only alphanumeric characters of the recognised text.
pub fn clean_guess(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .trim()
        .to_string()
}
