//! Image encoding: embedded document images → base64 `ImageData`.
//!
//! Multimodal APIs (OpenAI, Anthropic, Gemini) accept images as base64
//! payloads inside the JSON request body. JPEG streams lifted straight out
//! of a PDF are forwarded untouched; raw pixel streams are PNG-encoded
//! because PNG is lossless and diagrams with small labels survive it intact.

use super::extract::EmbeddedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode one embedded image for the model request.
pub fn encode_image(img: &EmbeddedImage) -> Result<ImageData, image::ImageError> {
    match img {
        EmbeddedImage::Jpeg { data, .. } => {
            let b64 = STANDARD.encode(data);
            debug!("Encoded JPEG → {} bytes base64", b64.len());
            Ok(ImageData::new(b64, "image/jpeg"))
        }
        EmbeddedImage::Raster { image, .. } => encode_png(image),
    }
}

fn encode_png(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded PNG → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn encode_raster_as_png() {
        let img = EmbeddedImage::Raster {
            page: 1,
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 128, 0]))),
        };
        let data = encode_image(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn jpeg_passes_through() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let img = EmbeddedImage::Jpeg {
            page: 2,
            data: bytes.clone(),
        };
        let data = encode_image(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&data.data).unwrap(), bytes);
    }
}
