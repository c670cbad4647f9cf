use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{AppError, Result};

const MARK_TEXT: &str = "Brand Kit AI";
const BADGE_WIDTH: u32 = 200;
const BADGE_HEIGHT: u32 = 60;

/// Wraps generated pixels in an SVG container with a fixed text badge anchored
/// at the bottom-right corner. Pure and deterministic; the original pixels are
/// embedded unchanged. Callers apply this for free-tier output only.
pub fn stamp(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let (width, height) = image::load_from_memory(image_bytes)
        .map(|img| (img.width(), img.height()))
        .map_err(|e| AppError::GenerationFailed(format!("unreadable generated image: {}", e)))?;

    let badge = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<rect width="{w}" height="{h}" fill="black" opacity="0.3" rx="8"/>"#,
            r#"<text x="{cx}" y="35" font-family="Inter, Arial, sans-serif" "#,
            r#"font-size="18" font-weight="600" fill="white" text-anchor="middle">{text}</text>"#,
            "</svg>"
        ),
        w = BADGE_WIDTH,
        h = BADGE_HEIGHT,
        cx = BADGE_WIDTH / 2,
        text = MARK_TEXT,
    );

    let badge_x = width.saturating_sub(BADGE_WIDTH);
    let badge_y = height.saturating_sub(BADGE_HEIGHT + 20);

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}">"#,
            r#"<image href="data:image/png;base64,{image}" width="{w}" height="{h}"/>"#,
            r#"<image href="data:image/svg+xml;base64,{badge}" x="{bx}" y="{by}" "#,
            r#"width="{bw}" height="{bh}"/>"#,
            "</svg>"
        ),
        w = width,
        h = height,
        image = STANDARD.encode(image_bytes),
        badge = STANDARD.encode(badge.as_bytes()),
        bx = badge_x,
        by = badge_y,
        bw = BADGE_WIDTH,
        bh = BADGE_HEIGHT,
    );

    Ok(svg.into_bytes())
}

/// File extension of the stamped output container.
pub const STAMPED_EXTENSION: &str = "svg";

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::io::Cursor;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgba([120u8, 10, 200, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn stamped_output_embeds_original_pixels_and_mark() {
        let png = png_fixture(512, 512);
        let stamped = stamp(&png).unwrap();
        let svg = String::from_utf8(stamped).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(&STANDARD.encode(&png)));

        let badge_b64 = svg
            .split("data:image/svg+xml;base64,")
            .nth(1)
            .unwrap()
            .split('"')
            .next()
            .unwrap();
        let badge = String::from_utf8(STANDARD.decode(badge_b64).unwrap()).unwrap();
        assert!(badge.contains("Brand Kit AI"));
    }

    #[test]
    fn stamp_is_deterministic() {
        let png = png_fixture(64, 64);
        assert_eq!(stamp(&png).unwrap(), stamp(&png).unwrap());
    }

    #[test]
    fn badge_is_anchored_bottom_right() {
        let png = png_fixture(1024, 1024);
        let svg = String::from_utf8(stamp(&png).unwrap()).unwrap();
        assert!(svg.contains(r#"x="824" y="944""#));
    }

    #[test]
    fn garbage_input_is_a_generation_failure() {
        let err = stamp(b"not an image").unwrap_err();
        assert!(matches!(err, crate::error::AppError::GenerationFailed(_)));
    }
}
