use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::EncodeError;
use crate::qrcode::QUIET_ZONE;

/*---- Utilities ----*/

/// Media type of every image this crate produces.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Parses a hex color into an opaque RGBA pixel.
///
/// Accepts `RGB` and `RRGGBB`, with or without a single leading `#`. There is
/// no alpha form: a translucent dark color would make codes unreadable.
///
/// # Arguments
///
/// * `color` - The color text, e.g. `"#FF0000"`.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidColor`] for any other shape or non-hex digits.
///
/// # Example
///
/// ```
/// use qrbatch::helper::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#f00").unwrap().0, [255, 0, 0, 255]);
/// assert!(parse_hex_color("red").is_err());
/// ```
pub fn parse_hex_color(color: &str) -> Result<Rgba<u8>, EncodeError> {
    let invalid = || EncodeError::InvalidColor(color.to_string());
    let trimmed = color.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    let mut rgb = [0u8; 3];
    hex::decode_to_slice(&expanded, &mut rgb).map_err(|_| invalid())?;
    Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Encodes a raster as PNG bytes.
///
/// # Arguments
///
/// * `img` - The raster to encode.
///
/// # Errors
///
/// Returns [`EncodeError::Image`] if the PNG encoder fails.
pub fn to_png_bytes(img: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img.clone()).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Wraps PNG bytes in a `data:` URI suitable for an `<img src>`.
///
/// # Example
///
/// ```
/// use qrbatch::helper::to_data_uri;
///
/// assert_eq!(to_data_uri(b"png"), "data:image/png;base64,cG5n");
/// ```
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:{};base64,{}", PNG_MEDIA_TYPE, general_purpose::STANDARD.encode(png))
}

/// Renders the symbol for `text` as block characters, for terminal previews.
///
/// Each module is two characters wide, with the same quiet zone as the
/// rasters.
///
/// # Errors
///
/// Returns [`EncodeError::Data`] if the text does not fit in a QR symbol.
pub fn to_console_string(text: &str) -> Result<String, EncodeError> {
    let code = ::qrcode::QrCode::new(text.as_bytes())?;
    let width = code.width() as i64;
    let colors = code.to_colors();
    let border = i64::from(QUIET_ZONE);

    let mut result = String::new();
    for y in -border..width + border {
        for x in -border..width + border {
            let dark = (0..width).contains(&x)
                && (0..width).contains(&y)
                && colors[(y * width + x) as usize] == ::qrcode::Color::Dark;
            let c = if dark { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    Ok(result)
}
