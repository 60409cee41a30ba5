//! QR symbol encoding and serialization
//!
//! Symbol construction is delegated to the `qrcode` crate; raster output is
//! written as PNG through `image`.

use std::io::Cursor;

use image::{imageops, DynamicImage, ImageBuffer, ImageFormat, Rgba};
use qrcode::render::svg;
use qrcode::QrCode;

use super::params::{OutputFormat, QrParams};
use crate::error::QrError;

/// Content type sent for every encoded body
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Encoded image bytes, owned by the request that produced them
#[derive(Debug, Clone)]
pub struct EncodedOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedOutput {
    pub fn content_disposition(&self) -> String {
        format!("inline; filename={}", self.format.filename())
    }
}

/// Encode `params.data` and serialize it in the requested format
///
/// Deterministic: the same parameters always produce the same bytes.
pub fn encode(params: &QrParams) -> Result<EncodedOutput, QrError> {
    let code = QrCode::with_error_correction_level(&params.data, params.ecc.ec_level())?;

    let bytes = match params.format {
        OutputFormat::Svg => render_svg(&code, params),
        OutputFormat::Png => render_png(&code, params)?,
    };

    Ok(EncodedOutput {
        bytes,
        format: params.format,
    })
}

fn render_svg(code: &QrCode, params: &QrParams) -> Vec<u8> {
    let dark = params.foreground.to_hex();
    let light = params.background.to_hex();

    code.render::<svg::Color<'_>>()
        .dark_color(svg::Color(&dark))
        .light_color(svg::Color(&light))
        .build()
        .into_bytes()
}

fn render_png(code: &QrCode, params: &QrParams) -> Result<Vec<u8>, QrError> {
    let background = params.background.to_rgba();
    let mut renderer = code.render::<Rgba<u8>>();
    renderer
        .dark_color(params.foreground.to_rgba())
        .light_color(background);

    if let Some(size) = params.size {
        renderer.max_dimensions(size, size);
    }

    let mut image = renderer.build();

    // Whole-pixel modules rarely fill `size` exactly; pad the rest with background.
    // A size smaller than the symbol yields the smallest image that fits it.
    if let Some(size) = params.size {
        if image.width() < size || image.height() < size {
            let mut canvas = ImageBuffer::from_pixel(size, size, background);
            let x = i64::from((size - image.width().min(size)) / 2);
            let y = i64::from((size - image.height().min(size)) / 2);
            imageops::overlay(&mut canvas, &image, x, y);
            image = canvas;
        }
    }

    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
