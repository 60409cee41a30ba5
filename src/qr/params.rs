//! Query parameter resolution
//!
//! Every parameter has a default. Bad input never fails the request: each
//! `resolve_*` function substitutes the default and reports what it did as a
//! separate diagnostic, which the handler logs.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use qrcode::EcLevel;

use super::color::Color;

/// A resolved parameter value plus an optional note on why a default was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub diagnostic: Option<String>,
}

impl<T> Resolved<T> {
    pub const fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub const fn fallback(value: T, diagnostic: String) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Error correction level, named by recovery capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// `L`, ~7% recovery
    #[default]
    Low,
    /// `M`, ~15% recovery
    Medium,
    /// `Q`, ~25% recovery
    High,
    /// `H`, ~30% recovery
    Highest,
}

impl ErrorCorrection {
    pub const fn ec_level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::High => EcLevel::Q,
            Self::Highest => EcLevel::H,
        }
    }
}

/// Output serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Svg,
    #[default]
    Png,
}

impl OutputFormat {
    /// File name advertised in `Content-Disposition`
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Svg => "qrcode.svg",
            Self::Png => "qrcode.png",
        }
    }
}

/// Fully resolved request for one QR code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrParams {
    /// Payload exactly as percent-decoded, not necessarily UTF-8
    pub data: Vec<u8>,
    /// Raster edge length in pixels; `None` means library default sizing
    pub size: Option<u32>,
    pub ecc: ErrorCorrection,
    pub foreground: Color,
    pub background: Color,
    pub format: OutputFormat,
}

impl QrParams {
    /// Build parameters from a raw query string
    ///
    /// Returns the parameters and the diagnostics collected while resolving them.
    pub fn from_query(query: Option<&str>, max_size: u32) -> (Self, Vec<String>) {
        let mut query = parse_query(query.unwrap_or(""));
        let text = |key: &str| {
            query
                .get(key)
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
        };

        let size = resolve_size(text("size").as_deref(), max_size);
        let ecc = resolve_ecc(text("ecc").as_deref());
        let foreground = resolve_color("color", text("color").as_deref(), Color::BLACK);
        let background = resolve_color("bgcolor", text("bgcolor").as_deref(), Color::WHITE);
        let format = resolve_format(text("format").as_deref());

        let diagnostics = [
            size.diagnostic,
            ecc.diagnostic,
            foreground.diagnostic,
            background.diagnostic,
            format.diagnostic,
        ]
        .into_iter()
        .flatten()
        .collect();

        let params = Self {
            data: query.remove("data").unwrap_or_default(),
            size: size.value,
            ecc: ecc.value,
            foreground: foreground.value,
            background: background.value,
            format: format.value,
        };

        (params, diagnostics)
    }
}

/// Decode a form-urlencoded query into raw byte values; the first occurrence of a key wins
fn parse_query(query: &str) -> HashMap<String, Vec<u8>> {
    let mut map = HashMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = String::from_utf8_lossy(&decode_component(key)).into_owned();
        map.entry(key).or_insert_with(|| decode_component(value));
    }
    map
}

/// `+` is a space; malformed `%` escapes pass through literally
fn decode_component(raw: &str) -> Vec<u8> {
    percent_decode_str(&raw.replace('+', " ")).collect()
}

pub fn resolve_size(raw: Option<&str>, max_size: u32) -> Resolved<Option<u32>> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Resolved::ok(None);
    };

    match raw.parse::<i64>() {
        Ok(n) if n <= 0 => {
            Resolved::fallback(None, format!("non-positive size {n}, using default sizing"))
        }
        Ok(n) if n > i64::from(max_size) => Resolved::fallback(
            Some(max_size),
            format!("size {n} exceeds maximum, clamped to {max_size}"),
        ),
        // In range 1..=max_size, so the conversion cannot fail
        Ok(n) => Resolved::ok(u32::try_from(n).ok()),
        Err(e) => Resolved::fallback(None, format!("invalid size '{raw}' ({e}), using default sizing")),
    }
}

pub fn resolve_ecc(raw: Option<&str>) -> Resolved<ErrorCorrection> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Resolved::ok(ErrorCorrection::Low);
    };

    match raw.to_uppercase().as_str() {
        "L" => Resolved::ok(ErrorCorrection::Low),
        "M" => Resolved::ok(ErrorCorrection::Medium),
        "Q" => Resolved::ok(ErrorCorrection::High),
        "H" => Resolved::ok(ErrorCorrection::Highest),
        _ => Resolved::fallback(
            ErrorCorrection::Low,
            format!("unsupported ecc '{raw}', using L"),
        ),
    }
}

pub fn resolve_color(name: &str, raw: Option<&str>, default: Color) -> Resolved<Color> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Resolved::ok(default);
    };

    match Color::parse_hex(raw) {
        Ok(color) => Resolved::ok(color),
        Err(e) => Resolved::fallback(default, format!("{name}: {e}, using {}", default.to_hex())),
    }
}

pub fn resolve_format(raw: Option<&str>) -> Resolved<OutputFormat> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Resolved::ok(OutputFormat::Png);
    };

    match raw.to_lowercase().as_str() {
        "svg" => Resolved::ok(OutputFormat::Svg),
        "png" => Resolved::ok(OutputFormat::Png),
        _ => Resolved::fallback(
            OutputFormat::Png,
            format!("unsupported format '{raw}', using png"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_query() {
        let (params, diagnostics) = QrParams::from_query(None, 4096);
        assert!(params.data.is_empty());
        assert_eq!(params.size, None);
        assert_eq!(params.ecc, ErrorCorrection::Low);
        assert_eq!(params.foreground, Color::BLACK);
        assert_eq!(params.background, Color::WHITE);
        assert_eq!(params.format, OutputFormat::Png);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_full_query() {
        let (params, diagnostics) = QrParams::from_query(
            Some("data=hello%20world&size=200&ecc=q&color=f00&bgcolor=00ff00&format=SVG"),
            4096,
        );
        assert_eq!(params.data, b"hello world");
        assert_eq!(params.size, Some(200));
        assert_eq!(params.ecc, ErrorCorrection::High);
        assert_eq!(params.foreground, Color::rgb(255, 0, 0));
        assert_eq!(params.background, Color::rgb(0, 255, 0));
        assert_eq!(params.format, OutputFormat::Svg);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_plus_decodes_to_space_and_first_value_wins() {
        let (params, _) = QrParams::from_query(Some("data=a+b&data=second"), 4096);
        assert_eq!(params.data, b"a b");
    }

    #[test]
    fn test_binary_data_survives_decoding() {
        let (params, _) = QrParams::from_query(Some("data=%FF%FE%00a&format=svg"), 4096);
        assert_eq!(params.data, [0xff, 0xfe, 0x00, b'a']);
        assert_eq!(params.format, OutputFormat::Svg);
    }

    #[test]
    fn test_malformed_escape_kept_literally() {
        let (params, _) = QrParams::from_query(Some("data=100%&size=%3200"), 4096);
        assert_eq!(params.data, b"100%");
        assert_eq!(params.size, Some(200));
    }

    #[test]
    fn test_ecc_mapping() {
        assert_eq!(resolve_ecc(Some("L")).value, ErrorCorrection::Low);
        assert_eq!(resolve_ecc(Some("m")).value, ErrorCorrection::Medium);
        assert_eq!(resolve_ecc(Some("Q")).value, ErrorCorrection::High);
        assert_eq!(resolve_ecc(Some("h")).value, ErrorCorrection::Highest);
        assert_eq!(ErrorCorrection::High.ec_level(), EcLevel::Q);
        assert_eq!(ErrorCorrection::Highest.ec_level(), EcLevel::H);
    }

    #[test]
    fn test_ecc_fallback() {
        let resolved = resolve_ecc(Some("Z"));
        assert_eq!(resolved.value, ErrorCorrection::Low);
        assert!(resolved.diagnostic.is_some());

        assert_eq!(resolve_ecc(None), Resolved::ok(ErrorCorrection::Low));
        assert_eq!(resolve_ecc(Some("")), Resolved::ok(ErrorCorrection::Low));
    }

    #[test]
    fn test_size_resolution() {
        assert_eq!(resolve_size(Some("200"), 4096), Resolved::ok(Some(200)));
        assert_eq!(resolve_size(None, 4096), Resolved::ok(None));

        let zero = resolve_size(Some("0"), 4096);
        assert_eq!(zero.value, None);
        assert!(zero.diagnostic.is_some());

        assert_eq!(resolve_size(Some("-5"), 4096).value, None);
        assert_eq!(resolve_size(Some("abc"), 4096).value, None);
        assert_eq!(resolve_size(Some("12.5"), 4096).value, None);

        let clamped = resolve_size(Some("100000"), 4096);
        assert_eq!(clamped.value, Some(4096));
        assert!(clamped.diagnostic.is_some());
    }

    #[test]
    fn test_malformed_color_uses_default() {
        let fg = resolve_color("color", Some("zzz"), Color::BLACK);
        assert_eq!(fg.value, Color::BLACK);
        assert!(fg.diagnostic.as_deref().unwrap_or("").starts_with("color:"));

        let bg = resolve_color("bgcolor", Some("12345"), Color::WHITE);
        assert_eq!(bg.value, Color::WHITE);
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(resolve_format(Some("svg")).value, OutputFormat::Svg);
        assert_eq!(resolve_format(Some("SvG")).value, OutputFormat::Svg);
        assert_eq!(resolve_format(Some("png")), Resolved::ok(OutputFormat::Png));
        assert_eq!(resolve_format(None), Resolved::ok(OutputFormat::Png));

        let eps = resolve_format(Some("eps"));
        assert_eq!(eps.value, OutputFormat::Png);
        assert!(eps.diagnostic.is_some());
    }

    #[test]
    fn test_diagnostics_collected() {
        let (_, diagnostics) =
            QrParams::from_query(Some("data=x&size=big&ecc=X&color=nope&format=pdf"), 4096);
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn test_filenames() {
        assert_eq!(OutputFormat::Svg.filename(), "qrcode.svg");
        assert_eq!(OutputFormat::Png.filename(), "qrcode.png");
    }
}
