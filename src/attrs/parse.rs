//! Attribute string tokenizer and value parsers.

use alloc::string::String;
use alloc::vec::Vec;

use super::ParseWarning;
use super::attributes::Attributes;
use crate::render::{MaskShape, ScaleMode, Variant};

/// Parse an attribute string into Attributes + warnings.
pub(crate) fn parse_attributes(input: &str) -> (Attributes, Vec<ParseWarning>) {
    let mut attrs = Attributes::new();
    let mut warnings = Vec::new();

    for pair in split_query(input) {
        let (raw_key, raw_value) = split_pair(pair);
        let key = percent_decode(&raw_key);
        let value = percent_decode(&raw_value);
        let key = normalize_key(&key);

        dispatch_key(&key, &value, &mut attrs, &mut warnings);
    }

    (attrs, warnings)
}

fn dispatch_key(key: &str, value: &str, attrs: &mut Attributes, warnings: &mut Vec<ParseWarning>) {
    match key {
        "variant" => match parse_variant(value) {
            Some(v) => set_or_warn(&mut attrs.variant, Some(v), key, value, warnings),
            None => invalid(key, value, "expected rounded|band|video_cover", warnings),
        },
        "shape" | "type" => match parse_shape(value) {
            Some(s) => set_or_warn(&mut attrs.shape, Some(s), key, value, warnings),
            None => invalid(key, value, "expected circle|rounded|0|1", warnings),
        },

        // Radii, in pixels
        "radius" => radius(&mut attrs.radius, key, value, warnings),
        "lefttopradius" => radius(&mut attrs.left_top_radius, key, value, warnings),
        "leftbottomradius" => radius(&mut attrs.left_bottom_radius, key, value, warnings),
        "righttopradius" => radius(&mut attrs.right_top_radius, key, value, warnings),
        "rightbottomradius" => radius(&mut attrs.right_bottom_radius, key, value, warnings),

        "scalemode" | "scaletype" => match parse_scale_mode(value) {
            Some(m) => set_or_warn(&mut attrs.scale_mode, Some(m), key, value, warnings),
            None => invalid(key, value, "expected 1|contain|2|cover|0|cover_top", warnings),
        },

        // Sizing
        "aspectratio" => match parse_f32(value) {
            Some(r) => set_or_warn(&mut attrs.aspect_ratio, Some(r), key, value, warnings),
            None => invalid(key, value, "expected a number", warnings),
        },
        "initsize" => match parse_size(value) {
            Some(s) => set_or_warn(&mut attrs.init_size, Some(s), key, value, warnings),
            None => invalid(key, value, "expected w,h (2 non-negative integers)", warnings),
        },

        "bandfraction" | "percentage" => match parse_f32(value) {
            Some(p) => set_or_warn(&mut attrs.band_fraction, Some(p), key, value, warnings),
            None => invalid(key, value, "expected a number", warnings),
        },
        "density" => match parse_f32(value).filter(|&d| d > 0.0) {
            Some(d) => set_or_warn(&mut attrs.density, Some(d), key, value, warnings),
            None => invalid(key, value, "expected a positive number", warnings),
        },

        _ => warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(value),
        }),
    }
}

fn radius(
    field: &mut Option<i32>,
    key: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    match parse_radius(value) {
        Some(r) => set_or_warn(field, Some(r), key, value, warnings),
        None => invalid(key, value, "expected a non-negative integer", warnings),
    }
}

/// Set a field, warning on duplicate.
fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    key: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    if let Some(v) = parsed {
        if field.is_some() {
            warnings.push(ParseWarning::DuplicateKey {
                key: canonical_key(key),
                value: String::from(value),
            });
        }
        *field = Some(v);
    }
}

fn invalid(key: &str, value: &str, reason: &'static str, warnings: &mut Vec<ParseWarning>) {
    warnings.push(ParseWarning::ValueInvalid {
        key: canonical_key(key),
        value: String::from(value),
        reason,
    });
}

// ---- Value parsers ----

fn parse_radius(s: &str) -> Option<i32> {
    let s = s.trim();
    let s = s.strip_suffix("px").unwrap_or(s);
    s.parse::<i32>().ok().filter(|&v| v >= 0)
}

fn parse_f32(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn parse_shape(s: &str) -> Option<MaskShape> {
    match s.trim().to_ascii_lowercase().as_str() {
        "circle" | "0" => Some(MaskShape::Circle),
        "rounded" | "round" | "1" => Some(MaskShape::Round),
        _ => None,
    }
}

fn parse_scale_mode(s: &str) -> Option<ScaleMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "contain" | "fit_xy" => Some(ScaleMode::Contain),
        "2" | "cover" | "center_crop" => Some(ScaleMode::Cover),
        "0" | "cover_top" => Some(ScaleMode::CoverTop),
        _ => None,
    }
}

fn parse_variant(s: &str) -> Option<Variant> {
    match s.trim().to_ascii_lowercase().as_str() {
        "rounded" | "round" => Some(Variant::Rounded),
        "band" | "height_color" => Some(Variant::Band),
        "video_cover" | "videocover" => Some(Variant::VideoCover),
        _ => None,
    }
}

// ---- Tokenizer ----

/// Split on '&'.
fn split_query(input: &str) -> impl Iterator<Item = &str> {
    let input = input.strip_prefix('?').unwrap_or(input);
    input.split('&').filter(|s| !s.is_empty())
}

/// Split a single "key=value" pair on the first '='.
fn split_pair(pair: &str) -> (String, String) {
    match pair.find('=') {
        Some(pos) => (String::from(&pair[..pos]), String::from(&pair[pos + 1..])),
        None => (String::from(pair), String::new()),
    }
}

/// Percent-decode a component. Also handles '+' as space.
///
/// Decoding works on bytes, so escaped multi-byte UTF-8 reassembles; invalid
/// sequences become U+FFFD.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    out.push(hi << 4 | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Lowercase, drop an `img_` prefix and every underscore, so
/// `img_leftTopRadius`, `left_top_radius`, and `leftTopRadius` collapse to
/// `lefttopradius`.
fn normalize_key(key: &str) -> String {
    let lower = key.trim().to_ascii_lowercase();
    let stripped = lower.strip_prefix("img_").unwrap_or(lower.as_str());
    stripped.chars().filter(|&c| c != '_').collect()
}

/// Canonical snake_case name for a normalized key, used in warnings.
fn canonical_key(key: &str) -> &'static str {
    match key {
        "variant" => "variant",
        "shape" | "type" => "shape",
        "radius" => "radius",
        "lefttopradius" => "left_top_radius",
        "leftbottomradius" => "left_bottom_radius",
        "righttopradius" => "right_top_radius",
        "rightbottomradius" => "right_bottom_radius",
        "scalemode" | "scaletype" => "scale_mode",
        "aspectratio" => "aspect_ratio",
        "initsize" => "init_size",
        "bandfraction" | "percentage" => "band_fraction",
        "density" => "density",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_shape_and_radius() {
        let (a, warnings) = parse_attributes("shape=rounded&radius=12");
        assert_eq!(a.shape, Some(MaskShape::Round));
        assert_eq!(a.radius, Some(12));
        assert!(warnings.is_empty());
    }

    #[test]
    fn numeric_shape_codes() {
        let (a, _) = parse_attributes("type=0");
        assert_eq!(a.shape, Some(MaskShape::Circle));
        let (a, _) = parse_attributes("type=1");
        assert_eq!(a.shape, Some(MaskShape::Round));
    }

    #[test]
    fn key_spellings_collapse() {
        for s in [
            "left_top_radius=5",
            "leftTopRadius=5",
            "img_leftTopRadius=5",
            "LEFT_TOP_RADIUS=5",
        ] {
            let (a, warnings) = parse_attributes(s);
            assert_eq!(a.left_top_radius, Some(5), "{s}");
            assert!(warnings.is_empty(), "{s}: {warnings:?}");
        }
    }

    #[test]
    fn scale_mode_values() {
        let (a, _) = parse_attributes("scale_mode=1");
        assert_eq!(a.scale_mode, Some(ScaleMode::Contain));
        let (a, _) = parse_attributes("img_scale_type=2");
        assert_eq!(a.scale_mode, Some(ScaleMode::Cover));
        let (a, _) = parse_attributes("scaleMode=cover_top");
        assert_eq!(a.scale_mode, Some(ScaleMode::CoverTop));
    }

    #[test]
    fn px_suffix_accepted() {
        let (a, _) = parse_attributes("radius=8px");
        assert_eq!(a.radius, Some(8));
    }

    #[test]
    fn negative_radius_warns() {
        let (a, warnings) = parse_attributes("radius=-1");
        assert_eq!(a.radius, None);
        assert_eq!(
            warnings,
            [ParseWarning::ValueInvalid {
                key: "radius",
                value: String::from("-1"),
                reason: "expected a non-negative integer",
            }]
        );
    }

    #[test]
    fn invalid_values_warn_with_canonical_key() {
        let (a, warnings) = parse_attributes("aspectRatio=wide&shape=hexagon&density=0");
        assert_eq!(a.aspect_ratio, None);
        assert_eq!(a.shape, None);
        assert_eq!(a.density, None);
        let keys: Vec<_> = warnings
            .iter()
            .filter_map(|w| match w {
                ParseWarning::ValueInvalid { key, .. } => Some(*key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, ["aspect_ratio", "shape", "density"]);
    }

    #[test]
    fn init_size_pair() {
        let (a, _) = parse_attributes("init_size=1600,900");
        assert_eq!(a.init_size, Some((1600, 900)));
        let (a, warnings) = parse_attributes("init_size=1600");
        assert_eq!(a.init_size, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_key_warns() {
        let (_, warnings) = parse_attributes("radius=4&border=2");
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParseWarning::KeyNotRecognized { key, .. } if key == "border"
        )));
    }

    #[test]
    fn duplicate_key_warns() {
        let (a, warnings) = parse_attributes("radius=4&radius=9");
        // Last value wins
        assert_eq!(a.radius, Some(9));
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ParseWarning::DuplicateKey { .. }))
        );
    }

    #[test]
    fn aliases_count_as_duplicates() {
        let (a, warnings) = parse_attributes("band_fraction=0.2&percentage=0.7");
        assert_eq!(a.band_fraction, Some(0.7));
        assert_eq!(
            warnings,
            [ParseWarning::DuplicateKey {
                key: "band_fraction",
                value: String::from("0.7"),
            }]
        );
    }

    #[test]
    fn duplicate_key_uses_canonical_name() {
        let (_, warnings) = parse_attributes("leftTopRadius=4&img_left_top_radius=6");
        assert_eq!(
            warnings,
            [ParseWarning::DuplicateKey {
                key: "left_top_radius",
                value: String::from("6"),
            }]
        );
    }

    #[test]
    fn percent_decoding_keeps_utf8() {
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("café+au+lait"), "café au lait");
        assert_eq!(percent_decode("%FF%41"), "\u{FFFD}A");
        // Trailing or malformed escapes stay literal.
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn escaped_utf8_value_in_warning() {
        let (_, warnings) = parse_attributes("shape=%E2%97%8B");
        assert_eq!(
            warnings,
            [ParseWarning::ValueInvalid {
                key: "shape",
                value: String::from("○"),
                reason: "expected circle|rounded|0|1",
            }]
        );
    }

    #[test]
    fn percent_decoding_and_leading_question_mark() {
        let (a, warnings) = parse_attributes("?init_size=16%2C9&shape=rounded");
        assert_eq!(a.init_size, Some((16, 9)));
        assert_eq!(a.shape, Some(MaskShape::Round));
        assert!(warnings.is_empty());
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let (a, warnings) = parse_attributes("aspect_ratio=NaN&band_fraction=inf");
        assert_eq!(a.aspect_ratio, None);
        assert_eq!(a.band_fraction, None);
        assert_eq!(warnings.len(), 2);
    }
}
