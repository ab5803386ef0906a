//! Sexagesimal (degrees-minutes-seconds) coordinate parsing and formatting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SpotterError};

/// Axis of a coordinate value; selects the hemisphere letters used when
/// formatting (N/S for latitude, E/W for longitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Supported textual layouts for a DMS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmsStyle {
    /// `45° 30' 15.50" N`
    #[default]
    Symbols,
    /// `45°30'15.50"N`
    Compact,
    /// `45 30 15.50 N`
    Spaced,
    /// `45:30:15.50` (sign prefix, no hemisphere letter)
    Colons,
    /// `-45° 30' 15.50"` (sign prefix, no hemisphere letter)
    Signed,
}

impl std::str::FromStr for DmsStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "symbols" => Ok(DmsStyle::Symbols),
            "compact" => Ok(DmsStyle::Compact),
            "spaced" => Ok(DmsStyle::Spaced),
            "colons" => Ok(DmsStyle::Colons),
            "signed" => Ok(DmsStyle::Signed),
            other => Err(format!("unknown DMS style: {other}")),
        }
    }
}

// Patterns are tried in this order; the first match wins.  Each captures
// (degrees with optional sign, minutes, seconds, optional hemisphere letter).
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // symbol-delimited: 45° 30' 15.50" N
        r#"^\s*([+-]?\d+)\s*°\s*(\d+(?:\.\d+)?)\s*'\s*(\d+(?:\.\d+)?)\s*"?\s*([NSEWnsew])?\s*$"#,
        // space-delimited: 45 30 15.50 N
        r#"^\s*([+-]?\d+)\s+(\d+(?:\.\d+)?)\s+(\d+(?:\.\d+)?)\s*([NSEWnsew])?\s*$"#,
        // colon-delimited: 45:30:15.50
        r#"^\s*([+-]?\d+)\s*:\s*(\d+(?:\.\d+)?)\s*:\s*(\d+(?:\.\d+)?)\s*([NSEWnsew])?\s*$"#,
        // letter-delimited: 45d30m15.50s
        r#"^\s*([+-]?\d+)\s*[dD]\s*(\d+(?:\.\d+)?)\s*[mM]\s*(\d+(?:\.\d+)?)\s*[sS]\s*([NSEWnsew])?\s*$"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Parses a coordinate string into decimal degrees.
///
/// Accepts a plain decimal number or any of the DMS notations covered by the
/// pattern table.  An explicit negative sign on the degrees and an S/W
/// hemisphere letter are not expected together; when both occur the explicit
/// sign wins.
pub fn decode(text: &str) -> Result<f64> {
    for re in PATTERNS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let deg_text = caps.get(1).map_or("", |m| m.as_str());
        let (Ok(deg), Ok(min), Ok(sec)) = (
            deg_text.parse::<f64>(),
            caps[2].parse::<f64>(),
            caps[3].parse::<f64>(),
        ) else {
            continue;
        };
        let value = deg.abs() + min / 60.0 + sec / 3600.0;
        let hemisphere_negative = matches!(
            caps.get(4).map(|m| m.as_str()),
            Some("S") | Some("s") | Some("W") | Some("w")
        );
        // An explicit sign and an S/W suffix are not expected together; when
        // both occur the explicit sign wins.
        let negative = if deg_text.starts_with('-') {
            true
        } else if deg_text.starts_with('+') {
            false
        } else {
            hemisphere_negative
        };
        return Ok(if negative { -value } else { value });
    }
    text.trim()
        .parse::<f64>()
        .map_err(|_| SpotterError::InvalidCoordinateFormat {
            text: text.to_string(),
        })
}

/// Formats decimal degrees as DMS text in the requested style.
///
/// `seconds_precision` is the number of decimal digits on the seconds part;
/// rounding carries into minutes and degrees so `59.999...` never prints as
/// `60`.
pub fn encode(value: f64, axis: Axis, style: DmsStyle, seconds_precision: usize) -> String {
    let hemisphere = match axis {
        Axis::Latitude => {
            if value < 0.0 {
                'S'
            } else {
                'N'
            }
        }
        Axis::Longitude => {
            if value < 0.0 {
                'W'
            } else {
                'E'
            }
        }
    };

    let total = value.abs();
    let mut deg = total.trunc() as u64;
    let mut min = ((total - deg as f64) * 60.0).trunc() as u64;
    let scale = 10f64.powi(seconds_precision as i32);
    let mut sec_units =
        ((total - deg as f64 - min as f64 / 60.0) * 3600.0 * scale).round() as u64;
    if sec_units >= 60 * scale as u64 {
        sec_units -= 60 * scale as u64;
        min += 1;
        if min == 60 {
            min = 0;
            deg += 1;
        }
    }
    let sec = sec_units as f64 / scale;

    let sign = if value < 0.0 { "-" } else { "" };
    match style {
        DmsStyle::Symbols => format!(
            "{deg}\u{00B0} {min}' {sec:.prec$}\" {hemisphere}",
            prec = seconds_precision
        ),
        DmsStyle::Compact => format!(
            "{deg}\u{00B0}{min}'{sec:.prec$}\"{hemisphere}",
            prec = seconds_precision
        ),
        DmsStyle::Spaced => {
            format!("{deg} {min} {sec:.prec$} {hemisphere}", prec = seconds_precision)
        }
        DmsStyle::Colons => format!(
            "{sign}{deg}:{min:02}:{sec:0width$.prec$}",
            width = seconds_precision + 3,
            prec = seconds_precision
        ),
        DmsStyle::Signed => format!(
            "{sign}{deg}\u{00B0} {min}' {sec:.prec$}\"",
            prec = seconds_precision
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: [DmsStyle; 5] = [
        DmsStyle::Symbols,
        DmsStyle::Compact,
        DmsStyle::Spaced,
        DmsStyle::Colons,
        DmsStyle::Signed,
    ];

    #[test]
    fn decode_symbol_form_with_hemisphere() {
        let v = decode("45\u{00B0}30'15.50\"N").unwrap();
        assert!((v - 45.504_305_555_6).abs() < 1e-9);
    }

    #[test]
    fn decode_colon_form_without_hemisphere() {
        let v = decode("45:30:15.50").unwrap();
        assert!((v - 45.504_305_555_6).abs() < 1e-9);
    }

    #[test]
    fn decode_space_and_letter_forms() {
        let expected = 9.0 + 7.0 / 60.0 + 30.0 / 3600.0;
        assert!((decode("9 7 30 E").unwrap() - expected).abs() < 1e-9);
        assert!((decode("9d7m30s").unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn hemisphere_letter_applies_sign() {
        assert!(decode("45:30:15.50 S").unwrap() < 0.0);
        assert!(decode("12\u{00B0}0'0\"W").unwrap() < 0.0);
    }

    #[test]
    fn explicit_sign_wins_over_hemisphere() {
        // Not expected in real data, but the resolution is: the sign wins.
        let v = decode("-45 30 15.50 S").unwrap();
        assert!(v < 0.0);
        assert!((v + 45.504_305_555_6).abs() < 1e-9);
    }

    #[test]
    fn plain_decimal_fallback() {
        assert!((decode("  -9.25 ").unwrap() + 9.25).abs() < 1e-12);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = decode("north of the barn").unwrap_err();
        assert!(matches!(
            err,
            SpotterError::InvalidCoordinateFormat { .. }
        ));
    }

    #[test]
    fn encode_seconds_carry() {
        // 29.9999... degrees must not print 60 seconds.
        let text = encode(29.999_999_9, Axis::Latitude, DmsStyle::Symbols, 2);
        assert_eq!(text, "30\u{00B0} 0' 0.00\" N");
    }

    #[test]
    fn encode_longitude_west() {
        let text = encode(-9.125, Axis::Longitude, DmsStyle::Compact, 2);
        assert_eq!(text, "9\u{00B0}7'30.00\"W");
    }

    #[test]
    fn roundtrip_within_seconds_rounding() {
        for &v in &[-89.999, -45.504_305, -0.5, 0.0, 0.004, 12.345_678, 89.999] {
            for style in STYLES {
                let text = encode(v, Axis::Latitude, style, 2);
                let back = decode(&text).unwrap();
                assert!(
                    (back - v).abs() < 1e-4,
                    "style {style:?}: {v} -> {text:?} -> {back}"
                );
            }
        }
    }
}
