//! Number rendering for directive parameters.
//!
//! The backend parses parameters with the same rules that produced them in
//! the block environment, so numbers are rendered the way ECMAScript's
//! `Number.prototype.toString` does: shortest round-trip digits, no
//! fractional part for integral values, exponent form outside `[1e-6, 1e21)`.

/// Render a parameter value in shortest round-trip decimal form.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Covers -0 as well
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", value);
    }

    // `{:e}` already yields shortest digits; only the exponent sign differs.
    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_values_have_no_fraction() {
        assert_eq!(format_number(400000.0), "400000");
        assert_eq!(format_number(2400.0), "2400");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-40.0), "-40");
    }

    #[test]
    fn test_fractional_values() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(1200.0 / 8.0), "150");
        assert_eq!(format_number(1000.0 / 8.0), "125");
        assert_eq!(format_number(37.5), "37.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn test_scaled_frequency() {
        assert_eq!(format_number(433.5 * 1e6), "433500000");
        assert_eq!(format_number(12.5 * 1000.0), "12500");
    }

    #[test]
    fn test_special_values() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_exponent_form_outside_plain_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(2.5e22), "2.5e+22");
        assert_eq!(format_number(1.5e-8), "1.5e-8");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1e-6), "0.000001");
    }
}
