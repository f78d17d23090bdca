//! Utility functions and helpers

use ethereum_types::U256;

const LIMB: f64 = 18_446_744_073_709_551_616.0; // 2^64

/// Lossy conversion of a full-width uint256 into f64
pub fn u256_to_f64(value: U256) -> f64 {
    value.0.iter().rev().fold(0.0, |acc, limb| acc * LIMB + *limb as f64)
}

/// Convert a raw integer amount into token units
pub fn to_units(raw: U256, decimals: u8) -> f64 {
    u256_to_f64(raw) / 10_f64.powi(decimals as i32)
}

/// Format a value with two decimals and thousands separators
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_units() {
        assert_eq!(to_units(U256::from(1_500_000u64), 6), 1.5);
        assert_eq!(to_units(U256::zero(), 18), 0.0);
    }

    #[test]
    fn test_u256_beyond_128_bits() {
        assert_eq!(u256_to_f64(U256::from(u64::MAX) + U256::one()), LIMB);
        // 1e40 does not fit u128
        let big = U256::exp10(40);
        assert!((u256_to_f64(big) / 1e40 - 1.0).abs() < 1e-12);
        assert!((to_units(big, 18) / 1e22 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567.891), "1,234,567.89");
        assert_eq!(format_thousands(999.5), "999.50");
        assert_eq!(format_thousands(-1500.0), "-1,500.00");
        assert_eq!(format_thousands(0.0), "0.00");
    }
}
