//! Resource limit parsing
//!
//! Limits travel through configuration as strings (`2G`, `2.0`) and are
//! converted here into the units the Engine API expects: bytes for memory,
//! nanocpus for CPU.

/// Parse a memory limit like `2G`, `512M`, `1024K`, or plain bytes.
///
/// Suffixes are case-insensitive. Returns bytes.
pub fn parse_memory_limit(value: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("memory limit is empty".to_string());
    }

    let (number, multiplier) = match trimmed.chars().last() {
        Some('k') | Some('K') => (&trimmed[..trimmed.len() - 1], 1024i64),
        Some('m') | Some('M') => (&trimmed[..trimmed.len() - 1], 1024i64 * 1024),
        Some('g') | Some('G') => (&trimmed[..trimmed.len() - 1], 1024i64 * 1024 * 1024),
        _ => (trimmed, 1),
    };

    let parsed: i64 = number
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a valid memory limit"))?;

    if parsed <= 0 {
        return Err(format!("memory limit must be positive, got '{value}'"));
    }

    parsed
        .checked_mul(multiplier)
        .ok_or_else(|| format!("memory limit '{value}' overflows"))
}

/// Parse a CPU limit like `2.0` or `0.5` into nanocpus.
pub fn parse_cpu_limit(value: &str) -> Result<i64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a valid CPU limit"))?;

    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(format!("CPU limit must be a positive number, got '{value}'"));
    }

    Ok((parsed * 1_000_000_000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_suffixes() {
        assert_eq!(parse_memory_limit("2G").unwrap(), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory_limit("512M").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_memory_limit("1024K").unwrap(), 1024 * 1024);
        assert_eq!(parse_memory_limit("1073741824").unwrap(), 1073741824);
    }

    #[test]
    fn memory_suffix_case_insensitive() {
        assert_eq!(parse_memory_limit("2g").unwrap(), parse_memory_limit("2G").unwrap());
    }

    #[test]
    fn memory_rejects_garbage() {
        assert!(parse_memory_limit("").is_err());
        assert!(parse_memory_limit("lots").is_err());
        assert!(parse_memory_limit("2T").is_err());
        assert!(parse_memory_limit("-1G").is_err());
        assert!(parse_memory_limit("0").is_err());
    }

    #[test]
    fn cpu_decimal_to_nanocpus() {
        assert_eq!(parse_cpu_limit("2.0").unwrap(), 2_000_000_000);
        assert_eq!(parse_cpu_limit("0.5").unwrap(), 500_000_000);
        assert_eq!(parse_cpu_limit("1").unwrap(), 1_000_000_000);
    }

    #[test]
    fn cpu_rejects_nonpositive() {
        assert!(parse_cpu_limit("0").is_err());
        assert!(parse_cpu_limit("-2").is_err());
        assert!(parse_cpu_limit("NaN").is_err());
        assert!(parse_cpu_limit("two").is_err());
    }
}
