//! # Validate Subcommand
//!
//! Checks codes against the `TT-RRR-YY-NNNNN` grammar. Letters may be in
//! any case and surrounding whitespace is ignored. With `--lenient`, the
//! compact twelve-character form is accepted too. Input that differs from
//! the canonical spelling is printed with the canonical form alongside.

use anyhow::Result;
use clap::Args;
use isrc_core::IsrcCode;

/// Arguments for the `isrc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Codes to check.
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,

    /// Also accept the compact form without hyphens.
    #[arg(long)]
    pub lenient: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every code is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let mut had_failures = false;
    for input in &args.codes {
        let parsed = if args.lenient {
            IsrcCode::parse_lenient(input)
        } else {
            IsrcCode::parse(input)
        };
        match parsed {
            Ok(code) if code.as_str() == input => println!("VALID: {code}"),
            Ok(code) => println!("VALID: {input} ({code})"),
            Err(e) => {
                tracing::debug!(input = %input, error = %e, "rejected code");
                println!("INVALID: {input}");
                had_failures = true;
            }
        }
    }
    Ok(if had_failures { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(codes: &[&str], lenient: bool) -> ValidateArgs {
        ValidateArgs {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            lenient,
        }
    }

    #[test]
    fn test_all_valid() {
        assert_eq!(run_validate(&args(&["ZA-80G-25-00001", "US-RC1-99-99999"], false)).unwrap(), 0);
    }

    #[test]
    fn test_any_invalid_fails() {
        assert_eq!(run_validate(&args(&["ZA-80G-25-00001", "ZA-80G-25-0001"], false)).unwrap(), 1);
        assert_eq!(run_validate(&args(&["ZA-80G-2500001"], false)).unwrap(), 1);
    }

    #[test]
    fn test_lowercase_is_accepted() {
        assert_eq!(run_validate(&args(&[" za-80g-25-00001 "], false)).unwrap(), 0);
    }

    #[test]
    fn test_compact_needs_lenient() {
        assert_eq!(run_validate(&args(&["ZA80G2500001"], false)).unwrap(), 1);
        assert_eq!(run_validate(&args(&["ZA80G2500001"], true)).unwrap(), 0);
    }
}
