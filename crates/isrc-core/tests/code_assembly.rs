//! # Code Assembly
//!
//! Cross-module checks through the crate root: the year group comes from a
//! `Timestamp` and the designation from a digest-derived range, the way the
//! registry assembles codes.

use chrono::{TimeZone, Utc};
use isrc_core::{sha256_digest, validate, IsrcCode, Timestamp, DESIGNATION_MAX};

fn year_of(ts: &Timestamp) -> u8 {
    ts.year_suffix().parse().unwrap()
}

#[test]
fn test_year_group_from_timestamp() {
    for (year, suffix) in [(2000, 0u8), (2009, 9), (2025, 25), (2099, 99)] {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(year_of(&ts), suffix);
        let code = IsrcCode::from_parts("ZA", "80G", year_of(&ts), 200).unwrap();
        assert!(code.as_str().contains(&format!("-{suffix:02}-")));
        assert!(validate(code.as_str()));
    }
}

#[test]
fn test_digest_bucket_designations_stay_in_field() {
    let ts = Timestamp::parse("2026-03-01T00:00:00Z").unwrap();
    for key in ["", "default", "user-42", "someone@example.com"] {
        let bucket = sha256_digest(format!("{key}x").as_bytes()).prefix_u32() % 90;
        let start = 200 + bucket * 1000;
        let end = start + 999;
        assert!(end <= DESIGNATION_MAX);
        for designation in [start, end] {
            let code = IsrcCode::from_parts("ZA", "80G", year_of(&ts), designation).unwrap();
            assert_eq!(code.designation(), designation);
            assert_eq!(IsrcCode::parse_lenient(&code.to_compact()).unwrap(), code);
        }
    }
}
