use std::io::{self, BufRead, BufReader, Read};

use crate::error::Error;

/// Separates the suffix from the occurrence count on each response line.
pub const DELIMITER: char = ':';

/// One `SUFFIX:COUNT` record from a range response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeLine {
    pub suffix: String,
    pub count: u64,
}

/// Parses the count field, truncating any fractional part.
fn parse_count(field: &str, line: usize) -> Result<u64, Error> {
    let malformed = || Error::MalformedLine { line, reason: format!("invalid count '{field}'") };

    let value: f64 = field.trim().parse().map_err(|_| malformed())?;
    // u64::MAX rounds up to 2^64 as an f64, which is already out of range.
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(malformed());
    }

    Ok(value.trunc() as u64)
}

/// Scans a range response for `target_suffix`, one line at a time.
///
/// Returns the first matching record, or `None` once the body is exhausted.
/// A line without a count field, or one that is not UTF-8, aborts the scan
/// with [`Error::MalformedLine`]; blank lines are skipped. The body is consumed and dropped on every path.
pub fn scan(body: impl Read, target_suffix: &str) -> Result<Option<RangeLine>, Error> {
    let reader = BufReader::new(body);

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => Error::MalformedLine {
                line: idx + 1,
                reason: "not valid UTF-8".to_string(),
            },
            _ => Error::ResponseRead(e),
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((suffix, count)) = line.split_once(DELIMITER) else {
            return Err(Error::MalformedLine {
                line: idx + 1,
                reason: "missing count field".to_string(),
            });
        };

        let suffix = suffix.trim();
        if suffix.eq_ignore_ascii_case(target_suffix) {
            let count = parse_count(count, idx + 1)?;
            return Ok(Some(RangeLine { suffix: suffix.to_ascii_uppercase(), count }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::TrackedBody;

    const SUFFIX: &str = "0018A45C4D1DEF81644B54AB7F969B88D65";

    fn scan_str(body: &str, target: &str) -> Result<Option<RangeLine>, Error> {
        scan(Cursor::new(body.as_bytes()), target)
    }

    #[test]
    fn test_scan_finds_match() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1";
        let found = scan_str(body, SUFFIX).unwrap().unwrap();
        assert_eq!(found, RangeLine { suffix: SUFFIX.to_string(), count: 1 });
    }

    #[test]
    fn test_scan_unrelated_suffix_not_found() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1";
        assert_eq!(scan_str(body, "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF").unwrap(), None);
        assert_eq!(scan_str("", SUFFIX).unwrap(), None);
    }

    #[test]
    fn test_scan_unsorted_crlf_body() {
        let body = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF:7\r\n\
                    0018A45C4D1DEF81644B54AB7F969B88D65:2254650\r\n\
                    00000000000000000000000000000000000:3\r\n";
        let found = scan_str(body, SUFFIX).unwrap().unwrap();
        assert_eq!(found.count, 2254650);
    }

    #[test]
    fn test_scan_stops_at_first_match() {
        // Lines after the match are never parsed.
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:4\nmalformed-no-delimiter\n";
        assert_eq!(scan_str(body, SUFFIX).unwrap().unwrap().count, 4);
    }

    #[test]
    fn test_scan_lowercase_target() {
        let found = scan_str("0018A45C4D1DEF81644B54AB7F969B88D65:9", &SUFFIX.to_lowercase());
        assert_eq!(found.unwrap().unwrap().suffix, SUFFIX);
    }

    #[test]
    fn test_scan_malformed_line_aborts() {
        let body = "malformed-no-delimiter\n0018A45C4D1DEF81644B54AB7F969B88D65:1\n";
        match scan_str(body, SUFFIX) {
            Err(Error::MalformedLine { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected malformed line, got {other:?}"),
        }

        let body = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF:7\nmalformed-no-delimiter\n";
        assert!(matches!(
            scan_str(body, SUFFIX),
            Err(Error::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_scan_skips_blank_lines() {
        let body = "\n\n0018A45C4D1DEF81644B54AB7F969B88D65:12\n";
        assert_eq!(scan_str(body, SUFFIX).unwrap().unwrap().count, 12);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5", 1).unwrap(), 5);
        assert_eq!(parse_count(" 42 ", 1).unwrap(), 42);
        assert_eq!(parse_count("3.9", 1).unwrap(), 3);
        assert_eq!(parse_count("0", 1).unwrap(), 0);
        for bad in ["", "many", "-1", "inf", "NaN", "1:2", "1e30", "18446744073709551616"] {
            assert!(
                matches!(parse_count(bad, 3), Err(Error::MalformedLine { line: 3, .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_scan_bad_count_on_match() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:lots";
        assert!(matches!(scan_str(body, SUFFIX), Err(Error::MalformedLine { .. })));
    }

    #[test]
    fn test_scan_read_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("connection reset"))
            }
        }
        let err = scan(Broken, SUFFIX).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_scan_invalid_utf8_is_malformed() {
        let mut body = b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF:7\n".to_vec();
        body.extend_from_slice(&[0xff, 0xfe, b':', b'1', b'\n']);

        let err = scan(Cursor::new(body), SUFFIX).unwrap_err();

        assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_scan_releases_body() {
        let (body, dropped) = TrackedBody::new("0018A45C4D1DEF81644B54AB7F969B88D65:1");
        scan(body, SUFFIX).unwrap();
        assert!(dropped.load(Ordering::SeqCst));

        let (body, dropped) = TrackedBody::new("malformed-no-delimiter");
        scan(body, SUFFIX).unwrap_err();
        assert!(dropped.load(Ordering::SeqCst));

        let (body, dropped) = TrackedBody::new("");
        assert_eq!(scan(body, SUFFIX).unwrap(), None);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
