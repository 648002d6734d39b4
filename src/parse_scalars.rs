//! Literal recognizers and casts for YAML 1.1 scalars.
//!
//! The `is_*` functions implement implicit typing of plain scalars; the
//! `parse_*` functions coerce a literal once its kind is known. Casts report
//! failures as messages so the caller can attach them to the node.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

/// YAML 1.1 true literals.
pub const TRUE_TOKENS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON",
];

/// YAML 1.1 false literals (the "Norway problem" set).
pub const FALSE_TOKENS: &[&str] = &[
    "n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF",
];

const NULL_TOKENS: &[&str] = &["", "~", "null", "Null", "NULL"];

pub(crate) fn is_bool(s: &str) -> bool {
    TRUE_TOKENS.contains(&s) || FALSE_TOKENS.contains(&s)
}

pub(crate) fn is_null(s: &str) -> bool {
    NULL_TOKENS.contains(&s)
}

/// Decimal float with a mandatory `.`, or one of the `.inf`/`.nan` spellings.
pub(crate) fn is_float(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(s, ".nan" | ".NaN" | ".NAN") {
        return true;
    }

    let Some((int_part, rest)) = unsigned.split_once('.') else {
        return false;
    };
    let int_ok = match int_part.as_bytes().first() {
        None => true,
        Some(b) if b.is_ascii_digit() => int_part
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'_' || b == b','),
        Some(_) => false,
    };
    if !int_ok {
        return false;
    }

    let (frac, exp) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.is_empty() && frac.is_empty() {
        return false;
    }
    match exp {
        None => true,
        Some(exp) => match exp.strip_prefix(['-', '+']) {
            Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        },
    }
}

/// Binary, legacy octal, decimal or hexadecimal integer.
pub(crate) fn is_int(s: &str) -> bool {
    let t = s.strip_prefix(['-', '+']).unwrap_or(s);
    if let Some(digits) = t.strip_prefix("0b") {
        return !digits.is_empty()
            && digits.bytes().all(|b| matches!(b, b'0' | b'1' | b'_' | b','));
    }
    if let Some(digits) = t.strip_prefix("0x") {
        return !digits.is_empty()
            && digits
                .bytes()
                .all(|b| b.is_ascii_hexdigit() || b == b'_' || b == b',');
    }
    if t == "0" {
        return true;
    }
    if let Some(digits) = t.strip_prefix('0') {
        return !digits.is_empty()
            && digits
                .bytes()
                .all(|b| matches!(b, b'0'..=b'7' | b'_' | b','));
    }

    // [1-9] followed by digits, each optionally preceded by one separator.
    let bytes = t.as_bytes();
    match bytes.first() {
        Some(b'1'..=b'9') => {}
        _ => return false,
    }
    let mut after_separator = false;
    for &b in &bytes[1..] {
        match b {
            b'0'..=b'9' => after_separator = false,
            b'_' | b',' if !after_separator => after_separator = true,
            _ => return false,
        }
    }
    !after_separator
}

pub(crate) fn is_timestamp(s: &str) -> bool {
    scan_timestamp(s).is_some()
}

/// Boolean cast: false exactly for the false tokens, true otherwise.
pub fn parse_yaml11_bool(s: &str) -> bool {
    !FALSE_TOKENS.contains(&s)
}

fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        if c == '_' || c == ',' {
            continue;
        }
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?;
        val = val.checked_add(d as u128)?;
        saw = true;
    }
    if saw { Some(val) } else { None }
}

/// Integer cast with radix prefixes (`0x`, `0o`, `0b`), legacy octal (`0755`)
/// and `_`/`,` digit separators.
pub fn parse_int(s: &str) -> Result<i64, String> {
    let invalid = || format!("invalid int {s:?}");
    let t = s.trim();
    let (neg, rest) = match t.strip_prefix('+') {
        Some(r) => (false, r),
        None => match t.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, t),
        },
    };

    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16u32, r)
    } else if let Some(r) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8u32, r)
    } else if let Some(r) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2u32, r)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8u32, &rest[1..])
    } else {
        (10u32, rest)
    };

    let mag = parse_digits_u128(digits, radix).ok_or_else(invalid)?;
    let mag = i128::try_from(mag).map_err(|_| invalid())?;
    let val = if neg { -mag } else { mag };
    i64::try_from(val).map_err(|_| format!("int {s:?} out of range"))
}

/// Float cast accepting `_`/`,` separators and the `.inf`/`.nan` spellings.
pub fn parse_float(s: &str) -> Result<f64, String> {
    let t: String = s.trim().chars().filter(|c| *c != '_' && *c != ',').collect();
    let lower = t.to_ascii_lowercase();
    match lower.as_str() {
        ".nan" | "+.nan" | "-.nan" => Ok(f64::NAN),
        ".inf" | "+.inf" => Ok(f64::INFINITY),
        "-.inf" => Ok(f64::NEG_INFINITY),
        _ => t.parse::<f64>().map_err(|_| format!("invalid float {s:?}")),
    }
}

/// Decode a `!!binary` scalar (may contain newlines or spaces).
pub fn parse_binary(s: &str) -> Result<Vec<u8>, String> {
    let cleaned: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .map_err(|err| format!("invalid binary: {err}"))
}

/// Timestamp cast. A timestamp without a zone is taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let invalid = || format!("invalid timestamp {s:?}");
    let parts = scan_timestamp(s.trim()).ok_or_else(invalid)?;

    let year = if parts.negative_year {
        -(parts.year as i32)
    } else {
        parts.year as i32
    };
    let date = NaiveDate::from_ymd_opt(year, parts.month, parts.day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_nano_opt(parts.hour, parts.minute, parts.second, parts.nanos)
        .ok_or_else(invalid)?;
    let offset = FixedOffset::east_opt(parts.offset_seconds.unwrap_or(0)).ok_or_else(invalid)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(invalid)
}

#[derive(Debug, Default, PartialEq)]
struct TimestampParts {
    negative_year: bool,
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    offset_seconds: Option<i32>,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Option<()> {
        self.eat(b).then_some(())
    }

    /// Between `min` and `max` decimal digits.
    fn digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let start = self.pos;
        let mut val = 0u32;
        while self.pos - start < max {
            match self.peek() {
                Some(b @ b'0'..=b'9') => {
                    val = val * 10 + (b - b'0') as u32;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        (self.pos - start >= min).then_some(val)
    }

    fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

/// `[-]YYYY-M-D(T|t|ws)H:MM:SS[.frac][ws][Z|±H[:][MM]]`
fn scan_timestamp(s: &str) -> Option<TimestampParts> {
    let mut cur = Cursor::new(s);
    let mut parts = TimestampParts {
        negative_year: cur.eat(b'-'),
        ..TimestampParts::default()
    };

    parts.year = cur.digits(4, 4)?;
    cur.expect(b'-')?;
    parts.month = cur.digits(1, 2)?;
    cur.expect(b'-')?;
    parts.day = cur.digits(1, 2)?;

    if !(cur.eat(b'T') || cur.eat(b't')) && cur.skip_whitespace() == 0 {
        return None;
    }

    parts.hour = cur.digits(1, 2)?;
    cur.expect(b':')?;
    parts.minute = cur.digits(2, 2)?;
    cur.expect(b':')?;
    parts.second = cur.digits(2, 2)?;

    if cur.eat(b'.') {
        let mut scale = 100_000_000u32;
        while let Some(b @ b'0'..=b'9') = cur.peek() {
            parts.nanos += (b - b'0') as u32 * scale;
            scale /= 10;
            cur.pos += 1;
        }
    }

    let spaced = cur.skip_whitespace() > 0;
    if cur.eat(b'Z') {
        parts.offset_seconds = Some(0);
    } else if let Some(sign @ (b'+' | b'-')) = cur.peek() {
        cur.pos += 1;
        let hours = cur.digits(1, 2)? as i32;
        cur.eat(b':');
        let before_minutes = cur.pos;
        let minutes = match cur.digits(2, 2) {
            Some(m) => m as i32,
            None => {
                cur.pos = before_minutes;
                0
            }
        };
        let seconds = hours * 3600 + minutes * 60;
        parts.offset_seconds = Some(if sign == b'-' { -seconds } else { seconds });
    } else if spaced {
        return None;
    }

    cur.at_end().then_some(parts)
}
