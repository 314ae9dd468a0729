//! A minimal IGC B/C/H record parser.
//!
//! Deliberately narrow: this reads exactly the fields the optimization
//! core needs (fix time/lat/lon/validity/altitudes, task declaration
//! waypoints, the flight date) and nothing else — no signature
//! verification, no extension records, no interpolation. Grounded
//! directly on `match_b_record` / `match_c_record` / `match_hfdte_record`
//! in the original C scoring engine this crate's algorithms are modeled
//! on, so that the integer 1/60000-degree lat/lon representation survives
//! the round trip exactly rather than drifting through a decimal-degree
//! intermediate.

use crate::error::Error;
use crate::point::{Trkpt, Validity, Wpt};
use crate::track::Track;

pub(crate) fn parse(name: &str, bytes: &[u8]) -> Result<Track, Error> {
    let text = String::from_utf8_lossy(bytes);

    let mut trkpts = Vec::new();
    let mut task_waypoints = Vec::new();
    let mut date: Option<(i32, u32, u32)> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match line.as_bytes()[0] {
            b'B' => {
                if let Some(trkpt) = parse_b_record(line, date) {
                    trkpts.push(trkpt);
                } else {
                    return Err(Error::MalformedFix {
                        file: name.to_string(),
                        line: line.to_string(),
                    });
                }
            }
            b'C' => {
                if let Some(wpt) = parse_c_record(line) {
                    task_waypoints.push(wpt);
                }
            }
            b'H' if line.starts_with("HFDTE") => {
                date = parse_hfdte_record(line);
            }
            _ => {}
        }
    }

    let mut track = Track::from_trkpts(trkpts);
    track.task_waypoints = task_waypoints;
    track.igc_bytes_mut().extend_from_slice(bytes);
    Ok(track)
}

fn parse_unsigned(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `B HHMMSS DDMMmmm N/S DDDMMmmm E/W A PPPPP GGGGG`
fn parse_b_record(line: &str, date: Option<(i32, u32, u32)>) -> Option<Trkpt> {
    let bytes = line.as_bytes();
    if bytes.len() < 35 || bytes[0] != b'B' {
        return None;
    }

    let hour = parse_unsigned(&line[1..3])?;
    let min = parse_unsigned(&line[3..5])?;
    let sec = parse_unsigned(&line[5..7])?;

    let lat_deg = parse_unsigned(&line[7..9])?;
    let lat_mmin = parse_unsigned(&line[9..14])?;
    let lat_hemi = bytes[14];
    let mut lat = 60000 * lat_deg + lat_mmin;
    if lat_hemi == b'S' {
        lat = -lat;
    } else if lat_hemi != b'N' {
        return None;
    }

    let lon_deg = parse_unsigned(&line[15..18])?;
    let lon_mmin = parse_unsigned(&line[18..23])?;
    let lon_hemi = bytes[23];
    let mut lon = 60000 * lon_deg + lon_mmin;
    if lon_hemi == b'W' {
        lon = -lon;
    } else if lon_hemi != b'E' {
        return None;
    }

    let val = match bytes[24] {
        b'A' => Validity::Valid,
        b'V' => Validity::Voided,
        _ => return None,
    };

    let alt = parse_unsigned(&line[25..30])?;
    let ele = parse_unsigned(&line[30..35])?;

    let (year, month, day) = date.unwrap_or((1970, 1, 1));
    let time = days_from_civil(year, month, day) * 86400 + hour * 3600 + min * 60 + sec;

    Some(Trkpt {
        time,
        lat: lat as i32,
        lon: lon as i32,
        val,
        alt: alt as i32,
        ele: ele as i32,
    })
}

/// `C DDMMmmm N/S DDDMMmmm E/W <name>`. The fixed-width fields span 18
/// bytes; `<name>` is optional and may be empty, per `match_c_record`.
fn parse_c_record(line: &str) -> Option<Wpt> {
    let bytes = line.as_bytes();
    if bytes.len() < 18 || bytes[0] != b'C' {
        return None;
    }

    let lat_deg = parse_unsigned(&line[1..3])?;
    let lat_mmin = parse_unsigned(&line[3..8])?;
    let lat_hemi = bytes[8];
    let mut lat = 60000 * lat_deg + lat_mmin;
    if lat_hemi == b'S' {
        lat = -lat;
    } else if lat_hemi != b'N' {
        return None;
    }

    let lon_deg = parse_unsigned(&line[9..12])?;
    let lon_mmin = parse_unsigned(&line[12..17])?;
    let lon_hemi = bytes[17];
    let mut lon = 60000 * lon_deg + lon_mmin;
    if lon_hemi == b'W' {
        lon = -lon;
    } else if lon_hemi != b'E' {
        return None;
    }

    let name = line.get(18..).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Some(Wpt {
        time: None,
        lat: lat as i32,
        lon: lon as i32,
        name,
        ele: 0,
        val: Validity::Voided,
    })
}

/// `HFDTEDDMMYY` (or `HFDTEDATE:DDMMYY,NN`, tolerated by taking the first
/// six digits after the `HFDTE` prefix).
fn parse_hfdte_record(line: &str) -> Option<(i32, u32, u32)> {
    let digits: String = line
        .chars()
        .skip(5)
        .filter(|c| c.is_ascii_digit())
        .take(6)
        .collect();
    if digits.len() != 6 {
        return None;
    }
    let day: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let year: i32 = digits[4..6].parse().ok()?;
    Some((2000 + year, month, day))
}

/// Days since the Unix epoch for a given civil (Gregorian) date, Howard
/// Hinnant's `days_from_civil` algorithm.
fn days_from_civil(y: i32, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y } as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = ((m as i64 + 9) % 12) as i64;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}
