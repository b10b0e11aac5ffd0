use crate::models::Position;

/// Encoded polylines carry coordinates at 1e-5 degree precision
const PRECISION: f64 = 1e5;

/// Decode a Google encoded polyline into its vertices
pub fn decode(encoded: &str) -> Result<Vec<Position>, String> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(format!(
                "Truncated polyline: latitude without longitude at byte {}",
                index
            ));
        }
        lng += next_value(bytes, &mut index)?;

        points.push(Position::new(lat as f64 / PRECISION, lng as f64 / PRECISION)?);
    }

    Ok(points)
}

/// Read one zig-zag encoded delta, advancing `index` past it
fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, String> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| format!("Truncated polyline at byte {}", index))?;
        if !(63..=126).contains(&byte) {
            return Err(format!(
                "Invalid polyline character '{}' at byte {}",
                byte as char, index
            ));
        }
        *index += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return Err(format!("Overlong polyline value ending at byte {}", index));
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
