use crate::constants::EARTH_RADIUS_M;
use crate::models::{DistanceMeters, PathSegment, Position};

/// Great-circle distance between two points using the Haversine formula
pub fn distance(a: &Position, b: &Position) -> DistanceMeters {
    DistanceMeters::from_raw(angular_distance(a, b) * EARTH_RADIUS_M)
}

/// Minimum distance from `p` to any point on the corridor polyline.
///
/// Each consecutive vertex pair is handled as its own sub-segment and the
/// smallest result wins. Geodesic corridors project onto the great circle
/// through the pair; the others use a local equirectangular plane.
pub fn distance_to_segment(p: &Position, segment: &PathSegment) -> DistanceMeters {
    let project: fn(&Position, &Position, &Position) -> DistanceMeters = if segment.is_geodesic() {
        geodesic_point_to_segment
    } else {
        flat_point_to_segment
    };

    segment
        .points()
        .windows(2)
        .map(|w| project(p, &w[0], &w[1]))
        .fold(DistanceMeters::from_raw(f64::INFINITY), DistanceMeters::min)
}

/// Central angle between two points, in radians
fn angular_distance(a: &Position, b: &Position) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}

/// Initial bearing from `a` towards `b`, in radians
fn initial_bearing(a: &Position, b: &Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    y.atan2(x)
}

/// Wrap a longitude difference into [-180, 180]
fn wrap_lng_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Point-to-segment distance on a flat plane centred on `p`.
/// The projection is clamped to the segment endpoints, then the distance to
/// the projected point is measured on the sphere.
fn flat_point_to_segment(p: &Position, start: &Position, end: &Position) -> DistanceMeters {
    let cos_lat = p.lat.to_radians().cos();
    let to_plane = |q: &Position| -> (f64, f64) {
        (
            wrap_lng_delta(q.lng - p.lng).to_radians() * cos_lat * EARTH_RADIUS_M,
            (q.lat - p.lat).to_radians() * EARTH_RADIUS_M,
        )
    };

    let (ax, ay) = to_plane(start);
    let (bx, by) = to_plane(end);
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-12 {
        // Segment is essentially a point
        return distance(p, start);
    }

    // p sits at the plane origin
    let t = ((-ax) * dx + (-ay) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = Position {
        lat: start.lat + t * (end.lat - start.lat),
        lng: start.lng + t * wrap_lng_delta(end.lng - start.lng),
    };

    distance(p, &closest)
}

/// Point-to-segment distance along great circles (cross-track / along-track).
fn geodesic_point_to_segment(p: &Position, start: &Position, end: &Position) -> DistanceMeters {
    let d13 = angular_distance(start, p);
    if d13 == 0.0 {
        return DistanceMeters::from_raw(0.0);
    }

    let d12 = angular_distance(start, end);
    if d12 < 1e-12 {
        return distance(p, start);
    }

    let delta_bearing = initial_bearing(start, p) - initial_bearing(start, end);

    // Projection falls behind the start vertex
    if delta_bearing.cos() < 0.0 {
        return distance(p, start);
    }

    let cross_track = (d13.sin() * delta_bearing.sin()).clamp(-1.0, 1.0).asin();
    // tan(along) = tan(d13) * cos(delta), well conditioned for short corridors
    let along_track = (d13.tan() * delta_bearing.cos()).atan();

    // Projection falls past the end vertex
    if along_track > d12 {
        return distance(p, end);
    }

    DistanceMeters::from_raw(cross_track.abs() * EARTH_RADIUS_M)
}
