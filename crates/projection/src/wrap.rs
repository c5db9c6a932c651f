//! Longitude convention handling for geographic (WGS84) data.
//!
//! Gridded climate data is published either with longitudes in 0..360
//! ("unwrapped") or in -180..180 ("wrapped"). These helpers move coordinates,
//! cell bounds and geometries between the two conventions. A cell straddling
//! the 180 meridian becomes a two-part multipolygon when wrapped.

use geo::{coord, BooleanOps, BoundingRect, MapCoords, MultiPolygon, Point, Polygon, Rect};

/// Longitude of the wrapping seam.
pub const SEAM: f64 = 180.0;

/// Map a longitude from 0..360 into -180..180.
pub fn wrap_longitude(x: f64) -> f64 {
    if x > SEAM {
        x - 360.0
    } else {
        x
    }
}

/// Map a longitude from -180..180 into 0..360.
pub fn unwrap_longitude(x: f64) -> f64 {
    if x < 0.0 {
        x + 360.0
    } else {
        x
    }
}

/// Map a cell's column bounds from 0..360 into -180..180.
///
/// A cell lying wholly east of the seam moves as a unit, so an edge on the
/// seam itself becomes -180.
pub fn wrap_bounds(lower: f64, upper: f64) -> (f64, f64) {
    if lower.min(upper) >= SEAM && lower.max(upper) > SEAM {
        (lower - 360.0, upper - 360.0)
    } else {
        (wrap_longitude(lower), wrap_longitude(upper))
    }
}

/// Map a cell's column bounds from -180..180 into 0..360.
///
/// A cell lying wholly west of the prime meridian moves as a unit, so an
/// edge on the meridian becomes 360.
pub fn unwrap_bounds(lower: f64, upper: f64) -> (f64, f64) {
    if lower.max(upper) <= 0.0 && lower.min(upper) < 0.0 {
        (lower + 360.0, upper + 360.0)
    } else {
        (unwrap_longitude(lower), unwrap_longitude(upper))
    }
}

/// True when any longitude lies east of the seam.
pub fn has_unwrapped_longitudes<I>(values: I) -> bool
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().any(|x| x > SEAM)
}

/// A column bound interval whose lower edge lies east of its upper edge.
pub fn is_seam_crossing(lower: f64, upper: f64) -> bool {
    lower > upper && lower - upper > SEAM
}

/// Split a seam-crossing column interval into its two ascending parts.
///
/// The part running up to the seam comes first. Wrapped cells split at 180,
/// unwrapped cells at 360/0. Returns `None` for an ordinary interval.
pub fn seam_parts(lower: f64, upper: f64) -> Option<((f64, f64), (f64, f64))> {
    if !is_seam_crossing(lower, upper) {
        return None;
    }
    let (east_edge, west_edge) = if upper < 0.0 { (SEAM, -SEAM) } else { (360.0, 0.0) };
    Some(((lower, east_edge), (west_edge, upper)))
}

fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon {
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }).to_polygon()
}

/// Polygon of a grid cell from its column and row bounds.
///
/// Row bounds may be in either order. A seam-crossing column interval
/// produces two parts, one on each side of the seam.
pub fn cell_polygon(x_bounds: (f64, f64), y_bounds: (f64, f64)) -> MultiPolygon {
    let (min_y, max_y) = if y_bounds.0 <= y_bounds.1 {
        y_bounds
    } else {
        (y_bounds.1, y_bounds.0)
    };
    let (lower, upper) = x_bounds;

    if let Some(((a0, a1), (b0, b1))) = seam_parts(lower, upper) {
        return MultiPolygon::new(vec![rect(a0, min_y, a1, max_y), rect(b0, min_y, b1, max_y)]);
    }

    let (min_x, max_x) = if lower <= upper { (lower, upper) } else { (upper, lower) };
    MultiPolygon::new(vec![rect(min_x, min_y, max_x, max_y)])
}

pub fn wrap_point(point: &Point) -> Point {
    Point::new(wrap_longitude(point.x()), point.y())
}

pub fn unwrap_point(point: &Point) -> Point {
    Point::new(unwrap_longitude(point.x()), point.y())
}

fn band(geom: &MultiPolygon, min_x: f64, max_x: f64) -> MultiPolygon {
    let Some(bbox) = geom.bounding_rect() else {
        return MultiPolygon::new(Vec::new());
    };
    let clip = MultiPolygon::new(vec![rect(
        min_x,
        bbox.min().y - 1.0,
        max_x,
        bbox.max().y + 1.0,
    )]);
    let mut part = geom.intersection(&clip);
    part.0.retain(|p| !p.exterior().0.is_empty());
    part
}

fn shift_x(geom: MultiPolygon, dx: f64) -> MultiPolygon {
    geom.map_coords(|c| coord! { x: c.x + dx, y: c.y })
}

/// Move the part of a geometry east of the seam to negative longitudes.
///
/// Geometries entirely west of the seam are returned unchanged.
pub fn wrap_multipolygon(geom: &MultiPolygon) -> MultiPolygon {
    let Some(bbox) = geom.bounding_rect() else {
        return geom.clone();
    };
    if bbox.max().x <= SEAM {
        return geom.clone();
    }

    let west = band(geom, bbox.min().x.min(-SEAM) - 1.0, SEAM);
    let east = shift_x(band(geom, SEAM, bbox.max().x + 1.0), -360.0);

    let mut parts = west.0;
    parts.extend(east.0);
    MultiPolygon::new(parts)
}

/// Move negative-longitude parts east of the prime meridian and merge them.
///
/// A cell split by [`wrap_multipolygon`] comes back as a single polygon.
pub fn unwrap_multipolygon(geom: &MultiPolygon) -> MultiPolygon {
    let Some(bbox) = geom.bounding_rect() else {
        return geom.clone();
    };
    if bbox.min().x >= 0.0 {
        return geom.clone();
    }

    let west = shift_x(band(geom, bbox.min().x - 1.0, 0.0), 360.0);
    let east = band(geom, 0.0, bbox.max().x.max(360.0) + 1.0);

    if east.0.is_empty() {
        return west;
    }
    if west.0.is_empty() {
        return east;
    }
    east.union(&west)
}
