use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Web Mercator projection constants
pub const EARTH_RADIUS: f64 = 6378137.0;
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude.
///
/// Latitude is in [-90, 90], longitude is normalized to (-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a new GeoPoint, rejecting out-of-range or non-finite values.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinates(format!("lat={lat}, lng={lng}")));
        }
        Ok(Self {
            lat,
            lng: wrap_lng(lng),
        })
    }

    /// Creates a GeoPoint from possibly out-of-range values: latitude is
    /// clamped to [-90, 90] and longitude is wrapped to (-180, 180].
    pub fn normalized(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lng: wrap_lng(lng),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Calculates the distance in meters to another point using the
    /// Haversine formula.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Returns the point reached by travelling `distance` meters from this
    /// point along the given bearing (degrees, clockwise from north).
    pub fn destination(&self, distance: f64, bearing: f64) -> GeoPoint {
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();
        let theta = bearing.to_radians();
        let delta = distance / EARTH_RADIUS;

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lng2 = lng1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::normalized(lat2.to_degrees(), lng2.to_degrees())
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self { lat: 0.0, lng: 0.0 }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    /// Parses a `"lat,lng"` pair, e.g. `"48.137,11.575"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ',');
        let lat = parts.next().unwrap_or("").trim();
        let lng = parts
            .next()
            .ok_or_else(|| Error::InvalidCoordinates(format!("expected \"lat,lng\", got {s:?}")))?
            .trim();
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::InvalidCoordinates(format!("bad latitude in {s:?}")))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::InvalidCoordinates(format!("bad longitude in {s:?}")))?;
        GeoPoint::new(lat, lng)
    }
}

/// Wraps longitude to the (-180, 180] range.
pub fn wrap_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Parses a whitespace- or semicolon-separated list of `"lat,lng"` pairs.
pub fn parse_points(s: &str) -> Result<Vec<GeoPoint>> {
    s.split(|c: char| c.is_whitespace() || c == ';')
        .filter(|part| !part.is_empty())
        .map(GeoPoint::from_str)
        .collect()
}

/// A point in pixel coordinates on the unbounded projected plane.
///
/// `x` may exceed one world width; horizontal wrapping is applied at
/// tile-index time, never here, so no precision is lost to repeated wraps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A geographic bounding region.
///
/// Latitude extents are a plain min/max pair. The longitude extent is an
/// interval travelled eastward from `west` to `east`; whether it crosses
/// the antimeridian is tracked with an explicit flag rather than by
/// comparing `west` and `east` numerically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    lat_min: f64,
    lat_max: f64,
    west: f64,
    east: f64,
    wraps_antimeridian: bool,
}

impl BoundingRegion {
    /// Creates a degenerate region covering a single point.
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            lat_min: point.lat(),
            lat_max: point.lat(),
            west: point.lng(),
            east: point.lng(),
            wraps_antimeridian: false,
        }
    }

    /// Creates the smallest region covering all given points, or `None`
    /// for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut region = Self::from_point(*first);
        for p in rest {
            region.extend(p);
        }
        Some(region)
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn wraps_antimeridian(&self) -> bool {
        self.wraps_antimeridian
    }

    /// Longitude span in degrees, measured eastward from `west` and
    /// allowing for the antimeridian crossing; always in [0, 360).
    pub fn lng_span(&self) -> f64 {
        if self.wraps_antimeridian {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn is_point(&self) -> bool {
        self.lat_span() == 0.0 && self.lng_span() == 0.0
    }

    /// True if the given longitude lies within the region's interval.
    pub fn contains_lng(&self, lng: f64) -> bool {
        let lng = wrap_lng(lng);
        if self.wraps_antimeridian {
            lng >= self.west || lng <= self.east
        } else {
            lng >= self.west && lng <= self.east
        }
    }

    /// Extends the region to include a point, growing the longitude
    /// interval toward whichever side adds the smaller arc.
    pub fn extend(&mut self, point: &GeoPoint) {
        self.lat_min = self.lat_min.min(point.lat());
        self.lat_max = self.lat_max.max(point.lat());

        let lng = point.lng();
        if self.contains_lng(lng) {
            return;
        }
        // Arc added when growing eastward vs. westward.
        let east_growth = (lng - self.east).rem_euclid(360.0);
        let west_growth = (self.west - lng).rem_euclid(360.0);
        if east_growth <= west_growth {
            self.east = lng;
        } else {
            self.west = lng;
        }
        self.wraps_antimeridian = self.west > self.east;
    }

    /// Returns the union of this region with another.
    pub fn union(&self, other: &BoundingRegion) -> BoundingRegion {
        let mut merged = *self;
        merged.lat_min = merged.lat_min.min(other.lat_min);
        merged.lat_max = merged.lat_max.max(other.lat_max);
        merged.extend(&GeoPoint::normalized(other.lat_min, other.west));
        merged.extend(&GeoPoint::normalized(other.lat_min, other.east));
        merged
    }

    /// Gets the center point of the region (wrap-aware in longitude).
    pub fn center(&self) -> GeoPoint {
        let lat = (self.lat_min + self.lat_max) / 2.0;
        let lng = wrap_lng(self.west + self.lng_span() / 2.0);
        GeoPoint::normalized(lat, lng)
    }
}
