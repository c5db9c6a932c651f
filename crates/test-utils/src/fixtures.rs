//! Common test fixtures for climslice tests.
//!
//! Pre-defined geometries, grids and dataset metadata that represent common
//! scenarios in climate data subsetting.

use geo::{polygon, Polygon};

/// Regular grids used across the test suites.
pub mod grid {
    /// Shape, origin and cell size of a regular grid.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub nrow: usize,
        pub ncol: usize,
        pub min_x: f64,
        pub min_y: f64,
        pub resolution: f64,
    }

    /// Simple 4x4 grid of unit cells at the origin
    pub const UNIT_4X4: GridSpec = GridSpec {
        nrow: 4,
        ncol: 4,
        min_x: 0.0,
        min_y: 0.0,
        resolution: 1.0,
    };

    /// 2 degree global grid in 0..360 longitudes
    pub const GLOBAL_2DEG: GridSpec = GridSpec {
        nrow: 90,
        ncol: 180,
        min_x: 0.0,
        min_y: -90.0,
        resolution: 2.0,
    };

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.nrow * self.ncol
        }

        /// Row (y) centers and bounds.
        pub fn rows(&self) -> (Vec<f64>, Vec<(f64, f64)>) {
            crate::regular_axis(self.min_y, self.resolution, self.nrow)
        }

        /// Column (x) centers and bounds.
        pub fn cols(&self) -> (Vec<f64>, Vec<(f64, f64)>) {
            crate::regular_axis(self.min_x, self.resolution, self.ncol)
        }
    }
}

/// A rectangle polygon from `(min_x, min_y)` to `(max_x, max_y)`.
pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
    ]
}

/// A triangle covering the lower-left half of the unit 4x4 grid.
pub fn triangle_4x4() -> Polygon<f64> {
    polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 0.0, y: 4.0)]
}

/// Metadata of a NARCCAP regional run on a Lambert conformal grid.
pub const NARCCAP_LAMBERT_METADATA: &str = r#"{
    "global_attributes": {"Conventions": "CF-1.0"},
    "variables": {
        "tas": {
            "dimensions": ["time", "yc", "xc"],
            "attributes": {"grid_mapping": "Lambert_Conformal", "units": "K"}
        },
        "Lambert_Conformal": {
            "attributes": {
                "grid_mapping_name": "lambert_conformal_conic",
                "standard_parallel": [30.0, 60.0],
                "longitude_of_central_meridian": -97.0,
                "latitude_of_projection_origin": 47.5,
                "false_easting": 3825000.0,
                "false_northing": 3187500.0
            }
        },
        "xc": {
            "dimensions": ["xc"],
            "attributes": {"standard_name": "projection_x_coordinate", "units": "m", "axis": "X"}
        },
        "yc": {
            "dimensions": ["yc"],
            "attributes": {"standard_name": "projection_y_coordinate", "units": "m", "axis": "Y"}
        },
        "time": {
            "dimensions": ["time"],
            "attributes": {"units": "days since 1968-01-01 00:00:00", "bounds": "time_bnds"}
        }
    }
}"#;

/// Metadata of a geographic dataset on 0..360 longitudes.
pub const GEOGRAPHIC_METADATA: &str = r#"{
    "variables": {
        "tas": {"dimensions": ["time", "lat", "lon"], "attributes": {"units": "K"}},
        "lat": {"dimensions": ["lat"], "attributes": {"units": "degrees_north", "bounds": "lat_bnds"}},
        "lon": {"dimensions": ["lon"], "attributes": {"units": "degrees_east", "bounds": "lon_bnds"}},
        "time": {"dimensions": ["time"], "attributes": {"units": "days since 1950-01-01 00:00:00"}}
    }
}"#;
