//! Common test fixtures for field rendering tests.

/// Common bounding boxes as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// Unit square, convenient for pixel arithmetic
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);

    /// Straddles the antimeridian in 0..360 longitudes
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, -50.0, 220.0, 50.0);
}

/// Common frame instants.
pub mod time {
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    pub const FORECAST_HOURS: [u32; 4] = [0, 3, 6, 12];
}

/// Style documents in the JSON format read by `StyleDocument`.
pub mod styles {
    /// Name of every style defined in [`STYLE_DOCUMENT`].
    pub const STYLE_NAMES: [&str; 4] = ["temperature", "precipitation", "wind_speed", "land_cover"];

    /// One style of each function type.
    pub const STYLE_DOCUMENT: &str = r##"{
        "version": "1.0",
        "styles": {
            "temperature": {
                "name": "Air temperature",
                "units": "K",
                "colour": {
                    "type": "interpolate",
                    "points": [
                        {"data": 250, "value": "#0000FF"},
                        {"data": 273.15, "value": "white"},
                        {"data": 310, "value": "#FF0000"}
                    ],
                    "fallback": "transparent"
                },
                "legend": {"title": "Temperature K"}
            },
            "precipitation": {
                "name": "Precipitation",
                "units": "mm",
                "colour": {
                    "type": "threshold",
                    "thresholds": [0.1, 5, 20],
                    "values": ["transparent", "#A0C8FF", "#3060FF", "#FF00FF"]
                },
                "opacity": {
                    "type": "threshold",
                    "thresholds": [0.1],
                    "values": [0.0, 0.8]
                }
            },
            "wind_speed": {
                "name": "Wind speed",
                "units": "m/s",
                "colour": {
                    "type": "segment",
                    "range": [0, 50],
                    "num_segments": 10,
                    "palette": "viridis",
                    "above_max": "magenta"
                }
            },
            "land_cover": {
                "name": "Land cover",
                "colour": {
                    "type": "map",
                    "table": {"1": "green", "2": "yellow", "3": [0, 0, 200]},
                    "fallback": "grey"
                }
            }
        }
    }"##;

    /// A threshold style whose thresholds are not ascending.
    pub const INVALID_STYLE_DOCUMENT: &str = r##"{
        "version": "1.0",
        "styles": {
            "broken": {
                "name": "Broken",
                "colour": {
                    "type": "threshold",
                    "thresholds": [10, 5],
                    "values": ["red", "green", "blue"]
                }
            }
        }
    }"##;
}
