//! Locate command - show the tile addressing for a point.

use mapstitch::coord::{resolve, Anchor, GeoPoint};

use crate::error::CliError;

/// Run the locate command.
pub fn run(lat: f64, lon: f64, zoom: u8, precision: u32) -> Result<(), CliError> {
    let point = GeoPoint::rounded(lat, lon, precision);
    point.validate().map_err(CliError::Locate)?;
    let anchor = resolve(point, zoom, precision).map_err(CliError::Locate)?;

    print!("{}", describe(&anchor));
    Ok(())
}

fn describe(anchor: &Anchor) -> String {
    let bounds = &anchor.bounds;
    format!(
        "Point:        {}\n\
         Tile:         x={}, y={}, zoom={}\n\
         Top left:     {}\n\
         Bottom right: {}\n\
         Per pixel:    {:.10} lat, {:.10} lon\n",
        anchor.point,
        anchor.tile.x,
        anchor.tile.y,
        anchor.tile.zoom,
        bounds.top_left,
        bounds.bottom_right,
        anchor.scale.degrees_lat_per_pixel,
        anchor.scale.degrees_lon_per_pixel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_london() {
        let point = GeoPoint::rounded(51.563839178, -0.164794922, 8);
        let anchor = resolve(point, 19, 8).unwrap();

        let text = describe(&anchor);
        assert!(text.contains("x=261904, y=174207, zoom=19"));
        assert!(text.starts_with("Point:        (51.56383918, -0.16479492)"));
    }

    #[test]
    fn test_rejects_pole() {
        assert!(matches!(run(90.0, 0.0, 19, 8), Err(CliError::Locate(_))));
    }
}
