use anyhow::{Result, bail};
use rapidroute::geodesy::{CompassOctant, haversine_distance, initial_bearing, reciprocal_bearing};

/// Print distance and bearing from the first point to the second
pub fn handle_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<()> {
    for (name, value, limit) in [
        ("lat1", lat1, 90.0),
        ("lon1", lon1, 180.0),
        ("lat2", lat2, 90.0),
        ("lon2", lon2, 180.0),
    ] {
        if !value.is_finite() || value.abs() > limit {
            bail!("{} must be within +/-{} degrees, got {}", name, limit, value);
        }
    }

    let distance = haversine_distance(lat1, lon1, lat2, lon2);
    let bearing = initial_bearing(lat1, lon1, lat2, lon2);
    let approach_side = CompassOctant::from_bearing(reciprocal_bearing(bearing));

    println!("distance: {:.1} m", distance);
    println!(
        "bearing:  {:.1} deg ({})",
        bearing,
        CompassOctant::from_bearing(bearing)
    );
    println!("approaching from the {}", approach_side);
    Ok(())
}
