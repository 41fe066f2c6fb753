//! Arithmetic midpoint of a coordinate set.
//!
//! Latitudes and longitudes are averaged independently. This is not a
//! geodesic centroid; at city scale the error is well inside the candidate
//! search radius.

use crate::{Coordinate, GeoError, Result};

/// Coordinate-wise arithmetic mean of `points`.
///
/// Fails with [`GeoError::EmptyInput`] when `points` is empty. The result does
/// not depend on the order of `points`.
///
/// ```
/// use rendezvous_geo::{midpoint, Coordinate};
///
/// let m = midpoint(&[
///     Coordinate::new(0.0, 0.0),
///     Coordinate::new(0.0, 2.0),
///     Coordinate::new(2.0, 0.0),
/// ])
/// .unwrap();
///
/// assert!((m.latitude - 2.0 / 3.0).abs() < 1e-12);
/// assert!((m.longitude - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn midpoint<'a, I>(points: I) -> Result<Coordinate>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let (mut lats, mut lngs): (Vec<f64>, Vec<f64>) = points
        .into_iter()
        .map(|c| (c.latitude, c.longitude))
        .unzip();

    if lats.is_empty() {
        return Err(GeoError::EmptyInput);
    }

    Ok(Coordinate::new(sorted_mean(&mut lats), sorted_mean(&mut lngs)))
}

/// Mean over values summed in ascending order, so the rounding is the same
/// for every permutation of the input.
#[allow(clippy::cast_precision_loss)]
fn sorted_mean(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}
