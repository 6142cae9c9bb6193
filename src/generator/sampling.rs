use rand::seq::SliceRandom;
use rand::Rng;

use crate::generator::pools::Bounds;
use crate::models::Coordinates;

/// Up to `k` distinct elements of `pool`, chosen uniformly without replacement.
/// Returns the whole pool (shuffled) when `k` exceeds its size.
pub fn distinct_sample<T: Copy, R: Rng + ?Sized>(pool: &[T], k: usize, rng: &mut R) -> Vec<T> {
    pool.choose_multiple(rng, k.min(pool.len()))
        .copied()
        .collect()
}

/// Uniform coordinate inside `bounds`
pub fn random_coordinate<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> Coordinates {
    Coordinates {
        latitude: rng.gen_range(bounds.south..bounds.north),
        longitude: rng.gen_range(bounds.west..bounds.east),
    }
}
