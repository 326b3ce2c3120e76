use approx::assert_relative_eq;
use geogrid::cell_size::AngularCellOffset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Application record used by the integration tests: only reachable through an accessor.
#[derive(Debug, Clone)]
pub struct Sighting {
    pub longitude: f64,
    pub latitude: f64,
}

impl Sighting {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Sighting {
            longitude,
            latitude,
        }
    }

    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// `n` sightings uniformly drawn in `[lng_min, lng_max) × [lat_min, lat_max)`.
pub fn random_sightings(
    seed: u64,
    n: usize,
    (lng_min, lng_max): (f64, f64),
    (lat_min, lat_max): (f64, f64),
) -> Vec<Sighting> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Sighting::new(
                rng.random_range(lng_min..lng_max),
                rng.random_range(lat_min..lat_max),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn assert_offset_close(actual: &AngularCellOffset, expected: &AngularCellOffset, epsilon: f64) {
    assert_relative_eq!(actual.x_offset, expected.x_offset, epsilon = epsilon);
    assert_relative_eq!(actual.y_offset, expected.y_offset, epsilon = epsilon);
}
