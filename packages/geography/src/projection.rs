//! Lambert Conformal Conic projection.
//!
//! Ellipsoidal two-standard-parallel form (Snyder, *Map Projections: A
//! Working Manual*, eqs. 15-1 to 15-10). The default parameters are those
//! of Statistics Canada Lambert (EPSG:3347) on the GRS80 ellipsoid.

use geo::{Coord, MapCoords, MultiPolygon};

/// GRS80 semi-major axis in meters.
const GRS80_A: f64 = 6_378_137.0;

/// GRS80 inverse flattening.
const GRS80_INV_F: f64 = 298.257_222_101;

/// A configured Lambert Conformal Conic projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformalConic {
    a: f64,
    e: f64,
    n: f64,
    f: f64,
    rho0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Default for LambertConformalConic {
    fn default() -> Self {
        Self::statistics_canada()
    }
}

impl LambertConformalConic {
    /// Statistics Canada Lambert: `lat_1=49 lat_2=77 lat_0=63.39
    /// lon_0=-91.86 x_0=6200000 y_0=3000000`, GRS80.
    #[must_use]
    pub fn statistics_canada() -> Self {
        Self::new(49.0, 77.0, 63.39, -91.86, 6_200_000.0, 3_000_000.0)
    }

    /// Builds a projection on the GRS80 ellipsoid. Angles are in degrees.
    #[must_use]
    pub fn new(
        lat1: f64,
        lat2: f64,
        lat0: f64,
        lon0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let a = GRS80_A;
        let flattening = 1.0 / GRS80_INV_F;
        let e = flattening.mul_add(-flattening, 2.0 * flattening).sqrt();

        let (phi1, phi2, phi0) = (lat1.to_radians(), lat2.to_radians(), lat0.to_radians());

        let m1 = m(phi1, e);
        let m2 = m(phi2, e);
        let t1 = t(phi1, e);
        let t2 = t(phi2, e);

        let n = if (phi1 - phi2).abs() < f64::EPSILON {
            phi1.sin()
        } else {
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };
        let f = m1 / (n * t1.powf(n));
        let rho0 = a * f * t(phi0, e).powf(n);

        Self {
            a,
            e,
            n,
            f,
            rho0,
            lon0: lon0.to_radians(),
            false_easting,
            false_northing,
        }
    }

    /// Projects a longitude/latitude pair (degrees) to meters.
    #[must_use]
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let rho = self.a * self.f * t(lat.to_radians(), self.e).powf(self.n);
        let theta = self.n * (lon.to_radians() - self.lon0);

        (
            rho.mul_add(theta.sin(), self.false_easting),
            rho.mul_add(-theta.cos(), self.false_northing + self.rho0),
        )
    }

    /// Projects every coordinate of a geometry.
    #[must_use]
    pub fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|c| {
            let (x, y) = self.project(c.x, c.y);
            Coord { x, y }
        })
    }
}

fn m(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    phi.cos() / es.mul_add(-es, 1.0).sqrt()
}

fn t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}
