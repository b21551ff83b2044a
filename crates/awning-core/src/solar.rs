// ── Solar position ──
//
// NOAA solar calculator equations (after Meeus, "Astronomical Algorithms"),
// evaluated for a single UTC instant. Accurate to roughly 0.01° in azimuth
// and altitude between 1800 and 2100.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::model::{Location, SunPosition};

/// Julian date of 0001-01-01T00:00 (proleptic Gregorian) minus one day,
/// so that `num_days_from_ce()` lines up directly.
const JD_CE_EPOCH: f64 = 1_721_424.5;
const JD_J2000: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Date-dependent terms shared by every location.
#[derive(Debug, Clone, Copy)]
struct SolarTerms {
    declination_deg: f64,
    /// Minutes.
    equation_of_time: f64,
}

fn julian_day(instant: DateTime<Utc>) -> f64 {
    let day = f64::from(instant.num_days_from_ce());
    let secs = f64::from(instant.num_seconds_from_midnight())
        + f64::from(instant.nanosecond() % 1_000_000_000) / 1e9;
    day + JD_CE_EPOCH + secs / 86_400.0
}

fn solar_terms(julian_century: f64) -> SolarTerms {
    let t = julian_century;

    let mean_long = (280.466_46 + t * (36_000.769_83 + t * 0.000_303_2)).rem_euclid(360.0);
    let mean_anom = 357.529_11 + t * (35_999.050_29 - 0.000_153_7 * t);
    let eccentricity = 0.016_708_634 - t * (0.000_042_037 + 0.000_000_126_7 * t);

    let m = mean_anom.to_radians();
    let center = m.sin() * (1.914_602 - t * (0.004_817 + 0.000_014 * t))
        + (2.0 * m).sin() * (0.019_993 - 0.000_101 * t)
        + (3.0 * m).sin() * 0.000_289;
    let true_long = mean_long + center;

    let omega = (125.04 - 1_934.136 * t).to_radians();
    let apparent_long = true_long - 0.005_69 - 0.004_78 * omega.sin();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.000_59 - t * 0.001_813))) / 60.0) / 60.0;
    let obliquity = mean_obliquity + 0.002_56 * omega.cos();

    let declination_deg = (obliquity.to_radians().sin() * apparent_long.to_radians().sin())
        .asin()
        .to_degrees();

    let y = (obliquity.to_radians() / 2.0).tan().powi(2);
    let l0 = mean_long.to_radians();
    let e = eccentricity;
    let equation_of_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * e * m.sin() + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * e * e * (2.0 * m).sin())
        .to_degrees();

    SolarTerms {
        declination_deg,
        equation_of_time,
    }
}

/// Atmospheric refraction (degrees) to add to the geometric elevation.
fn refraction_correction(elevation_deg: f64) -> f64 {
    let tan_e = elevation_deg.to_radians().tan();
    let arcsec = if elevation_deg > 85.0 {
        0.0
    } else if elevation_deg > 5.0 {
        58.1 / tan_e - 0.07 / tan_e.powi(3) + 0.000_086 / tan_e.powi(5)
    } else if elevation_deg > -0.575 {
        let h = elevation_deg;
        1_735.0 + h * (-518.2 + h * (103.4 + h * (-12.79 + h * 0.711)))
    } else {
        -20.772 / tan_e
    };
    arcsec / 3_600.0
}

/// Sun azimuth and apparent altitude at `location` for `instant`.
pub fn position(location: &Location, instant: DateTime<Utc>) -> SunPosition {
    let jd = julian_day(instant);
    let terms = solar_terms((jd - JD_J2000) / DAYS_PER_CENTURY);

    let minutes_utc = f64::from(instant.num_seconds_from_midnight()) / 60.0;
    let true_solar_time =
        (minutes_utc + terms.equation_of_time + 4.0 * location.longitude()).rem_euclid(1_440.0);
    // true_solar_time is in [0, 1440), so the angle lands in [-180, 180).
    let hour_angle = true_solar_time / 4.0 - 180.0;

    let lat = location.latitude().to_radians();
    let decl = terms.declination_deg.to_radians();
    let cos_zenith =
        lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.to_radians().cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos();
    let elevation_deg = 90.0 - zenith.to_degrees();

    let denominator = lat.cos() * zenith.sin();
    let azimuth_deg = if denominator.abs() < 1e-9 {
        // Sun at the zenith or observer at a pole: bearing is undefined.
        180.0
    } else {
        let cos_az = ((lat.sin() * zenith.cos() - decl.sin()) / denominator).clamp(-1.0, 1.0);
        let a = cos_az.acos().to_degrees();
        if hour_angle > 0.0 {
            (a + 180.0).rem_euclid(360.0)
        } else {
            (540.0 - a).rem_euclid(360.0)
        }
    };

    SunPosition {
        azimuth_deg,
        altitude_deg: elevation_deg + refraction_correction(elevation_deg),
    }
}
