// ── Decision engine ──
//
// Pure function of (weather, sun, clock, thresholds). No I/O, no logging,
// no hidden clock: the caller passes `now`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter};

use crate::model::{SourceTime, SunPosition, Thresholds, WeatherSnapshot};

/// One open/close predicate, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Condition {
    Clear,
    Calm,
    NoRain,
    AboveFreezing,
    Daytime,
    SunHigh,
    SunFacing,
}

impl Condition {
    /// Short human label for the predicate's outcome.
    pub fn label(self, passed: bool) -> &'static str {
        match (self, passed) {
            (Self::Clear, true) => "Clear",
            (Self::Clear, false) => "Cloudy",
            (Self::Calm, true) => "Calm",
            (Self::Calm, false) => "Windy",
            (Self::NoRain, true) => "No rain",
            (Self::NoRain, false) => "Rain",
            (Self::AboveFreezing, true) => "Above freezing",
            (Self::AboveFreezing, false) => "Freezing",
            (Self::Daytime, true) => "Daytime",
            (Self::Daytime, false) => "Nighttime",
            (Self::SunHigh, true) => "Sun high",
            (Self::SunHigh, false) => "Sun low",
            (Self::SunFacing, true) => "Sun facing",
            (Self::SunFacing, false) => "Sun not facing",
        }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub should_open: bool,
    /// All-clear summary when opening, otherwise every failing check.
    pub reason: String,
    /// Active predicates in evaluation order.
    pub conditions: IndexMap<Condition, bool>,
}

impl Decision {
    /// `✓ Clear, ✗ Windy, ...` for log lines.
    pub fn checklist(&self) -> String {
        self.conditions
            .iter()
            .map(|(condition, &passed)| {
                format!("{} {}", if passed { '✓' } else { '✗' }, condition.label(passed))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Whether `now` falls within `[sunrise, sunset]`.
///
/// Offset-aware bounds are compared as instants. If either bound is naive
/// civil time, everything is compared as wall-clock time at the source
/// location, with `now` shifted by the snapshot's UTC offset.
pub fn is_daytime(weather: &WeatherSnapshot, now: DateTime<Utc>) -> bool {
    match (&weather.sunrise, &weather.sunset) {
        (SourceTime::Offset(rise), SourceTime::Offset(set)) => {
            let now = now.fixed_offset();
            *rise <= now && now <= *set
        }
        (rise, set) => {
            let local = now.with_timezone(&weather.utc_offset).naive_local();
            rise.naive_local() <= local && local <= set.naive_local()
        }
    }
}

/// Combine every predicate into one open/close directive.
pub fn decide(
    weather: &WeatherSnapshot,
    sun: &SunPosition,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Decision {
    let mut conditions = IndexMap::new();
    let mut failures = Vec::new();

    let clear = weather.cloud_cover_pct <= thresholds.max_cloud_cover_pct;
    conditions.insert(Condition::Clear, clear);
    if !clear {
        failures.push(format!(
            "Too cloudy ({}% > {}%)",
            weather.cloud_cover_pct, thresholds.max_cloud_cover_pct
        ));
    }

    let calm = weather.wind_speed_mph < thresholds.max_wind_mph;
    conditions.insert(Condition::Calm, calm);
    if !calm {
        failures.push(format!(
            "Too windy ({} >= {} mph)",
            weather.wind_speed_mph, thresholds.max_wind_mph
        ));
    }

    let no_rain = weather.precipitation_mm_per_hr.abs() < f64::EPSILON;
    conditions.insert(Condition::NoRain, no_rain);
    if !no_rain {
        failures.push(format!("Raining ({} mm/h)", weather.precipitation_mm_per_hr));
    }

    if let Some(temperature) = weather.temperature_f {
        let above_freezing = temperature > 32.0;
        conditions.insert(Condition::AboveFreezing, above_freezing);
        if !above_freezing {
            failures.push(format!("Too cold ({temperature}°F <= 32°F)"));
        }
    }

    let daytime = is_daytime(weather, now);
    conditions.insert(Condition::Daytime, daytime);
    if !daytime {
        failures.push(format!(
            "Nighttime (sunrise {}, sunset {})",
            weather.sunrise.clock_label(),
            weather.sunset.clock_label()
        ));
    }

    let sun_high = sun.altitude_deg >= thresholds.min_sun_altitude_deg;
    conditions.insert(Condition::SunHigh, sun_high);
    if !sun_high {
        failures.push(format!(
            "Sun too low ({:.1}° < {}°)",
            sun.altitude_deg, thresholds.min_sun_altitude_deg
        ));
    }

    let sun_facing = (thresholds.azimuth_min_deg..=thresholds.azimuth_max_deg)
        .contains(&sun.azimuth_deg);
    conditions.insert(Condition::SunFacing, sun_facing);
    if !sun_facing {
        failures.push(format!(
            "Sun not facing target (azimuth {:.1}°, need {}°-{}°)",
            sun.azimuth_deg, thresholds.azimuth_min_deg, thresholds.azimuth_max_deg
        ));
    }

    let should_open = failures.is_empty();
    let reason = if should_open {
        let temperature = weather
            .temperature_f
            .map(|t| format!("{t}°F, "))
            .unwrap_or_default();
        format!(
            "All conditions met: {}% clouds, {} mph wind, {} mm/h rain, {temperature}sun azimuth {:.1}° (altitude {:.1}°)",
            weather.cloud_cover_pct,
            weather.wind_speed_mph,
            weather.precipitation_mm_per_hr,
            sun.azimuth_deg,
            sun.altitude_deg
        )
    } else {
        failures.join(", ")
    };

    Decision {
        should_open,
        reason,
        conditions,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::model::Location;
    use crate::solar;

    fn thresholds() -> Thresholds {
        Thresholds::new(20.0, 10.0, 20.0).unwrap()
    }

    fn local(h: u32, m: u32) -> SourceTime {
        SourceTime::Local(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
        )
    }

    /// Clear, calm, dry, warm June morning in San Francisco (UTC-7).
    fn fair_weather() -> WeatherSnapshot {
        WeatherSnapshot {
            cloud_cover_pct: 10.0,
            wind_speed_mph: 4.0,
            precipitation_mm_per_hr: 0.0,
            temperature_f: Some(68.0),
            is_day: true,
            observation_time: "2024-06-01T10:00".into(),
            sunrise: local(5, 48),
            sunset: local(20, 29),
            utc_offset: FixedOffset::west_opt(7 * 3600).unwrap(),
        }
    }

    fn southeast_sun() -> SunPosition {
        SunPosition {
            azimuth_deg: 135.0,
            altitude_deg: 40.0,
        }
    }

    /// 10:00 local in UTC-7.
    fn mid_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap()
    }

    // ── Scenarios ───────────────────────────────────────────────────

    #[test]
    fn fair_weather_opens_with_summary() {
        let decision = decide(&fair_weather(), &southeast_sun(), mid_morning(), &thresholds());
        assert!(decision.should_open);
        assert_eq!(
            decision.reason,
            "All conditions met: 10% clouds, 4 mph wind, 0 mm/h rain, 68°F, sun azimuth 135.0° (altitude 40.0°)"
        );
        assert_eq!(
            decision.conditions.keys().copied().collect::<Vec<_>>(),
            Condition::iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn windy_day_closes_and_names_wind() {
        let weather = WeatherSnapshot {
            wind_speed_mph: 15.0,
            ..fair_weather()
        };
        let decision = decide(&weather, &southeast_sun(), mid_morning(), &thresholds());
        assert!(!decision.should_open);
        assert_eq!(decision.reason, "Too windy (15 >= 10 mph)");
        assert!(!decision.conditions[&Condition::Calm]);
    }

    #[test]
    fn computed_sun_position_feeds_the_decision() {
        let sf = Location::new(37.77, -122.42).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap();
        let sun = solar::position(&sf, now);
        let decision = decide(&fair_weather(), &sun, now, &thresholds());
        assert!(decision.should_open, "{}", decision.reason);
    }

    // ── AND invariant ───────────────────────────────────────────────

    #[test]
    fn any_single_failure_forces_closed() {
        let weather = fair_weather();
        let sun = southeast_sun();
        let now = mid_morning();
        let cases: Vec<(Condition, WeatherSnapshot, SunPosition, DateTime<Utc>)> = vec![
            (
                Condition::Clear,
                WeatherSnapshot {
                    cloud_cover_pct: 80.0,
                    ..weather.clone()
                },
                sun,
                now,
            ),
            (
                Condition::Calm,
                WeatherSnapshot {
                    wind_speed_mph: 25.0,
                    ..weather.clone()
                },
                sun,
                now,
            ),
            (
                Condition::NoRain,
                WeatherSnapshot {
                    precipitation_mm_per_hr: 0.4,
                    ..weather.clone()
                },
                sun,
                now,
            ),
            (
                Condition::AboveFreezing,
                WeatherSnapshot {
                    temperature_f: Some(20.0),
                    ..weather.clone()
                },
                sun,
                now,
            ),
            (
                Condition::Daytime,
                weather.clone(),
                sun,
                Utc.with_ymd_and_hms(2024, 6, 2, 5, 0, 0).unwrap(),
            ),
            (
                Condition::SunHigh,
                weather.clone(),
                SunPosition {
                    altitude_deg: 5.0,
                    ..sun
                },
                now,
            ),
            (
                Condition::SunFacing,
                weather.clone(),
                SunPosition {
                    azimuth_deg: 250.0,
                    ..sun
                },
                now,
            ),
        ];

        for (failing, weather, sun, now) in cases {
            let decision = decide(&weather, &sun, now, &thresholds());
            assert!(!decision.should_open, "{failing} should force closed");
            let failed: Vec<_> = decision
                .conditions
                .iter()
                .filter(|(_, passed)| !**passed)
                .map(|(c, _)| *c)
                .collect();
            assert_eq!(failed, vec![failing]);
            assert!(!decision.reason.contains(", "), "one reason only: {}", decision.reason);
        }
    }

    #[test]
    fn every_failure_is_listed_in_order() {
        let weather = WeatherSnapshot {
            cloud_cover_pct: 90.0,
            wind_speed_mph: 12.0,
            precipitation_mm_per_hr: 1.5,
            temperature_f: Some(30.0),
            ..fair_weather()
        };
        let sun = SunPosition {
            azimuth_deg: 300.0,
            altitude_deg: -4.3,
        };
        let night = Utc.with_ymd_and_hms(2024, 6, 2, 6, 0, 0).unwrap();
        let decision = decide(&weather, &sun, night, &thresholds());
        assert_eq!(
            decision.reason,
            "Too cloudy (90% > 20%), Too windy (12 >= 10 mph), Raining (1.5 mm/h), \
             Too cold (30°F <= 32°F), Nighttime (sunrise 05:48, sunset 20:29), \
             Sun too low (-4.3° < 20°), Sun not facing target (azimuth 300.0°, need 90°-180°)"
        );
        assert!(decision.conditions.values().all(|passed| !passed));
        assert_eq!(
            decision.checklist(),
            "✗ Cloudy, ✗ Windy, ✗ Rain, ✗ Freezing, ✗ Nighttime, ✗ Sun low, ✗ Sun not facing"
        );
    }

    #[test]
    fn decide_is_pure() {
        let weather = WeatherSnapshot {
            cloud_cover_pct: 50.0,
            ..fair_weather()
        };
        let a = decide(&weather, &southeast_sun(), mid_morning(), &thresholds());
        let b = decide(&weather, &southeast_sun(), mid_morning(), &thresholds());
        assert_eq!(a, b);
    }

    // ── Boundaries ──────────────────────────────────────────────────

    #[test]
    fn azimuth_range_is_inclusive() {
        let facing = |azimuth_deg| {
            let sun = SunPosition {
                azimuth_deg,
                ..southeast_sun()
            };
            decide(&fair_weather(), &sun, mid_morning(), &thresholds()).conditions
                [&Condition::SunFacing]
        };
        assert!(!facing(89.9));
        assert!(facing(90.0));
        assert!(facing(180.0));
        assert!(!facing(180.1));
    }

    #[test]
    fn custom_azimuth_range_is_honoured() {
        let thresholds = thresholds().with_azimuth_range(180.0, 270.0).unwrap();
        let decision = decide(&fair_weather(), &southeast_sun(), mid_morning(), &thresholds);
        assert!(!decision.conditions[&Condition::SunFacing]);
        assert!(decision.reason.contains("need 180°-270°"));
    }

    #[test]
    fn cloud_threshold_is_inclusive_and_wind_is_strict() {
        let at_limits = WeatherSnapshot {
            cloud_cover_pct: 20.0,
            wind_speed_mph: 10.0,
            ..fair_weather()
        };
        let decision = decide(&at_limits, &southeast_sun(), mid_morning(), &thresholds());
        assert!(decision.conditions[&Condition::Clear]);
        assert!(!decision.conditions[&Condition::Calm]);
    }

    #[test]
    fn altitude_threshold_is_inclusive() {
        let sun = SunPosition {
            altitude_deg: 20.0,
            ..southeast_sun()
        };
        let decision = decide(&fair_weather(), &sun, mid_morning(), &thresholds());
        assert!(decision.conditions[&Condition::SunHigh]);
    }

    #[test]
    fn freezing_point_is_too_cold() {
        let weather = WeatherSnapshot {
            temperature_f: Some(32.0),
            ..fair_weather()
        };
        let decision = decide(&weather, &southeast_sun(), mid_morning(), &thresholds());
        assert_eq!(decision.reason, "Too cold (32°F <= 32°F)");
    }

    #[test]
    fn missing_temperature_skips_freezing_check() {
        let weather = WeatherSnapshot {
            temperature_f: None,
            ..fair_weather()
        };
        let decision = decide(&weather, &southeast_sun(), mid_morning(), &thresholds());
        assert!(decision.should_open);
        assert!(!decision.conditions.contains_key(&Condition::AboveFreezing));
        assert!(!decision.reason.contains("°F"));
    }

    #[test]
    fn daytime_bounds_are_inclusive_in_local_time() {
        let weather = fair_weather();
        // Sunrise 05:48 / sunset 20:29 local = 12:48 / 03:29(+1) UTC.
        let utc = |d, h, m| Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap();
        assert!(!is_daytime(&weather, utc(1, 12, 47)));
        assert!(is_daytime(&weather, utc(1, 12, 48)));
        assert!(is_daytime(&weather, utc(2, 3, 29)));
        assert!(!is_daytime(&weather, utc(2, 3, 30)));
    }

    #[test]
    fn offset_aware_bounds_compare_as_instants() {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let weather = WeatherSnapshot {
            sunrise: SourceTime::Offset(offset.with_ymd_and_hms(2024, 6, 1, 5, 48, 0).unwrap()),
            sunset: SourceTime::Offset(offset.with_ymd_and_hms(2024, 6, 1, 20, 29, 0).unwrap()),
            // Deliberately wrong: must not be used for offset-aware bounds.
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            ..fair_weather()
        };
        let utc = |d, h, m| Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap();
        assert!(!is_daytime(&weather, utc(1, 12, 47)));
        assert!(is_daytime(&weather, utc(1, 12, 48)));
        assert!(is_daytime(&weather, utc(2, 3, 29)));
        assert!(!is_daytime(&weather, utc(2, 3, 30)));
    }
}
