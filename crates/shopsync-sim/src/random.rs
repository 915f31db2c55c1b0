use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;

/// Days covered by [`random_processed_at`].
pub const PROCESSED_AT_WINDOW_DAYS: i64 = 365 * 2;

/// Random integer in `[min, max]` biased toward `min`.
///
/// Draws `r` uniformly from `[0, 1)` and returns `min + (max - min) * r^weight`
/// truncated. `weight = 2` gives a moderate bias, `3` a stronger one; `max`
/// itself is practically never produced.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn random_number_exp<R: Rng>(rng: &mut R, min: u32, max: u32, weight: i32) -> u32 {
    let r: f64 = rng.random::<f64>().powi(weight);
    let span = f64::from(max.saturating_sub(min));
    min + (span * r) as u32
}

/// Random instant within the last two years before `now`, as RFC 3339 with a
/// `Z` suffix.
pub fn random_processed_at<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> String {
    let window = Duration::days(PROCESSED_AT_WINDOW_DAYS).num_seconds();
    let offset = rng.random_range(0..=window);
    let at = now - Duration::seconds(window - offset);
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
