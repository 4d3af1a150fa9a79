//! Honeypot submission classifier
//!
//! A submission is spam when the hidden name field was filled in, or when it
//! came back faster than the configured interval after the form was
//! rendered. Anything ambiguous (missing markers, unreadable timestamp) is
//! rejected. The classifier never returns an error: callers show the same
//! confirmation either way.

use crate::clock::{Clock, SystemClock};
use crate::config::HoneypotConfig;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read access to submitted form values by field name
pub trait SubmissionFields {
    fn field(&self, name: &str) -> Option<&str>;
}

impl SubmissionFields for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl SubmissionFields for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Raw urlencoded pairs; the last occurrence of a name wins, so a trap
/// value cannot be masked by an empty copy sent ahead of it
impl SubmissionFields for [(String, String)] {
    fn field(&self, name: &str) -> Option<&str> {
        self.iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl SubmissionFields for Vec<(String, String)> {
    fn field(&self, name: &str) -> Option<&str> {
        self.as_slice().field(name)
    }
}

/// A render timestamp as it may arrive: form text or an already parsed number
pub trait TimestampInput {
    /// Unix seconds, or `None` when the value is not a whole number
    fn unix_secs(&self) -> Option<i64>;
}

impl TimestampInput for str {
    fn unix_secs(&self) -> Option<i64> {
        self.trim().parse().ok()
    }
}

impl TimestampInput for &str {
    fn unix_secs(&self) -> Option<i64> {
        (**self).unix_secs()
    }
}

impl TimestampInput for String {
    fn unix_secs(&self) -> Option<i64> {
        self.as_str().unix_secs()
    }
}

impl TimestampInput for i64 {
    fn unix_secs(&self) -> Option<i64> {
        Some(*self)
    }
}

impl TimestampInput for u64 {
    fn unix_secs(&self) -> Option<i64> {
        i64::try_from(*self).ok()
    }
}

/// Why a submission was treated as spam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Honeypot is enabled but the name or time marker was not submitted
    MissingMarkers,
    /// The time marker is not a whole number of seconds
    MalformedTimestamp,
    /// Something was typed into the hidden name field
    HoneypotFilled,
    /// Submitted within the minimum interval
    TooFast { elapsed: u64 },
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingMarkers => "missing_markers",
            RejectReason::MalformedTimestamp => "malformed_timestamp",
            RejectReason::HoneypotFilled => "honeypot_filled",
            RejectReason::TooFast { .. } => "too_fast",
        }
    }
}

/// Outcome of classifying one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Seconds between `now` and the submitted timestamp, in either direction
fn elapsed_secs(now: i64, submitted: i64) -> u64 {
    now.abs_diff(submitted)
}

/// Check that more than `interval_secs` passed between render and `now`.
///
/// Returns `false` for an exact match on the interval and for timestamps
/// that cannot be read.
pub fn time_diff_at<T: TimestampInput + ?Sized>(now: i64, submitted: &T, interval_secs: u64) -> bool {
    match submitted.unix_secs() {
        Some(ts) => elapsed_secs(now, ts) > interval_secs,
        None => false,
    }
}

/// [`time_diff_at`] against the system clock
pub fn time_diff<T: TimestampInput + ?Sized>(submitted: &T, interval_secs: u64) -> bool {
    time_diff_at(SystemClock.now_unix_secs(), submitted, interval_secs)
}

/// Decide whether a submission should be stored, using the system clock
pub fn should_accept<F: SubmissionFields + ?Sized>(
    enabled: bool,
    fields: &F,
    config: &HoneypotConfig,
) -> bool {
    classify_at(SystemClock.now_unix_secs(), enabled, fields, config).is_accept()
}

fn classify_at<F: SubmissionFields + ?Sized>(
    now: i64,
    enabled: bool,
    fields: &F,
    config: &HoneypotConfig,
) -> Verdict {
    if !enabled {
        return Verdict::Accept;
    }

    let (Some(name), Some(time)) = (
        fields.field(config.name_field()),
        fields.field(config.time_field()),
    ) else {
        return Verdict::Reject(RejectReason::MissingMarkers);
    };

    let Some(rendered_at) = time.unix_secs() else {
        return Verdict::Reject(RejectReason::MalformedTimestamp);
    };

    let name_empty = name.is_empty();
    let elapsed = elapsed_secs(now, rendered_at);
    let time_ok = elapsed > config.time_interval();

    match (name_empty, time_ok) {
        (true, true) => Verdict::Accept,
        (false, _) => Verdict::Reject(RejectReason::HoneypotFilled),
        (true, false) => Verdict::Reject(RejectReason::TooFast { elapsed }),
    }
}

/// Honeypot settings bundled with a clock, for hosts that classify many
/// submissions
#[derive(Clone)]
pub struct HoneypotPolicy {
    config: HoneypotConfig,
    clock: Arc<dyn Clock>,
}

impl HoneypotPolicy {
    pub fn new(config: HoneypotConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: HoneypotConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &HoneypotConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Classify a submission for a form whose honeypot flag is `enabled`
    pub fn classify<F: SubmissionFields + ?Sized>(&self, enabled: bool, fields: &F) -> Verdict {
        classify_at(self.clock.now_unix_secs(), enabled, fields, &self.config)
    }

    pub fn should_accept<F: SubmissionFields + ?Sized>(&self, enabled: bool, fields: &F) -> bool {
        self.classify(enabled, fields).is_accept()
    }
}

impl std::fmt::Debug for HoneypotPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoneypotPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn submission(name: &str, time: &str) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), "foo".to_string()),
            ("whf_name".to_string(), name.to_string()),
            ("whf_time".to_string(), time.to_string()),
        ])
    }

    fn policy_at(now: i64) -> (HoneypotPolicy, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(now));
        let policy = HoneypotPolicy::with_clock(HoneypotConfig::default(), clock.clone());
        (policy, clock)
    }

    #[test]
    fn test_time_diff_boundary() {
        for interval in [0u64, 1, 3, 60, 3600] {
            let now = 1_000_000;
            let at = |elapsed: u64| now - elapsed as i64;

            assert!(!time_diff_at(now, &at(interval), interval), "equal to {}", interval);
            assert!(time_diff_at(now, &at(interval + 1), interval), "just over {}", interval);
            for elapsed in 0..=interval.min(5) {
                assert!(!time_diff_at(now, &at(elapsed), interval), "{} within {}", elapsed, interval);
            }
        }
    }

    #[test]
    fn test_time_diff_intervals() {
        let now = 1_700_000_000;
        assert!(!time_diff_at(now, &now, 3));
        assert!(!time_diff_at(now, &(now - 3), 3));
        assert!(time_diff_at(now, &(now - 4), 3));
        assert!(time_diff_at(now, &(now - 10), 3));
    }

    #[test]
    fn test_time_diff_future_timestamp_is_absolute() {
        let now = 1000;
        assert!(time_diff_at(now, &1010i64, 3));
        assert!(!time_diff_at(now, &1002i64, 3));
    }

    #[test]
    fn test_time_diff_string_input() {
        assert!(time_diff_at(1010, "1000", 3));
        assert!(time_diff_at(1010, " 1000 ", 3));
        assert!(!time_diff_at(1002, &"1000".to_string(), 3));
        assert!(time_diff_at(1010, &1000u64, 3));
    }

    #[test]
    fn test_time_diff_malformed_fails_closed() {
        assert!(!time_diff_at(1010, "", 3));
        assert!(!time_diff_at(1010, "abc", 3));
        assert!(!time_diff_at(1010, "1000.5", 3));
        assert!(!time_diff_at(1010, &u64::MAX, 3));
    }

    #[test]
    fn test_time_diff_system_clock() {
        let now = SystemClock.now_unix_secs();
        assert!(!time_diff(&now, 3));
        assert!(time_diff(&(now - 10), 3));
        assert!(time_diff(&(now - 10).to_string(), 3));
    }

    #[test]
    fn test_disabled_accepts_anything() {
        let config = HoneypotConfig::default();
        assert!(should_accept(false, &HashMap::new(), &config));
        assert!(should_accept(false, &submission("spam", "garbage"), &config));
        assert!(should_accept(false, &submission("", "0"), &config));
    }

    #[test]
    fn test_enabled_accepts_clean_submission() {
        let config = HoneypotConfig::default();
        let old = (SystemClock.now_unix_secs() - 10).to_string();
        assert!(should_accept(true, &submission("", &old), &config));
    }

    #[test]
    fn test_enabled_rejects_filled_honeypot() {
        let config = HoneypotConfig::default();
        let old = (SystemClock.now_unix_secs() - 10).to_string();
        assert!(!should_accept(true, &submission("anything", &old), &config));
    }

    #[test]
    fn test_enabled_rejects_fast_submission() {
        let config = HoneypotConfig::default();
        let fresh = (SystemClock.now_unix_secs() - 1).to_string();
        assert!(!should_accept(true, &submission("", &fresh), &config));
    }

    #[test]
    fn test_enabled_missing_markers_fails_closed() {
        let config = HoneypotConfig::default();
        let fields = HashMap::from([("name".to_string(), "foo".to_string())]);
        assert!(!should_accept(true, &fields, &config));

        let (policy, _) = policy_at(1010);
        assert_eq!(
            policy.classify(true, &fields),
            Verdict::Reject(RejectReason::MissingMarkers)
        );

        let only_name = HashMap::from([("whf_name".to_string(), String::new())]);
        assert_eq!(
            policy.classify(true, &only_name),
            Verdict::Reject(RejectReason::MissingMarkers)
        );
        let only_time = HashMap::from([("whf_time".to_string(), "1000".to_string())]);
        assert_eq!(
            policy.classify(true, &only_time),
            Verdict::Reject(RejectReason::MissingMarkers)
        );
    }

    #[test]
    fn test_malformed_timestamp_rejected() {
        let (policy, _) = policy_at(1010);
        assert_eq!(
            policy.classify(true, &submission("", "not-a-time")),
            Verdict::Reject(RejectReason::MalformedTimestamp)
        );
    }

    #[test]
    fn test_render_then_submit_scenario() {
        let (policy, clock) = policy_at(1000);
        let rendered = clock.now_unix_secs().to_string();

        clock.set(1010);
        assert_eq!(policy.classify(true, &submission("", &rendered)), Verdict::Accept);

        clock.set(1002);
        assert_eq!(
            policy.classify(true, &submission("", &rendered)),
            Verdict::Reject(RejectReason::TooFast { elapsed: 2 })
        );

        clock.set(1010);
        assert_eq!(
            policy.classify(true, &submission("bot was here", &rendered)),
            Verdict::Reject(RejectReason::HoneypotFilled)
        );
    }

    #[test]
    fn test_exact_interval_is_too_fast() {
        let (policy, _) = policy_at(1003);
        assert_eq!(
            policy.classify(true, &submission("", "1000")),
            Verdict::Reject(RejectReason::TooFast { elapsed: 3 })
        );
        assert!(policy.should_accept(true, &submission("", "999")));
    }

    #[test]
    fn test_custom_field_names() {
        let config = HoneypotConfig::new("foo", "bar", 3).unwrap();
        let clock = Arc::new(FixedClock::new(1010));
        let policy = HoneypotPolicy::with_clock(config, clock);

        let fields = HashMap::from([
            ("foo".to_string(), String::new()),
            ("bar".to_string(), "1000".to_string()),
        ]);
        assert!(policy.should_accept(true, &fields));

        // Default names are no longer markers
        assert!(!policy.should_accept(true, &submission("", "1000")));
    }

    #[test]
    fn test_pair_list_fields() {
        let (policy, _) = policy_at(1010);
        let pairs = vec![
            ("whf_name".to_string(), "first".to_string()),
            ("whf_time".to_string(), "1000".to_string()),
            ("whf_name".to_string(), String::new()),
        ];
        assert!(policy.should_accept(true, &pairs));
        assert!(policy.should_accept(true, pairs.as_slice()));
    }

    #[test]
    fn test_repeated_name_marker_uses_last_value() {
        let (policy, _) = policy_at(1010);
        let pairs = vec![
            ("whf_name".to_string(), String::new()),
            ("whf_name".to_string(), "spam".to_string()),
            ("whf_time".to_string(), "1000".to_string()),
        ];
        assert_eq!(
            policy.classify(true, &pairs),
            Verdict::Reject(RejectReason::HoneypotFilled)
        );
    }
}
