//! Verbosity resolution: `-v` / `-q` flags to a log filter threshold.
//!
//! The threshold is a rank on the severity scale (see
//! [`crate::logs::Severity::rank`]). A record is shown when the threshold is
//! strictly greater than its rank, so the default of `2` shows `fatal` and
//! `error` records and hides everything from `warn` upward.

use std::fmt;

use tracing::level_filters::LevelFilter;

/// Base value the `-v` accumulator starts from.
pub const VERBOSE_BASE: u8 = 2;

/// Threshold used with `-q` and no `-v`.
pub const QUIET_THRESHOLD: u8 = 1;

/// Process-wide filter threshold. Written once before startup, copied into
/// every listener afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// `true` when a record of the given rank passes this threshold.
    pub const fn admits(self, rank: u8) -> bool {
        self.0 > rank
    }

    /// Level for the CLI's own tracing output at this verbosity.
    pub fn level_filter(self) -> LevelFilter {
        match self.0 {
            0 | 1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 | 4 => LevelFilter::INFO,
            5 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(VERBOSE_BASE)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the filter threshold from the verbosity flags.
///
/// `verbose` is the number of `-v` occurrences, or `None` when the flag was
/// not given. Each occurrence adds one to [`VERBOSE_BASE`]; an explicit `-v`
/// always wins over `-q`.
pub fn resolve_threshold(verbose: Option<u8>, quiet: bool) -> Threshold {
    match verbose {
        Some(count) => Threshold(VERBOSE_BASE.saturating_add(count)),
        None if quiet => Threshold(QUIET_THRESHOLD),
        None => Threshold(VERBOSE_BASE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_base_without_flags() {
        assert_eq!(resolve_threshold(None, false), Threshold::new(2));
    }

    #[test]
    fn quiet_lowers_threshold() {
        assert_eq!(resolve_threshold(None, true), Threshold::new(1));
    }

    #[test]
    fn each_verbose_occurrence_adds_one() {
        for n in 0..=6u8 {
            assert_eq!(resolve_threshold(Some(n), false).value(), 2 + n);
        }
    }

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(resolve_threshold(Some(1), true), Threshold::new(3));
    }

    #[test]
    fn accumulator_saturates() {
        assert_eq!(resolve_threshold(Some(u8::MAX), false).value(), u8::MAX);
    }

    #[test]
    fn admits_is_strictly_greater() {
        let t = Threshold::new(3);
        assert!(t.admits(2));
        assert!(!t.admits(3));
        assert!(!t.admits(4));
    }

    #[test]
    fn level_filter_tracks_threshold() {
        assert_eq!(Threshold::new(1).level_filter(), LevelFilter::ERROR);
        assert_eq!(Threshold::new(2).level_filter(), LevelFilter::WARN);
        assert_eq!(Threshold::new(4).level_filter(), LevelFilter::INFO);
        assert_eq!(Threshold::new(5).level_filter(), LevelFilter::DEBUG);
        assert_eq!(Threshold::new(9).level_filter(), LevelFilter::TRACE);
    }
}
