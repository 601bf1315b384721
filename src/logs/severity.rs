//! Severity scale and the per-severity color table.

use std::fmt;

/// Declared severity of a structured log record.
///
/// Ranks run from loudest to most verbose; a lower rank is shown at lower
/// verbosity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Fatal,
    Error,
    Warn,
    Normal,
    Info,
    Debug,
    Silly,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Normal,
        Severity::Info,
        Severity::Debug,
        Severity::Silly,
    ];

    /// Severity used for any declared level that is not recognised.
    pub const DEFAULT: Severity = Severity::Normal;

    pub const fn rank(self) -> u8 {
        match self {
            Severity::Fatal => 0,
            Severity::Error => 1,
            Severity::Warn => 2,
            Severity::Normal => 3,
            Severity::Info => 4,
            Severity::Debug => 5,
            Severity::Silly => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Normal => "normal",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Silly => "silly",
        }
    }

    /// Exact, case-sensitive match against the known names.
    pub fn from_name(name: &str) -> Option<Severity> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Map a declared level onto the scale. `"trace"` is an alias of
    /// `silly`; anything unknown falls back to [`Severity::DEFAULT`].
    pub fn normalize(declared: &str) -> Severity {
        match Self::from_name(declared) {
            Some(severity) => severity,
            None if declared == "trace" => Severity::Silly,
            None => Self::DEFAULT,
        }
    }

    /// Uppercase name right-aligned in six columns, e.g. `"  WARN"`.
    pub fn tag(self) -> String {
        format!("{:>6}", self.name().to_uppercase())
    }

    pub fn level_color(self) -> &'static str {
        color_for(&format!("{}_LEVEL", self.name().to_uppercase()))
    }

    pub fn message_color(self) -> &'static str {
        color_for(&format!("{}_MESSAGE", self.name().to_uppercase()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Color table ──────────────────────────────────────────────────────────────

const COLORS: &[(&str, &str)] = &[
    ("FATAL_LEVEL", "\x1b[41;97;1m"),
    ("FATAL_MESSAGE", "\x1b[31;1m"),
    ("ERROR_LEVEL", "\x1b[31;1m"),
    ("ERROR_MESSAGE", "\x1b[31m"),
    ("WARN_LEVEL", "\x1b[33;1m"),
    ("WARN_MESSAGE", "\x1b[33m"),
    ("NORMAL_LEVEL", "\x1b[97;1m"),
    ("NORMAL_MESSAGE", "\x1b[97m"),
    ("INFO_LEVEL", "\x1b[32;1m"),
    ("INFO_MESSAGE", "\x1b[37m"),
    ("DEBUG_LEVEL", "\x1b[35;1m"),
    ("DEBUG_MESSAGE", "\x1b[90m"),
    ("SILLY_LEVEL", "\x1b[34;1m"),
    ("SILLY_MESSAGE", "\x1b[90;2m"),
];

/// Look up an escape sequence by `"{SEVERITY}_LEVEL"` / `"{SEVERITY}_MESSAGE"`
/// key. Surrounding whitespace in the key is ignored; unknown keys map to the
/// empty string so the text is printed uncolored.
pub fn color_for(key: &str) -> &'static str {
    let key = key.trim();
    COLORS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, code)| *code)
        .unwrap_or("")
}
