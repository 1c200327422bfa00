use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Numeric value of the custom `VERBOSE` level.
pub const VERBOSE_LOG_LEVEL: u8 = 15;
/// Numeric value of the custom `SUCCESS` level.
pub const SUCCESS_LOG_LEVEL: u8 = 25;
/// Numeric value of the custom `ACTION` level.
pub const ACTION_LOG_LEVEL: u8 = 35;
/// Numeric value of `CRITICAL`, which `tracing` has no level for.
pub const CRITICAL_LOG_LEVEL: u8 = 50;

/// Ordered log severity.
///
/// Values follow the conventional 10/20/30/40/50 scale, with the three
/// custom levels sitting in between the standard ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(u8);

impl Severity {
    pub const TRACE: Severity = Severity(5);
    pub const DEBUG: Severity = Severity(10);
    pub const VERBOSE: Severity = Severity(VERBOSE_LOG_LEVEL);
    pub const INFO: Severity = Severity(20);
    pub const SUCCESS: Severity = Severity(SUCCESS_LOG_LEVEL);
    pub const WARNING: Severity = Severity(30);
    pub const ACTION: Severity = Severity(ACTION_LOG_LEVEL);
    pub const ERROR: Severity = Severity(40);
    pub const CRITICAL: Severity = Severity(CRITICAL_LOG_LEVEL);

    pub const fn new(value: u8) -> Self {
        Severity(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity::TRACE,
            tracing::Level::DEBUG => Severity::DEBUG,
            tracing::Level::INFO => Severity::INFO,
            tracing::Level::WARN => Severity::WARNING,
            tracing::Level::ERROR => Severity::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display attributes of a single severity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityStyle {
    /// Canonical upper-case name, also used for URL routing.
    pub name: String,
    /// Embed color as a packed `0xRRGGBB` integer.
    pub color: u32,
    pub emoji: String,
}

impl SeverityStyle {
    pub fn new(name: impl Into<String>, color: u32, emoji: impl Into<String>) -> Self {
        SeverityStyle {
            name: name.into(),
            color,
            emoji: emoji.into(),
        }
    }
}

const FALLBACK_COLOR: u32 = 0x607D8B;
const FALLBACK_EMOJI: &str = "📝";

/// Immutable severity → style table.
///
/// Tables are plain values: registering levels consumes the table and
/// returns an extended copy, so independent tables never interfere.
/// Severities missing from the table resolve to a neutral fallback style
/// named `Level N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
    entries: BTreeMap<Severity, SeverityStyle>,
}

impl StyleTable {
    /// Table covering only DEBUG, INFO, WARNING, ERROR and CRITICAL.
    pub fn standard() -> Self {
        StyleTable {
            entries: BTreeMap::new(),
        }
        .register(Severity::DEBUG, SeverityStyle::new("DEBUG", 0x95A5A6, "🐛"))
        .register(Severity::INFO, SeverityStyle::new("INFO", 0x3498DB, "ℹ️"))
        .register(Severity::WARNING, SeverityStyle::new("WARNING", 0xF1C40F, "⚠️"))
        .register(Severity::ERROR, SeverityStyle::new("ERROR", 0xE74C3C, "❌"))
        .register(Severity::CRITICAL, SeverityStyle::new("CRITICAL", 0x992D22, "🚨"))
    }

    /// Registers the VERBOSE, SUCCESS and ACTION levels.
    pub fn with_custom_levels(self) -> Self {
        self.register(Severity::VERBOSE, SeverityStyle::new("VERBOSE", 0x1ABC9C, "🔍"))
            .register(Severity::SUCCESS, SeverityStyle::new("SUCCESS", 0x2ECC71, "✅"))
            .register(Severity::ACTION, SeverityStyle::new("ACTION", 0x9B59B6, "⚡"))
    }

    /// Returns a table with `severity` mapped to `style`, replacing any
    /// previous entry for the same value.
    pub fn register(mut self, severity: Severity, style: SeverityStyle) -> Self {
        self.entries.insert(severity, style);
        self
    }

    pub fn get(&self, severity: Severity) -> Option<&SeverityStyle> {
        self.entries.get(&severity)
    }

    /// Style for `severity`, or the fallback style when it is not registered.
    /// Registered styles are borrowed from the table.
    pub fn style_for(&self, severity: Severity) -> Cow<'_, SeverityStyle> {
        match self.entries.get(&severity) {
            Some(style) => Cow::Borrowed(style),
            None => Cow::Owned(SeverityStyle::new(
                format!("Level {}", severity),
                FALLBACK_COLOR,
                FALLBACK_EMOJI,
            )),
        }
    }

    pub fn name_of(&self, severity: Severity) -> Cow<'_, str> {
        match self.entries.get(&severity) {
            Some(style) => Cow::Borrowed(style.name.as_str()),
            None => Cow::Owned(format!("Level {}", severity)),
        }
    }

    /// Looks a severity up by its registered name (case-insensitive) or by
    /// its decimal value.
    pub fn parse(&self, name: &str) -> Option<Severity> {
        let name = name.trim();
        if let Ok(value) = name.parse::<u8>() {
            return Some(Severity::new(value));
        }
        self.entries
            .iter()
            .find(|(_, style)| style.name.eq_ignore_ascii_case(name))
            .map(|(severity, _)| *severity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Severity, &SeverityStyle)> {
        self.entries.iter().map(|(severity, style)| (*severity, style))
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        StyleTable::standard().with_custom_levels()
    }
}
