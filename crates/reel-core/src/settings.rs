#![forbid(unsafe_code)]

//! Instance configuration.
//!
//! [`Settings`] is the full, validated configuration of one reel.
//! [`SettingsPatch`] is a partial overlay used for runtime updates and for
//! breakpoints: each breakpoint maps a maximum viewport width to a patch, and
//! [`Settings::matched`] applies the patch of the narrowest breakpoint that
//! still covers the viewport.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `perView == 0` | [`SettingsError::ZeroPerView`] from `validate` |
//! | unknown option key | [`SettingsError::UnknownOption`], nothing changes |
//! | unparsable option value | [`SettingsError::InvalidValue`], previous value kept |
//! | direction other than `ltr`/`rtl` | [`SettingsError::Direction`], previous value kept |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::direction::{Direction, DirectionError};

/// Default `animationTimingFunc`.
pub const DEFAULT_TIMING_FUNC: &str = "cubic-bezier(.165, .840, .440, 1)";

// ---------------------------------------------------------------------------
// Option value types
// ---------------------------------------------------------------------------

/// Movement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReelType {
    /// Bounded strip; moving past an edge rewinds or stops.
    #[default]
    Slider,
    /// Wrap-around strip backed by synthetic clones.
    Carousel,
}

impl ReelType {
    /// Configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Carousel => "carousel",
        }
    }
}

impl fmt::Display for ReelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReelType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slider" => Ok(Self::Slider),
            "carousel" => Ok(Self::Carousel),
            other => Err(SettingsError::invalid("type", other)),
        }
    }
}

/// Viewport slot the active item is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "serde_repr::FocusAtRepr", into = "serde_repr::FocusAtRepr")
)]
pub enum FocusAt {
    /// Centered in the viewport.
    Center,
    /// The n-th slot from the leading edge.
    Index(usize),
}

impl FocusAt {
    /// Slot index, or `None` when centered.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Center => None,
            Self::Index(i) => Some(i),
        }
    }
}

impl Default for FocusAt {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for FocusAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => f.write_str("center"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for FocusAt {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "center" {
            return Ok(Self::Center);
        }
        s.parse::<usize>()
            .map(Self::Index)
            .map_err(|_| SettingsError::invalid("focusAt", s))
    }
}

/// How much of the neighbouring items shows at the viewport edges, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Peek {
    /// Same amount on both sides.
    Uniform(u32),
    /// Separate leading and trailing amounts.
    Split {
        /// Leading edge.
        before: u32,
        /// Trailing edge.
        after: u32,
    },
}

impl Peek {
    /// Leading-edge amount.
    #[must_use]
    pub const fn before(self) -> u32 {
        match self {
            Self::Uniform(v) => v,
            Self::Split { before, .. } => before,
        }
    }

    /// Total width taken from the viewport by peeking.
    #[must_use]
    pub const fn reductor(self) -> u32 {
        match self {
            Self::Uniform(v) => v.saturating_mul(2),
            Self::Split { before, after } => before.saturating_add(after),
        }
    }

    /// Whether any peek is configured.
    #[must_use]
    pub const fn is_set(self) -> bool {
        match self {
            Self::Uniform(v) => v != 0,
            Self::Split { before, after } => before != 0 || after != 0,
        }
    }
}

impl Default for Peek {
    fn default() -> Self {
        Self::Uniform(0)
    }
}

impl FromStr for Peek {
    type Err = SettingsError;

    /// `"40"` for a uniform peek, `"40,20"` for before/after.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SettingsError::invalid("peek", s);
        match s.split_once(',') {
            None => s.trim().parse().map(Self::Uniform).map_err(|_| bad()),
            Some((before, after)) => Ok(Self::Split {
                before: before.trim().parse().map_err(|_| bad())?,
                after: after.trim().parse().map_err(|_| bad())?,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Option key that does not exist.
    UnknownOption(String),
    /// Value that does not parse for its key.
    InvalidValue {
        /// Option key.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Direction other than `ltr`/`rtl`.
    Direction(DirectionError),
    /// `perView` must be at least 1.
    ZeroPerView,
    /// A breakpoint patch is invalid.
    Breakpoint {
        /// Breakpoint max width.
        width: u32,
        /// Underlying problem.
        source: Box<SettingsError>,
    },
}

impl SettingsError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption(key) => write!(f, "unknown option {key:?}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value {value:?} for {key}"),
            Self::Direction(e) => write!(f, "{e}"),
            Self::ZeroPerView => f.write_str("perView must be at least 1"),
            Self::Breakpoint { width, source } => write!(f, "breakpoint {width}: {source}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Direction(e) => Some(e),
            Self::Breakpoint { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<DirectionError> for SettingsError {
    fn from(e: DirectionError) -> Self {
        Self::Direction(e)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Full configuration of a reel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Settings {
    /// Movement mode.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ReelType,
    /// Index the reel starts at.
    pub start_at: usize,
    /// Items visible at once.
    pub per_view: usize,
    /// Slot the active item is anchored to.
    pub focus_at: FocusAt,
    /// Gap between items in pixels.
    pub gap: u32,
    /// Stop a slider at the last full page instead of the last item.
    pub bound: bool,
    /// Wrap a slider from one end to the other.
    pub rewind: bool,
    /// Reading direction.
    pub direction: Direction,
    /// Visible part of neighbouring items.
    pub peek: Peek,
    /// Regular move duration in milliseconds.
    pub animation_duration: u64,
    /// Duration of a slider rewind in milliseconds.
    pub rewind_duration: u64,
    /// Timing function handed to the presentation layer.
    pub animation_timing_func: String,
    /// Drop commands while a move is animating.
    pub wait_for_transition: bool,
    /// Max viewport width to overrides.
    pub breakpoints: BTreeMap<u32, SettingsPatch>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kind: ReelType::Slider,
            start_at: 0,
            per_view: 1,
            focus_at: FocusAt::Index(0),
            gap: 10,
            bound: false,
            rewind: true,
            direction: Direction::Ltr,
            peek: Peek::Uniform(0),
            animation_duration: 400,
            rewind_duration: 800,
            animation_timing_func: DEFAULT_TIMING_FUNC.to_owned(),
            wait_for_transition: true,
            breakpoints: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement mode (builder pattern).
    #[must_use]
    pub fn kind(mut self, kind: ReelType) -> Self {
        self.kind = kind;
        self
    }

    /// Set the start index (builder pattern).
    #[must_use]
    pub fn start_at(mut self, index: usize) -> Self {
        self.start_at = index;
        self
    }

    /// Set items per view (builder pattern).
    #[must_use]
    pub fn per_view(mut self, per_view: usize) -> Self {
        self.per_view = per_view;
        self
    }

    /// Set the focus slot (builder pattern).
    #[must_use]
    pub fn focus_at(mut self, focus_at: FocusAt) -> Self {
        self.focus_at = focus_at;
        self
    }

    /// Set the gap in pixels (builder pattern).
    #[must_use]
    pub fn gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Set bound mode (builder pattern).
    #[must_use]
    pub fn bound(mut self, bound: bool) -> Self {
        self.bound = bound;
        self
    }

    /// Set rewind (builder pattern).
    #[must_use]
    pub fn rewind(mut self, rewind: bool) -> Self {
        self.rewind = rewind;
        self
    }

    /// Set the reading direction (builder pattern).
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the peek (builder pattern).
    #[must_use]
    pub fn peek(mut self, peek: Peek) -> Self {
        self.peek = peek;
        self
    }

    /// Set wait-for-transition (builder pattern).
    #[must_use]
    pub fn wait_for_transition(mut self, wait: bool) -> Self {
        self.wait_for_transition = wait;
        self
    }

    /// Set both durations in milliseconds (builder pattern).
    #[must_use]
    pub fn durations(mut self, animation_ms: u64, rewind_ms: u64) -> Self {
        self.animation_duration = animation_ms;
        self.rewind_duration = rewind_ms;
        self
    }

    /// Add a breakpoint applying `patch` at viewport widths `<= max_width`.
    #[must_use]
    pub fn breakpoint(mut self, max_width: u32, patch: SettingsPatch) -> Self {
        self.breakpoints.insert(max_width, patch);
        self
    }

    /// Regular move duration.
    #[must_use]
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    /// Slider rewind duration.
    #[must_use]
    pub fn rewind_duration(&self) -> Duration {
        Duration::from_millis(self.rewind_duration)
    }

    /// Whether the mode is `kind`.
    #[must_use]
    pub fn is_type(&self, kind: ReelType) -> bool {
        self.kind == kind
    }

    /// Check the configuration, breakpoints included.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.per_view == 0 {
            return Err(SettingsError::ZeroPerView);
        }
        for (&width, patch) in &self.breakpoints {
            if patch.per_view == Some(0) {
                return Err(SettingsError::Breakpoint {
                    width,
                    source: Box::new(SettingsError::ZeroPerView),
                });
            }
        }
        Ok(())
    }

    /// Settings in effect for a viewport of `viewport_width` pixels.
    ///
    /// The narrowest breakpoint whose max width covers the viewport wins;
    /// without a match the settings are returned unchanged.
    #[must_use]
    pub fn matched(&self, viewport_width: f64) -> Settings {
        let mut active = self.clone();
        let hit = self
            .breakpoints
            .iter()
            .find(|&(&max_width, _)| viewport_width <= f64::from(max_width));
        if let Some((&max_width, patch)) = hit {
            crate::debug!(max_width, viewport_width, "breakpoint matched");
            patch.apply_to(&mut active);
        }
        active
    }

    /// Merge a patch, keeping `self` untouched if the result is invalid.
    pub fn merge(&mut self, patch: &SettingsPatch) -> Result<(), SettingsError> {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Set one option from its textual form.
    ///
    /// Used for untyped sources such as markup attributes. On any error the
    /// previous value stays in place.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let patch = SettingsPatch::default().with_option(key, value)?;
        self.merge(&patch)
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial settings. `None` leaves the corresponding field alone.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SettingsPatch {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "type", skip_serializing_if = "Option::is_none")
    )]
    pub kind: Option<ReelType>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_at: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub per_view: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub focus_at: Option<FocusAt>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub gap: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bound: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rewind: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub direction: Option<Direction>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub peek: Option<Peek>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub animation_duration: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rewind_duration: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub animation_timing_func: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub wait_for_transition: Option<bool>,
}

impl SettingsPatch {
    /// Empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch touches the start index.
    #[must_use]
    pub fn sets_start(&self) -> bool {
        self.start_at.is_some()
    }

    /// Parse one textual option into the patch.
    pub fn with_option(mut self, key: &str, value: &str) -> Result<Self, SettingsError> {
        fn num<T: FromStr>(key: &'static str, value: &str) -> Result<T, SettingsError> {
            value
                .trim()
                .parse()
                .map_err(|_| SettingsError::invalid(key, value))
        }
        match key {
            "type" => self.kind = Some(value.parse()?),
            "startAt" => self.start_at = Some(num("startAt", value)?),
            "perView" => self.per_view = Some(num("perView", value)?),
            "focusAt" => self.focus_at = Some(value.parse()?),
            "gap" => self.gap = Some(num("gap", value)?),
            "bound" => self.bound = Some(num("bound", value)?),
            "rewind" => self.rewind = Some(num("rewind", value)?),
            "direction" => self.direction = Some(value.parse()?),
            "peek" => self.peek = Some(value.parse()?),
            "animationDuration" => self.animation_duration = Some(num("animationDuration", value)?),
            "rewindDuration" => self.rewind_duration = Some(num("rewindDuration", value)?),
            "animationTimingFunc" => self.animation_timing_func = Some(value.to_owned()),
            "waitForTransition" => {
                self.wait_for_transition = Some(num("waitForTransition", value)?);
            }
            other => return Err(SettingsError::UnknownOption(other.to_owned())),
        }
        Ok(self)
    }

    /// Overlay the set fields onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &self.$field {
                    settings.$field = v.clone();
                })*
            };
        }
        overlay!(
            kind,
            start_at,
            per_view,
            focus_at,
            gap,
            bound,
            rewind,
            direction,
            peek,
            animation_duration,
            rewind_duration,
            animation_timing_func,
            wait_for_transition,
        );
    }
}

#[cfg(feature = "serde")]
mod serde_repr {
    use super::{FocusAt, SettingsError};

    /// Wire form of [`FocusAt`]: `"center"` or an integer.
    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(untagged)]
    pub(super) enum FocusAtRepr {
        Index(usize),
        Name(String),
    }

    impl TryFrom<FocusAtRepr> for FocusAt {
        type Error = SettingsError;

        fn try_from(repr: FocusAtRepr) -> Result<Self, Self::Error> {
            match repr {
                FocusAtRepr::Index(i) => Ok(FocusAt::Index(i)),
                FocusAtRepr::Name(name) => name.parse(),
            }
        }
    }

    impl From<FocusAt> for FocusAtRepr {
        fn from(focus: FocusAt) -> Self {
            match focus {
                FocusAt::Center => FocusAtRepr::Name("center".to_owned()),
                FocusAt::Index(i) => FocusAtRepr::Index(i),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.kind, ReelType::Slider);
        assert_eq!(s.per_view, 1);
        assert_eq!(s.gap, 10);
        assert!(s.rewind);
        assert!(!s.bound);
        assert!(s.wait_for_transition);
        assert_eq!(s.animation_duration(), Duration::from_millis(400));
        assert_eq!(s.rewind_duration(), Duration::from_millis(800));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn zero_per_view_is_rejected() {
        assert_eq!(
            Settings::new().per_view(0).validate(),
            Err(SettingsError::ZeroPerView)
        );
        let patch = SettingsPatch {
            per_view: Some(0),
            ..SettingsPatch::default()
        };
        let err = Settings::new().breakpoint(600, patch).validate().unwrap_err();
        assert!(matches!(err, SettingsError::Breakpoint { width: 600, .. }));
    }

    #[test]
    fn invalid_direction_keeps_previous_value() {
        let mut s = Settings::new().direction(Direction::Rtl);
        let err = s.set_option("direction", "sideways").unwrap_err();
        assert!(matches!(err, SettingsError::Direction(_)));
        assert_eq!(s.direction, Direction::Rtl);
        s.set_option("direction", "ltr").unwrap();
        assert_eq!(s.direction, Direction::Ltr);
    }

    #[test]
    fn set_option_parses_each_key() {
        let mut s = Settings::new();
        s.set_option("type", "carousel").unwrap();
        s.set_option("perView", "3").unwrap();
        s.set_option("focusAt", "center").unwrap();
        s.set_option("peek", "40,20").unwrap();
        s.set_option("bound", "true").unwrap();
        s.set_option("rewindDuration", "300").unwrap();
        assert_eq!(s.kind, ReelType::Carousel);
        assert_eq!(s.per_view, 3);
        assert_eq!(s.focus_at, FocusAt::Center);
        assert_eq!(s.peek, Peek::Split { before: 40, after: 20 });
        assert!(s.bound);
        assert_eq!(s.rewind_duration, 300);
    }

    #[test]
    fn set_option_rejects_bad_input_without_change() {
        let mut s = Settings::new();
        assert!(matches!(
            s.set_option("perView", "many"),
            Err(SettingsError::InvalidValue { key: "perView", .. })
        ));
        assert_eq!(s.set_option("perView", "0"), Err(SettingsError::ZeroPerView));
        assert!(matches!(
            s.set_option("autoplay", "1"),
            Err(SettingsError::UnknownOption(_))
        ));
        assert_eq!(s, Settings::new());
    }

    #[test]
    fn narrowest_covering_breakpoint_wins() {
        let s = Settings::new()
            .per_view(4)
            .breakpoint(1024, SettingsPatch { per_view: Some(3), ..SettingsPatch::default() })
            .breakpoint(600, SettingsPatch { per_view: Some(1), ..SettingsPatch::default() });
        assert_eq!(s.matched(1400.0).per_view, 4);
        assert_eq!(s.matched(1024.0).per_view, 3);
        assert_eq!(s.matched(800.0).per_view, 3);
        assert_eq!(s.matched(320.0).per_view, 1);
    }

    #[test]
    fn peek_accessors() {
        assert_eq!(Peek::Uniform(50).before(), 50);
        assert_eq!(Peek::Uniform(50).reductor(), 100);
        assert_eq!(Peek::Split { before: 30, after: 10 }.reductor(), 40);
        assert!(!Peek::default().is_set());
    }

    #[test]
    fn focus_parse() {
        assert_eq!("center".parse::<FocusAt>(), Ok(FocusAt::Center));
        assert_eq!("2".parse::<FocusAt>(), Ok(FocusAt::Index(2)));
        assert!("left".parse::<FocusAt>().is_err());
    }
}
