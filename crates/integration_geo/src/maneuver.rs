//! Maneuver translation and turn-by-turn instruction assembly
//!
//! Instructions are phrased in Polish, matching the address formatting of the
//! geocoding side.

use serde::{Deserialize, Serialize};

use crate::routing::models::{RouteLeg, RouteStep};

const ARRIVED_TEXT: &str = "Dotarłeś do celu";

/// Maneuver type reported by the routing engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManeuverType {
    Depart,
    Turn,
    NewName,
    Continue,
    Arrive,
    Roundabout,
    Rotary,
    /// Types without a translation keep the engine's wording
    Other(String),
}

impl ManeuverType {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "depart" => Self::Depart,
            "turn" => Self::Turn,
            "new name" => Self::NewName,
            "continue" => Self::Continue,
            "arrive" => Self::Arrive,
            "roundabout" => Self::Roundabout,
            "rotary" => Self::Rotary,
            other => Self::Other(other.to_string()),
        }
    }

    /// Localized verb phrase for this maneuver
    #[must_use]
    pub fn phrase(&self) -> &str {
        match self {
            Self::Depart => "Rozpocznij trasę",
            Self::Turn => "Skręć",
            Self::NewName | Self::Continue => "Kontynuuj",
            Self::Arrive => "Dotrzyj do celu",
            Self::Roundabout | Self::Rotary => "Wjedź na rondo",
            Self::Other(raw) => raw,
        }
    }
}

/// Direction modifier of a maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverModifier {
    Left,
    Right,
    SharpLeft,
    SharpRight,
    SlightLeft,
    SlightRight,
    Straight,
    UTurn,
}

impl ManeuverModifier {
    /// Parse an engine modifier; unknown values yield `None`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "left" => Self::Left,
            "right" => Self::Right,
            "sharp left" => Self::SharpLeft,
            "sharp right" => Self::SharpRight,
            "slight left" => Self::SlightLeft,
            "slight right" => Self::SlightRight,
            "straight" => Self::Straight,
            "uturn" => Self::UTurn,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Left => "w lewo",
            Self::Right => "w prawo",
            Self::SharpLeft => "ostro w lewo",
            Self::SharpRight => "ostro w prawo",
            Self::SlightLeft => "lekko w lewo",
            Self::SlightRight => "lekko w prawo",
            Self::Straight => "prosto",
            Self::UTurn => "zawróć",
        }
    }
}

/// Icon identifier shown next to an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManeuverIcon {
    Forward,
    Flag,
    RoundaboutArrow,
    ArrowLeft,
    ArrowRight,
    ArrowSharpLeft,
    ArrowSharpRight,
    ArrowSlightLeft,
    ArrowSlightRight,
    ArrowStraight,
    ArrowUturn,
    Navigation,
}

impl ManeuverIcon {
    /// Select the icon for a maneuver
    #[must_use]
    pub fn for_maneuver(maneuver: &ManeuverType, modifier: Option<ManeuverModifier>) -> Self {
        match (maneuver, modifier) {
            (ManeuverType::Depart, _) => Self::Forward,
            (ManeuverType::Arrive, _) => Self::Flag,
            (ManeuverType::Roundabout | ManeuverType::Rotary, _) => Self::RoundaboutArrow,
            (ManeuverType::Turn, Some(m)) => match m {
                ManeuverModifier::Left => Self::ArrowLeft,
                ManeuverModifier::Right => Self::ArrowRight,
                ManeuverModifier::SharpLeft => Self::ArrowSharpLeft,
                ManeuverModifier::SharpRight => Self::ArrowSharpRight,
                ManeuverModifier::SlightLeft => Self::ArrowSlightLeft,
                ManeuverModifier::SlightRight => Self::ArrowSlightRight,
                ManeuverModifier::Straight => Self::ArrowStraight,
                ManeuverModifier::UTurn => Self::ArrowUturn,
            },
            _ => Self::Navigation,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Flag => "flag",
            Self::RoundaboutArrow => "roundabout-arrow",
            Self::ArrowLeft => "arrow-left",
            Self::ArrowRight => "arrow-right",
            Self::ArrowSharpLeft => "arrow-sharp-left",
            Self::ArrowSharpRight => "arrow-sharp-right",
            Self::ArrowSlightLeft => "arrow-slight-left",
            Self::ArrowSlightRight => "arrow-slight-right",
            Self::ArrowStraight => "arrow-straight",
            Self::ArrowUturn => "arrow-uturn",
            Self::Navigation => "navigation",
        }
    }
}

/// One displayable navigation instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    pub icon: ManeuverIcon,
    /// Meters until the next instruction
    pub distance_m: f64,
    pub distance_text: String,
}

impl Instruction {
    /// Translate a single engine step
    #[must_use]
    pub fn from_step(step: &RouteStep) -> Self {
        let maneuver = ManeuverType::parse(&step.maneuver.maneuver_type);
        let modifier = step
            .maneuver
            .modifier
            .as_deref()
            .and_then(ManeuverModifier::parse);

        Self {
            text: translate(&maneuver, modifier, &step.name),
            icon: ManeuverIcon::for_maneuver(&maneuver, modifier),
            distance_m: step.distance,
            distance_text: format_distance(step.distance),
        }
    }

    /// The closing "arrived at destination" entry
    #[must_use]
    pub fn arrival() -> Self {
        Self {
            text: ARRIVED_TEXT.to_string(),
            icon: ManeuverIcon::Flag,
            distance_m: 0.0,
            distance_text: format_distance(0.0),
        }
    }
}

/// Build the localized text for a maneuver
#[must_use]
pub fn translate(maneuver: &ManeuverType, modifier: Option<ManeuverModifier>, street: &str) -> String {
    let mut text = maneuver.phrase().to_string();
    if let Some(modifier) = modifier {
        text.push(' ');
        text.push_str(modifier.phrase());
    }
    let street = street.trim();
    if !is_placeholder_name(street) {
        text.push_str(": ");
        text.push_str(street);
    }
    text
}

/// Unnamed ways come back as an empty string or a lone dash
fn is_placeholder_name(name: &str) -> bool {
    name.is_empty() || name == "-"
}

/// Flatten all legs into display instructions
///
/// The last step of every leg is the engine's arrival marker for that leg and
/// is skipped; a single arrival entry closes the list.
#[must_use]
pub fn build_instructions(legs: &[RouteLeg]) -> Vec<Instruction> {
    let mut instructions: Vec<Instruction> = legs
        .iter()
        .flat_map(|leg| {
            let shown = leg.steps.len().saturating_sub(1);
            leg.steps[..shown].iter().map(Instruction::from_step)
        })
        .collect();

    instructions.push(Instruction::arrival());
    instructions
}

/// Format meters as `N m` below one kilometer, `N.NN km` from there on
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_distance(meters: f64) -> String {
    let whole = meters.round();
    if whole >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{} m", whole as i64)
    }
}
