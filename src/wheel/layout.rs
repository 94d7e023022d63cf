use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::wrap_angle;

/// Supported physical pocket arrangements.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Single-zero wheel, 37 pockets.
    #[default]
    European,
    /// Double-zero wheel, 38 pockets.
    American,
}

impl LayoutKind {
    /// Static layout table for this arrangement.
    pub fn layout(self) -> &'static WheelLayout {
        match self {
            Self::European => &EUROPEAN,
            Self::American => &AMERICAN,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::European => "european",
            Self::American => "american",
        }
    }
}

impl FromStr for LayoutKind {
    type Err = SpinError;

    fn from_str(s: &str) -> SpinResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "european" | "eu" | "single" | "single_zero" => Ok(Self::European),
            "american" | "us" | "double" | "double_zero" => Ok(Self::American),
            other => Err(SpinError::validation(format!("unknown wheel layout '{other}'"))),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label printed on a pocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PocketLabel {
    /// `0`.
    Zero,
    /// `00`, American wheels only.
    DoubleZero,
    /// `1..=36`.
    Number(u8),
}

impl PocketLabel {
    /// Standard casino color for this label.
    pub fn color(self) -> PocketColor {
        const RED: [u8; 18] = [
            1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
        ];
        match self {
            Self::Zero | Self::DoubleZero => PocketColor::Green,
            Self::Number(n) if RED.contains(&n) => PocketColor::Red,
            Self::Number(_) => PocketColor::Black,
        }
    }
}

impl FromStr for PocketLabel {
    type Err = SpinError;

    fn from_str(s: &str) -> SpinResult<Self> {
        let s = s.trim();
        match s {
            "0" => return Ok(Self::Zero),
            "00" => return Ok(Self::DoubleZero),
            _ => {}
        }
        let n: u8 = s
            .parse()
            .map_err(|_| SpinError::validation(format!("invalid pocket label '{s}'")))?;
        if !(1..=36).contains(&n) {
            return Err(SpinError::validation(format!(
                "pocket number {n} out of range 1..=36"
            )));
        }
        Ok(Self::Number(n))
    }
}

impl fmt::Display for PocketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("0"),
            Self::DoubleZero => f.write_str("00"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Pocket background color class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PocketColor {
    /// Zero pockets.
    Green,
    /// Red numbers.
    Red,
    /// Black numbers.
    Black,
}

impl PocketColor {
    /// Lowercase color name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Black => "black",
        }
    }

    /// Fill used when painting the wheel face.
    pub fn fill(self) -> Rgba8Premul {
        match self {
            Self::Green => Rgba8Premul::opaque(0x0b, 0x8a, 0x3e),
            Self::Red => Rgba8Premul::opaque(0xc4, 0x1e, 0x2a),
            Self::Black => Rgba8Premul::opaque(0x16, 0x16, 0x1a),
        }
    }
}

/// One pocket in physical order around the wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Pocket {
    /// Printed label.
    pub label: PocketLabel,
    /// Background color.
    pub color: PocketColor,
}

/// Ordered pocket table of one physical arrangement.
///
/// Index order is physically contiguous: pocket `i` spans the wheel-local angles
/// `[i·w, (i+1)·w)` where `w = 2π / len`, measured clockwise from 12 o'clock.
#[derive(Debug, PartialEq, Eq)]
pub struct WheelLayout {
    kind: LayoutKind,
    labels: &'static [PocketLabel],
}

use PocketLabel::{DoubleZero as DZ, Number as N, Zero as Z};

const EUROPEAN_ORDER: [PocketLabel; 37] = [
    Z, N(32), N(15), N(19), N(4), N(21), N(2), N(25), N(17), N(34), N(6), N(27), N(13), N(36),
    N(11), N(30), N(8), N(23), N(10), N(5), N(24), N(16), N(33), N(1), N(20), N(14), N(31), N(9),
    N(22), N(18), N(29), N(7), N(28), N(12), N(35), N(3), N(26),
];

const AMERICAN_ORDER: [PocketLabel; 38] = [
    Z, N(28), N(9), N(26), N(30), N(11), N(7), N(20), N(32), N(17), N(5), N(22), N(34), N(15),
    N(3), N(24), N(36), N(13), N(1), DZ, N(27), N(10), N(25), N(29), N(12), N(8), N(19), N(31),
    N(18), N(6), N(21), N(33), N(16), N(4), N(23), N(35), N(14), N(2),
];

static EUROPEAN: WheelLayout = WheelLayout {
    kind: LayoutKind::European,
    labels: &EUROPEAN_ORDER,
};

static AMERICAN: WheelLayout = WheelLayout {
    kind: LayoutKind::American,
    labels: &AMERICAN_ORDER,
};

impl WheelLayout {
    /// Arrangement this table describes.
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Number of pockets.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false` for the built-in tables.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in physical order.
    pub fn labels(&self) -> &'static [PocketLabel] {
        self.labels
    }

    /// Pocket at `index`.
    pub fn pocket(&self, index: usize) -> Option<Pocket> {
        self.labels.get(index).map(|&label| Pocket {
            label,
            color: label.color(),
        })
    }

    /// All pockets in physical order.
    pub fn pockets(&self) -> impl Iterator<Item = Pocket> + '_ {
        self.labels.iter().map(|&label| Pocket {
            label,
            color: label.color(),
        })
    }

    /// Physical index of `label`, or a validation error when the label is not on this wheel.
    pub fn index_of(&self, label: PocketLabel) -> SpinResult<usize> {
        self.labels
            .iter()
            .position(|&l| l == label)
            .ok_or_else(|| {
                SpinError::validation(format!(
                    "pocket '{label}' does not exist on the {} wheel",
                    self.kind
                ))
            })
    }

    /// Parse `outcome` and resolve it to a physical index.
    pub fn index_of_str(&self, outcome: &str) -> SpinResult<usize> {
        self.index_of(outcome.parse()?)
    }

    /// Angular width of one pocket in radians.
    pub fn pocket_angular_width(&self) -> f64 {
        TAU / self.len() as f64
    }

    /// Wheel-local center angle of pocket `index`.
    pub fn pocket_center_angle(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.pocket_angular_width()
    }

    /// Pocket index containing the wheel-local `angle` (any real value, wrapped first).
    pub fn pocket_at_angle(&self, angle: f64) -> usize {
        let a = wrap_angle(angle);
        let idx = (a / self.pocket_angular_width()).floor() as usize;
        idx.min(self.len() - 1)
    }

    /// Check the table invariant: every label appears exactly once.
    pub fn validate(&self) -> SpinResult<()> {
        for (i, a) in self.labels.iter().enumerate() {
            if self.labels[i + 1..].contains(a) {
                return Err(SpinError::validation(format!(
                    "{} layout lists pocket '{a}' more than once",
                    self.kind
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wheel/layout.rs"]
mod tests;
