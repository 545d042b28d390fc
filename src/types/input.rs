use serde::{Deserialize, Serialize};

/// Dimensions and enclosure flag of one enclosure entry.
///
/// Length and width are normalized on construction: floored to an integer and
/// raised to at least 1. Non-finite values become 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInput", into = "RawInput")]
pub struct InputTuple {
    length: f64,
    width: f64,
    is_enclosed: bool,
}

impl InputTuple {
    #[must_use]
    pub fn new(length: f64, width: f64, is_enclosed: bool) -> Self {
        Self {
            length: normalize_dimension(length),
            width: normalize_dimension(width),
            is_enclosed,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn is_enclosed(&self) -> bool {
        self.is_enclosed
    }

    /// The `D` base variable.
    #[must_use]
    pub fn enclosed_flag(&self) -> f64 {
        if self.is_enclosed {
            1.0
        } else {
            0.0
        }
    }
}

fn normalize_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.floor().max(1.0)
    } else {
        1.0
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInput {
    length: f64,
    width: f64,
    is_enclosed: bool,
}

impl From<RawInput> for InputTuple {
    fn from(raw: RawInput) -> Self {
        InputTuple::new(raw.length, raw.width, raw.is_enclosed)
    }
}

impl From<InputTuple> for RawInput {
    fn from(input: InputTuple) -> Self {
        RawInput {
            length: input.length,
            width: input.width,
            is_enclosed: input.is_enclosed,
        }
    }
}
