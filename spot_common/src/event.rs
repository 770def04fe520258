//! Remote controller input snapshots.
//!
//! A `ControlEvent` is the full state of the gamepad at one instant. The
//! input side publishes one snapshot per change; the motion controller keeps
//! no history besides the previous `start` value.

use serde::{Deserialize, Deserializer, Serialize};

/// One snapshot of all buttons and axes.
///
/// Buttons are pressed when `true`. Axes are in [-1, 1]; hat axes take the
/// discrete values -1, 0 and 1. Fields missing from the serialized form
/// default to released / centered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlEvent {
    #[serde(deserialize_with = "button")]
    pub start: bool,
    #[serde(deserialize_with = "button")]
    pub select: bool,
    #[serde(deserialize_with = "button")]
    pub a: bool,
    #[serde(deserialize_with = "button")]
    pub b: bool,
    #[serde(deserialize_with = "button")]
    pub x: bool,
    #[serde(deserialize_with = "button")]
    pub y: bool,
    /// Left shoulder button, enables arm rotation/lift.
    #[serde(deserialize_with = "button")]
    pub tl: bool,
    /// Right shoulder button, enables arm reach and camera tilt.
    #[serde(deserialize_with = "button")]
    pub tr: bool,
    #[serde(deserialize_with = "button")]
    pub tl2: bool,
    #[serde(deserialize_with = "button")]
    pub tr2: bool,

    pub lx: f32,
    pub ly: f32,
    pub rx: f32,
    pub ry: f32,
    pub hat0x: f32,
    pub hat0y: f32,
}

impl ControlEvent {
    /// Event with every button released and every axis centered.
    pub const NEUTRAL: Self = Self {
        start: false,
        select: false,
        a: false,
        b: false,
        x: false,
        y: false,
        tl: false,
        tr: false,
        tl2: false,
        tr2: false,
        lx: 0.0,
        ly: 0.0,
        rx: 0.0,
        ry: 0.0,
        hat0x: 0.0,
        hat0y: 0.0,
    };

    /// Parse one JSON object, as produced by the remote controller bridge.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

// Controller bridges report buttons either as 0/1 or as booleans.
fn button<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Int(0) => Ok(false),
        Raw::Int(1) => Ok(true),
        Raw::Int(other) => Err(serde::de::Error::custom(format!(
            "button value must be 0 or 1, got {other}"
        ))),
    }
}
