/*!
 * Traffic Types
 * Domain types shared by the crossing monitor and the simulation
 */

use super::errors::ClassParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of traffic classes sharing the crossing
pub const CLASS_COUNT: usize = 3;

/// Traffic class competing for the crossing
///
/// All three classes pairwise conflict: the crossing is a single lane.
///
/// # Performance
/// - Packed C layout, used directly as an index into per-class arrays
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrafficClass {
    /// Cars heading north (direction A)
    CarNorth,
    /// Cars heading south (direction B)
    CarSouth,
    /// Pedestrians
    Pedestrian,
}

impl TrafficClass {
    /// Every class, in canonical index order
    pub const ALL: [TrafficClass; CLASS_COUNT] =
        [Self::CarNorth, Self::CarSouth, Self::Pedestrian];

    /// Canonical index into per-class arrays
    ///
    /// # Performance
    /// Hot path - used on every counter access
    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            Self::CarNorth => 0,
            Self::CarSouth => 1,
            Self::Pedestrian => 2,
        }
    }

    /// Class for a canonical index (wraps modulo the class count)
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        match index % CLASS_COUNT {
            0 => Self::CarNorth,
            1 => Self::CarSouth,
            _ => Self::Pedestrian,
        }
    }

    /// Successor in the priority chain CarNorth -> CarSouth -> Pedestrian -> CarNorth
    #[inline]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// The two conflicting classes, in priority-chain order starting after `self`
    #[inline]
    pub const fn conflicting(self) -> [Self; CLASS_COUNT - 1] {
        [self.next(), self.next().next()]
    }

    /// Whether this class is a car (either direction)
    #[inline]
    pub const fn is_car(self) -> bool {
        !matches!(self, Self::Pedestrian)
    }

    /// Convert to string representation
    ///
    /// # Performance
    /// Hot path - frequently called for logging and serialization
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CarNorth => "car_north",
            Self::CarSouth => "car_south",
            Self::Pedestrian => "pedestrian",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficClass {
    type Err = ClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "car_north" | "north" | "a" => Ok(Self::CarNorth),
            "car_south" | "south" | "b" => Ok(Self::CarSouth),
            "pedestrian" | "ped" => Ok(Self::Pedestrian),
            _ => Err(ClassParseError(s.to_string())),
        }
    }
}

impl Serialize for TrafficClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrafficClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed-size table with one slot per traffic class
pub type PerClass<T> = [T; CLASS_COUNT];
