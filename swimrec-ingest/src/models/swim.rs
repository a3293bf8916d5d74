//! Swimming domain enums: gender, pool course, stroke, event kind
//!
//! Each enum stores as its canonical code (`as_str`) and parses back from that
//! code only. Free-text vocabularies live in the parsing module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use swimrec_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Men,
    #[serde(rename = "F")]
    Women,
    #[serde(rename = "X")]
    Mixed,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "M",
            Gender::Women => "F",
            Gender::Mixed => "X",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Men),
            "F" => Ok(Gender::Women),
            "X" => Ok(Gender::Mixed),
            other => Err(Error::InvalidInput(format!("Unknown gender code: {}", other))),
        }
    }
}

/// Pool course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolCourse {
    /// Long course meters (50 m pool)
    Lcm,
    /// Short course meters (25 m pool)
    Scm,
    /// Short course yards
    Scy,
}

impl PoolCourse {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolCourse::Lcm => "LCM",
            PoolCourse::Scm => "SCM",
            PoolCourse::Scy => "SCY",
        }
    }
}

impl FromStr for PoolCourse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LCM" => Ok(PoolCourse::Lcm),
            "SCM" => Ok(PoolCourse::Scm),
            "SCY" => Ok(PoolCourse::Scy),
            other => Err(Error::InvalidInput(format!("Unknown pool course: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stroke {
    Freestyle,
    Backstroke,
    Breaststroke,
    Butterfly,
    Medley,
}

impl Stroke {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stroke::Freestyle => "Freestyle",
            Stroke::Backstroke => "Backstroke",
            Stroke::Breaststroke => "Breaststroke",
            Stroke::Butterfly => "Butterfly",
            Stroke::Medley => "Medley",
        }
    }
}

impl FromStr for Stroke {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Freestyle" => Ok(Stroke::Freestyle),
            "Backstroke" => Ok(Stroke::Backstroke),
            "Breaststroke" => Ok(Stroke::Breaststroke),
            "Butterfly" => Ok(Stroke::Butterfly),
            "Medley" => Ok(Stroke::Medley),
            other => Err(Error::InvalidInput(format!("Unknown stroke: {}", other))),
        }
    }
}

/// Individual event or relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Individual,
    Relay,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Individual => "Individual",
            EventKind::Relay => "Relay",
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Individual" => Ok(EventKind::Individual),
            "Relay" => Ok(EventKind::Relay),
            other => Err(Error::InvalidInput(format!("Unknown event kind: {}", other))),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Gender, PoolCourse, Stroke, EventKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_parse_back() {
        for gender in [Gender::Men, Gender::Women, Gender::Mixed] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        for pool in [PoolCourse::Lcm, PoolCourse::Scm, PoolCourse::Scy] {
            assert_eq!(pool.as_str().parse::<PoolCourse>().unwrap(), pool);
        }
        for stroke in [
            Stroke::Freestyle,
            Stroke::Backstroke,
            Stroke::Breaststroke,
            Stroke::Butterfly,
            Stroke::Medley,
        ] {
            assert_eq!(stroke.as_str().parse::<Stroke>().unwrap(), stroke);
        }
        for kind in [EventKind::Individual, EventKind::Relay] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!("W".parse::<Gender>().is_err());
        assert!("LC".parse::<PoolCourse>().is_err());
        assert!("IM".parse::<Stroke>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Gender::Women).unwrap(), "\"F\"");
        assert_eq!(serde_json::to_string(&PoolCourse::Scy).unwrap(), "\"SCY\"");
    }
}
