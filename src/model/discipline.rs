use serde::{Deserialize, Serialize};
use std::fmt;

/// Engineering domain an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Discipline {
    Architecture,
    Structure,
    Electrical,
    Plumbing,
    #[serde(rename = "HVAC")]
    Hvac,
    #[default]
    Unknown,
}

impl Discipline {
    pub const ALL: [Discipline; 6] = [
        Discipline::Architecture,
        Discipline::Structure,
        Discipline::Electrical,
        Discipline::Plumbing,
        Discipline::Hvac,
        Discipline::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Discipline::Architecture => "Architecture",
            Discipline::Structure => "Structure",
            Discipline::Electrical => "Electrical",
            Discipline::Plumbing => "Plumbing",
            Discipline::Hvac => "HVAC",
            Discipline::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
