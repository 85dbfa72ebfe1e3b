use std::fmt;

use serde::Serialize;

/// One step of the verification pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    TypeCheck,
    RoundtripCheck,
    ComplianceCheck,
    Simulate,
    SimulationRoundtripCheck,
}

impl Stage {
    pub const ALL: [Self; 5] = [
        Self::TypeCheck,
        Self::RoundtripCheck,
        Self::ComplianceCheck,
        Self::Simulate,
        Self::SimulationRoundtripCheck,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeCheck => "TYPE_CHECK",
            Self::RoundtripCheck => "ROUNDTRIP_CHECK",
            Self::ComplianceCheck => "COMPLIANCE_CHECK",
            Self::Simulate => "SIMULATE",
            Self::SimulationRoundtripCheck => "SIMULATION_ROUNDTRIP_CHECK",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_name_matches_display() {
        for stage in Stage::ALL {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, serde_json::Value::String(stage.to_string()));
        }
    }

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::ALL.windows(2).all(|w| w[0] < w[1]));
    }
}
