use serde::{Deserialize, Serialize};

/// A wire-format revision of the protocol, identified by its numeric epoch.
///
/// Versions are totally ordered; the registry selects id tables by comparing
/// them. The constants below cover every upstream release this crate ships
/// tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(pub i32);

impl ProtocolVersion {
    pub const V1_7_10: ProtocolVersion = ProtocolVersion(5);
    pub const V1_8: ProtocolVersion = ProtocolVersion(47);
    pub const V1_9: ProtocolVersion = ProtocolVersion(107);
    pub const V1_9_1: ProtocolVersion = ProtocolVersion(108);
    pub const V1_9_2: ProtocolVersion = ProtocolVersion(109);
    pub const V1_9_3: ProtocolVersion = ProtocolVersion(110);
    pub const V1_10: ProtocolVersion = ProtocolVersion(210);
    pub const V1_11: ProtocolVersion = ProtocolVersion(315);
    pub const V1_11_1: ProtocolVersion = ProtocolVersion(316);
    pub const V1_12: ProtocolVersion = ProtocolVersion(335);
    pub const V1_12_1: ProtocolVersion = ProtocolVersion(338);
    pub const V1_12_2: ProtocolVersion = ProtocolVersion(340);
    pub const V1_13: ProtocolVersion = ProtocolVersion(393);
    pub const V1_13_1: ProtocolVersion = ProtocolVersion(401);
    pub const V1_13_2: ProtocolVersion = ProtocolVersion(404);
    pub const V1_14: ProtocolVersion = ProtocolVersion(477);
    pub const V1_14_1: ProtocolVersion = ProtocolVersion(480);
    pub const V1_14_2: ProtocolVersion = ProtocolVersion(485);
    pub const V1_14_3: ProtocolVersion = ProtocolVersion(490);
    pub const V1_14_4: ProtocolVersion = ProtocolVersion(498);
    pub const V1_15: ProtocolVersion = ProtocolVersion(573);
    pub const V1_15_1: ProtocolVersion = ProtocolVersion(575);
    pub const V1_15_2: ProtocolVersion = ProtocolVersion(578);
    pub const V1_16: ProtocolVersion = ProtocolVersion(735);
    pub const V1_16_1: ProtocolVersion = ProtocolVersion(736);
    pub const V1_16_2: ProtocolVersion = ProtocolVersion(751);
    pub const V1_16_3: ProtocolVersion = ProtocolVersion(753);
    pub const V1_16_4: ProtocolVersion = ProtocolVersion(754);
    pub const V1_17: ProtocolVersion = ProtocolVersion(755);
    pub const V1_17_1: ProtocolVersion = ProtocolVersion(756);

    pub fn epoch(self) -> i32 {
        self.0
    }

    /// The release name for known epochs.
    pub fn release_name(self) -> Option<&'static str> {
        let name = match self {
            Self::V1_7_10 => "1.7.10",
            Self::V1_8 => "1.8",
            Self::V1_9 => "1.9",
            Self::V1_9_1 => "1.9.1",
            Self::V1_9_2 => "1.9.2",
            Self::V1_9_3 => "1.9.3",
            Self::V1_10 => "1.10",
            Self::V1_11 => "1.11",
            Self::V1_11_1 => "1.11.1",
            Self::V1_12 => "1.12",
            Self::V1_12_1 => "1.12.1",
            Self::V1_12_2 => "1.12.2",
            Self::V1_13 => "1.13",
            Self::V1_13_1 => "1.13.1",
            Self::V1_13_2 => "1.13.2",
            Self::V1_14 => "1.14",
            Self::V1_14_1 => "1.14.1",
            Self::V1_14_2 => "1.14.2",
            Self::V1_14_3 => "1.14.3",
            Self::V1_14_4 => "1.14.4",
            Self::V1_15 => "1.15",
            Self::V1_15_1 => "1.15.1",
            Self::V1_15_2 => "1.15.2",
            Self::V1_16 => "1.16",
            Self::V1_16_1 => "1.16.1",
            Self::V1_16_2 => "1.16.2",
            Self::V1_16_3 => "1.16.3",
            Self::V1_16_4 => "1.16.4",
            Self::V1_17 => "1.17",
            Self::V1_17_1 => "1.17.1",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.release_name() {
            Some(name) => write!(f, "{} (protocol {})", name, self.0),
            None => write!(f, "protocol {}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(ProtocolVersion::V1_7_10 < ProtocolVersion::V1_8);
        assert!(ProtocolVersion::V1_8 < ProtocolVersion::V1_16_4);
        assert!(ProtocolVersion::V1_17 < ProtocolVersion::V1_17_1);
        assert_eq!(ProtocolVersion(47), ProtocolVersion::V1_8);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProtocolVersion::V1_8.to_string(), "1.8 (protocol 47)");
        assert_eq!(ProtocolVersion(9999).to_string(), "protocol 9999");
    }
}
