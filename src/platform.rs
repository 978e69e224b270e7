//! Target device family of a TiGroup.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// No platform known yet.  Fine for reading, refused for writing.
    #[default]
    None,
    Ti73,
    Ti82,
    Ti83,
    Ti83Plus,
    Ti84Plus,
    Ti85,
    Ti86,
    Ti89,
    Ti89Titanium,
    Ti92,
    Ti92Plus,
    V200,
}

const ALL: [Platform; 12] = [
    Platform::Ti73,
    Platform::Ti82,
    Platform::Ti83,
    Platform::Ti83Plus,
    Platform::Ti84Plus,
    Platform::Ti85,
    Platform::Ti86,
    Platform::Ti89,
    Platform::Ti89Titanium,
    Platform::Ti92,
    Platform::Ti92Plus,
    Platform::V200,
];

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Platform::None         => "none",
            Platform::Ti73         => "TI73",
            Platform::Ti82         => "TI82",
            Platform::Ti83         => "TI83",
            Platform::Ti83Plus     => "TI83+",
            Platform::Ti84Plus     => "TI84+",
            Platform::Ti85         => "TI85",
            Platform::Ti86         => "TI86",
            Platform::Ti89         => "TI89",
            Platform::Ti89Titanium => "TI89t",
            Platform::Ti92         => "TI92",
            Platform::Ti92Plus     => "TI92+",
            Platform::V200         => "V200",
        }
    }

    /// Accepts the display name, with or without the `TI` prefix, in any case.
    pub fn from_name(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        let wanted = wanted.strip_prefix("TI-").or_else(|| wanted.strip_prefix("TI")).unwrap_or(&wanted);
        if wanted == "NONE" {
            return Some(Platform::None);
        }
        ALL.iter().copied().find(|p| {
            let name = p.name().to_ascii_uppercase();
            name.strip_prefix("TI").unwrap_or(&name) == wanted
        })
    }

    /// Guess the platform from a TI file extension such as `.89p` or `.8Xk`.
    pub fn from_extension(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_uppercase(),
            None => return Platform::None,
        };
        // `get` rather than slicing: the extension may hold multi-byte characters.
        match ext.get(..2) {
            Some("73") => Platform::Ti73,
            Some("82") => Platform::Ti82,
            Some("83") => Platform::Ti83,
            Some("8X") => Platform::Ti83Plus,
            Some("85") => Platform::Ti85,
            Some("86") => Platform::Ti86,
            Some("89") => Platform::Ti89,
            Some("92") => Platform::Ti92,
            Some("9X") => Platform::Ti92Plus,
            Some("V2") => Platform::V200,
            _          => Platform::None,
        }
    }

    /// 8-byte file signature used by regular variable files of this family.
    pub fn signature(self) -> Option<&'static [u8; 8]> {
        Some(match self {
            Platform::None => return None,
            Platform::Ti73 => b"**TI73**",
            Platform::Ti82 => b"**TI82**",
            Platform::Ti83 => b"**TI83**",
            Platform::Ti83Plus | Platform::Ti84Plus => b"**TI83F*",
            Platform::Ti85 => b"**TI85**",
            Platform::Ti86 => b"**TI86**",
            Platform::Ti89 | Platform::Ti89Titanium => b"**TI89**",
            Platform::Ti92 => b"**TI92**",
            Platform::Ti92Plus | Platform::V200 => b"**TI92P*",
        })
    }

    /// Inverse of [`Platform::signature`]; shared signatures map to the oldest model.
    pub fn from_signature(sig: &[u8]) -> Self {
        ALL.iter()
            .copied()
            .find(|p| p.signature().is_some_and(|s| s.as_slice() == sig))
            .unwrap_or(Platform::None)
    }

    /// 68k models (TI-89/92 family) use a different variable header than the Z80 ones.
    pub fn is_68k(self) -> bool {
        matches!(
            self,
            Platform::Ti89 | Platform::Ti89Titanium | Platform::Ti92 | Platform::Ti92Plus | Platform::V200
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::from_name(s).ok_or_else(|| format!("unknown platform '{s}'"))
    }
}
