use std::fmt;

/// Unix permission bits for files the tool writes.
///
/// Capability-named constructors keep call sites readable; adapters on
/// platforms without mode bits ignore the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Owner read/write only (`0600`). Private keys, credential sidecars.
    pub const fn private() -> Self {
        Self(0o600)
    }

    /// Owner read/write, everyone read (`0644`). Certificates, configs.
    pub const fn public_read() -> Self {
        Self(0o644)
    }

    /// Owner all, everyone read/execute (`0755`).
    pub const fn executable() -> Self {
        Self(0o755)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True when neither group nor other may read the file.
    pub const fn denies_group_and_other_read(&self) -> bool {
        self.0 & 0o044 == 0
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::public_read()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_mode_hides_key_from_group_and_other() {
        assert!(FileMode::private().denies_group_and_other_read());
        assert!(!FileMode::public_read().denies_group_and_other_read());
    }

    #[test]
    fn displays_as_octal() {
        assert_eq!(FileMode::private().to_string(), "0600");
        assert_eq!(FileMode::from_bits(0o100644).to_string(), "0644");
    }
}
