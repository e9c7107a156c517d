//! Shell selection per host platform.

use std::fmt;

/// Target platform family for shell dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Posix,
    Windows,
}

/// How a command string is handed to the platform shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shell {
    pub program: &'static str,
    pub flag: &'static str,
}

const POSIX_SHELL: Shell = Shell {
    program: "sh",
    flag: "-c",
};

const WINDOWS_SHELL: Shell = Shell {
    program: "cmd.exe",
    flag: "/C",
};

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    #[must_use]
    pub const fn shell(self) -> Shell {
        match self {
            Self::Posix => POSIX_SHELL,
            Self::Windows => WINDOWS_SHELL,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => f.write_str("posix"),
            Self::Windows => f.write_str("windows"),
        }
    }
}
