//! Table commands understood by pftabled

use std::fmt;

/// Command code carried in byte 1 of the datagram.
///
/// Names other than `add`, `del` and `flush` map to [`Command::Unknown`] and
/// are still sent; the daemon decides what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Command {
    #[default]
    Unknown = 0,
    Add = 1,
    Delete = 2,
    Flush = 3,
}

impl Command {
    pub fn from_name(name: &str) -> Self {
        match name {
            "add" => Command::Add,
            "del" => Command::Delete,
            "flush" => Command::Flush,
            _ => Command::Unknown,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Command::Add,
            2 => Command::Delete,
            3 => Command::Flush,
            _ => Command::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Add => "add",
            Command::Delete => "del",
            Command::Flush => "flush",
            Command::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
