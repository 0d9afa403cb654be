//! The closed set of dashboard modes

/// One browsable screen. The declaration order drives cyclic seeking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Monitor,
    Peers,
    Wallet,
    Block,
    Transaction,
    Console,
    Net,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Monitor,
        Mode::Peers,
        Mode::Wallet,
        Mode::Block,
        Mode::Transaction,
        Mode::Console,
        Mode::Net,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Mode::Monitor => "monitor",
            Mode::Peers => "peers",
            Mode::Wallet => "wallet",
            Mode::Block => "block",
            Mode::Transaction => "transaction",
            Mode::Console => "console",
            Mode::Net => "net",
        }
    }

    /// Hotkey that switches to this mode
    pub fn letter(self) -> char {
        self.title().chars().next().unwrap_or(' ')
    }

    fn index(self) -> usize {
        Mode::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Cyclic neighbour `delta` steps away
    pub fn seek(self, delta: i32) -> Mode {
        let len = Mode::ALL.len() as i64;
        let index = (self.index() as i64 + i64::from(delta)).rem_euclid(len);
        Mode::ALL[index as usize]
    }

    /// Case-insensitive hotkey lookup
    pub fn from_letter(c: char) -> Option<Mode> {
        let c = c.to_ascii_lowercase();
        Mode::ALL.into_iter().find(|mode| mode.letter() == c)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
