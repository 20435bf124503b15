//! Scoring for simultaneous line clears

/// Points for clearing one, two, three or four-plus rows at once
pub const SINGLE: u64 = 120;
pub const DOUBLE: u64 = 300;
pub const TRIPLE: u64 = 900;
pub const QUAD: u64 = 3600;

/// Points awarded for clearing `lines` rows in one lock
pub fn points_for(lines: usize) -> u64 {
    match lines {
        0 => 0,
        1 => SINGLE,
        2 => DOUBLE,
        3 => TRIPLE,
        _ => QUAD,
    }
}

/// Score tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simultaneous clear of `lines` rows, returning the points awarded
    pub fn add_clear(&mut self, lines: usize) -> u64 {
        let awarded = points_for(lines);
        self.points += awarded;
        self.lines += lines as u32;
        awarded
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
