/// Best alignment of the crop inside the original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Column of the crop's top-left pixel in the original
    pub x: usize,
    /// Row of the crop's top-left pixel in the original
    pub y: usize,
    /// Normalized SSD at this position, 0.0 is a perfect match, 1.0 is the worst
    pub score: f64,
    /// Number of positions sharing exactly this score (1 = unambiguous)
    pub ties: usize,
}

impl MatchResult {
    pub fn is_ambiguous(&self) -> bool {
        self.ties > 1
    }
}
