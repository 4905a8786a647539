//! Thumbnail sizing. Width grows with the log of the play count so a handful
//! of heavily played games do not dwarf everything else.

/// Width bounds for thumbnails. Widths are always multiples of `min_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailScale {
    pub min_width: u32,
    pub max_width: u32,
}

impl Default for ThumbnailScale {
    fn default() -> Self {
        Self {
            min_width: 100,
            max_width: 500,
        }
    }
}

impl ThumbnailScale {
    pub fn new(min_width: u32, max_width: u32) -> Self {
        Self {
            min_width,
            max_width,
        }
    }

    /// Largest width a thumbnail may have: `max_width` rounded down to a step.
    fn ceiling(&self) -> u32 {
        (self.max_width - self.max_width % self.min_width).max(self.min_width)
    }

    /// Width for a game played `count` times when the most played game has `most_played`.
    ///
    /// `log(count) / log(most_played)` is 0/0 when `most_played` is 1, so every
    /// game gets `min_width` in that case. Rounding to the nearest step uses
    /// ties-to-even.
    pub fn width_for(&self, count: u32, most_played: u32) -> u32 {
        if most_played <= 1 || count <= 1 {
            return self.min_width;
        }
        let span = f64::from(self.max_width - self.min_width);
        let ratio = f64::from(count).ln() / f64::from(most_played).ln();
        let raw = ratio * span + f64::from(self.min_width);
        let steps = (raw / f64::from(self.min_width)).round_ties_even().max(1.0);
        let width = (steps as u32).saturating_mul(self.min_width);
        width.clamp(self.min_width, self.ceiling())
    }
}

/// Height that keeps the source aspect ratio at `width`. Never zero.
pub fn thumbnail_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 {
        return width.max(1);
    }
    let height = u64::from(src_height) * u64::from(width) / u64::from(src_width);
    u32::try_from(height).unwrap_or(u32::MAX).max(1)
}
