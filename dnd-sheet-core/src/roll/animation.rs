//! Tumble-and-land animation frames.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Frames in every roll animation.
pub const FRAME_COUNT: u32 = 12;

/// Display color of a die, resolved to real colors by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieColor {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
    /// Settled on its final value.
    Landed,
    /// Settled, but discarded by an advantage/disadvantage draw.
    Dropped,
}

/// Colors a tumbling die cycles through.
pub const TUMBLE_PALETTE: [DieColor; 6] = [
    DieColor::Red,
    DieColor::Yellow,
    DieColor::Green,
    DieColor::Cyan,
    DieColor::Blue,
    DieColor::Magenta,
];

/// Whether die `index` of `dice` has landed by `frame`.
///
/// Dice land one per frame, left to right, during the last `dice` frames:
/// `frame > FRAME_COUNT - dice + index`, rearranged to avoid underflow.
pub fn is_landed(index: usize, frame: u32, dice: usize) -> bool {
    frame as usize + dice > FRAME_COUNT as usize + index
}

/// Palette color for an unlanded die.
pub fn tumble_color(index: usize, frame: u32) -> DieColor {
    TUMBLE_PALETTE[(index + frame as usize) % TUMBLE_PALETTE.len()]
}

/// Per-die animation state for one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiceAnimation {
    pub frame: u32,
    pub total_frames: u32,
    pub display_values: Vec<u32>,
    pub display_colors: Vec<DieColor>,
    pub final_values: Vec<u32>,
    pub sides: Vec<u32>,
    /// Dice at or after this index were dropped by a keep draw.
    pub dropped_from: usize,
}

impl DiceAnimation {
    /// Start an animation at frame zero with every die tumbling.
    pub fn start<R: Rng>(
        final_values: Vec<u32>,
        sides: Vec<u32>,
        dropped_from: usize,
        rng: &mut R,
    ) -> Self {
        let display_values = sides.iter().map(|s| rng.gen_range(1..=(*s).max(1))).collect();
        let display_colors = (0..final_values.len()).map(|i| tumble_color(i, 0)).collect();

        Self {
            frame: 0,
            total_frames: FRAME_COUNT,
            display_values,
            display_colors,
            final_values,
            sides,
            dropped_from,
        }
    }

    pub fn dice(&self) -> usize {
        self.final_values.len()
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.total_frames
    }

    fn landed_color(&self, index: usize) -> DieColor {
        if index >= self.dropped_from {
            DieColor::Dropped
        } else {
            DieColor::Landed
        }
    }

    /// Advance one frame, re-randomizing every die still in the air.
    ///
    /// Returns true once the last frame has been consumed.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.frame += 1;
        let dice = self.dice();

        if self.is_finished() {
            self.display_values = self.final_values.clone();
            self.display_colors = (0..dice).map(|i| self.landed_color(i)).collect();
            return true;
        }

        for i in 0..dice {
            if is_landed(i, self.frame, dice) {
                self.display_values[i] = self.final_values[i];
                self.display_colors[i] = self.landed_color(i);
            } else {
                self.display_values[i] = rng.gen_range(1..=self.sides[i].max(1));
                self.display_colors[i] = tumble_color(i, self.frame);
            }
        }
        false
    }

    /// How many dice currently show their final value.
    pub fn landed_count(&self) -> usize {
        if self.is_finished() {
            return self.dice();
        }
        (0..self.dice())
            .filter(|i| is_landed(*i, self.frame, self.dice()))
            .count()
    }
}
