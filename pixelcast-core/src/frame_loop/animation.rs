//! Wrap-around animation counter

/// Counter advanced once per frame, wrapping to zero past `bound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationCounter {
    value: u16,
    step: u16,
    bound: u16,
}

impl AnimationCounter {
    /// Counter starting at zero
    ///
    /// A zero `step` is treated as 1, and a `step` above `bound` is
    /// clamped to `bound`, so the counter always moves and stays in range.
    pub const fn new(step: u16, bound: u16) -> Self {
        let step = if step == 0 { 1 } else { step };
        let step = if step > bound && bound > 0 { bound } else { step };
        Self {
            value: 0,
            step,
            bound,
        }
    }

    /// Current value, always in `0..=bound`
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Upper bound (inclusive)
    pub fn bound(&self) -> u16 {
        self.bound
    }

    /// Step added per advance
    pub fn step(&self) -> u16 {
        self.step
    }

    /// Advance by one step, wrapping to zero once `bound` would be exceeded
    pub fn advance(&mut self) -> u16 {
        self.value = match self.value.checked_add(self.step) {
            Some(next) if next <= self.bound => next,
            _ => 0,
        };
        self.value
    }

    /// Back to zero
    pub fn reset(&mut self) {
        self.value = 0;
    }
}

impl Default for AnimationCounter {
    fn default() -> Self {
        Self::new(1, 7)
    }
}
