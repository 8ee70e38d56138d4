/// Right clicks needed to close the app.
pub const CLICKS_TO_CLOSE: u32 = 5;
/// Left clicks needed to swap the palette.
pub const CLICKS_TO_SWAP_PALETTE: u32 = 3;
/// All clicks of one gesture must land within this window (ms).
pub const CLICK_WINDOW_MS: u64 = 2000;

/// Counts presses of one button; fires after `required` presses that all
/// fall inside `window_ms` of the first.
#[derive(Debug, Clone)]
pub struct ClickBurst {
    required: u32,
    window_ms: u64,
    count: u32,
    first_click_ms: u64,
}

impl ClickBurst {
    pub fn new(required: u32, window_ms: u64) -> Self {
        Self {
            required,
            window_ms,
            count: 0,
            first_click_ms: 0,
        }
    }

    /// Record a press at `now_ms`. Returns true (and starts over) when the
    /// gesture completes.
    pub fn register(&mut self, now_ms: u64) -> bool {
        if self.count == 0 || now_ms.saturating_sub(self.first_click_ms) > self.window_ms {
            self.count = 1;
            self.first_click_ms = now_ms;
        } else {
            self.count += 1;
        }

        if self.count >= self.required {
            self.count = 0;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn count(&self) -> u32 {
        self.count
    }
}
