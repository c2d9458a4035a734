/// Cursor over the visible rows. Positions index the filtered list, not
/// the full collection.
pub struct NavigationState {
    pub cursor: usize,
    pub scroll_offset: usize,
}

impl NavigationState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            scroll_offset: 0,
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.update_scroll();
        }
    }

    pub fn move_down(&mut self, visible_rows: usize) {
        if self.cursor < visible_rows.saturating_sub(1) {
            self.cursor += 1;
            self.update_scroll();
        }
    }

    /// Keeps the cursor on a row after the visible list shrank.
    pub fn clamp(&mut self, visible_rows: usize) {
        let last = visible_rows.saturating_sub(1);
        if self.cursor > last {
            self.cursor = last;
        }
        self.update_scroll();
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    fn update_scroll(&mut self) {
        // Simple scroll logic - keep cursor row visible
        const VISIBLE_ITEMS: usize = 20;

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + VISIBLE_ITEMS {
            self.scroll_offset = self.cursor.saturating_sub(VISIBLE_ITEMS - 1);
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}
