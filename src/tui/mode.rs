// state local to the tui: where the cursor is and whether a save name is
// being typed. row count is synced from DisplayState every loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TuiState {
    pub cursor: usize,
    pub rows: usize,
    pub prompt: Option<SavePrompt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavePrompt {
    pub target: SaveTarget,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveTarget {
    Track(usize),
    Mix,
}

impl TuiState {
    // keeps the cursor on a real row after deletes/imports shrink the list
    pub fn sync(&mut self, rows: usize) {
        self.rows = rows;
        if self.cursor >= rows {
            self.cursor = rows.saturating_sub(1);
        }
        let vanished = match self.prompt.as_ref().map(|p| p.target) {
            Some(SaveTarget::Track(row)) => row >= rows,
            Some(SaveTarget::Mix) => rows == 0,
            None => false,
        };
        if vanished {
            self.prompt = None;
        }
    }

    pub fn has_rows(&self) -> bool {
        self.rows > 0
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows == 0 {
            self.cursor = 0;
            return;
        }
        let max = self.rows as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_follows_shrinking_list() {
        let mut ts = TuiState { cursor: 4, rows: 5, prompt: None };
        ts.sync(2);
        assert_eq!(ts.cursor, 1);
        ts.sync(0);
        assert_eq!(ts.cursor, 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut ts = TuiState::default();
        ts.sync(3);
        ts.move_cursor(-1);
        assert_eq!(ts.cursor, 0);
        ts.move_cursor(10);
        assert_eq!(ts.cursor, 2);
    }

    #[test]
    fn prompt_for_a_vanished_row_is_dropped() {
        let mut ts = TuiState {
            cursor: 1,
            rows: 2,
            prompt: Some(SavePrompt { target: SaveTarget::Track(1), name: "x".into() }),
        };
        ts.sync(1);
        assert!(ts.prompt.is_none());
    }

    #[test]
    fn mix_prompt_survives_until_the_list_is_empty() {
        let mut ts = TuiState {
            cursor: 0,
            rows: 2,
            prompt: Some(SavePrompt { target: SaveTarget::Mix, name: String::new() }),
        };
        ts.sync(1);
        assert!(ts.prompt.is_some());
        ts.sync(0);
        assert!(ts.prompt.is_none());
    }
}
