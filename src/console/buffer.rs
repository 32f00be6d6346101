//! The SQL text being edited.

/// Holds the current SQL text and an editing cursor.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryBuffer {
    text: String,
    cursor: usize,
}

impl QueryBuffer {
    /// Creates a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Returns true if the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// Returns the cursor byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the whole text and moves the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Inserts a character at the cursor.
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Moves the cursor to the start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.text[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// Moves the cursor to the end of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len());
    }

    /// Returns the cursor as (line, column), both counted in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count();
        (line, column)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut buffer = QueryBuffer::new();
        for c in "SELEC".chars() {
            buffer.insert(c);
        }
        buffer.backspace();
        assert_eq!(buffer.text(), "SELE");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buffer = QueryBuffer::new();
        buffer.set_text("abc");
        buffer.move_home();
        buffer.backspace();
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut buffer = QueryBuffer::new();
        buffer.set_text("'Pérez'");
        buffer.move_left();
        buffer.move_left();
        buffer.backspace();
        assert_eq!(buffer.text(), "'Pérz'");
        buffer.move_left();
        buffer.move_left();
        buffer.delete();
        assert_eq!(buffer.text(), "'Prz'");
    }

    #[test]
    fn test_set_text_moves_cursor_to_end() {
        let mut buffer = QueryBuffer::new();
        buffer.set_text("USE shop;");
        assert_eq!(buffer.cursor(), 9);
    }

    #[test]
    fn test_home_end_are_line_relative() {
        let mut buffer = QueryBuffer::new();
        buffer.set_text("SELECT *\nFROM users");
        buffer.move_home();
        assert_eq!(buffer.cursor_position(), (1, 0));
        buffer.move_left();
        buffer.move_home();
        assert_eq!(buffer.cursor_position(), (0, 0));
        buffer.move_end();
        assert_eq!(buffer.cursor_position(), (0, 8));
    }

    #[test]
    fn test_blank_detection() {
        let mut buffer = QueryBuffer::new();
        assert!(buffer.is_blank());
        buffer.set_text("  \n\t ");
        assert!(buffer.is_blank());
        buffer.set_text("  x ");
        assert!(!buffer.is_blank());
        assert_eq!(buffer.trimmed(), "x");
    }
}
