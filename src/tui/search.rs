/// The `/` search box. Every keystroke changes the query, which the app
/// pushes into the page filter so the list narrows as you type.
pub struct SearchState {
    pub search_mode: bool,
    pub search_query: String,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            search_mode: false,
            search_query: String::new(),
        }
    }

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }

    /// Leaves search mode and drops the query.
    pub fn cancel_search(&mut self) {
        self.search_mode = false;
        self.search_query.clear();
    }

    /// Leaves search mode but keeps filtering by the query.
    pub fn confirm_search(&mut self) {
        self.search_mode = false;
    }

    pub fn insert_char(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn backspace(&mut self) -> bool {
        self.search_query.pop().is_some()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_builds_query() {
        let mut search = SearchState::new();
        search.enter_search_mode();
        search.insert_char('s');
        search.insert_char('h');
        search.insert_char('o');
        assert_eq!(search.search_query, "sho");

        assert!(search.backspace());
        assert_eq!(search.search_query, "sh");
    }

    #[test]
    fn test_backspace_on_empty_query() {
        let mut search = SearchState::new();
        search.enter_search_mode();
        assert!(!search.backspace());
    }

    #[test]
    fn test_confirm_keeps_query_and_cancel_drops_it() {
        let mut search = SearchState::new();
        search.enter_search_mode();
        search.insert_char('x');

        search.confirm_search();
        assert!(!search.search_mode);
        assert_eq!(search.search_query, "x");

        search.enter_search_mode();
        search.cancel_search();
        assert!(!search.search_mode);
        assert!(search.search_query.is_empty());
    }

    #[test]
    fn test_multibyte_input() {
        let mut search = SearchState::new();
        search.insert_char('é');
        search.insert_char('e');
        search.backspace();
        assert_eq!(search.search_query, "é");
    }
}
