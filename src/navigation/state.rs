//! Navigation state: current page and back-stack

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_page: Option<String>,
    history: Vec<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    /// Oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Move to `page`. The previous page is pushed when `add_to_history` is
    /// set, unless it equals `page`.
    pub fn visit(&mut self, page: &str, add_to_history: bool) {
        if add_to_history {
            if let Some(current) = self.current_page.take() {
                if current != page {
                    self.history.push(current);
                }
            }
        }
        self.current_page = Some(page.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.history.pop()
    }

    pub fn reset(&mut self) {
        self.current_page = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_pushes_previous() {
        let mut state = NavigationState::new();
        state.visit("dashboard", true);
        assert!(state.history().is_empty());

        state.visit("register", true);
        assert_eq!(state.history(), ["dashboard".to_string()]);
        assert_eq!(state.current_page(), Some("register"));
    }

    #[test]
    fn test_same_page_not_pushed() {
        let mut state = NavigationState::new();
        state.visit("track", true);
        state.visit("track", true);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_visit_without_history() {
        let mut state = NavigationState::new();
        state.visit("a", true);
        state.visit("b", false);
        assert!(state.history().is_empty());
        assert_eq!(state.current_page(), Some("b"));

        state.reset();
        assert_eq!(state.current_page(), None);
    }
}
