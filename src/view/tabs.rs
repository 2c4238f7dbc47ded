#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMode {
    Source,
    Program,
}

impl TabMode {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TabMode::Source),
            1 => Some(TabMode::Program),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            TabMode::Source => 0,
            TabMode::Program => 1,
        }
    }
}

/// Which monitor the player shows, and which ones may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGate {
    active: TabMode,
    enabled: [bool; 2],
}

impl Default for TabGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TabGate {
    pub fn new() -> Self {
        Self {
            active: TabMode::Source,
            enabled: [true, true],
        }
    }

    pub fn active(&self) -> TabMode {
        self.active
    }

    pub fn is_enabled(&self, tab: TabMode) -> bool {
        self.enabled[tab.index()]
    }

    pub fn enable_tab(&mut self, tab: TabMode, enabled: bool) {
        self.enabled[tab.index()] = enabled;
    }

    /// Returns whether the switch happened.
    pub fn switch_to_tab(&mut self, tab: TabMode) -> bool {
        if !self.is_enabled(tab) {
            log::debug!("Ignoring switch to disabled {:?} tab", tab);
            return false;
        }
        self.active = tab;
        true
    }

    pub fn on_tab_bar_clicked(&mut self, index: usize) -> bool {
        match TabMode::from_index(index) {
            Some(tab) => self.switch_to_tab(tab),
            None => false,
        }
    }
}
