// The actions offered to the user when the document is opened.

use std::fmt::Display;

pub const MENU_TITLE: &str = "BTGC2 Functions";
pub const GENERATE_TIMING_SHEET: &str = "Generate Timing Sheet From Bids";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Action {
    GenerateTimingSheet,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: Action,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Menu {
    pub title: &'static str,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn find(&self, label: &str) -> Option<Action> {
        self.items
            .iter()
            .find(|item| item.label.eq_ignore_ascii_case(label.trim()))
            .map(|item| item.action)
    }
}

impl Display for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        for item in self.items.iter() {
            writeln!(f, "  {}", item.label)?;
        }
        Ok(())
    }
}

/// Registers the menu of the document.
pub fn on_open() -> Menu {
    Menu {
        title: MENU_TITLE,
        items: vec![MenuItem {
            label: GENERATE_TIMING_SHEET,
            action: Action::GenerateTimingSheet,
        }],
    }
}
