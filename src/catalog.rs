//! The fixed set of applications the FAQ backend knows about.

use ratatui::style::Color;

/// Terminal stand-in for an application logo: a short badge drawn in the brand color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppIcon {
    pub badge: &'static str,
    pub color: Color,
}

/// A selectable target application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Application {
    /// Human-readable, unique display name (e.g. "Google Workspace").
    pub name: &'static str,
    pub icon: AppIcon,
}

impl Application {
    /// Backend route name: the display name, lower-cased.
    pub fn slug(&self) -> String {
        self.name.to_lowercase()
    }
}

const fn app(name: &'static str, badge: &'static str, r: u8, g: u8, b: u8) -> Application {
    Application {
        name,
        icon: AppIcon {
            badge,
            color: Color::Rgb(r, g, b),
        },
    }
}

/// Every application offered by the dropdown, in display order.
pub const APPLICATIONS: [Application; 11] = [
    app("Dropbox", "Db", 0, 97, 254),
    app("GitHub", "Gh", 200, 200, 200),
    app("Notion", "No", 230, 230, 230),
    app("AWS", "Aw", 255, 153, 0),
    app("Google Workspace", "Gw", 66, 133, 244),
    app("HubSpot", "Hs", 255, 122, 89),
    app("Zoom", "Zm", 45, 140, 255),
    app("Slack", "Sl", 224, 30, 90),
    app("Salesforce", "Sf", 0, 161, 224),
    app("Asana", "As", 240, 106, 106),
    app("Databricks", "Dx", 255, 54, 33),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<_> = APPLICATIONS.iter().map(|app| app.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), APPLICATIONS.len());
    }

    #[test]
    fn test_slug_lowercases_display_name() {
        assert_eq!(APPLICATIONS[0].slug(), "dropbox");
        assert_eq!(APPLICATIONS[3].slug(), "aws");
        assert_eq!(APPLICATIONS[4].slug(), "google workspace");
    }
}
