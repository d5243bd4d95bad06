//! Enumerations shared by the crawl data model
//!
//! Every enum here is stored as text in the database, so each one carries a
//! `to_db_string` / `from_db_string` pair alongside its serde representation.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a page inside the discovered site structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// The effective homepage
    Main,
    /// Top-level navigation item (depth 1)
    Menu,
    /// Second-level navigation item (depth 2)
    Submenu,
    /// Third-level navigation item or a page found by the deep crawl
    Content,
    /// Bulletin board listing
    Board,
    /// Page opened through a script trigger
    Popup,
    /// Link leaving the organization's domain
    External,
    /// In-page layer that is never fetched
    Modal,
}

impl PageType {
    /// Page type used for a navigation node at the given depth
    pub fn for_menu_depth(depth: u32) -> Self {
        match depth {
            0 | 1 => Self::Menu,
            2 => Self::Submenu,
            _ => Self::Content,
        }
    }

    /// Returns true if the crawler must never fetch pages of this type
    pub fn is_unfetchable(&self) -> bool {
        matches!(self, Self::External | Self::Modal)
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Menu => "menu",
            Self::Submenu => "submenu",
            Self::Content => "content",
            Self::Board => "board",
            Self::Popup => "popup",
            Self::External => "external",
            Self::Modal => "modal",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "main" => Some(Self::Main),
            "menu" => Some(Self::Menu),
            "submenu" => Some(Self::Submenu),
            "content" => Some(Self::Content),
            "board" => Some(Self::Board),
            "popup" => Some(Self::Popup),
            "external" => Some(Self::External),
            "modal" => Some(Self::Modal),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Main,
            Self::Menu,
            Self::Submenu,
            Self::Content,
            Self::Board,
            Self::Popup,
            Self::External,
            Self::Modal,
        ]
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// What kind of content a page holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Static,
    Board,
    Gallery,
    Video,
    List,
    Form,
    Popup,
}

impl ContentType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Board => "board",
            Self::Gallery => "gallery",
            Self::Video => "video",
            Self::List => "list",
            Self::Form => "form",
            Self::Popup => "popup",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "static" => Some(Self::Static),
            "board" => Some(Self::Board),
            "gallery" => Some(Self::Gallery),
            "video" => Some(Self::Video),
            "list" => Some(Self::List),
            "form" => Some(Self::Form),
            "popup" => Some(Self::Popup),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// How a popup page is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    /// Generic click handler calling a function with a path argument
    Onclick,
    /// Location assignment or a `javascript:` href
    Href,
    /// URL stored in a data attribute
    DataUrl,
    /// Explicit `window.open` call
    WindowOpen,
    /// Modal trigger pointing at an in-page fragment
    Layer,
}

impl TriggerType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Onclick => "onclick",
            Self::Href => "href",
            Self::DataUrl => "data-url",
            Self::WindowOpen => "window-open",
            Self::Layer => "layer",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "onclick" => Some(Self::Onclick),
            "href" => Some(Self::Href),
            "data-url" => Some(Self::DataUrl),
            "window-open" => Some(Self::WindowOpen),
            "layer" => Some(Self::Layer),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Category of a dictionary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    Person,
    Department,
    Organization,
    Place,
    Event,
    Program,
}

impl EntryCategory {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Department => "department",
            Self::Organization => "organization",
            Self::Place => "place",
            Self::Event => "event",
            Self::Program => "program",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "person" => Some(Self::Person),
            "department" => Some(Self::Department),
            "organization" => Some(Self::Organization),
            "place" => Some(Self::Place),
            "event" => Some(Self::Event),
            "program" => Some(Self::Program),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Person,
            Self::Department,
            Self::Organization,
            Self::Place,
            Self::Event,
            Self::Program,
        ]
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Classification of an error recorded during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlErrorKind {
    /// The homepage could not be fetched; the crawl stops
    HomepageUnreachable,
    /// A single page failed; the crawl continues
    PageUnreachable,
    /// Markup could not be interpreted
    ExtractionAnomaly,
    /// The structure analyzer failed or answered garbage
    AnalyzerFailure,
}

impl CrawlErrorKind {
    /// Returns true if this error ends the crawl
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HomepageUnreachable)
    }
}
