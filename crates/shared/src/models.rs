use serde::{Deserialize, Serialize};

use crate::grid::MapPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    England,
    France,
    Spain,
    Dutch,
    Netherlands,
    Pirate,
    Infected,
    Native,
    Jesuit,
    Independent,
}

impl Faction {
    pub const ALL: [Faction; 10] = [
        Faction::England,
        Faction::France,
        Faction::Spain,
        Faction::Dutch,
        Faction::Netherlands,
        Faction::Pirate,
        Faction::Infected,
        Faction::Native,
        Faction::Jesuit,
        Faction::Independent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::England => "england",
            Faction::France => "france",
            Faction::Spain => "spain",
            Faction::Dutch => "dutch",
            Faction::Netherlands => "netherlands",
            Faction::Pirate => "pirate",
            Faction::Infected => "infected",
            Faction::Native => "native",
            Faction::Jesuit => "jesuit",
            Faction::Independent => "independent",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Faction::ALL.into_iter().find(|f| f.as_str() == slug)
    }

    /// Minimap dot colour.
    pub fn color(&self) -> &'static str {
        match self {
            Faction::Spain => "#ffff00",
            Faction::England => "#ff0000",
            Faction::Dutch | Faction::Netherlands => "#90ee90",
            Faction::France => "#0000ff",
            Faction::Pirate => "#ffffff",
            Faction::Native => "#D2691E",
            Faction::Jesuit => "#0082ff",
            Faction::Infected => "#8B0000",
            Faction::Independent => "#ff00ff",
        }
    }

    pub fn icon(&self) -> PortIcon {
        match self {
            Faction::Infected => PortIcon::Biohazard,
            Faction::Pirate => PortIcon::Skull,
            Faction::Native => PortIcon::Wigwam,
            Faction::Jesuit => PortIcon::Church,
            Faction::Independent => PortIcon::Flag,
            _ => PortIcon::Anchor,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortIcon {
    Anchor,
    Biohazard,
    Skull,
    Wigwam,
    Church,
    Flag,
}

/// A port, after sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub city: String,
    /// Display text as published, e.g. "Spain".
    pub country: String,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub description: String,
}

/// A moving map entity (ship, storm, ...), after sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub description: String,
    /// Always a path under `images/`.
    pub image: String,
}

impl Entity {
    /// Minimap dot colour, keyed off the id.
    pub fn color(&self) -> &'static str {
        let id = self.id.to_lowercase();
        if id.contains("ship") {
            "#dc143c"
        } else if id.contains("storm") {
            "#ffffff"
        } else {
            "#0ff"
        }
    }
}

/// A named place drawn as text on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLabel {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Port,
    Entity,
}

/// Anything drawn as a clickable marker.
#[derive(Debug, Clone, PartialEq)]
pub enum PointOfInterest {
    Port(Port),
    Entity(Entity),
}

impl PointOfInterest {
    pub fn id(&self) -> &str {
        match self {
            PointOfInterest::Port(p) => &p.id,
            PointOfInterest::Entity(e) => &e.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PointOfInterest::Port(p) => &p.city,
            PointOfInterest::Entity(e) => &e.name,
        }
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            PointOfInterest::Port(_) => MarkerKind::Port,
            PointOfInterest::Entity(_) => MarkerKind::Entity,
        }
    }

    pub fn position(&self) -> MapPoint {
        match self {
            PointOfInterest::Port(p) => MapPoint::new(p.x, p.y),
            PointOfInterest::Entity(e) => MapPoint::new(e.x, e.y),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            PointOfInterest::Port(p) => &p.description,
            PointOfInterest::Entity(e) => &e.description,
        }
    }

    /// Subtitle line for tooltips and sidebar items.
    pub fn subtitle(&self) -> String {
        match self {
            PointOfInterest::Port(p) => p.country.clone(),
            PointOfInterest::Entity(_) => String::new(),
        }
    }

    /// Case-insensitive substring match on the display name.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty() || self.display_name().to_lowercase().contains(&term)
    }
}
