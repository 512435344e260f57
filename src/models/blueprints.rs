use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single 2-D coordinate of a blueprint.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An authored, named and ordered sequence of points.
///
/// Two blueprints compare equal when they share the same `(author, name)` key,
/// regardless of their points or surrogate `id`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Blueprint {
    /// Surrogate key assigned by the store; `None` until the blueprint is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub author: String,
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Blueprint {
    pub fn new(author: impl Into<String>, name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: None,
            author: author.into(),
            name: name.into(),
            points,
        }
    }

    /// The `(author, name)` domain key.
    pub fn key(&self) -> (&str, &str) {
        (&self.author, &self.name)
    }

    pub fn has_key(&self, author: &str, name: &str) -> bool {
        self.author == author && self.name == name
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn replace_points(&mut self, points: Vec<Point>) {
        self.points = points;
    }

    /// Returns a copy of this blueprint carrying `points` instead of its own.
    pub fn with_points(&self, points: Vec<Point>) -> Self {
        Self {
            id: self.id.clone(),
            author: self.author.clone(),
            name: self.name.clone(),
            points,
        }
    }
}

impl PartialEq for Blueprint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Blueprint {}

impl Hash for Blueprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
