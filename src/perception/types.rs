use std::sync::Arc;

/// One uiautomator hierarchy dump. `generation` increases with every capture
/// taken from the device, so anything derived from a dump can be checked
/// against the dump currently on record.
#[derive(Debug, Clone)]
pub struct ScreenDump {
    generation: u64,
    xml: Arc<str>,
}

impl ScreenDump {
    pub fn new(generation: u64, xml: impl Into<Arc<str>>) -> Self {
        Self {
            generation,
            xml: xml.into(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }
}

/// The capture group a pattern extracted from a dump, e.g. `[42,1800][258,1900]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedToken {
    pub pattern: String,
    pub text: String,
    pub generation: u64,
}

/// Parsed form of a coordinate token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Point { x: i32, y: i32 },
    /// Two opposite corners, in whatever order the token listed them.
    Box { x1: i32, y1: i32, x2: i32, y2: i32 },
}

impl Bounds {
    /// Where to tap: the point itself, or the centre of the box.
    pub fn tap_point(&self) -> (i32, i32) {
        match *self {
            Bounds::Point { x, y } => (x, y),
            Bounds::Box { x1, y1, x2, y2 } => {
                let (lx, hx) = (x1.min(x2), x1.max(x2));
                let (ly, hy) = (y1.min(y2), y1.max(y2));
                (lx + (hx - lx) / 2, ly + (hy - ly) / 2)
            }
        }
    }

    /// Smallest y covered, i.e. the top edge of a box.
    pub fn top(&self) -> i32 {
        match *self {
            Bounds::Point { y, .. } => y,
            Bounds::Box { y1, y2, .. } => y1.min(y2),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        match *self {
            Bounds::Point { x: px, y: py } => px == x && py == y,
            Bounds::Box { x1, y1, x2, y2 } => {
                x1.min(x2) <= x && x <= x1.max(x2) && y1.min(y2) <= y && y <= y1.max(y2)
            }
        }
    }
}

/// A resolved device-pixel point, valid only against dump `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub bounds: Bounds,
    pub generation: u64,
}
