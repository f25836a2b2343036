//! Stacking order shared by every widget

/// Stacking layers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZIndex {
    Min = -1,
    Normal = 1,
    Middle = 5,
    Max = 10,
}

impl ZIndex {
    /// Numeric value handed to the host layout
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Layer for disclosure content, raised only while elevated
    pub fn for_elevation(elevated: bool) -> Self {
        if elevated {
            ZIndex::Middle
        } else {
            ZIndex::Min
        }
    }
}
