// SmartCane V1 — System Events & Data Types

// ---------------------------------------------------------------------------
// Contact edges
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    /// Signal rose to or above the threshold.
    ContactStart,
    /// Signal fell below the threshold; one step completed.
    ContactEnd,
}

// ---------------------------------------------------------------------------
// Publish visibility
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

// ---------------------------------------------------------------------------
// Controller mode
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Logging,
}

// ---------------------------------------------------------------------------
// Live metrics — refreshed on every logged sample
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveMetrics {
    pub weight_kg: f32,
    pub force_n: f32,
    pub pressure_kpa: f32,
    pub contact_area_cm2: f32,
    pub steps: u32,
}
