use foundation::{AssetId, Generation};

/// Identifies one issued asset load.
///
/// The generation is captured when the load starts; completions are matched
/// against the live generation, never against arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: Generation,
    pub asset: AssetId,
}

impl LoadTicket {
    pub fn new(generation: Generation, asset: AssetId) -> Self {
        Self { generation, asset }
    }
}
