use indexmap::IndexMap;
use serde::Deserialize;

/// T-shirt mockup configuration
///
/// The compositor ships a built-in template catalog; deployments may
/// override individual colors with their own hosted product shots.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockupConfig {
    /// Template URL overrides keyed by color name
    #[serde(default)]
    pub templates: IndexMap<String, String>,
}
