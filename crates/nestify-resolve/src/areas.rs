//! Area index: area name to the layers declaring it

use std::collections::BTreeMap;

use crate::error::Result;
use crate::layers::LayerMap;

/// Layers grouped by area
pub type AreaMap = BTreeMap<String, Vec<String>>;

/// Group layer names by their `area` param. Run on expanded layers so that
/// replicas are listed individually.
pub fn index_areas(layers: &LayerMap) -> Result<AreaMap> {
    let mut areas = AreaMap::new();
    for (name, layer) in layers {
        let area = layer.params.lookup_str("area")?;
        areas.entry(area.to_string()).or_default().push(name.clone());
    }
    Ok(areas)
}
