use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Rotation, Vector3};
use crate::pattern::{PanelId, PatternStore};

/// Places `n` copies of a panel evenly around the world Y axis.
///
/// The original panel stays first; copy `i` is named `"{name}_{i}"` and is
/// rotated by `i * 360° / n` together with its translation, so its outward
/// side keeps facing away from the axis.
pub struct DistributeAroundY {
    panel: PanelId,
    count: usize,
}

impl DistributeAroundY {
    /// Creates a new `DistributeAroundY` operation.
    #[must_use]
    pub fn new(panel: PanelId, count: usize) -> Self {
        Self { panel, count }
    }

    /// Executes the operation, returning the original and the new panels in
    /// order around the axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or the panel is not in the store.
    pub fn execute(&self, store: &mut PatternStore) -> Result<Vec<PanelId>> {
        if self.count == 0 {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "copy count",
                value: 0.0,
                min: 1.0,
                max: f64::INFINITY,
            }
            .into());
        }
        let name = store.panel(self.panel)?.name().to_owned();

        let mut ids = Vec::with_capacity(self.count);
        ids.push(self.panel);
        for i in 1..self.count {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * i as f64 / self.count as f64;
            let delta = Rotation::from_axis_angle(&Vector3::y_axis(), angle);

            let id = store.duplicate_panel(self.panel, format!("{name}_{i}"))?;
            let copy = store.panel_mut(id)?;
            let translation = delta * copy.translation();
            copy.rotate_by(&delta).translate_to(translation);
            ids.push(id);
        }
        Ok(ids)
    }
}
