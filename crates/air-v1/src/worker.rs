//! Worker availability.

use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;

impl AirModel {
    /// Mark the worker as available (or not) for new simulations.
    ///
    /// # Errors
    ///
    /// See [`AirModel::set`].
    pub async fn set_available(&mut self, available: bool) -> Result<()> {
        self.ensure_kind(&[ModelKind::Worker], "availability")?;
        self.set("available", available).await
    }
}
