//! Energy stream facade.

use fl_host::Property;

use crate::accessor::Accessor;
use crate::error::LinkResult;

/// Typed view of one energy stream. Its only typed property is heat flow.
pub struct EnergyStream<'a> {
    acc: Accessor<'a>,
}

impl<'a> EnergyStream<'a> {
    pub(crate) fn new(acc: Accessor<'a>) -> Self {
        Self { acc }
    }

    /// Stream name as the host knows it.
    pub fn name(&self) -> &str {
        self.acc.name()
    }

    /// Generic property access for everything beyond the typed surface.
    pub fn accessor(&self) -> &Accessor<'a> {
        &self.acc
    }

    /// Heat flow [kJ/h].
    pub fn heat_flow(&self) -> LinkResult<f64> {
        self.acc.get(Property::HeatFlow)
    }

    pub fn set_heat_flow(&self, kj_per_h: f64) -> LinkResult<()> {
        self.acc.set(Property::HeatFlow, kj_per_h)
    }
}
