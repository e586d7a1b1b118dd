//! Material stream facade.

use std::collections::BTreeMap;

use fl_host::{HostError, Property};

use crate::accessor::Accessor;
use crate::error::{LinkError, LinkResult};
use crate::session::{FallbackPolicy, MismatchPolicy};

/// Host-side names of the per-component vectors.
const MOLAR_FRACTION_KEY: &str = "ComponentMolarFraction";
const MOLAR_FLOW_KEY: &str = "ComponentMolarFlow";

/// Fraction sums further than this from 1.0 get normalized before writing.
const NORMALIZE_TOL: f64 = 1e-6;

/// Typed view of one material stream.
///
/// Scalar getters and setters work in fixed facade units (K, bar, gmole/s,
/// kg/h, kJ/h); anything else goes through [`accessor`](Self::accessor).
#[derive(Debug)]
pub struct MaterialStream<'a> {
    acc: Accessor<'a>,
}

impl<'a> MaterialStream<'a> {
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

    /// Stream temperature [K].
    pub fn temperature(&self) -> LinkResult<f64> {
        self.acc.get(Property::Temperature)
    }

    pub fn set_temperature(&self, kelvin: f64) -> LinkResult<()> {
        self.acc.set(Property::Temperature, kelvin)
    }

    /// Stream pressure [bar].
    pub fn pressure(&self) -> LinkResult<f64> {
        self.acc.get(Property::Pressure)
    }

    pub fn set_pressure(&self, bar: f64) -> LinkResult<()> {
        self.acc.set(Property::Pressure, bar)
    }

    /// Total molar flow [gmole/s].
    pub fn molar_flow(&self) -> LinkResult<f64> {
        self.acc.get(Property::MolarFlow)
    }

    pub fn set_molar_flow(&self, gmole_per_s: f64) -> LinkResult<()> {
        self.acc.set(Property::MolarFlow, gmole_per_s)
    }

    /// Total mass flow [kg/h].
    pub fn mass_flow(&self) -> LinkResult<f64> {
        self.acc.get(Property::MassFlow)
    }

    pub fn set_mass_flow(&self, kg_per_h: f64) -> LinkResult<()> {
        self.acc.set(Property::MassFlow, kg_per_h)
    }

    /// Heat flow [kJ/h].
    pub fn heat_flow(&self) -> LinkResult<f64> {
        self.acc.get(Property::HeatFlow)
    }

    pub fn set_heat_flow(&self, kj_per_h: f64) -> LinkResult<()> {
        self.acc.set(Property::HeatFlow, kj_per_h)
    }

    /// Molar vapour fraction (calculated, unit-less).
    pub fn vapour_fraction(&self) -> LinkResult<f64> {
        self.acc.get(Property::VapourFraction)
    }

    /// Mixture molecular weight (calculated, unit-less).
    pub fn molecular_weight(&self) -> LinkResult<f64> {
        self.acc.get(Property::MolecularWeight)
    }

    /// Compressibility factor (calculated, unit-less).
    pub fn z_factor(&self) -> LinkResult<f64> {
        self.acc.get(Property::ZFactor)
    }

    /// Component names of the stream's basis, in host order.
    ///
    /// Hosts report names in nested groups padded with empty slots; the
    /// padding is dropped here and the groups are flattened.
    pub fn component_names(&self) -> LinkResult<Vec<String>> {
        let (host, case) = self.acc.session().active()?;
        Ok(flatten_names(host.component_name_groups(case)?))
    }

    /// Component molar fractions keyed by component name.
    ///
    /// When the host reports more (or fewer) fraction values than component
    /// names, the session's mismatch policy decides between one warning plus
    /// truncation to the shorter length, and a hard error.
    pub fn component_molar_fractions(&self) -> LinkResult<BTreeMap<String, f64>> {
        let names = self.component_names()?;
        let values = self
            .acc
            .session()
            .host()?
            .read_vector(self.acc.object(), MOLAR_FRACTION_KEY, None)?;
        self.zip_components(names, values)
    }

    /// Replace the stream's molar composition in one host call.
    ///
    /// The vector is built over the stream's own component order. Components
    /// missing from `fractions` are written as 0.0 (one warning each); keys
    /// that are not components of the stream are skipped (one warning in
    /// total). A sum further than 1e-6 from 1.0 is normalized with a
    /// warning. A non-finite, zero or negative sum is an error, as is any
    /// negative entry, and nothing is written in that case.
    pub fn set_component_molar_fractions(
        &self,
        fractions: &BTreeMap<String, f64>,
    ) -> LinkResult<()> {
        let names = self.component_names()?;
        if names.is_empty() {
            return Err(LinkError::InvalidComposition {
                what: "stream has no components",
            });
        }

        let mut vector = Vec::with_capacity(names.len());
        for name in &names {
            match fractions.get(name) {
                Some(value) => {
                    if !value.is_finite() || *value < 0.0 {
                        return Err(LinkError::InvalidComposition {
                            what: "fractions must be finite and non-negative",
                        });
                    }
                    vector.push(*value);
                }
                None => {
                    tracing::warn!(
                        stream = self.name(),
                        component = %name,
                        "no fraction supplied; writing 0.0"
                    );
                    vector.push(0.0);
                }
            }
        }

        let unknown = fractions
            .keys()
            .filter(|key| !names.iter().any(|n| n == *key))
            .count();
        if unknown > 0 {
            tracing::warn!(
                stream = self.name(),
                skipped = unknown,
                "ignoring fractions for names that are not components of the stream"
            );
        }

        let sum: f64 = vector.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(LinkError::InvalidComposition {
                what: "fractions must sum to a positive finite value",
            });
        }
        if (sum - 1.0).abs() > NORMALIZE_TOL {
            tracing::warn!(
                stream = self.name(),
                total = sum,
                "fractions do not sum to 1; normalizing"
            );
            for value in &mut vector {
                *value /= sum;
            }
        }

        Ok(self.acc.session().host()?.write_vector(
            self.acc.object(),
            MOLAR_FRACTION_KEY,
            None,
            &vector,
        )?)
    }

    /// Component molar flows [gmole/s] keyed by component name.
    pub fn component_molar_flows(&self) -> LinkResult<BTreeMap<String, f64>> {
        self.component_molar_flows_in(fl_core::units::GMOLE_PER_S)
    }

    /// Component molar flows in an explicit unit, keyed by component name.
    ///
    /// When the host cannot express the vector in `unit`, the session's
    /// fallback policy decides between one warning plus the host's native
    /// values, and a hard error.
    pub fn component_molar_flows_in(&self, unit: &str) -> LinkResult<BTreeMap<String, f64>> {
        let names = self.component_names()?;
        let host = self.acc.session().host()?;
        let values = match host.read_vector(self.acc.object(), MOLAR_FLOW_KEY, Some(unit)) {
            Ok(values) => values,
            Err(err @ HostError::UnitMismatch { .. }) => {
                match self.acc.session().options().fallback {
                    FallbackPolicy::WarnNative => {
                        tracing::warn!(
                            stream = self.name(),
                            unit,
                            "host cannot express component molar flow in requested unit; \
                             returning native values"
                        );
                        host.read_vector(self.acc.object(), MOLAR_FLOW_KEY, None)?
                    }
                    FallbackPolicy::Strict => return Err(err.into()),
                }
            }
            Err(other) => return Err(other.into()),
        };
        self.zip_components(names, values)
    }

    fn zip_components(
        &self,
        names: Vec<String>,
        values: Vec<f64>,
    ) -> LinkResult<BTreeMap<String, f64>> {
        if names.len() != values.len() {
            match self.acc.session().options().mismatch {
                MismatchPolicy::WarnTruncate => {
                    tracing::warn!(
                        stream = self.name(),
                        names = names.len(),
                        values = values.len(),
                        "component name and value counts disagree; zipping to the shorter"
                    );
                }
                MismatchPolicy::Strict => {
                    return Err(LinkError::CompositionLengthMismatch {
                        names: names.len(),
                        values: values.len(),
                    });
                }
            }
        }
        Ok(names.into_iter().zip(values).collect())
    }
}

/// Flatten the host's grouped component names, dropping empty padding slots.
fn flatten_names(groups: Vec<Vec<String>>) -> Vec<String> {
    groups
        .into_iter()
        .flatten()
        .filter(|name| !name.trim().is_empty())
        .collect()
}
