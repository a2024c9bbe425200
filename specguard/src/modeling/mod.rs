//! Deterministic energy and transmission models.

pub mod energy;
pub mod transmission;

use serde::Serialize;

use crate::datasheets::schema::SpecificationRecord;
pub use energy::{estimate, EnergyError, EnergyEstimate};
pub use transmission::{ProtocolError, ProtocolProfile, ProtocolTable};

/// Energy estimate for one device plus the protocol's profile, if known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceEstimate {
    pub device_id: String,
    pub protocol: String,
    pub energy: EnergyEstimate,
    /// `None` when the protocol is not in the table
    pub profile: Option<ProtocolProfile>,
}

impl DeviceEstimate {
    pub fn compute(
        record: &SpecificationRecord,
        protocol: &str,
        table: &ProtocolTable,
    ) -> Result<Self, EnergyError> {
        let energy = estimate(record.specification(), protocol)?;
        Ok(Self {
            device_id: record.device_id().to_string(),
            protocol: protocol.to_string(),
            energy,
            profile: table.lookup(protocol).cloned(),
        })
    }

    pub fn is_supported_protocol(&self) -> bool {
        self.profile.is_some()
    }
}
