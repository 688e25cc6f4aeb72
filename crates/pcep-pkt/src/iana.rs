// Copyright (C) 2024-present The Pced Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! PCEP codes registered at IANA [Path Computation Element Protocol (PCEP) Numbers](https://www.iana.org/assignments/pcep/pcep.xhtml)
//! plus the stateful extensions from RFC 8231.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, FromRepr};

/// PCEP version carried in the 3-bit `Ver` field of the common header.
/// Only version 1 is defined. See [RFC5440](https://datatracker.ietf.org/doc/html/rfc5440)
pub const PCEP_VERSION: u8 = 1;

/// IANA-assigned TCP port a PCE listens on.
pub const DEFAULT_PCEP_PORT: u16 = 4189;

/// Corresponds to the D flag in the LSP object. If set, the PCC delegates
/// control over the LSP to the PCE. See [RFC8231](https://datatracker.ietf.org/doc/html/rfc8231)
pub const LSP_FLAGS_DELEGATE: u32 = 0b0000001;

/// Corresponds to the S flag in the LSP object. Set during LSP state
/// synchronization. See [RFC8231](https://datatracker.ietf.org/doc/html/rfc8231)
pub const LSP_FLAGS_SYNC: u32 = 0b0000010;

/// Corresponds to the R flag in the LSP object. If set, the LSP has been
/// removed and the PCE should purge its state.
pub const LSP_FLAGS_REMOVE: u32 = 0b0000100;

/// Corresponds to the A flag in the LSP object, the administrative
/// (desired operational) state of the LSP.
pub const LSP_FLAGS_ADMINISTRATIVE: u32 = 0b0001000;

/// Mask and shift of the 3-bit O (operational) field in the LSP object flags.
pub const LSP_FLAGS_OPERATIONAL_MASK: u32 = 0b1110000;
pub const LSP_FLAGS_OPERATIONAL_SHIFT: u32 = 4;

/// Number of bits the PLSP-ID occupies above the LSP flags field.
pub const LSP_PLSP_ID_SHIFT: u32 = 12;

/// Corresponds to the R flag in the SRP object. See [RFC8281](https://datatracker.ietf.org/doc/html/rfc8281)
pub const SRP_FLAGS_REMOVE: u32 = 0b1;

/// Update-Capability bit in the Stateful PCE Capability TLV value.
pub const STATEFUL_CAP_LSP_UPDATE: u32 = 0b1;

/// PCEP Message types as registered in IANA [PCEP Messages](https://www.iana.org/assignments/pcep/pcep.xhtml#pcep-messages),
/// with PCRpt/PCUpd from the stateful extension.
#[repr(u8)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PcepMessageType {
    Open = 1,
    Keepalive = 2,
    PathComputationRequest = 3,
    PathComputationReply = 4,
    Notification = 5,
    Error = 6,
    Close = 7,
    StateReport = 10,
    Update = 11,
}

/// PCEP Message type is not one of [`PcepMessageType`], the carried value is
/// the undefined code.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedPcepMessageType(pub u8);

impl From<PcepMessageType> for u8 {
    fn from(value: PcepMessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for PcepMessageType {
    type Error = UndefinedPcepMessageType;

    // Spelled out: `Self::Error` would be ambiguous with the `Error = 6`
    // message type variant
    fn try_from(value: u8) -> Result<Self, UndefinedPcepMessageType> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedPcepMessageType(value)),
        }
    }
}

/// The (Object-Class, Object-Type) pairs this implementation decodes into
/// typed objects. Anything else is carried as an unknown object.
///
/// The SRP Object-Class was still marked TBD in early stateful drafts; RFC
/// 8231 assigned 33 and that is what is used here.
#[derive(Display, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PcepObjectType {
    Open,
    RequestParameters,
    NoPath,
    EndpointsIpv4,
    EndpointsIpv6,
    Bandwidth,
    ExistingBandwidth,
    Metric,
    ExplicitRoute,
    RecordRoute,
    Lspa,
    IncludeRoute,
    PcepError,
    Close,
    Lsp,
    Srp,
}

impl PcepObjectType {
    pub const fn object_class(&self) -> u8 {
        match self {
            Self::Open => 1,
            Self::RequestParameters => 2,
            Self::NoPath => 3,
            Self::EndpointsIpv4 | Self::EndpointsIpv6 => 4,
            Self::Bandwidth | Self::ExistingBandwidth => 5,
            Self::Metric => 6,
            Self::ExplicitRoute => 7,
            Self::RecordRoute => 8,
            Self::Lspa => 9,
            Self::IncludeRoute => 10,
            Self::PcepError => 13,
            Self::Close => 15,
            Self::Lsp => 32,
            Self::Srp => 33,
        }
    }

    pub const fn object_type(&self) -> u8 {
        match self {
            Self::EndpointsIpv6 | Self::ExistingBandwidth => 2,
            _ => 1,
        }
    }

    /// Closed registry lookup, `None` for any (class, type) pair without a
    /// typed decoder.
    pub const fn from_class_type(object_class: u8, object_type: u8) -> Option<Self> {
        match (object_class, object_type) {
            (1, 1) => Some(Self::Open),
            (2, 1) => Some(Self::RequestParameters),
            (3, 1) => Some(Self::NoPath),
            (4, 1) => Some(Self::EndpointsIpv4),
            (4, 2) => Some(Self::EndpointsIpv6),
            (5, 1) => Some(Self::Bandwidth),
            (5, 2) => Some(Self::ExistingBandwidth),
            (6, 1) => Some(Self::Metric),
            (7, 1) => Some(Self::ExplicitRoute),
            (8, 1) => Some(Self::RecordRoute),
            (9, 1) => Some(Self::Lspa),
            (10, 1) => Some(Self::IncludeRoute),
            (13, 1) => Some(Self::PcepError),
            (15, 1) => Some(Self::Close),
            (32, 1) => Some(Self::Lsp),
            (33, 1) => Some(Self::Srp),
            _ => None,
        }
    }
}

/// ERO/RRO sub-object types as defined in [RFC3209](https://datatracker.ietf.org/doc/html/rfc3209).
#[repr(u8)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PathSubobjectType {
    Ipv4Prefix = 1,
    Label = 3,
}

/// Sub-object type is not one of [`PathSubobjectType`], the carried value is
/// the undefined code.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedPathSubobjectType(pub u8);

impl From<PathSubobjectType> for u8 {
    fn from(value: PathSubobjectType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for PathSubobjectType {
    type Error = UndefinedPathSubobjectType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedPathSubobjectType(value)),
        }
    }
}

/// TLV types carried in the Open object.
#[repr(u16)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PcepTlvType {
    StatefulPceCapability = 16,
}

/// TLV type is not one of [`PcepTlvType`], the carried value is the undefined
/// code.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedPcepTlvType(pub u16);

impl From<PcepTlvType> for u16 {
    fn from(value: PcepTlvType) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for PcepTlvType {
    type Error = UndefinedPcepTlvType;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedPcepTlvType(value)),
        }
    }
}

/// The 3-bit O field of the LSP object, the operational status of the LSP.
/// See [RFC8231](https://datatracker.ietf.org/doc/html/rfc8231)
#[repr(u8)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LspOperationalStatus {
    Down = 0,
    Up = 1,
    Active = 2,
    GoingDown = 3,
    GoingUp = 4,
}

/// Operational status is not one of [`LspOperationalStatus`] (values 5-7 are
/// reserved), the carried value is the undefined code.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedLspOperationalStatus(pub u8);

impl From<LspOperationalStatus> for u8 {
    fn from(value: LspOperationalStatus) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for LspOperationalStatus {
    type Error = UndefinedLspOperationalStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedLspOperationalStatus(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcep_message_type() {
        let undefined_code = 200;
        let open = PcepMessageType::try_from(1);
        let report = PcepMessageType::try_from(10);
        let undefined = PcepMessageType::try_from(undefined_code);
        let open_u8: u8 = PcepMessageType::Open.into();
        assert_eq!(open, Ok(PcepMessageType::Open));
        assert_eq!(report, Ok(PcepMessageType::StateReport));
        assert_eq!(open_u8, 1);
        assert_eq!(undefined, Err(UndefinedPcepMessageType(undefined_code)));
    }

    #[test]
    fn test_object_registry_is_closed() {
        assert_eq!(PcepObjectType::from_class_type(1, 1), Some(PcepObjectType::Open));
        assert_eq!(PcepObjectType::from_class_type(4, 2), Some(PcepObjectType::EndpointsIpv6));
        assert_eq!(PcepObjectType::from_class_type(32, 1), Some(PcepObjectType::Lsp));
        assert_eq!(PcepObjectType::from_class_type(99, 1), None);
        assert_eq!(PcepObjectType::from_class_type(1, 2), None);
    }

    #[test]
    fn test_object_registry_round_trips_class_and_type() {
        let all = [
            PcepObjectType::Open,
            PcepObjectType::RequestParameters,
            PcepObjectType::NoPath,
            PcepObjectType::EndpointsIpv4,
            PcepObjectType::EndpointsIpv6,
            PcepObjectType::Bandwidth,
            PcepObjectType::ExistingBandwidth,
            PcepObjectType::Metric,
            PcepObjectType::ExplicitRoute,
            PcepObjectType::RecordRoute,
            PcepObjectType::Lspa,
            PcepObjectType::IncludeRoute,
            PcepObjectType::PcepError,
            PcepObjectType::Close,
            PcepObjectType::Lsp,
            PcepObjectType::Srp,
        ];
        for object in all {
            assert_eq!(
                PcepObjectType::from_class_type(object.object_class(), object.object_type()),
                Some(object),
                "registry lookup is not symmetric for {object}"
            );
        }
    }

    #[test]
    fn test_operational_status() {
        assert_eq!(LspOperationalStatus::try_from(0), Ok(LspOperationalStatus::Down));
        assert_eq!(LspOperationalStatus::try_from(4), Ok(LspOperationalStatus::GoingUp));
        assert_eq!(
            LspOperationalStatus::try_from(7),
            Err(UndefinedLspOperationalStatus(7))
        );
    }
}
