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

//! Serializer library for PCEP's wire protocol

use byteorder::{NetworkEndian, WriteBytesExt};
use netgauze_parse_utils::WritablePdu;
use netgauze_serde_macros::WritingError;
use std::io::Write;

use crate::{iana::*, wire::PCEP_TLV_HEADER_LENGTH, *};

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum PcepMessageWritingError {
    StdIOError(#[from_std_io_error] String),
    /// The message would not fit the 16-bit Message-Length field.
    MessageLengthOverflow(usize),
    PcepObjectError(#[from] PcepObjectWritingError),
}

impl WritablePdu<PcepMessageWritingError> for PcepMessage {
    /// 1-octet version/flags, 1-octet message type, 2-octets message length
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
            + match self {
                Self::Open(msg) => PcepObject::BASE_LENGTH + msg.open().len(),
                Self::Keepalive => 0,
                Self::PathComputationRequest(value)
                | Self::PathComputationReply(value)
                | Self::Notification(value) => value.len(),
                Self::Error(msg) => msg.objects().iter().map(WritablePdu::len).sum(),
                Self::Close(msg) => msg.objects().iter().map(WritablePdu::len).sum(),
                Self::StateReport(msg) => msg.objects().iter().map(WritablePdu::len).sum(),
                Self::Update(msg) => msg.objects().iter().map(WritablePdu::len).sum(),
                Self::Unimplemented(msg) => msg.value().len(),
            }
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepMessageWritingError> {
        let len = self.len();
        if len > usize::from(u16::MAX) {
            return Err(PcepMessageWritingError::MessageLengthOverflow(len));
        }
        writer.write_u8(PCEP_VERSION << 5)?;
        writer.write_u8(self.message_type_code())?;
        writer.write_u16::<NetworkEndian>(len as u16)?;

        match self {
            Self::Open(msg) => {
                let open = msg.open();
                writer.write_u8(PcepObjectType::Open.object_class())?;
                writer.write_u8(PcepObjectType::Open.object_type() << 4)?;
                writer
                    .write_u16::<NetworkEndian>((PcepObject::BASE_LENGTH + open.len()) as u16)?;
                open.write(writer)?;
            }
            Self::Keepalive => {}
            Self::PathComputationRequest(value)
            | Self::PathComputationReply(value)
            | Self::Notification(value) => {
                writer.write_all(value)?;
            }
            Self::Error(msg) => {
                for object in msg.objects() {
                    object.write(writer)?;
                }
            }
            Self::Close(msg) => {
                for object in msg.objects() {
                    object.write(writer)?;
                }
            }
            Self::StateReport(msg) => {
                for object in msg.objects() {
                    object.write(writer)?;
                }
            }
            Self::Update(msg) => {
                for object in msg.objects() {
                    object.write(writer)?;
                }
            }
            Self::Unimplemented(msg) => {
                writer.write_all(msg.value())?;
            }
        }
        Ok(())
    }
}

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum PcepObjectWritingError {
    StdIOError(#[from_std_io_error] String),
    PcepTlvError(#[from] PcepTlvWritingError),
    PathSubobjectError(#[from] PathSubobjectWritingError),
}

impl WritablePdu<PcepObjectWritingError> for PcepObject {
    /// 1-octet object class, 1-octet OT/Res/P/I, 2-octets object length
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
            + match self {
                Self::Open(value) => value.len(),
                Self::RequestParameters(value) => value.len(),
                Self::NoPath(value) => value.len(),
                Self::EndpointsIpv4(value) => value.len(),
                Self::EndpointsIpv6(value) => value.len(),
                Self::Bandwidth(value) | Self::ExistingBandwidth(value) => value.len(),
                Self::Metric(value) => value.len(),
                Self::ExplicitRoute(value) => value.len(),
                Self::RecordRoute(value) => value.len(),
                Self::Lspa(value) => value.len(),
                Self::IncludeRoute(value) => value.value().len(),
                Self::PcepError(value) => value.len(),
                Self::Close(value) => value.len(),
                Self::Lsp(value) => value.len(),
                Self::Srp(value) => value.len(),
                Self::Unknown(value) => value.value().len(),
            }
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        let (object_class, object_type) = self.class_and_type();
        // P and I are only meaningful on objects this implementation does
        // not interpret; known objects write them as zero
        let (processing, ignore) = match self {
            Self::Unknown(unknown) => (unknown.processing(), unknown.ignore()),
            _ => (false, false),
        };
        writer.write_u8(object_class)?;
        writer.write_u8((object_type << 4) | (u8::from(processing) << 1) | u8::from(ignore))?;
        writer.write_u16::<NetworkEndian>(self.len() as u16)?;

        match self {
            Self::Open(value) => value.write(writer)?,
            Self::RequestParameters(value) => value.write(writer)?,
            Self::NoPath(value) => value.write(writer)?,
            Self::EndpointsIpv4(value) => value.write(writer)?,
            Self::EndpointsIpv6(value) => value.write(writer)?,
            Self::Bandwidth(value) | Self::ExistingBandwidth(value) => value.write(writer)?,
            Self::Metric(value) => value.write(writer)?,
            Self::ExplicitRoute(value) => value.write(writer)?,
            Self::RecordRoute(value) => value.write(writer)?,
            Self::Lspa(value) => value.write(writer)?,
            Self::IncludeRoute(value) => writer.write_all(value.value())?,
            Self::PcepError(value) => value.write(writer)?,
            Self::Close(value) => value.write(writer)?,
            Self::Lsp(value) => value.write(writer)?,
            Self::Srp(value) => value.write(writer)?,
            Self::Unknown(value) => writer.write_all(value.value())?,
        }
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for OpenObject {
    /// 1-octet version/flags, Keepalive, DeadTimer and SID octets
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.tlvs().iter().map(WritablePdu::len).sum::<usize>()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u8(PCEP_VERSION << 5)?;
        writer.write_u8(self.keepalive())?;
        writer.write_u8(self.dead_timer())?;
        writer.write_u8(self.session_id())?;
        for tlv in self.tlvs() {
            tlv.write(writer)?;
        }
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for RequestParametersObject {
    /// 4-octets flags word, 4-octets request id
    const BASE_LENGTH: usize = 8;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        let flags = u32::from(self.priority() & 0x07)
            | (u32::from(self.reoptimization()) << 3)
            | (u32::from(self.bidirectional()) << 4)
            | (u32::from(self.loose()) << 5);
        writer.write_u32::<NetworkEndian>(flags)?;
        writer.write_u32::<NetworkEndian>(self.request_id())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for NoPathObject {
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u8(self.nature_of_issue())?;
        writer.write_u16::<NetworkEndian>(u16::from(self.unsatisfied_constraints()) << 15)?;
        writer.write_u8(0)?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for EndpointsIpv4Object {
    const BASE_LENGTH: usize = 8;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u32::<NetworkEndian>(self.source().into())?;
        writer.write_u32::<NetworkEndian>(self.destination().into())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for EndpointsIpv6Object {
    const BASE_LENGTH: usize = 32;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u128::<NetworkEndian>(self.source().into())?;
        writer.write_u128::<NetworkEndian>(self.destination().into())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for BandwidthObject {
    /// Bandwidth in IEEE floating point format, carried as its raw bits
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u32::<NetworkEndian>(self.bandwidth())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for MetricObject {
    const BASE_LENGTH: usize = 8;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u16::<NetworkEndian>(0)?;
        writer.write_u8(u8::from(self.bound()) | (u8::from(self.computed()) << 1))?;
        writer.write_u8(self.metric_type())?;
        writer.write_u32::<NetworkEndian>(self.value())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for ExplicitRouteObject {
    const BASE_LENGTH: usize = 0;

    fn len(&self) -> usize {
        self.subobjects().iter().map(WritablePdu::len).sum()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        for subobject in self.subobjects() {
            subobject.write(writer)?;
        }
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for RecordRouteObject {
    const BASE_LENGTH: usize = 0;

    fn len(&self) -> usize {
        self.subobjects().iter().map(WritablePdu::len).sum()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        for subobject in self.subobjects() {
            subobject.write(writer)?;
        }
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for LspaObject {
    const BASE_LENGTH: usize = 16;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u32::<NetworkEndian>(self.exclude_any())?;
        writer.write_u32::<NetworkEndian>(self.include_any())?;
        writer.write_u32::<NetworkEndian>(self.include_all())?;
        writer.write_u8(self.setup_priority())?;
        writer.write_u8(self.holding_priority())?;
        writer.write_u8(u8::from(self.local_protection()))?;
        writer.write_u8(0)?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for ErrorObject {
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u8(0)?;
        writer.write_u8(0)?;
        writer.write_u8(self.error_type())?;
        writer.write_u8(self.error_value())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for CloseObject {
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u16::<NetworkEndian>(0)?;
        writer.write_u8(0)?;
        writer.write_u8(self.reason())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for LspObject {
    /// 4-octets PLSP-ID and flags word
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.tlvs().len()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        let word = (self.plsp_id() << LSP_PLSP_ID_SHIFT)
            | (u32::from(u8::from(self.operational())) << LSP_FLAGS_OPERATIONAL_SHIFT)
            | if self.administrative() { LSP_FLAGS_ADMINISTRATIVE } else { 0 }
            | if self.remove() { LSP_FLAGS_REMOVE } else { 0 }
            | if self.sync() { LSP_FLAGS_SYNC } else { 0 }
            | if self.delegate() { LSP_FLAGS_DELEGATE } else { 0 };
        writer.write_u32::<NetworkEndian>(word)?;
        writer.write_all(self.tlvs())?;
        Ok(())
    }
}

impl WritablePdu<PcepObjectWritingError> for SrpObject {
    /// 4-octets flags word, 4-octets SRP-ID-number
    const BASE_LENGTH: usize = 8;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.tlvs().len()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepObjectWritingError> {
        writer.write_u32::<NetworkEndian>(if self.remove() { SRP_FLAGS_REMOVE } else { 0 })?;
        writer.write_u32::<NetworkEndian>(self.srp_id())?;
        writer.write_all(self.tlvs())?;
        Ok(())
    }
}

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum PcepTlvWritingError {
    StdIOError(#[from_std_io_error] String),
}

impl WritablePdu<PcepTlvWritingError> for PcepTlv {
    /// 2-octets TLV type, 2-octets TLV length
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        let value_len = self.value_len();
        let padding = (PCEP_TLV_HEADER_LENGTH - (value_len % PCEP_TLV_HEADER_LENGTH))
            % PCEP_TLV_HEADER_LENGTH;
        Self::BASE_LENGTH + value_len + padding
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PcepTlvWritingError> {
        let value_len = self.value_len();
        writer.write_u16::<NetworkEndian>(self.type_code())?;
        // The length field counts the value without its padding
        writer.write_u16::<NetworkEndian>(value_len as u16)?;
        match self {
            Self::StatefulPceCapability(cap) => {
                writer.write_u32::<NetworkEndian>(if cap.update_capability() {
                    STATEFUL_CAP_LSP_UPDATE
                } else {
                    0
                })?;
            }
            Self::Unknown { value, .. } => {
                writer.write_all(value)?;
            }
        }
        let padding = (PCEP_TLV_HEADER_LENGTH - (value_len % PCEP_TLV_HEADER_LENGTH))
            % PCEP_TLV_HEADER_LENGTH;
        for _ in 0..padding {
            writer.write_u8(0)?;
        }
        Ok(())
    }
}

impl PcepTlv {
    fn value_len(&self) -> usize {
        match self {
            Self::StatefulPceCapability(_) => 4,
            Self::Unknown { value, .. } => value.len(),
        }
    }
}

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum PathSubobjectWritingError {
    StdIOError(#[from_std_io_error] String),
}

impl WritablePdu<PathSubobjectWritingError> for PathSubobject {
    /// 1-octet L/Type, 1-octet length
    const BASE_LENGTH: usize = 2;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
            + match self {
                Self::Ipv4Prefix { .. } => 6,
                Self::Label { .. } => 6,
                Self::Unknown { value, .. } => value.len(),
            }
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), PathSubobjectWritingError> {
        let type_code = match self.get_type() {
            Some(subobject_type) => subobject_type as u8,
            None => match self {
                Self::Unknown { subobject_type, .. } => *subobject_type,
                // get_type() is None only for Unknown
                _ => unreachable!(),
            },
        };
        writer.write_u8((u8::from(self.loose()) << 7) | type_code)?;
        writer.write_u8(self.len() as u8)?;
        match self {
            Self::Ipv4Prefix {
                address,
                prefix_length,
                ..
            } => {
                writer.write_u32::<NetworkEndian>((*address).into())?;
                writer.write_u8(*prefix_length)?;
                writer.write_u8(0)?;
            }
            Self::Label {
                flags,
                c_type,
                label,
                ..
            } => {
                writer.write_u8(*flags)?;
                writer.write_u8(*c_type)?;
                writer.write_u32::<NetworkEndian>(*label)?;
            }
            Self::Unknown { value, .. } => {
                writer.write_all(value)?;
            }
        }
        Ok(())
    }
}
