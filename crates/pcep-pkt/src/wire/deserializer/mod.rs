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

//! Deserializer library for PCEP's wire protocol

use std::net::{Ipv4Addr, Ipv6Addr};

use nom::{
    error::ErrorKind,
    number::complete::{be_u128, be_u16, be_u32, be_u8},
    IResult,
};

use netgauze_parse_utils::{
    parse_into_located, parse_till_empty_into_located, ErrorKindSerdeDeref, ReadablePdu, Span,
};
use netgauze_serde_macros::LocatedError;

use crate::{
    iana::*,
    wire::{
        PATH_SUBOBJECT_HEADER_LENGTH, PCEP_COMMON_HEADER_LENGTH, PCEP_OBJECT_HEADER_LENGTH,
        PCEP_TLV_HEADER_LENGTH,
    },
    *,
};

#[derive(LocatedError, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub enum PcepMessageParsingError {
    #[serde(with = "ErrorKindSerdeDeref")]
    NomError(#[from_nom] ErrorKind),
    /// The 3-bit version field of the common header is not 1.
    UnsupportedPcepVersion(u8),
    /// Message-Length is shorter than the common header it counts.
    InvalidPcepMessageLength(u16),
    /// An Open message without an OPEN object in its body.
    MissingOpenObject,
    PcepObjectError(#[from_located(module = "self")] PcepObjectParsingError),
}

impl<'a> ReadablePdu<'a, LocatedPcepMessageParsingError<'a>> for PcepMessage {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepMessageParsingError<'a>> {
        let input = buf;
        let (buf, ver_flags) = be_u8(buf)?;
        let version = ver_flags >> 5;
        if version != PCEP_VERSION {
            return Err(nom::Err::Error(LocatedPcepMessageParsingError::new(
                input,
                PcepMessageParsingError::UnsupportedPcepVersion(version),
            )));
        }
        let (buf, message_type) = be_u8(buf)?;
        let input = buf;
        let (buf, length) = be_u16(buf)?;
        if length < PCEP_COMMON_HEADER_LENGTH {
            return Err(nom::Err::Error(LocatedPcepMessageParsingError::new(
                input,
                PcepMessageParsingError::InvalidPcepMessageLength(length),
            )));
        }
        let (remainder, buf) =
            nom::bytes::complete::take(length - PCEP_COMMON_HEADER_LENGTH)(buf)?;

        let (buf, msg) = match PcepMessageType::try_from(message_type) {
            Ok(PcepMessageType::Open) => {
                let input = buf;
                let (buf, object) = parse_into_located(buf)?;
                match object {
                    PcepObject::Open(open) => (buf, PcepMessage::Open(OpenMessage::new(open))),
                    _ => {
                        return Err(nom::Err::Error(LocatedPcepMessageParsingError::new(
                            input,
                            PcepMessageParsingError::MissingOpenObject,
                        )))
                    }
                }
            }
            Ok(PcepMessageType::Keepalive) => (buf, PcepMessage::Keepalive),
            Ok(PcepMessageType::PathComputationRequest) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (buf, PcepMessage::PathComputationRequest(value.to_vec()))
            }
            Ok(PcepMessageType::PathComputationReply) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (buf, PcepMessage::PathComputationReply(value.to_vec()))
            }
            Ok(PcepMessageType::Notification) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (buf, PcepMessage::Notification(value.to_vec()))
            }
            Ok(PcepMessageType::Error) => {
                let (buf, objects) = parse_till_empty_into_located(buf)?;
                (buf, PcepMessage::Error(ErrorMessage::new(objects)))
            }
            Ok(PcepMessageType::Close) => {
                let (buf, objects) = parse_till_empty_into_located(buf)?;
                (buf, PcepMessage::Close(CloseMessage::new(objects)))
            }
            Ok(PcepMessageType::StateReport) => {
                let (buf, objects) = parse_till_empty_into_located(buf)?;
                (buf, PcepMessage::StateReport(StateReportMessage::new(objects)))
            }
            Ok(PcepMessageType::Update) => {
                let (buf, objects) = parse_till_empty_into_located(buf)?;
                (buf, PcepMessage::Update(UpdateMessage::new(objects)))
            }
            Err(_) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (
                    buf,
                    PcepMessage::Unimplemented(UnimplementedMessage::new(
                        message_type,
                        value.to_vec(),
                    )),
                )
            }
        };
        // Make sure the message is fully parsed according to its length
        if !buf.is_empty() {
            return Err(nom::Err::Error(LocatedPcepMessageParsingError::new(
                buf,
                PcepMessageParsingError::NomError(ErrorKind::NonEmpty),
            )));
        }
        Ok((remainder, msg))
    }
}

#[derive(LocatedError, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub enum PcepObjectParsingError {
    #[serde(with = "ErrorKindSerdeDeref")]
    NomError(#[from_nom] ErrorKind),
    /// Object Length is shorter than the object header it counts. Raised
    /// before any body is consumed so a malformed length can never stall
    /// object iteration.
    InvalidPcepObjectLength(u16),
    UndefinedOperationalStatus(#[from_external] UndefinedLspOperationalStatus),
    PcepTlvError(#[from_located(module = "self")] PcepTlvParsingError),
    PathSubobjectError(#[from_located(module = "self")] PathSubobjectParsingError),
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for PcepObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, object_class) = be_u8(buf)?;
        let (buf, ot_flags) = be_u8(buf)?;
        let object_type = ot_flags >> 4;
        let processing = ot_flags & 0b10 != 0;
        let ignore = ot_flags & 0b01 != 0;
        let input = buf;
        let (buf, length) = be_u16(buf)?;
        if length < PCEP_OBJECT_HEADER_LENGTH {
            return Err(nom::Err::Error(LocatedPcepObjectParsingError::new(
                input,
                PcepObjectParsingError::InvalidPcepObjectLength(length),
            )));
        }
        let (remainder, buf) =
            nom::bytes::complete::take(length - PCEP_OBJECT_HEADER_LENGTH)(buf)?;

        let (buf, object) = match PcepObjectType::from_class_type(object_class, object_type) {
            Some(PcepObjectType::Open) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Open(value))
            }
            Some(PcepObjectType::RequestParameters) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::RequestParameters(value))
            }
            Some(PcepObjectType::NoPath) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::NoPath(value))
            }
            Some(PcepObjectType::EndpointsIpv4) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::EndpointsIpv4(value))
            }
            Some(PcepObjectType::EndpointsIpv6) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::EndpointsIpv6(value))
            }
            Some(PcepObjectType::Bandwidth) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Bandwidth(value))
            }
            Some(PcepObjectType::ExistingBandwidth) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::ExistingBandwidth(value))
            }
            Some(PcepObjectType::Metric) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Metric(value))
            }
            Some(PcepObjectType::ExplicitRoute) => {
                let (buf, subobjects) = parse_till_empty_into_located(buf)?;
                (
                    buf,
                    PcepObject::ExplicitRoute(ExplicitRouteObject::new(subobjects)),
                )
            }
            Some(PcepObjectType::RecordRoute) => {
                let (buf, subobjects) = parse_till_empty_into_located(buf)?;
                (
                    buf,
                    PcepObject::RecordRoute(RecordRouteObject::new(subobjects)),
                )
            }
            Some(PcepObjectType::Lspa) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Lspa(value))
            }
            Some(PcepObjectType::IncludeRoute) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (
                    buf,
                    PcepObject::IncludeRoute(IncludeRouteObject::new(value.to_vec())),
                )
            }
            Some(PcepObjectType::PcepError) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::PcepError(value))
            }
            Some(PcepObjectType::Close) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Close(value))
            }
            Some(PcepObjectType::Lsp) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Lsp(value))
            }
            Some(PcepObjectType::Srp) => {
                let (buf, value) = parse_into_located(buf)?;
                (buf, PcepObject::Srp(value))
            }
            None => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (
                    buf,
                    PcepObject::Unknown(UnknownObject::new(
                        object_class,
                        object_type,
                        processing,
                        ignore,
                        value.to_vec(),
                    )),
                )
            }
        };
        // Make sure the object is fully parsed according to its length
        if !buf.is_empty() {
            return Err(nom::Err::Error(LocatedPcepObjectParsingError::new(
                buf,
                PcepObjectParsingError::NomError(ErrorKind::NonEmpty),
            )));
        }
        Ok((remainder, object))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for OpenObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        // Ver/Flags of the OPEN object body; the version was already checked
        // in the common header
        let (buf, _ver_flags) = be_u8(buf)?;
        let (buf, keepalive) = be_u8(buf)?;
        let (buf, dead_timer) = be_u8(buf)?;
        let (buf, session_id) = be_u8(buf)?;
        let (buf, tlvs) = parse_till_empty_into_located(buf)?;
        Ok((buf, OpenObject::new(keepalive, dead_timer, session_id, tlvs)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for RequestParametersObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, flags) = be_u32(buf)?;
        let priority = (flags & 0x07) as u8;
        let reoptimization = flags & 0x08 != 0;
        let bidirectional = flags & 0x10 != 0;
        let loose = flags & 0x20 != 0;
        let (buf, request_id) = be_u32(buf)?;
        Ok((
            buf,
            RequestParametersObject::new(priority, reoptimization, bidirectional, loose, request_id),
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for NoPathObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, nature_of_issue) = be_u8(buf)?;
        // C flag is the top bit of the 16-bit flags field
        let (buf, flags) = be_u16(buf)?;
        let unsatisfied_constraints = flags & 0x8000 != 0;
        let (buf, _reserved) = be_u8(buf)?;
        Ok((buf, NoPathObject::new(nature_of_issue, unsatisfied_constraints)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for EndpointsIpv4Object {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, source) = nom::combinator::map(be_u32, Ipv4Addr::from)(buf)?;
        let (buf, destination) = nom::combinator::map(be_u32, Ipv4Addr::from)(buf)?;
        Ok((buf, EndpointsIpv4Object::new(source, destination)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for EndpointsIpv6Object {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, source) = nom::combinator::map(be_u128, Ipv6Addr::from)(buf)?;
        let (buf, destination) = nom::combinator::map(be_u128, Ipv6Addr::from)(buf)?;
        Ok((buf, EndpointsIpv6Object::new(source, destination)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for BandwidthObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, bandwidth) = be_u32(buf)?;
        Ok((buf, BandwidthObject::new(bandwidth)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for MetricObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, _reserved) = be_u16(buf)?;
        let (buf, flags) = be_u8(buf)?;
        let bound = flags & 0x01 != 0;
        let computed = flags & 0x02 != 0;
        let (buf, metric_type) = be_u8(buf)?;
        let (buf, value) = be_u32(buf)?;
        Ok((buf, MetricObject::new(bound, computed, metric_type, value)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for LspaObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, exclude_any) = be_u32(buf)?;
        let (buf, include_any) = be_u32(buf)?;
        let (buf, include_all) = be_u32(buf)?;
        let (buf, setup_priority) = be_u8(buf)?;
        let (buf, holding_priority) = be_u8(buf)?;
        let (buf, flags) = be_u8(buf)?;
        let local_protection = flags & 0x01 != 0;
        let (buf, _reserved) = be_u8(buf)?;
        Ok((
            buf,
            LspaObject::new(
                exclude_any,
                include_any,
                include_all,
                setup_priority,
                holding_priority,
                local_protection,
            ),
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for ErrorObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, _reserved) = be_u8(buf)?;
        let (buf, _flags) = be_u8(buf)?;
        let (buf, error_type) = be_u8(buf)?;
        let (buf, error_value) = be_u8(buf)?;
        Ok((buf, ErrorObject::new(error_type, error_value)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for CloseObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, _reserved) = be_u16(buf)?;
        let (buf, _flags) = be_u8(buf)?;
        let (buf, reason) = be_u8(buf)?;
        Ok((buf, CloseObject::new(reason)))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for LspObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let input = buf;
        let (buf, word) = be_u32(buf)?;
        let plsp_id = word >> LSP_PLSP_ID_SHIFT;
        let delegate = word & LSP_FLAGS_DELEGATE != 0;
        let sync = word & LSP_FLAGS_SYNC != 0;
        let remove = word & LSP_FLAGS_REMOVE != 0;
        let administrative = word & LSP_FLAGS_ADMINISTRATIVE != 0;
        let operational_code =
            ((word & LSP_FLAGS_OPERATIONAL_MASK) >> LSP_FLAGS_OPERATIONAL_SHIFT) as u8;
        let operational = LspOperationalStatus::try_from(operational_code).map_err(|err| {
            nom::Err::Error(LocatedPcepObjectParsingError::new(
                input,
                PcepObjectParsingError::UndefinedOperationalStatus(err),
            ))
        })?;
        let (buf, tlvs) = nom::bytes::complete::take(buf.len())(buf)?;
        Ok((
            buf,
            LspObject::new(
                plsp_id,
                delegate,
                sync,
                remove,
                administrative,
                operational,
                tlvs.to_vec(),
            ),
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedPcepObjectParsingError<'a>> for SrpObject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepObjectParsingError<'a>> {
        let (buf, flags) = be_u32(buf)?;
        let remove = flags & SRP_FLAGS_REMOVE != 0;
        let (buf, srp_id) = be_u32(buf)?;
        // Trailing TLVs are carried raw
        let (buf, tlvs) = nom::bytes::complete::take(buf.len())(buf)?;
        Ok((buf, SrpObject::new(remove, srp_id, tlvs.to_vec())))
    }
}

#[derive(LocatedError, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub enum PcepTlvParsingError {
    #[serde(with = "ErrorKindSerdeDeref")]
    NomError(#[from_nom] ErrorKind),
    /// A TLV whose declared length does not match its fixed-size value.
    InvalidTlvLength(u16),
}

impl<'a> ReadablePdu<'a, LocatedPcepTlvParsingError<'a>> for PcepTlv {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPcepTlvParsingError<'a>> {
        let (buf, tlv_type) = be_u16(buf)?;
        let input = buf;
        let (buf, length) = be_u16(buf)?;
        let (remainder, buf) = nom::bytes::complete::take(length)(buf)?;
        // Values are zero-padded to the next 4-octet boundary
        let padding = (PCEP_TLV_HEADER_LENGTH - (length as usize % PCEP_TLV_HEADER_LENGTH))
            % PCEP_TLV_HEADER_LENGTH;
        let (remainder, _) = nom::bytes::complete::take(padding)(remainder)?;

        let (buf, tlv) = match PcepTlvType::try_from(tlv_type) {
            Ok(PcepTlvType::StatefulPceCapability) => {
                if length != 4 {
                    return Err(nom::Err::Error(LocatedPcepTlvParsingError::new(
                        input,
                        PcepTlvParsingError::InvalidTlvLength(length),
                    )));
                }
                let (buf, flags) = be_u32(buf)?;
                let update_capability = flags & STATEFUL_CAP_LSP_UPDATE != 0;
                (
                    buf,
                    PcepTlv::StatefulPceCapability(StatefulPceCapabilityTlv::new(
                        update_capability,
                    )),
                )
            }
            Err(_) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (
                    buf,
                    PcepTlv::Unknown {
                        tlv_type,
                        value: value.to_vec(),
                    },
                )
            }
        };
        if !buf.is_empty() {
            return Err(nom::Err::Error(LocatedPcepTlvParsingError::new(
                buf,
                PcepTlvParsingError::NomError(ErrorKind::NonEmpty),
            )));
        }
        Ok((remainder, tlv))
    }
}

#[derive(LocatedError, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub enum PathSubobjectParsingError {
    #[serde(with = "ErrorKindSerdeDeref")]
    NomError(#[from_nom] ErrorKind),
    /// Sub-object length smaller than its own 2-octet header; rejecting it
    /// here keeps sub-object iteration strictly advancing.
    InvalidSubobjectLength(u8),
}

impl<'a> ReadablePdu<'a, LocatedPathSubobjectParsingError<'a>> for PathSubobject {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedPathSubobjectParsingError<'a>> {
        let (buf, type_byte) = be_u8(buf)?;
        let loose = type_byte & 0x80 != 0;
        let subobject_type = type_byte & 0x7f;
        let input = buf;
        let (buf, length) = be_u8(buf)?;
        if (length as usize) < PATH_SUBOBJECT_HEADER_LENGTH {
            return Err(nom::Err::Error(LocatedPathSubobjectParsingError::new(
                input,
                PathSubobjectParsingError::InvalidSubobjectLength(length),
            )));
        }
        let (remainder, buf) =
            nom::bytes::complete::take(length as usize - PATH_SUBOBJECT_HEADER_LENGTH)(buf)?;

        let (buf, subobject) = match PathSubobjectType::try_from(subobject_type) {
            Ok(PathSubobjectType::Ipv4Prefix) => {
                let (buf, address) = nom::combinator::map(be_u32, Ipv4Addr::from)(buf)?;
                let (buf, prefix_length) = be_u8(buf)?;
                let (buf, _reserved) = be_u8(buf)?;
                (
                    buf,
                    PathSubobject::Ipv4Prefix {
                        loose,
                        address,
                        prefix_length,
                    },
                )
            }
            Ok(PathSubobjectType::Label) => {
                let (buf, flags) = be_u8(buf)?;
                let (buf, c_type) = be_u8(buf)?;
                let (buf, label) = be_u32(buf)?;
                (
                    buf,
                    PathSubobject::Label {
                        loose,
                        flags,
                        c_type,
                        label,
                    },
                )
            }
            Err(_) => {
                let (buf, value) = nom::bytes::complete::take(buf.len())(buf)?;
                (
                    buf,
                    PathSubobject::Unknown {
                        loose,
                        subobject_type,
                        value: value.to_vec(),
                    },
                )
            }
        };
        if !buf.is_empty() {
            return Err(nom::Err::Error(LocatedPathSubobjectParsingError::new(
                buf,
                PathSubobjectParsingError::NomError(ErrorKind::NonEmpty),
            )));
        }
        Ok((remainder, subobject))
    }
}
