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

//! Typed representation of PCEP messages, objects, TLVs and path sub-objects
//! as defined in [RFC5440](https://datatracker.ietf.org/doc/html/rfc5440)
//! with the stateful extensions (PCRpt/PCUpd, LSP and SRP objects) of
//! [RFC8231](https://datatracker.ietf.org/doc/html/rfc8231).

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::iana::{
    LspOperationalStatus, PathSubobjectType, PcepMessageType, PcepObjectType, PcepTlvType,
};

#[cfg(feature = "codec")]
pub mod codec;
pub mod iana;
pub mod wire;

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Ver |  Flags  |  Message-Type |       Message-Length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `Message-Length` covers the whole message including the common header.
/// Flags are reserved, zero on transmit and ignored on receipt.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PcepMessage {
    Open(OpenMessage),
    Keepalive,
    /// PCReq is recognized but its body is not parsed yet.
    PathComputationRequest(Vec<u8>),
    /// PCRep is recognized but its body is not parsed yet.
    PathComputationReply(Vec<u8>),
    /// PCNtf is recognized but its body is not parsed yet.
    Notification(Vec<u8>),
    Error(ErrorMessage),
    Close(CloseMessage),
    StateReport(StateReportMessage),
    Update(UpdateMessage),
    /// A message whose type is not registered. Carried opaquely so the
    /// session can log and ignore it without tearing anything down.
    Unimplemented(UnimplementedMessage),
}

impl PcepMessage {
    /// Returns the IANA message type, `None` for unregistered types.
    pub const fn get_type(&self) -> Option<PcepMessageType> {
        match self {
            Self::Open(_) => Some(PcepMessageType::Open),
            Self::Keepalive => Some(PcepMessageType::Keepalive),
            Self::PathComputationRequest(_) => Some(PcepMessageType::PathComputationRequest),
            Self::PathComputationReply(_) => Some(PcepMessageType::PathComputationReply),
            Self::Notification(_) => Some(PcepMessageType::Notification),
            Self::Error(_) => Some(PcepMessageType::Error),
            Self::Close(_) => Some(PcepMessageType::Close),
            Self::StateReport(_) => Some(PcepMessageType::StateReport),
            Self::Update(_) => Some(PcepMessageType::Update),
            Self::Unimplemented(_) => None,
        }
    }

    /// The message type code written on the wire.
    pub const fn message_type_code(&self) -> u8 {
        match self.get_type() {
            Some(msg_type) => msg_type as u8,
            None => match self {
                Self::Unimplemented(value) => value.message_type(),
                // get_type() is None only for Unimplemented
                _ => unreachable!(),
            },
        }
    }
}

/// An Open message carries exactly one OPEN object.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OpenMessage {
    open: OpenObject,
}

impl OpenMessage {
    pub const fn new(open: OpenObject) -> Self {
        Self { open }
    }

    /// The Open a stateful PCE sends during the handshake: DeadTimer is four
    /// times the Keepalive timer and the Stateful PCE Capability TLV
    /// advertises Update-Capability.
    pub fn stateful(keepalive: u8, session_id: u8) -> Self {
        Self::new(OpenObject::new(
            keepalive,
            keepalive.saturating_mul(4),
            session_id,
            vec![PcepTlv::StatefulPceCapability(StatefulPceCapabilityTlv::new(
                true,
            ))],
        ))
    }

    pub const fn open(&self) -> &OpenObject {
        &self.open
    }
}

/// A PCErr message; carries one or more PCEP-ERROR objects, possibly with an
/// Open object during session establishment negotiation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    objects: Vec<PcepObject>,
}

impl ErrorMessage {
    pub const fn new(objects: Vec<PcepObject>) -> Self {
        Self { objects }
    }

    pub const fn objects(&self) -> &Vec<PcepObject> {
        &self.objects
    }
}

/// A Close message; carries a CLOSE object with the reason for closing the
/// PCEP session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CloseMessage {
    objects: Vec<PcepObject>,
}

impl CloseMessage {
    pub const fn new(objects: Vec<PcepObject>) -> Self {
        Self { objects }
    }

    pub const fn objects(&self) -> &Vec<PcepObject> {
        &self.objects
    }
}

/// PCRpt: the state report a PCC streams to the PCE.
///
/// ```text
/// <PCRpt Message> ::= <Common Header> <state-report-list>
/// <state-report>  ::= [<SRP>] <LSP> <path>
/// <path>          ::= <ERO> <attribute-list> [<RRO>]
/// ```
///
/// The object sequence is kept flat and in wire order; grouping objects into
/// per-LSP reports is left to the consumer since PCCs differ in how strictly
/// they follow the grammar.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StateReportMessage {
    objects: Vec<PcepObject>,
}

impl StateReportMessage {
    pub const fn new(objects: Vec<PcepObject>) -> Self {
        Self { objects }
    }

    pub const fn objects(&self) -> &Vec<PcepObject> {
        &self.objects
    }
}

/// PCUpd: the update the PCE sends for a delegated LSP, an ordered sequence
/// of LSP + ERO + attribute objects per updated LSP.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UpdateMessage {
    objects: Vec<PcepObject>,
}

impl UpdateMessage {
    pub const fn new(objects: Vec<PcepObject>) -> Self {
        Self { objects }
    }

    pub const fn objects(&self) -> &Vec<PcepObject> {
        &self.objects
    }
}

/// A message with a type code outside the registry. The body is preserved
/// verbatim so the message can be re-encoded or inspected.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnimplementedMessage {
    message_type: u8,
    value: Vec<u8>,
}

impl UnimplementedMessage {
    pub const fn new(message_type: u8, value: Vec<u8>) -> Self {
        Self {
            message_type,
            value,
        }
    }

    pub const fn message_type(&self) -> u8 {
        self.message_type
    }

    pub const fn value(&self) -> &Vec<u8> {
        &self.value
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Object-Class  |   OT  |Res|P|I|   Object Length (bytes)       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         (Object body)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// One variant per (Object-Class, Object-Type) pair in
/// [`PcepObjectType`], plus an `Unknown` arm for everything else. The P and I
/// header flags are ignored on known objects and written as zero; unknown
/// objects preserve them together with the raw body.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PcepObject {
    Open(OpenObject),
    RequestParameters(RequestParametersObject),
    NoPath(NoPathObject),
    EndpointsIpv4(EndpointsIpv4Object),
    EndpointsIpv6(EndpointsIpv6Object),
    Bandwidth(BandwidthObject),
    ExistingBandwidth(BandwidthObject),
    Metric(MetricObject),
    ExplicitRoute(ExplicitRouteObject),
    RecordRoute(RecordRouteObject),
    Lspa(LspaObject),
    IncludeRoute(IncludeRouteObject),
    PcepError(ErrorObject),
    Close(CloseObject),
    Lsp(LspObject),
    Srp(SrpObject),
    Unknown(UnknownObject),
}

impl PcepObject {
    /// Returns the registry entry, `None` for [`PcepObject::Unknown`].
    pub const fn get_type(&self) -> Option<PcepObjectType> {
        match self {
            Self::Open(_) => Some(PcepObjectType::Open),
            Self::RequestParameters(_) => Some(PcepObjectType::RequestParameters),
            Self::NoPath(_) => Some(PcepObjectType::NoPath),
            Self::EndpointsIpv4(_) => Some(PcepObjectType::EndpointsIpv4),
            Self::EndpointsIpv6(_) => Some(PcepObjectType::EndpointsIpv6),
            Self::Bandwidth(_) => Some(PcepObjectType::Bandwidth),
            Self::ExistingBandwidth(_) => Some(PcepObjectType::ExistingBandwidth),
            Self::Metric(_) => Some(PcepObjectType::Metric),
            Self::ExplicitRoute(_) => Some(PcepObjectType::ExplicitRoute),
            Self::RecordRoute(_) => Some(PcepObjectType::RecordRoute),
            Self::Lspa(_) => Some(PcepObjectType::Lspa),
            Self::IncludeRoute(_) => Some(PcepObjectType::IncludeRoute),
            Self::PcepError(_) => Some(PcepObjectType::PcepError),
            Self::Close(_) => Some(PcepObjectType::Close),
            Self::Lsp(_) => Some(PcepObjectType::Lsp),
            Self::Srp(_) => Some(PcepObjectType::Srp),
            Self::Unknown(_) => None,
        }
    }

    /// The (Object-Class, Object-Type) pair written on the wire.
    pub const fn class_and_type(&self) -> (u8, u8) {
        match self.get_type() {
            Some(object_type) => (object_type.object_class(), object_type.object_type()),
            None => match self {
                Self::Unknown(unknown) => (unknown.object_class(), unknown.object_type()),
                // get_type() is None only for Unknown
                _ => unreachable!(),
            },
        }
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Ver |   Flags |   Keepalive   |  DeadTimer    |      SID      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Optional TLVs                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OpenObject {
    keepalive: u8,
    dead_timer: u8,
    session_id: u8,
    tlvs: Vec<PcepTlv>,
}

impl OpenObject {
    pub const fn new(keepalive: u8, dead_timer: u8, session_id: u8, tlvs: Vec<PcepTlv>) -> Self {
        Self {
            keepalive,
            dead_timer,
            session_id,
            tlvs,
        }
    }

    pub const fn keepalive(&self) -> u8 {
        self.keepalive
    }

    pub const fn dead_timer(&self) -> u8 {
        self.dead_timer
    }

    pub const fn session_id(&self) -> u8 {
        self.session_id
    }

    pub const fn tlvs(&self) -> &Vec<PcepTlv> {
        &self.tlvs
    }

    /// True when a Stateful PCE Capability TLV with the Update-Capability
    /// bit is present.
    pub fn update_capable(&self) -> bool {
        self.tlvs.iter().any(|tlv| {
            matches!(tlv, PcepTlv::StatefulPceCapability(cap) if cap.update_capability())
        })
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Flags                    |O|B|R| Pri |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Request-ID-number                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestParametersObject {
    priority: u8,
    reoptimization: bool,
    bidirectional: bool,
    loose: bool,
    request_id: u32,
}

impl RequestParametersObject {
    pub const fn new(
        priority: u8,
        reoptimization: bool,
        bidirectional: bool,
        loose: bool,
        request_id: u32,
    ) -> Self {
        Self {
            priority,
            reoptimization,
            bidirectional,
            loose,
            request_id,
        }
    }

    pub const fn priority(&self) -> u8 {
        self.priority
    }

    pub const fn reoptimization(&self) -> bool {
        self.reoptimization
    }

    pub const fn bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// The O flag; a loose path is acceptable when set.
    pub const fn loose(&self) -> bool {
        self.loose
    }

    pub const fn request_id(&self) -> u32 {
        self.request_id
    }
}

/// NO-PATH object, carried in PCRep when no path satisfying the constraints
/// could be found.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NoPathObject {
    nature_of_issue: u8,
    unsatisfied_constraints: bool,
}

impl NoPathObject {
    pub const fn new(nature_of_issue: u8, unsatisfied_constraints: bool) -> Self {
        Self {
            nature_of_issue,
            unsatisfied_constraints,
        }
    }

    pub const fn nature_of_issue(&self) -> u8 {
        self.nature_of_issue
    }

    pub const fn unsatisfied_constraints(&self) -> bool {
        self.unsatisfied_constraints
    }
}

/// END-POINTS object body for IPv4 (Object-Type 1).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EndpointsIpv4Object {
    source: Ipv4Addr,
    destination: Ipv4Addr,
}

impl EndpointsIpv4Object {
    pub const fn new(source: Ipv4Addr, destination: Ipv4Addr) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub const fn source(&self) -> Ipv4Addr {
        self.source
    }

    pub const fn destination(&self) -> Ipv4Addr {
        self.destination
    }
}

/// END-POINTS object body for IPv6 (Object-Type 2).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EndpointsIpv6Object {
    source: Ipv6Addr,
    destination: Ipv6Addr,
}

impl EndpointsIpv6Object {
    pub const fn new(source: Ipv6Addr, destination: Ipv6Addr) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub const fn source(&self) -> Ipv6Addr {
        self.source
    }

    pub const fn destination(&self) -> Ipv6Addr {
        self.destination
    }
}

/// BANDWIDTH object. Object-Type 1 is requested bandwidth, Object-Type 2 the
/// bandwidth of an existing TE LSP being reoptimized; both share this body.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BandwidthObject {
    bandwidth: u32,
}

impl BandwidthObject {
    pub const fn new(bandwidth: u32) -> Self {
        Self { bandwidth }
    }

    pub const fn bandwidth(&self) -> u32 {
        self.bandwidth
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Reserved             |    Flags  |C|B|       T       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          metric-value                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetricObject {
    bound: bool,
    computed: bool,
    metric_type: u8,
    value: u32,
}

impl MetricObject {
    pub const fn new(bound: bool, computed: bool, metric_type: u8, value: u32) -> Self {
        Self {
            bound,
            computed,
            metric_type,
            value,
        }
    }

    pub const fn bound(&self) -> bool {
        self.bound
    }

    pub const fn computed(&self) -> bool {
        self.computed
    }

    pub const fn metric_type(&self) -> u8 {
        self.metric_type
    }

    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// ERO: the ordered list of hops the LSP must traverse.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExplicitRouteObject {
    subobjects: Vec<PathSubobject>,
}

impl ExplicitRouteObject {
    pub const fn new(subobjects: Vec<PathSubobject>) -> Self {
        Self { subobjects }
    }

    pub const fn subobjects(&self) -> &Vec<PathSubobject> {
        &self.subobjects
    }
}

/// RRO: the ordered list of hops the LSP actually traverses.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordRouteObject {
    subobjects: Vec<PathSubobject>,
}

impl RecordRouteObject {
    pub const fn new(subobjects: Vec<PathSubobject>) -> Self {
        Self { subobjects }
    }

    pub const fn subobjects(&self) -> &Vec<PathSubobject> {
        &self.subobjects
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Exclude-any                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Include-any                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Include-all                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Setup Prio   |  Holding Prio |     Flags   |L|   Reserved    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LspaObject {
    exclude_any: u32,
    include_any: u32,
    include_all: u32,
    setup_priority: u8,
    holding_priority: u8,
    local_protection: bool,
}

impl LspaObject {
    pub const fn new(
        exclude_any: u32,
        include_any: u32,
        include_all: u32,
        setup_priority: u8,
        holding_priority: u8,
        local_protection: bool,
    ) -> Self {
        Self {
            exclude_any,
            include_any,
            include_all,
            setup_priority,
            holding_priority,
            local_protection,
        }
    }

    pub const fn exclude_any(&self) -> u32 {
        self.exclude_any
    }

    pub const fn include_any(&self) -> u32 {
        self.include_any
    }

    pub const fn include_all(&self) -> u32 {
        self.include_all
    }

    pub const fn setup_priority(&self) -> u8 {
        self.setup_priority
    }

    pub const fn holding_priority(&self) -> u8 {
        self.holding_priority
    }

    pub const fn local_protection(&self) -> bool {
        self.local_protection
    }
}

/// IRO body. The sub-object layout is shared with ERO but the body is kept
/// opaque until the IRO decoder is implemented.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IncludeRouteObject {
    value: Vec<u8>,
}

impl IncludeRouteObject {
    pub const fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    pub const fn value(&self) -> &Vec<u8> {
        &self.value
    }
}

/// PCEP-ERROR object body: Error-Type identifies the class of error,
/// Error-value the specific condition.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    error_type: u8,
    error_value: u8,
}

impl ErrorObject {
    pub const fn new(error_type: u8, error_value: u8) -> Self {
        Self {
            error_type,
            error_value,
        }
    }

    pub const fn error_type(&self) -> u8 {
        self.error_type
    }

    pub const fn error_value(&self) -> u8 {
        self.error_value
    }
}

/// CLOSE object body; the reason code for terminating the session.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CloseObject {
    reason: u8,
}

impl CloseObject {
    pub const fn new(reason: u8) -> Self {
        Self { reason }
    }

    pub const fn reason(&self) -> u8 {
        self.reason
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                PLSP-ID                |    Flags  |  O|A|R|S|D|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           TLVs                                |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// TLVs following the flags word are carried raw; their parsing is still
/// partial in this implementation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LspObject {
    plsp_id: u32,
    delegate: bool,
    sync: bool,
    remove: bool,
    administrative: bool,
    operational: LspOperationalStatus,
    tlvs: Vec<u8>,
}

impl LspObject {
    pub const fn new(
        plsp_id: u32,
        delegate: bool,
        sync: bool,
        remove: bool,
        administrative: bool,
        operational: LspOperationalStatus,
        tlvs: Vec<u8>,
    ) -> Self {
        Self {
            plsp_id,
            delegate,
            sync,
            remove,
            administrative,
            operational,
            tlvs,
        }
    }

    /// PCEP-specific identifier of the LSP, 20 bits, unique per PCC.
    pub const fn plsp_id(&self) -> u32 {
        self.plsp_id
    }

    pub const fn delegate(&self) -> bool {
        self.delegate
    }

    pub const fn sync(&self) -> bool {
        self.sync
    }

    pub const fn remove(&self) -> bool {
        self.remove
    }

    pub const fn administrative(&self) -> bool {
        self.administrative
    }

    pub const fn operational(&self) -> LspOperationalStatus {
        self.operational
    }

    pub const fn tlvs(&self) -> &Vec<u8> {
        &self.tlvs
    }
}

/// SRP object body; the SRP-ID-number correlates updates with the state
/// reports they trigger. TLVs after the SRP-ID (such as PATH-SETUP-TYPE)
/// are carried raw.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SrpObject {
    remove: bool,
    srp_id: u32,
    tlvs: Vec<u8>,
}

impl SrpObject {
    pub const fn new(remove: bool, srp_id: u32, tlvs: Vec<u8>) -> Self {
        Self {
            remove,
            srp_id,
            tlvs,
        }
    }

    pub const fn remove(&self) -> bool {
        self.remove
    }

    pub const fn srp_id(&self) -> u32 {
        self.srp_id
    }

    pub const fn tlvs(&self) -> &Vec<u8> {
        &self.tlvs
    }
}

/// An object with a (class, type) pair outside the registry. Enough is kept
/// to skip over it, log it, or write it back unchanged.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnknownObject {
    object_class: u8,
    object_type: u8,
    processing: bool,
    ignore: bool,
    value: Vec<u8>,
}

impl UnknownObject {
    pub const fn new(
        object_class: u8,
        object_type: u8,
        processing: bool,
        ignore: bool,
        value: Vec<u8>,
    ) -> Self {
        Self {
            object_class,
            object_type,
            processing,
            ignore,
            value,
        }
    }

    pub const fn object_class(&self) -> u8 {
        self.object_class
    }

    pub const fn object_type(&self) -> u8 {
        self.object_type
    }

    pub const fn processing(&self) -> bool {
        self.processing
    }

    pub const fn ignore(&self) -> bool {
        self.ignore
    }

    pub const fn value(&self) -> &Vec<u8> {
        &self.value
    }
}

/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |L|    Type     |     Length    |   (Sub-object contents)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Every sub-object carries its own length and is walked using it; nothing
/// here assumes a fixed size.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PathSubobject {
    /// IPv4 prefix hop (type 1).
    Ipv4Prefix {
        loose: bool,
        address: Ipv4Addr,
        prefix_length: u8,
    },
    /// MPLS label hop (type 3), as recorded in RROs.
    Label {
        loose: bool,
        flags: u8,
        c_type: u8,
        label: u32,
    },
    /// A sub-object type without a decoder, skipped using its declared
    /// length.
    Unknown {
        loose: bool,
        subobject_type: u8,
        value: Vec<u8>,
    },
}

impl PathSubobject {
    pub const fn get_type(&self) -> Option<PathSubobjectType> {
        match self {
            Self::Ipv4Prefix { .. } => Some(PathSubobjectType::Ipv4Prefix),
            Self::Label { .. } => Some(PathSubobjectType::Label),
            Self::Unknown { .. } => None,
        }
    }

    pub const fn loose(&self) -> bool {
        match self {
            Self::Ipv4Prefix { loose, .. }
            | Self::Label { loose, .. }
            | Self::Unknown { loose, .. } => *loose,
        }
    }
}

/// Stateful PCE Capability TLV value, advertised in the Open object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatefulPceCapabilityTlv {
    update_capability: bool,
}

impl StatefulPceCapabilityTlv {
    pub const fn new(update_capability: bool) -> Self {
        Self { update_capability }
    }

    pub const fn update_capability(&self) -> bool {
        self.update_capability
    }
}

/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     Value (padded to 4 octets)                |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PcepTlv {
    StatefulPceCapability(StatefulPceCapabilityTlv),
    Unknown { tlv_type: u16, value: Vec<u8> },
}

impl PcepTlv {
    pub const fn get_type(&self) -> Option<PcepTlvType> {
        match self {
            Self::StatefulPceCapability(_) => Some(PcepTlvType::StatefulPceCapability),
            Self::Unknown { .. } => None,
        }
    }

    /// The TLV type code written on the wire.
    pub const fn type_code(&self) -> u16 {
        match self {
            Self::StatefulPceCapability(_) => PcepTlvType::StatefulPceCapability as u16,
            Self::Unknown { tlv_type, .. } => *tlv_type,
        }
    }
}
