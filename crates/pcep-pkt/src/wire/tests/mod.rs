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

use crate::{
    iana::*,
    wire::{
        deserializer::{
            LocatedPathSubobjectParsingError, LocatedPcepMessageParsingError,
            LocatedPcepObjectParsingError, PathSubobjectParsingError, PcepMessageParsingError,
            PcepObjectParsingError,
        },
        serializer::{PcepMessageWritingError, PcepObjectWritingError},
    },
    *,
};
use netgauze_parse_utils::{
    test_helpers::{combine, test_parse_error, test_parsed_completely, test_write},
    ReadablePdu, Span, WritablePdu,
};
use std::net::Ipv4Addr;

#[test]
fn test_open_message() -> Result<(), PcepMessageWritingError> {
    let good_wire = [
        0x20, 0x01, 0x00, 0x14, // common header, length 20
        0x01, 0x10, 0x00, 0x10, // OPEN object header, length 16
        0x20, 0x1e, 0x78, 0x01, // version, keepalive 30, dead timer 120, sid 1
        0x00, 0x10, 0x00, 0x04, // stateful capability TLV
        0x00, 0x00, 0x00, 0x01, // update capability
    ];
    let bad_version_wire = [0x40, 0x01, 0x00, 0x04];
    let bad_length_wire = [0x20, 0x01, 0x00, 0x03];

    let good = PcepMessage::Open(OpenMessage::stateful(30, 1));
    let bad_version = LocatedPcepMessageParsingError::new(
        Span::new(&bad_version_wire),
        PcepMessageParsingError::UnsupportedPcepVersion(2),
    );
    let bad_length = LocatedPcepMessageParsingError::new(
        unsafe { Span::new_from_raw_offset(2, &bad_length_wire[2..]) },
        PcepMessageParsingError::InvalidPcepMessageLength(3),
    );

    test_parsed_completely(&good_wire, &good);
    test_parse_error::<PcepMessage, LocatedPcepMessageParsingError<'_>>(
        &bad_version_wire,
        &bad_version,
    );
    test_parse_error::<PcepMessage, LocatedPcepMessageParsingError<'_>>(
        &bad_length_wire,
        &bad_length,
    );
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_keepalive_message() -> Result<(), PcepMessageWritingError> {
    let good_wire = [0x20, 0x02, 0x00, 0x04];
    let good = PcepMessage::Keepalive;

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_truncated_message_never_parses() {
    let good_wire = [
        0x20, 0x01, 0x00, 0x14, 0x01, 0x10, 0x00, 0x10, 0x20, 0x1e, 0x78, 0x01, 0x00, 0x10, 0x00,
        0x04, 0x00, 0x00, 0x00, 0x01,
    ];
    for cut in 0..good_wire.len() {
        let parsed = PcepMessage::from_wire(Span::new(&good_wire[..cut]));
        assert!(
            parsed.is_err(),
            "prefix of {cut} bytes parsed as {parsed:?}"
        );
    }
}

#[test]
fn test_object_length_shorter_than_header() {
    // Lengths 0 through 3 claim less than the object header itself and must
    // be rejected before any body is consumed
    for length in 0u16..=3 {
        let wire = [0x20, 0x10, (length >> 8) as u8, length as u8];
        let expected = LocatedPcepObjectParsingError::new(
            unsafe { Span::new_from_raw_offset(2, &wire[2..]) },
            PcepObjectParsingError::InvalidPcepObjectLength(length),
        );
        test_parse_error::<PcepObject, LocatedPcepObjectParsingError<'_>>(&wire, &expected);
    }
}

#[test]
fn test_state_report_message() -> Result<(), PcepMessageWritingError> {
    let good_lsp_wire = [
        0x20, 0x10, 0x00, 0x08, // LSP object header
        0x00, 0x00, 0x10, 0x11, // PLSP-ID 1, operational up, delegated
    ];
    let good_bandwidth_wire = [
        0x05, 0x10, 0x00, 0x08, // BANDWIDTH object header
        0x00, 0x0f, 0x42, 0x40, // 1000000
    ];
    let good_unknown_wire = [
        0x63, 0x12, 0x00, 0x08, // class 99, P flag set
        0xde, 0xad, 0xbe, 0xef,
    ];
    // The unregistered object sits between two known ones; decoding must
    // skip it and keep wire order
    let good_wire = combine(vec![
        &[0x20, 0x0a, 0x00, 0x1c],
        &good_bandwidth_wire,
        &good_unknown_wire,
        &good_lsp_wire,
    ]);

    let good = PcepMessage::StateReport(StateReportMessage::new(vec![
        PcepObject::Bandwidth(BandwidthObject::new(1_000_000)),
        PcepObject::Unknown(UnknownObject::new(
            99,
            1,
            true,
            false,
            vec![0xde, 0xad, 0xbe, 0xef],
        )),
        PcepObject::Lsp(LspObject::new(
            1,
            true,
            false,
            false,
            false,
            LspOperationalStatus::Up,
            vec![],
        )),
    ]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_lsp_object_flags() -> Result<(), PcepObjectWritingError> {
    let good_all_set_wire = [0x12, 0x34, 0x50, 0x2f];
    let good_all_clear_wire = [0x00, 0x00, 0x00, 0x00];
    let good_going_up_wire = [0xff, 0xff, 0xf0, 0x41];
    let bad_operational_wire = [0x00, 0x00, 0x10, 0x70];

    let good_all_set = LspObject::new(
        0x12345,
        true,
        true,
        true,
        true,
        LspOperationalStatus::Active,
        vec![],
    );
    let good_all_clear = LspObject::new(
        0,
        false,
        false,
        false,
        false,
        LspOperationalStatus::Down,
        vec![],
    );
    let good_going_up = LspObject::new(
        0xfffff,
        true,
        false,
        false,
        false,
        LspOperationalStatus::GoingUp,
        vec![],
    );
    let bad_operational = LocatedPcepObjectParsingError::new(
        Span::new(&bad_operational_wire),
        PcepObjectParsingError::UndefinedOperationalStatus(UndefinedLspOperationalStatus(7)),
    );

    test_parsed_completely(&good_all_set_wire, &good_all_set);
    test_parsed_completely(&good_all_clear_wire, &good_all_clear);
    test_parsed_completely(&good_going_up_wire, &good_going_up);
    test_parse_error::<LspObject, LocatedPcepObjectParsingError<'_>>(
        &bad_operational_wire,
        &bad_operational,
    );
    test_write(&good_all_set, &good_all_set_wire)?;
    test_write(&good_all_clear, &good_all_clear_wire)?;
    test_write(&good_going_up, &good_going_up_wire)?;
    Ok(())
}

#[test]
fn test_explicit_route_object() -> Result<(), PcepObjectWritingError> {
    let good_wire = [
        0x07, 0x10, 0x00, 0x20, // ERO object header, length 32
        0x01, 0x08, 0x0a, 0x00, 0x00, 0x01, 0x20, 0x00, // strict 10.0.0.1/32
        0x81, 0x08, 0x0a, 0x00, 0x01, 0x00, 0x18, 0x00, // loose 10.0.1.0/24
        0x03, 0x08, 0x00, 0x02, 0x00, 0x00, 0x03, 0xe9, // label 1001
        0x05, 0x04, 0xca, 0xfe, // unknown sub-object type 5
    ];

    let good = PcepObject::ExplicitRoute(ExplicitRouteObject::new(vec![
        PathSubobject::Ipv4Prefix {
            loose: false,
            address: Ipv4Addr::new(10, 0, 0, 1),
            prefix_length: 32,
        },
        PathSubobject::Ipv4Prefix {
            loose: true,
            address: Ipv4Addr::new(10, 0, 1, 0),
            prefix_length: 24,
        },
        PathSubobject::Label {
            loose: false,
            flags: 0,
            c_type: 2,
            label: 1001,
        },
        PathSubobject::Unknown {
            loose: false,
            subobject_type: 5,
            value: vec![0xca, 0xfe],
        },
    ]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_path_subobject_bad_length() {
    // A sub-object claiming to be shorter than its own header would stall
    // iteration if it were accepted
    let bad_length_wire = [0x01, 0x01, 0x00];
    let bad_length = LocatedPathSubobjectParsingError::new(
        unsafe { Span::new_from_raw_offset(1, &bad_length_wire[1..]) },
        PathSubobjectParsingError::InvalidSubobjectLength(1),
    );
    test_parse_error::<PathSubobject, LocatedPathSubobjectParsingError<'_>>(
        &bad_length_wire,
        &bad_length,
    );
}

#[test]
fn test_open_object_tlvs() -> Result<(), PcepObjectWritingError> {
    let good_no_update_wire = [
        0x20, 0x1e, 0x78, 0x02, // version, keepalive, dead timer, sid
        0x00, 0x10, 0x00, 0x04, // stateful capability TLV
        0x00, 0x00, 0x00, 0x00, // update capability not set
    ];
    let good_unknown_tlv_wire = [
        0x20, 0x1e, 0x78, 0x03, //
        0x00, 0xff, 0x00, 0x03, // unknown TLV type 255, length 3
        0xaa, 0xbb, 0xcc, 0x00, // value plus one padding octet
    ];

    let good_no_update = OpenObject::new(
        30,
        120,
        2,
        vec![PcepTlv::StatefulPceCapability(StatefulPceCapabilityTlv::new(
            false,
        ))],
    );
    let good_unknown_tlv = OpenObject::new(
        30,
        120,
        3,
        vec![PcepTlv::Unknown {
            tlv_type: 255,
            value: vec![0xaa, 0xbb, 0xcc],
        }],
    );

    test_parsed_completely(&good_no_update_wire, &good_no_update);
    test_parsed_completely(&good_unknown_tlv_wire, &good_unknown_tlv);
    assert!(!good_no_update.update_capable());
    test_write(&good_no_update, &good_no_update_wire)?;
    test_write(&good_unknown_tlv, &good_unknown_tlv_wire)?;
    Ok(())
}

#[test]
fn test_error_message() -> Result<(), PcepMessageWritingError> {
    let good_wire = [
        0x20, 0x06, 0x00, 0x0c, // common header
        0x0d, 0x10, 0x00, 0x08, // PCEP-ERROR object header
        0x00, 0x00, 0x01, 0x01, // session establishment failure
    ];
    let good = PcepMessage::Error(ErrorMessage::new(vec![PcepObject::PcepError(
        ErrorObject::new(1, 1),
    )]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_close_message() -> Result<(), PcepMessageWritingError> {
    let good_wire = [
        0x20, 0x07, 0x00, 0x0c, // common header
        0x0f, 0x10, 0x00, 0x08, // CLOSE object header
        0x00, 0x00, 0x00, 0x02, // reason: deadtimer expired
    ];
    let good = PcepMessage::Close(CloseMessage::new(vec![PcepObject::Close(CloseObject::new(
        2,
    ))]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_update_message() -> Result<(), PcepMessageWritingError> {
    let good_wire = [
        0x20, 0x0b, 0x00, 0x24, // common header, length 36
        0x21, 0x10, 0x00, 0x0c, // SRP object header
        0x00, 0x00, 0x00, 0x00, // flags
        0x00, 0x00, 0x00, 0x2a, // SRP-ID 42
        0x20, 0x10, 0x00, 0x08, // LSP object header
        0x00, 0x00, 0x20, 0x11, // PLSP-ID 2, operational up, delegated
        0x07, 0x10, 0x00, 0x0c, // ERO object header
        0x01, 0x08, 0x0a, 0x00, 0x00, 0x01, 0x20, 0x00, // strict 10.0.0.1/32
    ];

    let good = PcepMessage::Update(UpdateMessage::new(vec![
        PcepObject::Srp(SrpObject::new(false, 42, vec![])),
        PcepObject::Lsp(LspObject::new(
            2,
            true,
            false,
            false,
            false,
            LspOperationalStatus::Up,
            vec![],
        )),
        PcepObject::ExplicitRoute(ExplicitRouteObject::new(vec![PathSubobject::Ipv4Prefix {
            loose: false,
            address: Ipv4Addr::new(10, 0, 0, 1),
            prefix_length: 32,
        }])),
    ]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_srp_object_trailing_tlvs() -> Result<(), PcepObjectWritingError> {
    // TLVs after the SRP-ID (here a PATH-SETUP-TYPE) must not abort the
    // object; they are carried raw and written back unchanged
    let good_wire = [
        0x21, 0x10, 0x00, 0x14, // SRP object header, length 20
        0x00, 0x00, 0x00, 0x00, // flags
        0x00, 0x00, 0x00, 0x07, // SRP-ID 7
        0x00, 0x1c, 0x00, 0x04, // PATH-SETUP-TYPE TLV
        0x00, 0x00, 0x00, 0x00,
    ];
    let good = PcepObject::Srp(SrpObject::new(
        false,
        7,
        vec![0x00, 0x1c, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00],
    ));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_no_path_object() -> Result<(), PcepObjectWritingError> {
    // NI fills the first octet; the C flag is the top bit of the 16-bit
    // flags field that follows
    let good_wire = [
        0x03, 0x10, 0x00, 0x08, // NO-PATH object header
        0x05, 0x80, 0x00, 0x00, // NI 5, C flag set
    ];
    let good_clear_wire = [0x03, 0x10, 0x00, 0x08, 0x02, 0x00, 0x00, 0x00];

    let good = PcepObject::NoPath(NoPathObject::new(5, true));
    let good_clear = PcepObject::NoPath(NoPathObject::new(2, false));

    test_parsed_completely(&good_wire, &good);
    test_parsed_completely(&good_clear_wire, &good_clear);
    test_write(&good, &good_wire)?;
    test_write(&good_clear, &good_clear_wire)?;
    Ok(())
}

#[test]
fn test_endpoints_object() -> Result<(), PcepObjectWritingError> {
    let good_wire = [
        0x04, 0x10, 0x00, 0x0c, // END-POINTS object header
        0x0a, 0x00, 0x00, 0x01, // source 10.0.0.1
        0x0a, 0x00, 0x00, 0x02, // destination 10.0.0.2
    ];
    let good = PcepObject::EndpointsIpv4(EndpointsIpv4Object::new(
        Ipv4Addr::new(10, 0, 0, 1),
        Ipv4Addr::new(10, 0, 0, 2),
    ));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_unimplemented_message_type() -> Result<(), PcepMessageWritingError> {
    let good_wire = [0x20, 0x09, 0x00, 0x06, 0xab, 0xcd];
    let good = PcepMessage::Unimplemented(UnimplementedMessage::new(9, vec![0xab, 0xcd]));

    test_parsed_completely(&good_wire, &good);
    test_write(&good, &good_wire)?;
    Ok(())
}

#[test]
fn test_message_length_overflow_is_rejected() {
    // A body that would not fit the 16-bit Message-Length field must be
    // refused instead of writing a truncated length
    let msg = PcepMessage::Unimplemented(UnimplementedMessage::new(9, vec![0; 70_000]));
    let mut buf = Vec::new();
    assert_eq!(
        msg.write(&mut buf),
        Err(PcepMessageWritingError::MessageLengthOverflow(70_004))
    );
    assert!(buf.is_empty());
}
