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

//! Codecs to decode and encode PCEP messages from byte streams

use crate::{
    iana::PCEP_VERSION,
    wire::{deserializer::PcepMessageParsingError, serializer::PcepMessageWritingError},
    PcepMessage,
};
use byteorder::{ByteOrder, NetworkEndian};
use bytes::{Buf, BufMut, BytesMut};
use netgauze_parse_utils::{LocatedParsingError, ReadablePdu, Span, WritablePdu};
use nom::Needed;
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder};

/// Min length for a valid PCEP message: the 4-octet common header
pub const PCEP_MESSAGE_MIN_LENGTH: usize = 4;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum PcepCodecDecoderError {
    IoError(String),
    Incomplete(Option<usize>),
    PcepMessageParsingError(PcepMessageParsingError),
}

impl From<std::io::Error> for PcepCodecDecoderError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

/// Encoder and Decoder for [`PcepMessage`]
#[derive(Debug, Default)]
pub struct PcepCodec {
    /// Helper to track in the decoder if we are inside a PCEP message or not
    in_message: bool,
}

impl Encoder<PcepMessage> for PcepCodec {
    type Error = PcepMessageWritingError;

    fn encode(&mut self, pcep_msg: PcepMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(pcep_msg.len());
        let mut writer = dst.writer();
        pcep_msg.write(&mut writer)?;
        Ok(())
    }
}

impl Decoder for PcepCodec {
    type Item = PcepMessage;
    type Error = PcepCodecDecoderError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.in_message || buf.len() >= PCEP_MESSAGE_MIN_LENGTH {
            let version: u8 = buf[0] >> 5;
            // Fail early if the version is invalid
            if version != PCEP_VERSION {
                buf.advance(1);
                return Err(PcepCodecDecoderError::PcepMessageParsingError(
                    PcepMessageParsingError::UnsupportedPcepVersion(version),
                ));
            }
            // Read the length from the common header; it counts the header
            // itself
            let length = NetworkEndian::read_u16(&buf[2..PCEP_MESSAGE_MIN_LENGTH]) as usize;
            if buf.len() < length {
                // We still didn't read all the bytes for the message yet
                self.in_message = true;
                Ok(None)
            } else {
                self.in_message = false;
                let msg = match PcepMessage::from_wire(Span::new(buf)) {
                    Ok((span, msg)) => {
                        buf.advance(span.location_offset());
                        msg
                    }
                    Err(error) => {
                        let err = match error {
                            nom::Err::Incomplete(needed) => {
                                let needed = match needed {
                                    Needed::Unknown => None,
                                    Needed::Size(size) => Some(size.get()),
                                };
                                PcepCodecDecoderError::Incomplete(needed)
                            }
                            nom::Err::Error(error) | nom::Err::Failure(error) => {
                                PcepCodecDecoderError::PcepMessageParsingError(
                                    error.error().clone(),
                                )
                            }
                        };
                        // Make sure we advance the buffer far enough, so we
                        // don't get stuck on an error value. PCEP doesn't
                        // carry synchronization markers to find the start of
                        // the next message.
                        buf.advance(if length < PCEP_MESSAGE_MIN_LENGTH {
                            PCEP_MESSAGE_MIN_LENGTH
                        } else {
                            length
                        });
                        return Err(err);
                    }
                };
                Ok(Some(msg))
            }
        } else {
            // We don't have enough data yet to start processing
            Ok(None)
        }
    }
}
