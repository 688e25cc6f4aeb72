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

//! Serialize/Deserialize PCEP wire protocol

#![allow(unsafe_code)]
pub mod deserializer;
pub mod serializer;

/// Ver/Flags + Message-Type + Message-Length as per RFC5440
pub(crate) const PCEP_COMMON_HEADER_LENGTH: u16 = 4;

/// Object-Class + OT/Res/P/I + Object Length as per RFC5440
pub(crate) const PCEP_OBJECT_HEADER_LENGTH: u16 = 4;

/// 2-octet TLV type + 2-octet TLV length, value padded to 4 octets
pub(crate) const PCEP_TLV_HEADER_LENGTH: usize = 4;

/// L/Type octet + Length octet shared by all ERO/RRO sub-objects
pub(crate) const PATH_SUBOBJECT_HEADER_LENGTH: usize = 2;

#[cfg(test)]
mod tests;
