// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::ensure;

/// 128-bit identifier with the native `GUID` layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct GUID {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Interface identifier.
pub type IID = GUID;

/// Class identifier.
pub type CLSID = GUID;

pub const IID_IUNKNOWN: IID = GUID::from_u128(0x0000_0000_0000_0000_C000_0000_0000_0046);

impl GUID {
    pub const fn zeroed() -> Self {
        Self::from_u128(0)
    }

    /// Builds a GUID from its canonical big-endian reading, so
    /// `0x56FDF342_FD6D_11D0_958A_006097C9A090` is
    /// `{56FDF342-FD6D-11D0-958A-006097C9A090}`.
    pub const fn from_u128(value: u128) -> Self {
        let tail = (value as u64).to_be_bytes();
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80) as u16,
            data3: (value >> 64) as u16,
            data4: tail,
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | (u64::from_be_bytes(self.data4) as u128)
    }
}

impl From<u128> for GUID {
    #[inline]
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl fmt::Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("malformed GUID string {input:?}")]
pub struct GuidParseError {
    pub input: String,
}

impl FromStr for GUID {
    type Err = GuidParseError;

    /// Accepts `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, optionally wrapped in braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GuidParseError {
            input: s.to_owned(),
        };

        let body = match s.strip_prefix('{') {
            Some(rest) => rest.strip_suffix('}').ok_or_else(err)?,
            None => s,
        };
        ensure!(body.len() == 36, err());

        let groups: Vec<&str> = body.split('-').collect();
        ensure!(groups.len() == 5, err());
        for (group, width) in groups.iter().zip([8usize, 4, 4, 4, 12]) {
            ensure!(group.len() == width, err());
            ensure!(group.bytes().all(|b| b.is_ascii_hexdigit()), err());
        }

        let hex: String = groups.concat();
        let value = u128::from_str_radix(&hex, 16).map_err(|_| err())?;
        Ok(Self::from_u128(value))
    }
}
