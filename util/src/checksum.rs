// Copyright (c) 2024 Huawei Technologies Co.,Ltd. All rights reserved.
//
// StratoVirt is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

/// Sum of all bytes of `slice`, modulo 256.
pub fn checksum(slice: &[u8]) -> u8 {
    let mut sum: u32 = 0;

    for byte in slice.iter() {
        sum += u32::from(*byte);
        sum &= 0xff;
    }

    (sum & 0xff) as u8
}

/// Store `value` at `offset` of `block` and fix up the checksum byte at
/// `csum_offset`, so that a block whose bytes summed to zero still does.
///
/// # Arguments
///
/// * `block` - the checksummed block.
/// * `offset` - index of the byte to replace, must differ from `csum_offset`.
/// * `value` - the new byte value.
/// * `csum_offset` - index of the checksum byte.
///
/// # Examples
///
/// ```rust
/// extern crate util;
/// use util::checksum::{checksum, write_byte_checksummed};
///
/// let mut block = [0x10_u8, 0x20, 0xd0];
/// write_byte_checksummed(&mut block, 0, 0x33, 2);
/// assert_eq!(block[0], 0x33);
/// assert_eq!(checksum(&block), 0);
/// ```
pub fn write_byte_checksummed(block: &mut [u8], offset: usize, value: u8, csum_offset: usize) {
    debug_assert_ne!(offset, csum_offset);
    let old = block[offset];
    block[offset] = value;
    block[csum_offset] = block[csum_offset].wrapping_add(old).wrapping_sub(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xff, 0x01]), 0);
        assert_eq!(checksum(&[0x80, 0x80, 0x05]), 0x05);
    }

    #[test]
    fn test_write_byte_checksummed() {
        let mut block = [0_u8; 16];
        block[15] = 0;
        assert_eq!(checksum(&block), 0);

        write_byte_checksummed(&mut block, 3, 0xff, 15);
        assert_eq!(block[3], 0xff);
        assert_eq!(block[15], 0x01);
        assert_eq!(checksum(&block), 0);

        // Writing the same value keeps the checksum byte as is.
        write_byte_checksummed(&mut block, 3, 0xff, 15);
        assert_eq!(block[15], 0x01);

        write_byte_checksummed(&mut block, 0, 0x7f, 15);
        write_byte_checksummed(&mut block, 3, 0x00, 15);
        assert_eq!(checksum(&block), 0);
    }
}
