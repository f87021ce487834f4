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

//! Rewrites a monitor EDID so that it can be advertised on a virtual port.
//!
//! The layout follows VESA ENHANCED EXTENDED DISPLAY IDENTIFICATION DATA STANDARD.
//! Only the base block is ever transmitted, extension blocks are left alone.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::checksum::write_byte_checksummed;
use crate::error::UtilError;

/// Size of the base EDID block, the only part written to a virtual port.
pub const EDID_BLOCK_SIZE: usize = 128;
/// Highest pixel clock accepted by the guest driver, in 10 kHz units (160 MHz).
pub const PIXEL_CLOCK_MAX: u16 = 16000;

const EDID_CHECKSUM_OFFSET: usize = 0x7f;
// Video Input Definition
const VIDEO_INPUT_OFFSET: usize = 20;
const VIDEO_INPUT_DIGITAL: u8 = 0x80;
// Feature Support
const FEATURE_SUPPORT_OFFSET: usize = 24;
const FEATURE_COLOR_MASK: u8 = 0x18;
const FEATURE_COLOR_DIGITAL: u8 = 0x08;
const FEATURE_DPMS_MASK: u8 = 0xe0;
// 18 Byte Data Blocks
const DESC_OFFSET: usize = 54;
const DESC_SIZE: usize = 18;
const DESC_COUNT: usize = 4;

struct EdidBlock<'a> {
    data: &'a mut [u8],
}

impl<'a> EdidBlock<'a> {
    fn new(edid: &'a mut [u8]) -> Result<Self, UtilError> {
        if edid.len() < EDID_BLOCK_SIZE {
            return Err(UtilError::EdidTooShort(edid.len(), EDID_BLOCK_SIZE));
        }
        Ok(EdidBlock {
            data: &mut edid[..EDID_BLOCK_SIZE],
        })
    }

    /// All mutations go through here to keep byte 0x7f a valid checksum.
    fn set_byte(&mut self, offset: usize, value: u8) {
        write_byte_checksummed(self.data, offset, value, EDID_CHECKSUM_OFFSET);
    }

    fn fixup_input_type(&mut self, is_digital: bool) {
        let input = self.data[VIDEO_INPUT_OFFSET];
        let features = self.data[FEATURE_SUPPORT_OFFSET];
        let flagged_digital = input & VIDEO_INPUT_DIGITAL != 0;

        if !is_digital && flagged_digital {
            debug!("Converting digital EDID to analog");
            self.set_byte(VIDEO_INPUT_OFFSET, input & !VIDEO_INPUT_DIGITAL);
            self.set_byte(FEATURE_SUPPORT_OFFSET, features & !FEATURE_COLOR_MASK);
        } else if is_digital && !flagged_digital {
            debug!("Converting analog EDID to digital");
            self.set_byte(VIDEO_INPUT_OFFSET, input | VIDEO_INPUT_DIGITAL);
            self.set_byte(
                FEATURE_SUPPORT_OFFSET,
                (features & !FEATURE_COLOR_MASK) | FEATURE_COLOR_DIGITAL,
            );
        }
    }

    fn disable_dpms(&mut self) {
        let features = self.data[FEATURE_SUPPORT_OFFSET];
        self.set_byte(FEATURE_SUPPORT_OFFSET, features & !FEATURE_DPMS_MASK);
    }

    /// Clocks are meaningless on a virtual port, but the guest driver rejects
    /// modes above its limit.
    fn cap_pixel_clocks(&mut self) {
        for i in 0..DESC_COUNT {
            let offset = DESC_OFFSET + DESC_SIZE * i;
            let clock = LittleEndian::read_u16(&self.data[offset..offset + 2]);
            if clock <= PIXEL_CLOCK_MAX {
                continue;
            }

            debug!(
                "Capping pixel clock of descriptor {} from {} to {}",
                i, clock, PIXEL_CLOCK_MAX
            );
            let mut capped = [0_u8; 2];
            LittleEndian::write_u16(&mut capped, PIXEL_CLOCK_MAX);
            self.set_byte(offset, capped[0]);
            self.set_byte(offset + 1, capped[1]);
        }
    }
}

/// Patch `edid` in place for presentation on a virtual port.
///
/// Reconciles the digital input flag with the port type, disables every DPMS
/// capability and caps the pixel clock of the four detailed timing descriptors.
/// The checksum byte is kept valid after each single byte write.
///
/// # Arguments
///
/// * `edid` - EDID data, at least `EDID_BLOCK_SIZE` bytes. Bytes past the base
///   block are not touched.
/// * `is_digital` - whether the port the EDID is presented on is digital.
///
/// # Errors
///
/// `UtilError::EdidTooShort` if `edid` does not contain a whole base block. No
/// byte is modified in that case.
pub fn patch_edid(edid: &mut [u8], is_digital: bool) -> Result<(), UtilError> {
    let mut block = EdidBlock::new(edid)?;
    block.fixup_input_type(is_digital);
    block.disable_dpms();
    block.cap_pixel_clocks();
    Ok(())
}
