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

//! Hotplug of virtual displays.
//!
//! A port is either unplugged or plugged. Plugging an already plugged port
//! unplugs it first, the guest never sees the attributes change under a live
//! connection.

use util::edid::{patch_edid, EDID_BLOCK_SIZE};
use util::log_to;
use util::logger::{Level, Log};
use util::UtilError;

use crate::control::{port_attr, ControlChannel, CONNECTION_ATTR, EDID_ATTR, PORT_OVERRIDE_ATTR};
use crate::error::GvtError;
use crate::port::GtPort;
use crate::Gvt;

const CONNECT: &[u8] = b"connect\n";
const DISCONNECT: &[u8] = b"disconnect\n";
const CONNECTED: &str = "connected";

impl<C: ControlChannel> Gvt<C> {
    /// Plug a display into a virtual port.
    ///
    /// # Arguments
    ///
    /// * `domid` - The domain owning the port.
    /// * `vgt_port` - The virtual port.
    /// * `edid` - EDID of the virtual display, patched in place. Only the first
    ///   `EDID_BLOCK_SIZE` bytes are written, the vgt driver hangs on more.
    /// * `pgt_port` - The physical port the virtual display is mapped to while
    ///   `domid` owns the display.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` without touching the control tree if `domid` is not a
    /// guest with a vgt instance or `edid` is shorter than one block.
    /// `DeviceUnavailable` if an attribute can't be written. Earlier writes are
    /// not rolled back, unplug the port before trying again.
    pub fn plug_display(
        &self,
        domid: u32,
        vgt_port: GtPort,
        edid: &mut [u8],
        pgt_port: GtPort,
    ) -> Result<(), GvtError> {
        self.check_guest(domid)?;
        if edid.len() < EDID_BLOCK_SIZE {
            return Err(UtilError::EdidTooShort(edid.len(), EDID_BLOCK_SIZE).into());
        }

        if self.is_port_plugged(domid, vgt_port) {
            log_to!(
                self.logger,
                Level::Debug,
                "{} of domain {} is plugged, unplugging first",
                vgt_port,
                domid
            );
            self.unplug_display(domid, vgt_port)?;
        }

        let value = format!("{}\n", pgt_port.control_name());
        self.write_attr(
            &port_attr(domid, vgt_port, PORT_OVERRIDE_ATTR),
            value.as_bytes(),
        )?;

        patch_edid(edid, vgt_port.is_digital())?;
        self.write_attr(&port_attr(domid, vgt_port, EDID_ATTR), &edid[..EDID_BLOCK_SIZE])?;

        self.write_attr(&port_attr(domid, vgt_port, CONNECTION_ATTR), CONNECT)?;
        log_to!(
            self.logger,
            Level::Info,
            "Plugged display into {} of domain {}, mapped to {}",
            vgt_port,
            domid,
            pgt_port.connector_name()
        );
        Ok(())
    }

    /// Unplug the display from a virtual port. Unplugging an empty port
    /// succeeds.
    pub fn unplug_display(&self, domid: u32, vgt_port: GtPort) -> Result<(), GvtError> {
        self.check_guest(domid)?;
        self.write_attr(&port_attr(domid, vgt_port, CONNECTION_ATTR), DISCONNECT)?;
        log_to!(
            self.logger,
            Level::Info,
            "Unplugged display from {} of domain {}",
            vgt_port,
            domid
        );
        Ok(())
    }

    /// Whether a display is plugged into the port. Any failure reads as
    /// unplugged.
    pub fn is_port_plugged(&self, domid: u32, vgt_port: GtPort) -> bool {
        if self.check_guest(domid).is_err() {
            return false;
        }

        match self.control.read(&port_attr(domid, vgt_port, CONNECTION_ATTR)) {
            Ok(state) => state.trim() == CONNECTED,
            Err(e) => {
                log_to!(
                    self.logger,
                    Level::Warn,
                    "Failed to query {} of domain {}: {}",
                    vgt_port,
                    domid,
                    e
                );
                false
            }
        }
    }

    /// Whether displays can come and go on the port. The eDP panel is fixed.
    pub fn is_port_hotpluggable(&self, domid: u32, vgt_port: GtPort) -> bool {
        self.check_guest(domid).is_ok() && vgt_port.is_hotpluggable()
    }
}
