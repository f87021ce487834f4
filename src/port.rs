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

//! Display ports of the GT and the three names each of them goes by: the
//! ordinal, the vgt control directory (`PORT_A`..`PORT_E`) and the i915 DRM
//! connector (as found in /sys/class/drm).

use std::fmt;

use crate::error::GvtError;

/// Number of display ports of the GT.
pub const GVT_MAX_PORTS: i32 = 5;

/// Name reported for ordinals that are not a port.
pub const INVALID_PORT_NAME: &str = "INVALID";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GtPort {
    /// Embedded panel, PORT_A.
    Edp = 0,
    B = 1,
    C = 2,
    D = 3,
    /// Analog output, PORT_E.
    Vga = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortInfo {
    /// Directory of the port below `vm<domid>` in the vgt control tree.
    pub control_name: &'static str,
    /// Connector name used by the i915 driver.
    pub connector_name: &'static str,
    pub digital: bool,
    pub hotpluggable: bool,
}

impl GtPort {
    pub const ALL: [GtPort; GVT_MAX_PORTS as usize] =
        [GtPort::Edp, GtPort::B, GtPort::C, GtPort::D, GtPort::Vga];

    pub fn info(self) -> PortInfo {
        match self {
            GtPort::Edp => PortInfo {
                control_name: "PORT_A",
                connector_name: "card0-eDP-1",
                digital: true,
                hotpluggable: false,
            },
            GtPort::B => PortInfo {
                control_name: "PORT_B",
                connector_name: "card0-HDMI-A-1",
                digital: true,
                hotpluggable: true,
            },
            GtPort::C => PortInfo {
                control_name: "PORT_C",
                connector_name: "card0-HDMI-A-2",
                digital: true,
                hotpluggable: true,
            },
            GtPort::D => PortInfo {
                control_name: "PORT_D",
                connector_name: "card0-HDMI-A-3",
                digital: true,
                hotpluggable: true,
            },
            GtPort::Vga => PortInfo {
                control_name: "PORT_E",
                connector_name: "card0-VGA-1",
                digital: false,
                hotpluggable: true,
            },
        }
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    pub fn control_name(self) -> &'static str {
        self.info().control_name
    }

    pub fn connector_name(self) -> &'static str {
        self.info().connector_name
    }

    pub fn is_digital(self) -> bool {
        self.info().digital
    }

    pub fn is_hotpluggable(self) -> bool {
        self.info().hotpluggable
    }

    /// Translate an i915 connector name. DP and HDMI connectors with the same
    /// index share one port.
    pub fn from_connector_name(name: &str) -> Option<GtPort> {
        match name {
            "card0-eDP-1" => Some(GtPort::Edp),
            "card0-DP-1" | "card0-HDMI-A-1" => Some(GtPort::B),
            "card0-DP-2" | "card0-HDMI-A-2" => Some(GtPort::C),
            "card0-DP-3" | "card0-HDMI-A-3" => Some(GtPort::D),
            "card0-VGA-1" => Some(GtPort::Vga),
            _ => None,
        }
    }
}

impl TryFrom<i32> for GtPort {
    type Error = GvtError;

    fn try_from(ordinal: i32) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(GtPort::Edp),
            1 => Ok(GtPort::B),
            2 => Ok(GtPort::C),
            3 => Ok(GtPort::D),
            4 => Ok(GtPort::Vga),
            _ => Err(GvtError::InvalidArgument(format!(
                "port {} out of range 0..{}",
                ordinal, GVT_MAX_PORTS
            ))),
        }
    }
}

impl fmt::Display for GtPort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.control_name())
    }
}

pub fn is_valid(ordinal: i32) -> bool {
    GtPort::try_from(ordinal).is_ok()
}

/// Connector name of a port ordinal, `INVALID` for anything out of range.
pub fn connector_name(ordinal: i32) -> &'static str {
    match GtPort::try_from(ordinal) {
        Ok(port) => port.connector_name(),
        Err(_) => INVALID_PORT_NAME,
    }
}
