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

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::port::GtPort;

/// Where the vgt kernel module exposes its control tree.
pub const VGT_KERNEL_PATH: &str = "/sys/kernel/vgt";

pub const FOREGROUND_VM_ATTR: &str = "control/foreground_vm";
pub const CREATE_INSTANCE_ATTR: &str = "control/create_vgt_instance";

pub const PORT_OVERRIDE_ATTR: &str = "port_override";
pub const EDID_ATTR: &str = "edid";
pub const CONNECTION_ATTR: &str = "connection";

/// Access to the vgt control tree.
///
/// Paths are relative to the root of the tree, e.g. `vm1/PORT_B/edid`.
pub trait ControlChannel {
    /// Write `value` to an existing attribute. Attributes are never created.
    fn write(&self, attr: &Path, value: &[u8]) -> io::Result<()>;

    fn read(&self, attr: &Path) -> io::Result<String>;

    fn is_dir(&self, path: &Path) -> bool;
}

/// Directory holding the attributes of domain `domid`.
pub fn vm_dir(domid: u32) -> PathBuf {
    PathBuf::from(format!("vm{}", domid))
}

pub fn port_attr(domid: u32, port: GtPort, attr: &str) -> PathBuf {
    vm_dir(domid).join(port.control_name()).join(attr)
}

/// Control tree backed by sysfs.
#[derive(Debug, Clone)]
pub struct SysfsControl {
    root: PathBuf,
}

impl SysfsControl {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        SysfsControl { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for SysfsControl {
    fn default() -> Self {
        SysfsControl::new(VGT_KERNEL_PATH)
    }
}

impl ControlChannel for SysfsControl {
    fn write(&self, attr: &Path, value: &[u8]) -> io::Result<()> {
        // O_TRUNC is ignored by sysfs, it only matters for plain file trees.
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.root.join(attr))?;
        file.write_all(value)
    }

    fn read(&self, attr: &Path) -> io::Result<String> {
        fs::read_to_string(self.root.join(attr))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.root.join(path).is_dir()
    }
}
