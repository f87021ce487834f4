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

//! Bindings for the sysfs API of Intel Graphics Virtualization Technology
//! (Intel GVT): virtual GT instances, the foreground domain and the virtual
//! display ports of each domain.

pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod instance;
pub mod port;
#[cfg(test)]
mod test_helper;

pub use config::{GvtConfig, InstanceConfig};
pub use control::{ControlChannel, SysfsControl};
pub use error::GvtError;
pub use port::GtPort;

use std::path::Path;
use std::sync::Arc;

use util::log_to;
use util::logger::{FacadeLogger, Level, Log};

use control::vm_dir;

/// Handle on one vgt control tree.
pub struct Gvt<C: ControlChannel> {
    control: C,
    logger: Arc<dyn Log>,
}

impl Gvt<SysfsControl> {
    pub fn from_config(config: &GvtConfig) -> Self {
        Gvt::new(SysfsControl::new(&config.kernel_path))
    }
}

impl<C: ControlChannel> Gvt<C> {
    /// Records go to the `log` facade until another logger is given with
    /// `with_logger`.
    pub fn new(control: C) -> Self {
        Gvt {
            control,
            logger: Arc::new(FacadeLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Whether domain `domid` has a vgt instance.
    pub fn vm_exists(&self, domid: u32) -> bool {
        self.control.is_dir(&vm_dir(domid))
    }

    /// Domain 0 owns the physical display and is never a valid target.
    fn check_guest(&self, domid: u32) -> Result<(), GvtError> {
        if domid == 0 {
            return Err(GvtError::InvalidArgument("refusing to hotplug dom0".to_string()));
        }
        if !self.vm_exists(domid) {
            return Err(GvtError::InvalidArgument(format!(
                "domain {} has no vgt instance",
                domid
            )));
        }
        Ok(())
    }

    fn write_attr(&self, attr: &Path, value: &[u8]) -> Result<(), GvtError> {
        self.control.write(attr, value).map_err(|e| {
            log_to!(self.logger, Level::Error, "error writing {}: {}", attr.display(), e);
            GvtError::DeviceUnavailable {
                path: attr.display().to_string(),
                source: e,
            }
        })
    }

    fn read_attr(&self, attr: &Path) -> Result<String, GvtError> {
        self.control.read(attr).map_err(|e| {
            log_to!(self.logger, Level::Error, "error reading {}: {}", attr.display(), e);
            GvtError::DeviceUnavailable {
                path: attr.display().to_string(),
                source: e,
            }
        })
    }
}
