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

use std::path::Path;

use util::log_to;
use util::logger::{Level, Log};

use crate::config::InstanceConfig;
use crate::control::{ControlChannel, CREATE_INSTANCE_ATTR, FOREGROUND_VM_ATTR};
use crate::error::GvtError;
use crate::Gvt;

// The kernel picks the vgt instance number when it's -1.
const AUTO_VGT_ID: i32 = -1;

impl<C: ControlChannel> Gvt<C> {
    /// Set which domain is directly displayed. Domain 0 gives the display
    /// back to the host.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a guest without vgt instance, `DeviceUnavailable`
    /// if the control attribute can't be accessed and `VerificationFailed` if
    /// the kernel did not switch.
    pub fn set_foreground_vm(&self, domid: u32) -> Result<(), GvtError> {
        if domid != 0 && !self.vm_exists(domid) {
            return Err(GvtError::InvalidArgument(format!(
                "domain {} has no vgt instance",
                domid
            )));
        }

        let attr = Path::new(FOREGROUND_VM_ATTR);
        self.write_attr(attr, format!("{}\n", domid).as_bytes())?;

        // Check that it was ready.
        let found = self.read_attr(attr)?;
        if found.trim().parse::<u32>().ok() != Some(domid) {
            log_to!(
                self.logger,
                Level::Warn,
                "Foreground is {:?} after switching to domain {}",
                found.trim(),
                domid
            );
            return Err(GvtError::VerificationFailed {
                path: attr.display().to_string(),
                expected: domid.to_string(),
                found: found.trim().to_string(),
            });
        }

        log_to!(self.logger, Level::Info, "Domain {} is in the foreground", domid);
        Ok(())
    }

    /// Create a virtual GT instance for a guest.
    pub fn create_instance(&self, domid: u32, config: &InstanceConfig) -> Result<(), GvtError> {
        if domid == 0 {
            return Err(GvtError::InvalidArgument("dom0 owns the physical GT".to_string()));
        }

        let value = format!(
            "{},{},{},{},{}\n",
            domid, config.aperture_size, config.gm_size, config.fence_count, AUTO_VGT_ID
        );
        self.write_attr(Path::new(CREATE_INSTANCE_ATTR), value.as_bytes())?;
        log_to!(
            self.logger,
            Level::Info,
            "Created vgt instance for domain {}: aperture {}MiB, gm {}MiB, {} fences",
            domid,
            config.aperture_size,
            config.gm_size,
            config.fence_count
        );
        Ok(())
    }

    /// Destroy the virtual GT instance of a guest.
    pub fn destroy_instance(&self, domid: u32) -> Result<(), GvtError> {
        if domid == 0 {
            return Err(GvtError::InvalidArgument("dom0 owns the physical GT".to_string()));
        }

        // A negated domain id asks for destruction.
        let value = format!("-{}\n", domid);
        self.write_attr(Path::new(CREATE_INSTANCE_ATTR), value.as_bytes())?;
        log_to!(self.logger, Level::Info, "Destroyed vgt instance of domain {}", domid);
        Ok(())
    }
}
