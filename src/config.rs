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

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::control::VGT_KERNEL_PATH;
use crate::error::ConfigError;

pub const MAX_PATH_LENGTH: usize = 4096;

const DEFAULT_APERTURE_SIZE: u32 = 64;
const DEFAULT_GM_SIZE: u32 = 512;
const DEFAULT_FENCE_COUNT: u32 = 4;

pub trait ConfigCheck {
    fn check(&self) -> Result<()>;
}

fn check_path_length(path: &str, name: &str) -> Result<()> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(anyhow!(ConfigError::StringLengthTooLong(
            name.to_string(),
            MAX_PATH_LENGTH
        )));
    }
    Ok(())
}

/// Resources reserved for a virtual GT instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceConfig {
    /// Size of the virtual graphics aperture in MiB.
    pub aperture_size: u32,
    /// Size of the virtual graphics memory in MiB.
    pub gm_size: u32,
    /// Number of fence registers to reserve.
    pub fence_count: u32,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        InstanceConfig {
            aperture_size: DEFAULT_APERTURE_SIZE,
            gm_size: DEFAULT_GM_SIZE,
            fence_count: DEFAULT_FENCE_COUNT,
        }
    }
}

impl ConfigCheck for InstanceConfig {
    fn check(&self) -> Result<()> {
        if self.aperture_size == 0 {
            return Err(anyhow!(ConfigError::ZeroValue("aperture_size".to_string())));
        }
        if self.gm_size == 0 {
            return Err(anyhow!(ConfigError::ZeroValue("gm_size".to_string())));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GvtConfig {
    /// Root of the vgt control tree.
    pub kernel_path: String,
    /// Log file, stderr is used when absent.
    pub log_file: Option<String>,
    pub instance: InstanceConfig,
}

impl Default for GvtConfig {
    fn default() -> Self {
        GvtConfig {
            kernel_path: VGT_KERNEL_PATH.to_string(),
            log_file: None,
            instance: InstanceConfig::default(),
        }
    }
}

impl ConfigCheck for GvtConfig {
    fn check(&self) -> Result<()> {
        check_path_length(&self.kernel_path, "kernel_path")?;
        if !Path::new(&self.kernel_path).is_absolute() {
            return Err(anyhow!(ConfigError::InvalidParam(
                self.kernel_path.clone(),
                "kernel_path".to_string()
            )));
        }
        if let Some(log_file) = &self.log_file {
            check_path_length(log_file, "log_file")?;
        }
        self.instance.check()
    }
}

impl GvtConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GvtConfig = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        GvtConfig::from_json(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref().map(Path::new)
    }
}
