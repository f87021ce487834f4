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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GvtError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Control attribute {path} is unavailable: {source}")]
    DeviceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Read back {found:?} from {path}, expected {expected:?}")]
    VerificationFailed {
        path: String,
        expected: String,
        found: String,
    },
}

impl GvtError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, GvtError::InvalidArgument(_))
    }

    pub fn is_device_unavailable(&self) -> bool {
        matches!(self, GvtError::DeviceUnavailable { .. })
    }
}

impl From<util::UtilError> for GvtError {
    fn from(e: util::UtilError) -> Self {
        GvtError::InvalidArgument(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JsonSerde")]
    JsonSerde {
        #[from]
        source: serde_json::Error,
    },
    #[error("Input {0} string's length must be no more than {1}.")]
    StringLengthTooLong(String, usize),
    #[error("Invalid parameter \'{0}\' for \'{1}\'")]
    InvalidParam(String, String),
    #[error("{0} must be greater than 0.")]
    ZeroValue(String),
}
