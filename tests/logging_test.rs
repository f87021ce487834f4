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

use std::fs;

use igvt::{GtPort, Gvt, GvtConfig};
use util::logger::init_log;
use vmm_sys_util::tempdir::TempDir;

// The process wide logger can only be installed once, keep a single test here.
#[test]
fn test_file_logger() {
    let dir = TempDir::new().unwrap();
    let root = dir.as_path().join("vgt");
    let port_dir = root.join("vm2/PORT_D");
    fs::create_dir_all(&port_dir).unwrap();
    for attr in ["port_override", "edid"] {
        fs::write(port_dir.join(attr), "").unwrap();
    }
    fs::write(port_dir.join("connection"), "disconnected\n").unwrap();

    let log_file = dir.as_path().join("igvt.log");
    let config = GvtConfig::from_json(&format!(
        r#"{{"kernel_path": "{}", "log_file": "{}"}}"#,
        root.display(),
        log_file.display()
    ))
    .unwrap();
    init_log(config.log_path()).unwrap();
    assert!(init_log(None).is_err());

    let gvt = Gvt::from_config(&config);
    let mut edid = vec![0_u8; 128];
    gvt.plug_display(2, GtPort::D, &mut edid, GtPort::B).unwrap();
    // PORT_B has no attributes, the error is logged before being returned.
    assert!(gvt.unplug_display(2, GtPort::B).is_err());
    log::logger().flush();

    let log = fs::read_to_string(&log_file).unwrap();
    let plugged = log
        .lines()
        .find(|l| l.contains("Plugged display into PORT_D of domain 2"))
        .unwrap();
    assert!(plugged.contains(":INFO: "));
    assert!(plugged.contains("card0-HDMI-A-1"));
    assert!(plugged.contains(&format!("[{}]", std::process::id())));
    assert!(log
        .lines()
        .any(|l| l.contains(":ERROR: error writing vm2/PORT_B/connection")));
}
