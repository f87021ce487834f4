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

//! In-memory control tree which behaves like the vgt module for the
//! attributes this crate touches.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{Log, Metadata, Record};

use crate::control::{
    port_attr, vm_dir, ControlChannel, CONNECTION_ATTR, CREATE_INSTANCE_ATTR, EDID_ATTR,
    FOREGROUND_VM_ATTR, PORT_OVERRIDE_ATTR,
};
use crate::port::GtPort;

#[derive(Default)]
struct MemTree {
    dirs: HashSet<PathBuf>,
    attrs: HashMap<PathBuf, Vec<u8>>,
    /// Attributes which accept writes but keep their value.
    frozen: HashSet<PathBuf>,
    writes: Vec<(PathBuf, Vec<u8>)>,
}

impl MemTree {
    fn add_vm(&mut self, domid: u32) {
        self.dirs.insert(vm_dir(domid));
        for port in GtPort::ALL {
            self.dirs.insert(vm_dir(domid).join(port.control_name()));
            self.attrs.insert(port_attr(domid, port, PORT_OVERRIDE_ATTR), Vec::new());
            self.attrs.insert(port_attr(domid, port, EDID_ATTR), Vec::new());
            self.attrs.insert(
                port_attr(domid, port, CONNECTION_ATTR),
                b"disconnected\n".to_vec(),
            );
        }
    }

    fn remove_vm(&mut self, domid: u32) {
        let dir = vm_dir(domid);
        self.dirs.retain(|d| !d.starts_with(&dir));
        self.attrs.retain(|a, _| !a.starts_with(&dir));
    }

    fn store(&mut self, attr: &Path, value: &[u8]) {
        let text = String::from_utf8_lossy(value);
        let stored = if attr.ends_with(CONNECTION_ATTR) {
            match text.trim() {
                "connect" => b"connected\n".to_vec(),
                _ => b"disconnected\n".to_vec(),
            }
        } else {
            value.to_vec()
        };

        if attr == Path::new(CREATE_INSTANCE_ATTR) {
            let domid = text.split(',').next().unwrap_or("").trim();
            match domid.parse::<i64>() {
                Ok(id) if id < 0 => self.remove_vm(id.unsigned_abs() as u32),
                Ok(id) => self.add_vm(id as u32),
                Err(_) => {}
            }
        }
        self.attrs.insert(attr.to_path_buf(), stored);
    }
}

#[derive(Default, Clone)]
pub struct MemControl {
    tree: Arc<Mutex<MemTree>>,
}

impl MemControl {
    /// Tree with the global control attributes and no domain.
    pub fn new() -> Self {
        let control = MemControl::default();
        {
            let mut tree = control.tree.lock().unwrap();
            tree.dirs.insert(PathBuf::from("control"));
            tree.attrs.insert(PathBuf::from(FOREGROUND_VM_ATTR), b"0\n".to_vec());
            tree.attrs.insert(PathBuf::from(CREATE_INSTANCE_ATTR), Vec::new());
        }
        control
    }

    pub fn with_vm(domid: u32) -> Self {
        let control = MemControl::new();
        control.add_vm(domid);
        control
    }

    pub fn add_vm(&self, domid: u32) {
        self.tree.lock().unwrap().add_vm(domid);
    }

    pub fn remove_attr(&self, attr: &Path) {
        self.tree.lock().unwrap().attrs.remove(attr);
    }

    pub fn freeze_attr(&self, attr: &Path) {
        self.tree.lock().unwrap().frozen.insert(attr.to_path_buf());
    }

    pub fn set_attr(&self, attr: &Path, value: &[u8]) {
        self.tree
            .lock()
            .unwrap()
            .attrs
            .insert(attr.to_path_buf(), value.to_vec());
    }

    pub fn attr(&self, attr: &Path) -> Option<Vec<u8>> {
        self.tree.lock().unwrap().attrs.get(attr).cloned()
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.tree.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.tree.lock().unwrap().writes.clear();
    }
}

impl ControlChannel for MemControl {
    fn write(&self, attr: &Path, value: &[u8]) -> io::Result<()> {
        let mut tree = self.tree.lock().unwrap();
        if !tree.attrs.contains_key(attr) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        tree.writes.push((attr.to_path_buf(), value.to_vec()));
        if !tree.frozen.contains(attr) {
            tree.store(attr, value);
        }
        Ok(())
    }

    fn read(&self, attr: &Path) -> io::Result<String> {
        let tree = self.tree.lock().unwrap();
        match tree.attrs.get(attr) {
            Some(value) => Ok(String::from_utf8_lossy(value).into_owned()),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.tree.lock().unwrap().dirs.contains(path)
    }
}

/// Logger keeping every record it receives.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<(log::Level, String)>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<(log::Level, String)> {
        self.records.lock().unwrap().clone()
    }
}

impl Log for RecordingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
