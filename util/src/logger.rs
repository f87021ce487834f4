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

use std::fs::{File, OpenOptions};
use std::io::{stderr, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
pub use log::{Level, LevelFilter, Log, Metadata, Record};
use nix::unistd::{getpid, gettid};

const LOG_LEVEL_ENV: &str = "IGVT_LOG_LEVEL";

fn formatted_time(seconds: libc::time_t) -> [i32; 6] {
    // SAFETY: an all-zero value is valid for libc::tm.
    let mut ti: libc::tm = unsafe { std::mem::zeroed() };
    // SAFETY: seconds and ti are both local variables and valid.
    unsafe {
        libc::localtime_r(&seconds, &mut ti);
    }
    [
        ti.tm_year + 1900,
        ti.tm_mon + 1,
        ti.tm_mday,
        ti.tm_hour,
        ti.tm_min,
        ti.tm_sec,
    ]
}

fn formatted_now() -> String {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a local variable and valid.
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
    }
    let t = formatted_time(ts.tv_sec);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}",
        t[0], t[1], t[2], t[3], t[4], t[5], ts.tv_nsec
    )
}

/// Format like "%year-%mon-%dayT%hour:%min:%sec.%nsec: [pid][tid][file: line]:LEVEL: msg"
struct GvtLogger {
    handler: Mutex<Box<dyn Write + Send>>,
    level: Level,
}

impl Log for GvtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{:<5}: [{}][{}][{}: {}]:{}: {}\n",
            formatted_now(),
            getpid(),
            gettid(),
            record.file().unwrap_or(""),
            record.line().unwrap_or(0),
            record.level(),
            record.args()
        );

        let mut handler = match self.handler.lock() {
            Ok(h) => h,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = handler.write_all(msg.as_bytes()) {
            eprintln!("Failed to log message {:?}", e);
        }
    }

    fn flush(&self) {
        if let Ok(mut handler) = self.handler.lock() {
            let _ = handler.flush();
        }
    }
}

fn level_from_env() -> Level {
    match std::env::var(LOG_LEVEL_ENV) {
        Ok(l) => match l.to_lowercase().as_str() {
            "error" => Level::Error,
            "warn" => Level::Warn,
            "info" => Level::Info,
            "debug" => Level::Debug,
            "trace" => Level::Trace,
            _ => Level::Info,
        },
        _ => Level::Info,
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(false)
        .append(true)
        .create(true)
        .mode(0o640)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Install the process wide logger.
///
/// Records go to `path` when given, to stderr otherwise. The level is taken
/// from the `IGVT_LOG_LEVEL` environment variable and defaults to info.
pub fn init_log(path: Option<&Path>) -> Result<()> {
    let handler: Box<dyn Write + Send> = match path {
        Some(p) => Box::new(open_log_file(p)?),
        None => Box::new(stderr()),
    };
    let logger = GvtLogger {
        handler: Mutex::new(handler),
        level: level_from_env(),
    };

    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(LevelFilter::Trace))
        .with_context(|| "Logger has been already set")
}

/// Hands records to whichever logger is installed in the `log` facade.
///
/// This is the default sink for components that take an injected `Log`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogger;

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Emit a record into an explicit logger instead of the global one.
///
/// ```rust
/// use util::log_to;
/// use util::logger::{FacadeLogger, Level, Log};
///
/// let logger = FacadeLogger;
/// log_to!(logger, Level::Info, "port {} plugged", 2);
/// ```
#[macro_export]
macro_rules! log_to {
    ($logger:expr, $lvl:expr, $($arg:tt)+) => {
        $logger.log(
            &$crate::logger::Record::builder()
                .args(format_args!($($arg)+))
                .level($lvl)
                .target(module_path!())
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .line(Some(line!()))
                .build(),
        )
    };
}
