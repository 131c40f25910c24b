//! Kernel module readiness protocol.
//!
//! The w1 device directory only exists once the `w1-gpio` and `w1-therm`
//! kernel modules are loaded, and hardware enumeration may lag module load.
//! [`ensure_interface`] makes the backing filesystem tree available: it
//! returns immediately when the directory is already there, otherwise it
//! issues two advisory `modprobe` calls and polls for the directory within a
//! bounded retry budget.

use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{W1Error, W1Result};

/// Kernel modules backing the w1 sysfs interface.
const KERNEL_MODULES: [&str; 2] = ["w1-gpio", "w1-therm"];

/// Ensures the w1 device directory exists.
///
/// Idempotent and cheap once the interface is up. When
/// `settings.auto_load_modules` is disabled (mocked environments), no
/// external command is run and no poll happens; a missing directory is
/// reported as [`W1Error::KernelModuleLoad`] right away.
///
/// Exhausting the retry budget is fatal: callers treat this as a hard
/// dependency failure and do not retry it further up the stack.
pub fn ensure_interface(settings: &Settings) -> W1Result<()> {
    if settings.base_directory.is_dir() {
        return Ok(());
    }

    if !settings.auto_load_modules {
        return Err(W1Error::KernelModuleLoad);
    }

    load_modules();

    for attempt in 1..=settings.retry.attempts {
        if settings.base_directory.is_dir() {
            debug!(attempt, "w1 device interface appeared");
            return Ok(());
        }
        thread::sleep(settings.retry.delay);
    }

    warn!(
        base_directory = %settings.base_directory.display(),
        "w1 device interface did not appear after module load"
    );
    Err(W1Error::KernelModuleLoad)
}

/// Issues the advisory module-load commands. Exit codes are ignored; whether
/// the interface came up is decided by the directory poll alone.
fn load_modules() {
    for module in KERNEL_MODULES {
        let result = Command::new("modprobe")
            .arg(module)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match result {
            Ok(status) => debug!(module, %status, "modprobe finished"),
            Err(err) => debug!(module, %err, "modprobe could not be run"),
        }
    }
}
