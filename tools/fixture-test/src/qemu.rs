//! Command-line generation for launching the fixture.
//!
//! Emulated targets run as `qemu-<arch> [-L <prefix>] [-g <port>] <binary>`;
//! native targets run the binary directly.

use std::path::Path;

use crate::manifest::TargetSpec;

/// Build the full launch command for `binary` on `target`.
///
/// The first element is the program to execute, the rest are its
/// arguments. The fixture binary is always the last element.
pub fn build_run_command(target: &TargetSpec, binary: &Path, gdb_port: Option<u16>) -> Vec<String> {
    let binary = binary.display().to_string();

    let Some(qemu) = target.qemu_binary() else {
        return vec![binary];
    };

    let mut args = vec![qemu];

    // Guest library prefix
    if let Some(ref prefix) = target.ld_prefix {
        args.extend(["-L".to_string(), prefix.display().to_string()]);
    }

    // Wait for a debugger on this port before the first instruction
    if let Some(port) = gdb_port {
        args.extend(["-g".to_string(), port.to_string()]);
    }

    args.push(binary);
    args
}
