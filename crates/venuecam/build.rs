use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// The clap tree is clap-only, so the build script can compile it alone.
#[path = "src/cli.rs"]
mod cli;

/// Man pages land in `$OUT_DIR/man`: `venuecam.1`, then one page per
/// visible subcommand path (`venuecam-cameras-set.1`, `venuecam-zone-validate.1`).
fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        panic!("cargo did not set OUT_DIR for the venuecam build script");
    };
    let man_dir = out_dir.join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        panic!("cannot create {}: {e}", man_dir.display());
    }

    let mut pending = vec![cli::Cli::command()];
    while let Some(cmd) = pending.pop() {
        let page = cmd.get_name().to_owned();
        write_page(&cmd, &man_dir.join(format!("{page}.1")));

        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| sub.clone().name(format!("{page}-{}", sub.get_name()))),
        );
    }
}

fn write_page(cmd: &clap::Command, path: &Path) {
    let mut page = Vec::new();
    if let Err(e) = clap_mangen::Man::new(cmd.clone()).render(&mut page) {
        panic!("man page for `{}` did not render: {e}", cmd.get_name());
    }
    if let Err(e) = fs::write(path, page) {
        panic!("cannot write {}: {e}", path.display());
    }
}
