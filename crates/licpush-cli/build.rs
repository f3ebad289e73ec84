use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs is self-contained over clap + clap_complete, so the build script
// can include it directly and render docs from the single source of truth.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo"));

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");
    render_man_recursive(&cli::Cli::command(), &man_dir);

    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir).expect("failed to create completions output directory");
    render_completions(&completions_dir);
}

/// Render a man page for `cmd` and each visible subcommand beneath it.
///
/// Subcommand pages take hyphenated names (`licpush-config-set.1`), the
/// convention `man` expects for finding them.
fn render_man_recursive(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
    let path = dir.join(format!("{name}.1"));
    fs::write(&path, page).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        render_man_recursive(&sub, dir);
    }
}

/// Pre-render completion scripts for packaging; `licpush completions`
/// remains the user-facing way to get them.
fn render_completions(dir: &Path) {
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let mut cmd = cli::Cli::command();
        clap_complete::generate_to(shell, &mut cmd, "licpush", dir)
            .unwrap_or_else(|e| panic!("failed to render {shell} completions: {e}"));
    }
}
