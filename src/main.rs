use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use xtree::models::ProjectedNode;
use xtree::services::config::ensure_settings_file;
use xtree::services::{ConfigService, SyncController};

mod logging;

const USAGE: &str = "usage: xtree <file> [--json | --rows]\n       xtree --init-settings";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Output {
    Tree,
    Json,
    Rows,
}

enum Command {
    Show { path: String, output: Output },
    InitSettings,
}

fn parse_args(args: &[String]) -> Option<Command> {
    let mut path = None;
    let mut output = Output::Tree;
    for arg in args {
        match arg.as_str() {
            "--json" => output = Output::Json,
            "--rows" => output = Output::Rows,
            "--init-settings" => return Some(Command::InitSettings),
            flag if flag.starts_with("--") => return None,
            p if path.is_none() => path = Some(p.to_string()),
            _ => return None,
        }
    }
    path.map(|path| Command::Show { path, output })
}

fn main() -> ExitCode {
    let logging = logging::init();
    if let Some(guard) = &logging {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging ready");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::InitSettings => {
            let path = ensure_settings_file().map_err(|e| e.to_string())?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Show { path, output } => {
            let config = ConfigService::load();
            let mut controller = SyncController::local(config.editor().clone());
            controller.load(&path).map_err(|e| e.to_string())?;

            let Some(tree) = controller.tree() else {
                return Err(format!("no tree available for {path}"));
            };
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_output(&tree, output, &mut out).map_err(|e| e.to_string())
        }
    }
}

fn write_output(tree: &ProjectedNode, output: Output, out: &mut impl Write) -> io::Result<()> {
    match output {
        Output::Json => {
            serde_json::to_writer_pretty(&mut *out, tree)?;
            writeln!(out)
        }
        Output::Rows => {
            serde_json::to_writer_pretty(&mut *out, &tree.flatten())?;
            writeln!(out)
        }
        Output::Tree => {
            for row in tree.flatten() {
                write!(out, "{}{}", "  ".repeat(row.depth as usize), row.label)?;
                if !row.attribute_summary.is_empty() {
                    write!(out, " [{}]", row.attribute_summary)?;
                }
                if !row.inline_text.is_empty() {
                    write!(out, ": {:?}", row.inline_text)?;
                }
                writeln!(out)?;
            }
            Ok(())
        }
    }
}
