mod app;
mod chart;
mod cli;
mod estimator;
mod queue;
mod sample;
mod transport;
mod tui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::InitError;
use crate::cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let result: Result<()> = app::run(cli);

    if let Err(err) = result {
        // Map to stable exit codes
        let code = exit_code_for_error(&err);
        eprintln!("error: {err:?}");
        std::process::exit(code);
    }
}

// 0 on normal close; negative on initialization failure:
// -1: terminal surface or other, -2: HTTP client, -3: output file
pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(init) = cause.downcast_ref::<InitError>() {
            return match init {
                InitError::Terminal(_) => -1,
                InitError::Transport(_) => -2,
                InitError::Output { .. } => -3,
            };
        }
        if cause.is::<std::io::Error>() {
            return -1;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_terminal_error() {
        let err = anyhow::Error::from(InitError::Terminal(std::io::Error::from(
            std::io::ErrorKind::Unsupported,
        )));
        assert_eq!(exit_code_for_error(&err), -1);
    }

    #[test]
    fn exit_code_output_file_error() {
        let err = anyhow::Error::from(InitError::Output {
            path: "/tmp/out.bin".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(exit_code_for_error(&err), -3);
    }

    #[test]
    fn exit_code_bare_io_error() {
        let err = anyhow::Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(exit_code_for_error(&err), -1);
    }

    #[test]
    fn exit_code_other() {
        let err = anyhow::anyhow!("other");
        assert_eq!(exit_code_for_error(&err), -1);
    }
}
