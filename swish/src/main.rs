use clap::Parser;
use std::io::IsTerminal;
use swish::{terminal, Shell, ShellError};
use swish_config::{LogFormat, LoggingConfig, ShellConfig, SwishConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod completer;

/// swish - Interactive shell with POSIX job control
#[derive(Parser, Debug)]
#[command(name = "swish", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(long = "config")]
    config: Option<String>,

    /// Execute command and exit
    #[arg(short = 'c')]
    command: Option<String>,

    /// Script file to execute, one command per line
    script: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => swish_config::load_from_file(path)?,
        None => swish_config::load().unwrap_or_else(|e| {
            eprintln!("swish: {}; using default configuration", e);
            SwishConfig::default()
        }),
    };
    init_logging(&config.logging);
    tracing::debug!(
        file = ?args.config,
        prompt = %config.shell.prompt,
        history = config.shell.history.enabled,
        "configuration loaded"
    );

    if std::io::stdin().is_terminal() {
        terminal::ignore_terminal_signals()?;
    }
    let mut shell = Shell::new();

    if let Some(command) = args.command {
        match shell.execute(&command) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                if !matches!(e, ShellError::Exit(_)) {
                    eprintln!("swish: {}", e);
                }
                std::process::exit(e.exit_code());
            }
        }
    } else if let Some(script_path) = args.script {
        match std::fs::read_to_string(&script_path) {
            Ok(content) => std::process::exit(run_script(&mut shell, &content)),
            Err(e) => {
                eprintln!("swish: cannot read '{}': {}", script_path, e);
                std::process::exit(1);
            }
        }
    } else {
        let code = run_repl(&mut shell, &config.shell)?;
        std::process::exit(code);
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(config.directives());

    // stdout belongs to the shell's commands
    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

/// Outcome of one line for the driving loop.
enum Step {
    Continue,
    Stop(i32),
}

fn report(shell: &mut Shell, result: Result<i32, ShellError>) -> Step {
    match result {
        Ok(_) => Step::Continue,
        Err(ShellError::Exit(code)) => Step::Stop(code),
        Err(e) => {
            eprintln!("swish: {}", e);
            if e.is_fatal() {
                return Step::Stop(e.exit_code());
            }
            shell.last_exit_code = 1;
            Step::Continue
        }
    }
}

fn run_script(shell: &mut Shell, content: &str) -> i32 {
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let result = shell.execute(line);
        if let Step::Stop(code) = report(shell, result) {
            return code;
        }
    }
    0
}

fn run_repl(
    shell: &mut Shell,
    shell_config: &ShellConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    use completer::SwishHelper;
    use rustyline::error::ReadlineError;
    use rustyline::{CompletionType, Config, Editor};

    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .max_history_size(shell_config.history.max_entries)?
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .build();

    let mut rl = Editor::with_config(rl_config)?;
    rl.set_helper(Some(SwishHelper::new()));

    let history_path = shell_config
        .history
        .enabled
        .then(|| shell_config.history.path());
    if let Some(path) = &history_path {
        let _ = rl.load_history(path);
    }

    let mut exit_code = 0;

    loop {
        match rl.readline(&shell_config.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                if history_path.is_some() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                let result = shell.execute(&line);
                if let Step::Stop(code) = report(shell, result) {
                    exit_code = code;
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("swish: {}", err);
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        if let Err(e) = rl.save_history(path) {
            tracing::debug!(path = %path.display(), error = %e, "could not save history");
        }
    }

    Ok(exit_code)
}
