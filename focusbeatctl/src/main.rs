use anyhow::Result;
use clap::{Parser, Subcommand};
use focusbeat_ipc::{request, Command, Response, SessionStatus, SOCKET_PATH};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "focusbeatctl")]
#[command(about = "Control the FocusBeat timer", long_about = None)]
struct Cli {
    /// Control socket of the running focusbeat
    #[arg(long, global = true, default_value = SOCKET_PATH)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the timer, or pause it if it is running
    Toggle,
    /// Start the timer
    Start,
    /// Pause the timer
    Pause,
    /// Reset to a fresh focus session
    Reset,
    /// End the current session and move to the next one
    Skip,
    /// Get timer status
    Status,
    /// Change session lengths (whole minutes, 1-60)
    Set {
        #[arg(short, long)]
        focus: Option<u32>,
        #[arg(short, long = "break")]
        rest: Option<u32>,
    },
    /// Restore the default 25/5 minute lengths
    Defaults,
    /// Send a text message to focusbeat
    Send { text: String },
}

fn to_command(command: Commands) -> Command {
    match command {
        Commands::Toggle => Command::Toggle,
        Commands::Start => Command::Start,
        Commands::Pause => Command::Pause,
        Commands::Reset => Command::Reset,
        Commands::Skip => Command::Skip,
        Commands::Status => Command::Status,
        Commands::Set { focus, rest } => Command::SetDurations {
            focus_minutes: focus,
            break_minutes: rest,
        },
        Commands::Defaults => Command::RestoreDefaults,
        Commands::Send { text } => Command::Relay { text },
    }
}

fn render_status(status: &SessionStatus) -> String {
    let secs = status.remaining_secs;
    let mut out = format!(
        "Mode: {}\nState: {}\nRemaining: {:02}:{:02}\nLengths: {}m focus / {}m break",
        status.mode,
        if status.running { "running" } else { "paused" },
        secs / 60,
        secs % 60,
        status.focus_secs / 60,
        status.break_secs / 60,
    );
    if let Some(msg) = &status.companion_message {
        out.push_str(&format!("\nCompanion: {}", msg));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Send command and get response
    let response = request(&cli.socket, &to_command(cli.command)).await?;

    // Handle response
    match response {
        Response::Ok => println!("OK"),
        Response::Status(status) => println!("{}", render_status(&status)),
        Response::Error(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
