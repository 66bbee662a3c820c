use clap::{Parser, Subcommand};

mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a round in the terminal
    Play(#[clap(flatten)] play::PlayArg),
}

pub(crate) fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(play::PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg),
    }
}
