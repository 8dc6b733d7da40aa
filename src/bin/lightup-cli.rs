use clap::{Args, Parser, Subcommand};
use lightup_rs::{new_description, new_state, solver, GameParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        MainCommand::Generate(args) => execute_generate(args),
        MainCommand::Solve(args) => execute_solve(args),
        MainCommand::Show(args) => execute_show(args),
    }
}

fn execute_generate(args: GenerateArgs) -> Result<(), String> {
    let params = GameParams::decode(&args.params)?;
    params.validate(true)?;

    let (desc, used_params) = match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            new_description(&params, &mut rng)
        }
        None => lightup_rs::generate_puzzle(&params),
    };

    println!("{}", used_params.encode(true));
    println!("{desc}");
    if args.pretty {
        let state = new_state(&used_params, &desc)?;
        print!("{}", state.text_format());
    }
    Ok(())
}

fn execute_solve(args: PuzzleArgs) -> Result<(), String> {
    let params = GameParams::decode(&args.params)?;
    params.validate(false)?;

    let mut state = new_state(&params, &args.descriptor)?;
    let mut depth = 0;
    if solver::solve(&mut state, true, false, &mut depth) <= 0 {
        return Err("Puzzle is not self-consistent.".to_string());
    }
    print!("{}", state.text_format());
    Ok(())
}

fn execute_show(args: PuzzleArgs) -> Result<(), String> {
    let params = GameParams::decode(&args.params)?;
    params.validate(false)?;

    let state = new_state(&params, &args.descriptor)?;
    print!("{}", state.text_format());
    Ok(())
}

#[derive(Parser)]
#[command(name = "lightup-cli", version, about = "Light Up puzzle tools")]
struct Cli {
    #[command(subcommand)]
    command: MainCommand,
}

#[derive(Subcommand)]
enum MainCommand {
    /// Generate a puzzle with a unique solution
    Generate(GenerateArgs),

    /// Solve a puzzle and print the solved grid
    Solve(PuzzleArgs),

    /// Print a puzzle grid without solving it
    Show(PuzzleArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Parameter string, e.g. "10x10b20s2r" (r requests a hard puzzle).
    #[arg()]
    params: String,

    /// Seed for deterministic generation (default: OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Also print the puzzle as a character grid
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct PuzzleArgs {
    /// Parameter string, e.g. "7x7"; only the dimensions are used.
    #[arg()]
    params: String,

    /// Puzzle descriptor as emitted by `generate`
    #[arg()]
    descriptor: String,
}
