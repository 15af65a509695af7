// CLI application
use clap::{Args, Parser};
use rsbench_cli::commands::{build, evaluate_recovery, generate, recover, report, run};
use rsbench_cli::settings::BenchSettings;
use rsbench_cli::timing::timed;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rsbench")]
#[command(about = "Measures quality and speed of struct recovery")]
#[command(version)]
struct Cli {
    /// JSON settings file (flags override its values)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print evaluations as JSON instead of `recovered,garbage`
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Generate the test source and its ground truth
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Compile the generated source
    Build {
        #[command(flatten)]
        paths: PathArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },
    /// Run the recovery tool on the compiled binary
    Recover {
        #[command(flatten)]
        paths: PathArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },
    /// Score a recovered model against the ground truth
    Evaluate {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Full pipeline: generate, build, recover and evaluate
    Run {
        #[command(flatten)]
        generator: GeneratorArgs,
        #[command(flatten)]
        paths: PathArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },
}

#[derive(Args)]
struct GeneratorArgs {
    /// Amount of structs to generate
    #[arg(short = 's', long = "strucs")]
    struct_count: Option<usize>,

    /// Amount of functions to generate
    #[arg(short = 'f', long = "funcs")]
    func_count: Option<usize>,

    /// Seed for the generator
    #[arg(long)]
    seed: Option<u64>,

    /// Header to use instead of the built-in boilerplate
    #[arg(long)]
    preamble: Option<PathBuf>,
}

impl GeneratorArgs {
    fn apply(self, settings: &mut BenchSettings) {
        if let Some(count) = self.struct_count {
            settings.struct_count = count;
        }
        if let Some(count) = self.func_count {
            settings.func_count = count;
        }
        if let Some(seed) = self.seed {
            settings.generator.seed = seed;
        }
        if self.preamble.is_some() {
            settings.preamble = self.preamble;
        }
    }
}

#[derive(Args)]
struct PathArgs {
    /// Generation output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compiled benchmark binary
    #[arg(short, long)]
    binary: Option<PathBuf>,

    /// Output file for the recovery tool
    #[arg(short = 'R', long = "recover")]
    recovered: Option<PathBuf>,
}

impl PathArgs {
    fn apply(self, settings: &mut BenchSettings) {
        if let Some(path) = self.output {
            settings.source = path;
        }
        if let Some(path) = self.binary {
            settings.binary = path;
        }
        if let Some(path) = self.recovered {
            settings.recovered = path;
        }
    }
}

#[derive(Args)]
struct ToolArgs {
    /// Path to the recovery tool
    #[arg(short, long)]
    restruc: Option<PathBuf>,

    /// C++ compiler to build the test source with
    #[arg(long)]
    compiler: Option<String>,
}

impl ToolArgs {
    fn apply(self, settings: &mut BenchSettings) {
        if let Some(path) = self.restruc {
            settings.recovery_tool = path;
        }
        if let Some(compiler) = self.compiler {
            settings.compiler.program = compiler;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = BenchSettings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { generator, paths } => {
            generator.apply(&mut settings);
            paths.apply(&mut settings);
            timed("Generating test data", || generate(&settings))?;
        }
        Commands::Build { paths, tools } => {
            paths.apply(&mut settings);
            tools.apply(&mut settings);
            timed("Building rs-bench", || build(&settings))?;
        }
        Commands::Recover { paths, tools } => {
            paths.apply(&mut settings);
            tools.apply(&mut settings);
            timed("Recovering structs", || recover(&settings))?;
        }
        Commands::Evaluate { paths } => {
            paths.apply(&mut settings);
            let evaluation = timed("Evaluating", || evaluate_recovery(&settings, None))?;
            report(&evaluation, cli.json)?;
        }
        Commands::Run {
            generator,
            paths,
            tools,
        } => {
            generator.apply(&mut settings);
            paths.apply(&mut settings);
            tools.apply(&mut settings);
            let evaluation = run(&settings)?;
            report(&evaluation, cli.json)?;
        }
    }

    Ok(())
}
