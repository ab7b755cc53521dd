use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::{debug, info, warn};

use geodraw::canvas::{CanvasView, render_document};
use geodraw::config::{Config, Provider};
use geodraw::logging;
use geodraw::output::write_output;
use geodraw::repl::{self, HELP, Input};
use geodraw::service::{HttpInterpreter, Interpreter, MockInterpreter, ServiceError};
use geodraw::session::{Command, Event, RequestId, Session};
use geodraw::shape::Drawing;

/// Render LLM-generated 2D shape drawings to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "geodraw")]
#[command(version)]
#[command(about = "Render 2D shape drawings with dimension overlays and undo/redo history", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one drawing JSON file
    Render(RenderArgs),
    /// Interactive session against the interpretation service
    Session(SessionArgs),
    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct SurfaceArgs {
    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Config file (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input drawing JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Args, Debug)]
struct SessionArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Base URL of the interpretation service
    #[arg(long, value_name = "URL")]
    backend: Option<String>,

    /// Use the offline mock interpreter
    #[arg(long, conflicts_with = "backend")]
    mock: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Session(args) => run_session(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "geodraw", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(surface: &SurfaceArgs) -> Result<Config, String> {
    let config = match surface.config {
        Some(ref path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };
    let mut config = config
        .with_env(|key| std::env::var(key).ok())
        .map_err(|e| e.to_string())?;

    if let Some(width) = surface.width {
        config.canvas.width = width;
    }
    if let Some(height) = surface.height {
        config.canvas.height = height;
    }
    Ok(config)
}

fn is_stdin(path: &Path) -> bool {
    path.to_str() == Some("-")
}

fn render(args: RenderArgs) -> Result<(), String> {
    let config = load_config(&args.surface)?;
    let viewport = config.viewport().map_err(|e| e.to_string())?;

    let json = if is_stdin(&args.input) {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let drawing = Drawing::from_json(&json).map_err(|e| e.to_string())?;
    let svg = render_document(
        CanvasView::Drawing(&drawing),
        viewport,
        &config.canvas.background,
    );

    let format = write_output(&args.surface.output, &svg, args.surface.png_scale)
        .map_err(|e| e.to_string())?;
    eprintln!("{} saved to: {}", format, args.surface.output.display());
    Ok(())
}

enum Message {
    Line(String),
    InputClosed,
    Completed {
        id: RequestId,
        result: Result<Drawing, ServiceError>,
    },
}

struct Runtime {
    config: Config,
    output: PathBuf,
    png_scale: f32,
    interpreter: Arc<dyn Interpreter>,
    sender: Sender<Message>,
}

fn run_session(args: SessionArgs) -> Result<(), String> {
    let mut config = load_config(&args.surface)?;
    if let Some(url) = args.backend {
        config.service.base_url = url;
        config.service.provider = Provider::Http;
    }
    if args.mock {
        config.service.provider = Provider::Mock;
    }
    // Fail early on a bad canvas rather than at the first redraw.
    config.viewport().map_err(|e| e.to_string())?;

    let interpreter: Arc<dyn Interpreter> = match config.service.provider {
        Provider::Mock => {
            info!("using offline mock interpreter");
            Arc::new(MockInterpreter)
        }
        Provider::Http => {
            let client = HttpInterpreter::new(&config.service.base_url, config.timeout());
            info!(endpoint = client.endpoint(), "using HTTP interpreter");
            Arc::new(client)
        }
    };

    let (sender, receiver) = mpsc::channel();
    spawn_stdin_reader(sender.clone());

    let runtime = Runtime {
        config,
        output: args.surface.output,
        png_scale: args.surface.png_scale,
        interpreter,
        sender,
    };

    let mut session = Session::new();
    redraw(&runtime, &session);
    println!("{}", HELP);
    println!("{}", repl::status_line(&session));

    let mut input_open = true;
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Line(line) => match repl::parse_line(&line) {
                Ok(Input::Event(event)) => session = dispatch(&runtime, session, event),
                Ok(Input::ShowJson) => println!("{}", session.drawing_json()),
                Ok(Input::ShowHistory) => println!("{}", repl::render_query_log(&session)),
                Ok(Input::Help) => println!("{}", HELP),
                Ok(Input::Quit) => break,
                Ok(Input::Nothing) => {}
                Err(message) => println!("{}", message),
            },
            Message::InputClosed => {
                if !session.is_loading() {
                    break;
                }
                debug!("input closed, waiting for the pending request");
                input_open = false;
            }
            Message::Completed { id, result } => {
                session = dispatch(&runtime, session, Event::Completed { id, result });
                if !input_open && !session.is_loading() {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn spawn_stdin_reader(sender: Sender<Message>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(Message::Line(line)).is_err() {
                return;
            }
        }
        let _ = sender.send(Message::InputClosed);
    });
}

fn dispatch(runtime: &Runtime, session: Session, event: Event) -> Session {
    let is_submit = matches!(event, Event::Submit);
    let previous_error = session.error().map(str::to_string);

    let (session, command) = session.update(event);

    if let Some(Command::Interpret { id, instruction }) = command {
        let interpreter = Arc::clone(&runtime.interpreter);
        let sender = runtime.sender.clone();
        thread::spawn(move || {
            let result = interpreter.interpret(&instruction);
            let _ = sender.send(Message::Completed { id, result });
        });
    }

    if let Some(error) = session.error() {
        if is_submit || previous_error.as_deref() != Some(error) {
            println!("Error: {}", error);
        }
    }

    redraw(runtime, &session);
    println!("{}", repl::status_line(&session));
    session
}

/// Rewrite the surface file from scratch for the current session state.
fn redraw(runtime: &Runtime, session: &Session) {
    let viewport = match runtime.config.viewport() {
        Ok(viewport) => viewport,
        Err(e) => {
            warn!(error = %e, "cannot redraw");
            return;
        }
    };
    let svg = render_document(
        session.canvas_view(),
        viewport,
        &runtime.config.canvas.background,
    );
    if let Err(e) = write_output(&runtime.output, &svg, runtime.png_scale) {
        println!("Error: {}", e);
    }
}
