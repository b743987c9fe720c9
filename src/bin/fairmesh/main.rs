//! fairmesh CLI - inspect and fair triangle meshes.
//!
//! Usage: fairmesh [--log-level LEVEL] <COMMAND> <INPUT> [OUTPUT]
//!
//! Run `fairmesh --help` for available commands.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use fairmesh::algo::boundary::classify;
use fairmesh::algo::fairing::{LocalFairingOptions, LocalFairingOutcome};
use fairmesh::algo::Progress;
use fairmesh::io;
use fairmesh::session::{FairingEvent, FairingRequest, Session};

#[derive(Parser)]
#[command(name = "fairmesh")]
#[command(author, version, about = "Half-edge mesh fairing CLI", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Check half-edge invariants
    Check {
        /// Input mesh file
        input: PathBuf,
    },

    /// Fair the interior of a mesh with its boundary fixed
    Fair {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Fairing method
        #[arg(short, long, value_enum, default_value = "global")]
        method: FairMethod,

        /// Number of iterations (local only)
        #[arg(short, long, default_value = "3000")]
        iterations: usize,

        /// Damping factor per iteration, 0.0 to 1.0 (local only)
        #[arg(short, long, default_value = "0.3")]
        damping: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FairMethod {
    /// Iterative umbrella smoothing
    Local,
    /// Direct sparse Laplace solve
    Global,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Check { input } => cmd_check(&input)?,
        Commands::Fair {
            input,
            output,
            method,
            iterations,
            damping,
            sequential,
        } => cmd_fair(&input, &output, method, iterations, damping, sequential)?,
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            raw_percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    let summary = mesh.summary();

    println!("File: {}", input.display());
    println!("Vertices: {}", summary.vertices);
    println!("Edges: {}", summary.edges);
    println!("Faces: {}", summary.faces);
    println!("Half-edges: {}", mesh.halfedge_count());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    if summary.boundary_vertices == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary, {} interior vertices)",
            summary.boundary_vertices,
            summary.vertices - summary.boundary_vertices
        );
    }

    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    mesh.validate()?;

    let boundary = classify(&mesh);
    println!("{}: valid half-edge mesh", input.display());
    if mesh.is_manifold_closed() {
        println!("Closed surface: global fairing is not applicable");
    } else if boundary.interior_count() == 0 {
        println!("No interior vertices: fairing has nothing to move");
    } else {
        println!(
            "Fairable: {} interior vertices inside {} boundary vertices",
            boundary.interior_count(),
            boundary.boundary_count()
        );
    }

    Ok(())
}

/// Local fairing options from the command line. Out-of-range values are
/// rejected rather than clamped.
fn local_options(
    iterations: usize,
    damping: f64,
    sequential: bool,
) -> fairmesh::error::Result<LocalFairingOptions> {
    let options = LocalFairingOptions {
        iterations,
        damping,
        parallel: !sequential,
    };
    options.validate()?;
    Ok(options)
}

fn cmd_fair(
    input: &Path,
    output: &Path,
    method: FairMethod,
    iterations: usize,
    damping: f64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = local_options(iterations, damping, sequential)?;

    let mut session = Session::new()
        .with_local_options(options.clone())
        .with_progress(create_progress());
    let mesh = session.load(input)?;
    println!("Loaded: {} vertices, {} faces", mesh.vertex_count(), mesh.face_count());

    let request = match method {
        FairMethod::Local => {
            let mode = if sequential { "sequential" } else { "parallel" };
            println!(
                "Applying local fairing ({} iterations, damping={}, {})...",
                options.iterations, options.damping, mode
            );
            FairingRequest::Local
        }
        FairMethod::Global => {
            println!("Applying global fairing...");
            FairingRequest::Global
        }
    };
    session.request_fairing(request);

    let start = Instant::now();
    for event in session.update() {
        match event {
            FairingEvent::Local(LocalFairingOutcome::Completed { moved, .. }) => {
                println!("Moved {} interior vertices", moved);
            }
            FairingEvent::Local(LocalFairingOutcome::NoInteriorVertices) => {
                println!("Every vertex is on the boundary; nothing to fair");
            }
            FairingEvent::Local(LocalFairingOutcome::ClosedSurface) => {
                println!("Surface is closed; local fairing needs a boundary");
            }
            FairingEvent::Global(report) => {
                println!(
                    "Solved {} interior vertices ({} non-zeros, {}), max displacement {:.6}",
                    report.interior, report.nonzeros, report.factorization, report.max_displacement
                );
            }
            FairingEvent::Failed { error, .. } => return Err(error.into()),
        }
    }
    let elapsed = start.elapsed();

    session.save(output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairmesh::error::ErrorKind;

    #[test]
    fn test_local_options_keep_values() {
        let options = local_options(50, 0.5, true).unwrap();
        assert_eq!(options.iterations, 50);
        assert_eq!(options.damping, 0.5);
        assert!(!options.parallel);
    }

    #[test]
    fn test_local_options_reject_out_of_range_damping() {
        for damping in [4.0, -0.1, f64::NAN] {
            let err = local_options(10, damping, false).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parameter);
        }
    }
}
