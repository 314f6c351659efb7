//! Blink Stop CLI
//!
//! Usage:
//!   blinkstop --simulate                    # Drive a game from an EAR stream on stdin
//!   blinkstop --demo                        # Scripted round through the full pipeline
//!   blinkstop --serve                       # HTTP API server
//!   blinkstop --ear 0.18                    # Single sample classification
//!   blinkstop --simulate --json             # JSON output

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use blinkstop::core::{
    run_server, ApiConfig, AudioCue, AudioDirector, BlinkClassifier, CalibrationController,
    DetectionScheduler, FileStore, GameEngine, InferenceError, LocalLeaderboard, MemoryRemote,
    ScoreAdapter, SchedulerConfig,
};
use blinkstop::types::{BlinkReport, Entry, GameMode, GamePhase, LandmarkFrame, ScoreResult};
use blinkstop::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "blinkstop",
    version = VERSION,
    about = "Blink Stop - keep your eyes open, the machine is watching",
    long_about = "Headless engine for the Blink Stop reflex game.\n\n\
                  The pipeline turns face-mesh landmark frames into a debounced\n\
                  blink signal and drives the game state machine with it.\n\n\
                  Modes:\n  \
                  --simulate  Feed EAR samples from stdin (one per line, 'none' = no face)\n  \
                  --demo      Scripted round through the full detection pipeline\n  \
                  --serve     HTTP API server (sessions + global leaderboard)\n\n\
                  Game modes:\n  \
                  CLASSIC     Survive as long as possible\n  \
                  PRECISION   Blink as close to the target as you can\n  \
                  ENDURANCE   Hold out for the full 30 seconds"
)]
struct Args {
    /// Game mode: classic, precision, or endurance
    #[arg(short, long, default_value = "classic")]
    mode: String,

    /// Precision target in seconds
    #[arg(short, long, default_value_t = 10.0)]
    target: f64,

    /// Player name for saved scores
    #[arg(short, long)]
    name: Option<String>,

    /// Interactive simulation - read EAR samples from stdin
    #[arg(short, long)]
    simulate: bool,

    /// Scripted demo round through the full detection pipeline
    #[arg(short, long)]
    demo: bool,

    /// Run as HTTP API server
    #[arg(long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Classify a single EAR sample and exit
    #[arg(long)]
    ear: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Directory for local leaderboard data (default: ./data)
    #[arg(long, default_value = "./data")]
    data_dir: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    if args.serve {
        run_serve(&args).await;
    } else if args.demo {
        run_demo(&args).await;
    } else if let Some(ear) = args.ear {
        run_single(ear, &args);
    } else if args.simulate {
        run_simulate(&args).await;
    } else {
        // default to the interactive simulation
        run_simulate(&args).await;
    }
}

/// Parse the requested game mode or exit with a hint
fn parse_mode(args: &Args) -> GameMode {
    match GameMode::parse(&args.mode) {
        Some(mode) => mode,
        None => {
            eprintln!(
                "Unknown mode '{}'. Use classic, precision, or endurance.",
                args.mode
            );
            std::process::exit(2);
        }
    }
}

/// Classify one EAR sample against the default threshold
fn run_single(ear: f64, args: &Args) {
    let mut classifier = BlinkClassifier::new();
    let report = classifier.observe_ear(Some(ear));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return;
    }

    let closed = report.ear < classifier.threshold();
    let verdict = if closed {
        "closed (one more frame like this would be a blink)".red()
    } else {
        "open".green()
    };
    println!(
        "ear={:.3} | threshold={:.3} | eye {}",
        report.ear,
        classifier.threshold(),
        verdict
    );
}

/// Run the interactive stdin-driven simulation
async fn run_simulate(args: &Args) {
    let mode = parse_mode(args);
    let target = (mode == GameMode::Precision).then_some(args.target);

    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let mut calibration = CalibrationController::new();
    let mut audio = AudioDirector::new();
    let mut adapter = ScoreAdapter::new(
        LocalLeaderboard::new(FileStore::new(&args.data_dir)),
        MemoryRemote::new(),
    );

    print_header(&format!("{} Mode", mode));
    println!("Enter one EAR sample per line (typical open eyes: 0.25-0.40).");
    println!("Type 'none' for a no-face frame, 'quit' to exit.");
    println!("Keep your eyes open for the 3s calibration window first.");
    println!();

    let now = Instant::now();
    engine
        .start_session(mode, target, Ok(()), now)
        .expect("camera stub cannot fail");
    calibration.start(now);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", prompt(&engine));
        stdout.flush().unwrap();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession abandoned.");
            break;
        }
        if line.is_empty() {
            continue;
        }

        let ear = match parse_sample(line) {
            Ok(ear) => ear,
            Err(()) => {
                println!("{}", "Enter an EAR value like 0.31, or 'none'.".yellow());
                continue;
            }
        };

        let now = Instant::now();
        match engine.phase() {
            GamePhase::Calibrating => {
                if let Some(ear) = ear {
                    calibration.sample(ear);
                }
                let progress = calibration.tick(now);
                if progress.done {
                    if let Some(threshold) = calibration.finish() {
                        classifier.set_threshold(threshold);
                    }
                    println!(
                        "{}",
                        format!("Calibrated: threshold={:.3}", classifier.threshold()).green()
                    );
                    classifier.reset_state();
                    engine.begin_play(now);
                    print_cues(&audio.round_started());
                    println!("{}", "GO - do not blink.".bold());
                } else {
                    println!(
                        "{}",
                        format!(
                            "CALIBRATING {:>4.1}% | {:.2}s left",
                            progress.fraction * 100.0,
                            progress.remaining_secs
                        )
                        .yellow()
                    );
                }
            }
            GamePhase::Playing | GamePhase::Endurance => {
                let report = classifier.observe_ear(ear);
                let outcome = engine.on_frame(&report, ear.is_some(), now);

                if args.json {
                    print_json_sample(&engine, &report, now);
                } else {
                    print_status_line(&engine, &report, now);
                    if engine.phase() == GamePhase::Playing {
                        if let Some(elapsed) = engine.elapsed_secs(now) {
                            if let Some(cue) = audio.poll(elapsed) {
                                print_cues(&[cue]);
                            }
                        }
                    }
                }

                if outcome.is_some() {
                    let result = engine.last_result().cloned().expect("result after game over");
                    finish_game(&result, &mut audio, &mut adapter, args).await;
                    break;
                }
            }
            _ => {}
        }
    }
}

/// Scripted demo: a full classic round through scheduler, EAR computation,
/// classifier, and engine, with synthetic frames standing in for the camera
async fn run_demo(args: &Args) {
    let mode = parse_mode(args);
    let target = (mode == GameMode::Precision).then_some(args.target);

    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let mut calibration = CalibrationController::new();
    let mut audio = AudioDirector::new();
    let mut adapter = ScoreAdapter::new(
        LocalLeaderboard::new(FileStore::new(&args.data_dir)),
        MemoryRemote::new(),
    );

    print_header(&format!("Demo - {} Mode", mode));
    println!("Synthetic face: eyes open through calibration, blink at ~9.5s.");
    println!();

    // eyes held open until the scripted blink
    let started = Instant::now();
    let infer = move || {
        let elapsed = started.elapsed().as_secs_f64();
        async move {
            let ear = if elapsed < 9.5 { 0.32 } else { 0.08 };
            Ok::<_, InferenceError>(Some(LandmarkFrame::with_eye_openness(ear)))
        }
    };

    let mut scheduler = DetectionScheduler::new();
    let mut rx = scheduler.start_loop(infer, SchedulerConfig::default());

    let now = Instant::now();
    engine
        .start_session(mode, target, Ok(()), now)
        .expect("camera stub cannot fail");
    calibration.start(now);

    while let Some(frame) = rx.recv().await {
        let now = Instant::now();
        match engine.phase() {
            GamePhase::Calibrating => {
                let report = classifier.observe(frame.as_ref());
                if frame.is_some() {
                    calibration.sample(report.ear);
                }
                if calibration.tick(now).done {
                    if let Some(threshold) = calibration.finish() {
                        classifier.set_threshold(threshold);
                    }
                    println!(
                        "{}",
                        format!("Calibrated: threshold={:.3}", classifier.threshold()).green()
                    );
                    classifier.reset_state();
                    engine.begin_play(now);
                    print_cues(&audio.round_started());
                }
            }
            GamePhase::Playing | GamePhase::Endurance => {
                let report = classifier.observe(frame.as_ref());
                let outcome = engine.on_frame(&report, frame.is_some(), now);
                print_status_line(&engine, &report, now);

                if outcome.is_some() {
                    let result = engine.last_result().cloned().expect("result after game over");
                    finish_game(&result, &mut audio, &mut adapter, args).await;
                    break;
                }
            }
            _ => break,
        }
    }

    scheduler.stop_loop();
}

/// Game-over handling: cues, score display, local + best-effort remote save
async fn finish_game(
    result: &ScoreResult,
    audio: &mut AudioDirector,
    adapter: &mut ScoreAdapter<FileStore, MemoryRemote>,
    args: &Args,
) {
    print_cues(&audio.round_ended(result));
    println!();
    println!("{}", result.end_reason.headline().red().bold());
    println!("  {}: {}", result.label(), result.formatted().bold());
    if result.perfect {
        println!("  {}", "PERFECT!".cyan().bold());
    }
    if result.reward_unlocked {
        println!("  {}", "Cosmetic theme unlocked.".magenta());
        if let Err(err) = adapter.local_mut().unlock_reward() {
            eprintln!("Could not persist reward flag: {}", err);
        }
    }

    let Some(name) = args.name.as_deref() else {
        println!("\nPass --name to save your score.");
        return;
    };

    match adapter.record_local(result.mode, result.value, name) {
        Ok(()) => {
            if adapter.record_remote(result.mode, result.value, name).await {
                println!("\n{}", "SAVED ✓".green());
            } else {
                println!("\n{}", "SAVED (LOCAL)".yellow());
            }
        }
        Err(err) => eprintln!("Could not save score: {}", err),
    }

    println!("\nTop {}:", result.mode);
    render_board(&adapter.local_top(result.mode), result.mode);
    println!("\n{}", result.share_text().dimmed());
}

/// Print a local top-5 table
fn render_board(entries: &[Entry], mode: GameMode) {
    if entries.is_empty() {
        println!("  No scores yet");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "  #{} {:<12} {}",
            index + 1,
            entry.name,
            mode.format_score(entry.score)
        );
    }
}

/// Parse one stdin token: an EAR value or a no-face marker
fn parse_sample(line: &str) -> Result<Option<f64>, ()> {
    if line.eq_ignore_ascii_case("none") || line.eq_ignore_ascii_case("noface") {
        return Ok(None);
    }
    line.parse::<f64>().map(Some).map_err(|_| ())
}

/// Print mode header
fn print_header(mode: &str) {
    println!("========================================");
    println!("  Blink Stop v{} - {}", VERSION, mode);
    println!("========================================");
    println!();
}

/// Input prompt showing the current phase
fn prompt(engine: &GameEngine) -> String {
    let phase = engine.phase();
    format!("{} [{}] >", phase.emoji(), phase)
        .color(phase.color())
        .to_string()
}

/// One status line per processed sample
fn print_status_line(engine: &GameEngine, report: &BlinkReport, now: Instant) {
    let phase = engine.phase();
    let elapsed = engine
        .elapsed_secs(now)
        .or_else(|| engine.last_result().map(|r| r.value));
    let line = format!(
        "{} ear={:.3} | state={} | elapsed={}",
        phase.emoji(),
        report.ear,
        phase,
        elapsed
            .map(|e| format!("{:.2}s", e))
            .unwrap_or_else(|| "-".to_string()),
    );
    println!("{}", line.color(phase.color()));
}

/// JSON output for one processed sample
fn print_json_sample(engine: &GameEngine, report: &BlinkReport, now: Instant) {
    #[derive(serde::Serialize)]
    struct SampleOutput<'a> {
        phase: GamePhase,
        report: &'a BlinkReport,
        elapsed_secs: Option<f64>,
    }

    let output = SampleOutput {
        phase: engine.phase(),
        report,
        elapsed_secs: engine.elapsed_secs(now),
    };
    println!("{}", serde_json::to_string(&output).unwrap());
}

/// Print audio cues for the external tone generator
fn print_cues(cues: &[AudioCue]) {
    for cue in cues {
        let label = match cue {
            AudioCue::DroneOn => "♪ drone on",
            AudioCue::DroneOff => "♪ drone off",
            AudioCue::Heartbeat => "♥",
            AudioCue::Glitch => "♪ glitch",
            AudioCue::Win => "♪ win",
        };
        println!("{}", label.dimmed());
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    println!("Blink Stop API server v{}", VERSION);
    println!();

    if let Err(e) = run_server(&args.addr, ApiConfig::default()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
