use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};

use workout_log::builder::{today, SessionBuilder, SetInput, SetInputs};
use workout_log::config::AppConfig;
use workout_log::errors::{AppError, StoreError};
use workout_log::history::HistoryIndex;
use workout_log::logging;
use workout_log::models::{CardioRecord, DayKey, ExerciseRecord, Session, SessionType};
use workout_log::progression::{ProgressionEngine, Suggestion, SuggestionBasis};
use workout_log::routines::{
    day_plan, format_clock, mobility_item, rest_to_seconds, warmup_sets, CARDIO_MODALITIES,
    CARDIO_ZONES, DEFAULT_CARDIO_MINUTES, MOBILITY_BLOCKS,
};
use workout_log::store::{export_file_name, DocumentSource, KeyValueStorage, SessionStore};
use workout_log::timer::{RestTimers, TimerTick};

#[derive(Parser)]
#[command(
    name = "workout-log",
    about = "Workout Tracker",
    long_about = "Log strength, cardio and mobility sessions and get the next session's loads."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the session history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show a day's plan with suggested loads
    Plan {
        #[arg(value_enum)]
        view: View,
    },
    /// Record a finished session
    Log {
        #[command(subcommand)]
        kind: LogCommand,
    },
    /// List stored sessions, newest first
    History {
        /// Only show records of this exercise (exact name)
        #[arg(long)]
        exercise: Option<String>,
    },
    /// Delete a session by the index shown in `history`
    Delete { index: usize },
    /// Write the history as a JSON array
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the history with an exported file
    Import { path: PathBuf },
    /// Rewrite legacy history in the current format
    Migrate,
    /// Run the rest countdown for an exercise
    Rest {
        #[arg(value_enum)]
        day: Day,
        exercise: usize,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    Strength {
        #[arg(value_enum)]
        day: Day,
        /// EX.SET=WEIGHT/REPS[/RPE], e.g. 0.0=72.5/4/8
        #[arg(long = "set", value_parser = parse_set_entry)]
        sets: Vec<SetEntry>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Cardio {
        /// Index into the modality list shown by `plan cardio`
        #[arg(long, default_value_t = 0)]
        modality: usize,
        /// Minutes
        #[arg(long, default_value_t = DEFAULT_CARDIO_MINUTES)]
        duration: u32,
        #[arg(long, default_value = "Z2")]
        zone: String,
        #[arg(long, default_value = "")]
        rpe: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Mobility {
        /// BLOCK.ITEM of each completed item
        #[arg(long = "done", value_parser = parse_slot)]
        done: Vec<(usize, usize)>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Day {
    A,
    B,
}

impl From<Day> for DayKey {
    fn from(day: Day) -> Self {
        match day {
            Day::A => DayKey::A,
            Day::B => DayKey::B,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum View {
    A,
    B,
    Cardio,
    Mobility,
}

#[derive(Clone, Debug, PartialEq)]
struct SetEntry {
    exercise: usize,
    set: usize,
    input: SetInput,
}

fn parse_slot(raw: &str) -> Result<(usize, usize), String> {
    let (first, second) = raw
        .split_once('.')
        .ok_or_else(|| format!("expected two indices like 0.1, got `{raw}`"))?;
    let index = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|_| format!("`{part}` is not an index in `{raw}`"))
    };
    Ok((index(first)?, index(second)?))
}

fn parse_set_entry(raw: &str) -> Result<SetEntry, String> {
    let (slot, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected EX.SET=WEIGHT/REPS[/RPE], got `{raw}`"))?;
    let (exercise, set) = parse_slot(slot)?;

    let mut parts = values.split('/').map(str::trim);
    let weight = parts.next().unwrap_or_default();
    let reps = parts.next().unwrap_or_default();
    let rpe = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(format!("too many values in `{raw}`"));
    }

    Ok(SetEntry { exercise, set, input: SetInput::new(weight, reps, rpe) })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = AppConfig::resolve(cli.data_dir);
    debug!(data_dir = %config.data_dir.display(), "using data directory");
    let store = config.session_store();

    match run(&store, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run<S: KeyValueStorage>(store: &SessionStore<S>, command: Command) -> Result<(), AppError> {
    match command {
        Command::Plan { view } => match view {
            View::A => show_strength_plan(store, DayKey::A),
            View::B => show_strength_plan(store, DayKey::B),
            View::Cardio => {
                show_cardio_plan();
                Ok(())
            }
            View::Mobility => {
                show_mobility_plan();
                Ok(())
            }
        },
        Command::Log { kind } => match kind {
            LogCommand::Strength { day, sets, notes } => {
                log_strength(store, day.into(), sets, notes).map(|_| ())
            }
            LogCommand::Cardio { modality, duration, zone, rpe, notes } => {
                log_cardio(store, modality, duration, &zone, rpe, notes)
            }
            LogCommand::Mobility { done, notes } => log_mobility(store, &done, notes),
        },
        Command::History { exercise } => show_history(store, exercise.as_deref()),
        Command::Delete { index } => {
            match store.delete_at(index)? {
                Some(removed) => println!("Deleted {} — {}", removed.date, removed.kind),
                None => println!("No session at index {index}"),
            }
            Ok(())
        }
        Command::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(today())));
            export_history(store, &path)
        }
        Command::Import { path } => import_history(store, &path),
        Command::Migrate => {
            let report = store.migrate()?;
            if report.rewritten {
                println!(
                    "Migrated {} sessions from schema {} to the current format",
                    report.sessions, report.found_version
                );
            } else if report.source == DocumentSource::Missing {
                println!("No history stored yet");
            } else {
                println!("History already current ({} sessions)", report.sessions);
            }
            Ok(())
        }
        Command::Rest { day, exercise } => run_rest_timer(day.into(), exercise),
    }
}

fn basis_marker(basis: SuggestionBasis) -> &'static str {
    match basis {
        SuggestionBasis::Increase => "▲",
        SuggestionBasis::Deload => "▼",
        SuggestionBasis::Hold => "=",
        SuggestionBasis::Repeat => "·",
        SuggestionBasis::NoHistory => "",
    }
}

fn show_strength_plan<S: KeyValueStorage>(store: &SessionStore<S>, day: DayKey) -> Result<(), AppError> {
    let sessions = store.sessions()?;
    let engine = ProgressionEngine::new(&sessions);
    let plan = day_plan(day);

    println!("Day {}", plan.day);
    for (ex_index, exercise) in plan.exercises.iter().enumerate() {
        println!();
        println!(
            "[{ex_index}] {}  (rest {}, {})",
            exercise.name,
            exercise.rest,
            format_clock(rest_to_seconds(exercise.rest))
        );
        if !exercise.description.is_empty() {
            println!("    {}", exercise.description);
        }

        let suggestions: Vec<Suggestion> = exercise
            .default_sets
            .iter()
            .enumerate()
            .map(|(slot, set)| engine.suggested_weight(exercise.name, slot, &set.weight.to_raw()))
            .collect();

        if !exercise.warmups.is_empty() {
            let top = suggestions.first().and_then(Suggestion::kg);
            let ladder: Vec<String> = warmup_sets(exercise, top)
                .iter()
                .enumerate()
                .map(|(i, w)| format!("W{} {} kg × {}", i + 1, w.weight, w.reps))
                .collect();
            println!("    warm-up: {}", ladder.join(" | "));
        }

        for (slot, (set, suggestion)) in exercise.default_sets.iter().zip(&suggestions).enumerate() {
            println!(
                "    {slot}. {:<12} plan {:<8} next {} {:<2} target {} reps",
                set.label,
                set.weight.to_string(),
                suggestion.weight,
                basis_marker(suggestion.basis),
                set.target_reps
            );
        }

        let best = engine.best_estimated_1rm(exercise.name);
        if best > 0.0 {
            println!("    best est. 1RM: {best:.1} kg");
        }
    }
    Ok(())
}

fn show_cardio_plan() {
    println!("Cardio");
    for (i, modality) in CARDIO_MODALITIES.iter().enumerate() {
        println!("  [{i}] {modality}");
    }
    println!("Zones:");
    for zone in CARDIO_ZONES {
        println!("  {:<6} {}", zone.value, zone.label);
    }
    println!("Default duration: {DEFAULT_CARDIO_MINUTES} min");
}

fn show_mobility_plan() {
    for (b, block) in MOBILITY_BLOCKS.iter().enumerate() {
        println!("{}", block.title);
        for (i, item) in block.items.iter().enumerate() {
            println!("  {b}.{i} {item}");
        }
    }
}

/// Records a strength day. Slots without an entered weight start from the
/// suggested load, as the plan view shows it.
fn log_strength<S: KeyValueStorage>(
    store: &SessionStore<S>,
    day: DayKey,
    entries: Vec<SetEntry>,
    notes: String,
) -> Result<Session, AppError> {
    let plan = day_plan(day);
    let prior = store.sessions()?;
    let engine = ProgressionEngine::new(&prior);

    let mut inputs = SetInputs::new();
    for SetEntry { exercise, set, input } in entries {
        let planned = plan.exercises.get(exercise).and_then(|ex| ex.default_sets.get(set));
        if planned.is_none() {
            return Err(AppError::InvalidInput(format!("day {day} has no set {exercise}.{set}")));
        }
        inputs.insert(exercise, set, input);
    }

    for (ex_index, exercise) in plan.exercises.iter().enumerate() {
        for (slot, set) in exercise.default_sets.iter().enumerate() {
            let entered = inputs.get(ex_index, slot).cloned().unwrap_or_default();
            if entered.weight.is_empty() {
                let suggestion = engine.suggested_weight(exercise.name, slot, &set.weight.to_raw());
                inputs.insert(ex_index, slot, SetInput { weight: suggestion.weight.entry_text(), ..entered });
            }
        }
    }

    let session = SessionBuilder::new(&prior, today()).notes(notes).strength(day, plan.exercises, &inputs);
    let prs: Vec<&str> = session
        .exercises()
        .iter()
        .filter(|ex| ex.sets.iter().any(|s| s.is_pr))
        .map(|ex| ex.name.as_str())
        .collect();

    store.append(session.clone())?;
    println!("Strength session saved ✅");
    for name in prs {
        println!("🏅 PR: {name}");
    }
    Ok(session)
}

fn log_cardio<S: KeyValueStorage>(
    store: &SessionStore<S>,
    modality: usize,
    duration: u32,
    zone: &str,
    rpe: String,
    notes: String,
) -> Result<(), AppError> {
    let modality = CARDIO_MODALITIES
        .get(modality)
        .ok_or_else(|| AppError::InvalidInput(format!("no cardio modality {modality}")))?;
    let zone = CARDIO_ZONES
        .iter()
        .find(|z| z.value.eq_ignore_ascii_case(zone))
        .ok_or_else(|| AppError::InvalidInput(format!("unknown zone `{zone}`")))?;

    let cardio = CardioRecord {
        modality: modality.to_string(),
        duration: duration.to_string(),
        zone: zone.value.to_string(),
        rpe,
    };
    let session = SessionBuilder::new(&[], today()).notes(notes).cardio(cardio);
    store.append(session)?;
    println!("Cardio session saved ✅");
    Ok(())
}

fn log_mobility<S: KeyValueStorage>(
    store: &SessionStore<S>,
    done: &[(usize, usize)],
    notes: String,
) -> Result<(), AppError> {
    let mut selected = done.to_vec();
    selected.sort_unstable();
    selected.dedup();

    let items = selected
        .iter()
        .map(|&(block, item)| {
            mobility_item(block, item)
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidInput(format!("no mobility item {block}.{item}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let session = SessionBuilder::new(&[], today()).notes(notes).mobility(items);
    store.append(session)?;
    println!("Mobility session saved ✅");
    Ok(())
}

fn print_exercise(exercise: &ExerciseRecord) {
    println!("  {}", exercise.name);
    for set in &exercise.sets {
        let note = if set.is_pr {
            "🏅 PR".to_string()
        } else {
            match set.reported_rpe() {
                Some(_) => format!("RPE {}", set.rpe.as_ref().map(ToString::to_string).unwrap_or_default()),
                None => String::new(),
            }
        };
        println!("    {:<12} {:<8} {} reps  {}", set.label, set.weight.to_string(), set.reps, note);
    }
}

fn print_session(index: usize, session: &Session) {
    println!("#{index}  {} — {}", session.date, session.kind);
    match &session.kind {
        SessionType::A | SessionType::B => session.exercises().iter().for_each(print_exercise),
        SessionType::Cardio => {
            if let Some(cardio) = &session.cardio {
                let rpe = if cardio.rpe.is_empty() { "-" } else { cardio.rpe.as_str() };
                println!("  {} · {} min · {} · RPE {}", cardio.modality, cardio.duration, cardio.zone, rpe);
            }
        }
        SessionType::Movilidad => {
            for item in session.mobility_done.iter().flatten() {
                println!("  {item}");
            }
        }
        SessionType::Other(_) => {}
    }
    if !session.notes.is_empty() {
        println!("  Notes: {}", session.notes);
    }
}

fn show_history<S: KeyValueStorage>(store: &SessionStore<S>, exercise: Option<&str>) -> Result<(), AppError> {
    let sessions = store.sessions()?;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    let index = HistoryIndex::new(&sessions);
    match exercise {
        Some(name) => {
            for record in index.history_for(name) {
                print_exercise(record);
            }
            match history_summary(&sessions, name) {
                Some(summary) => println!("{summary}"),
                None => println!("No records for {name}"),
            }
        }
        None => {
            for (i, session) in index.newest_first() {
                print_session(i, session);
                println!();
            }
        }
    }
    Ok(())
}

/// Closing line of an exercise history: sessions that include it (an exercise
/// may appear more than once in one session) and the best estimated 1RM.
fn history_summary(sessions: &[Session], name: &str) -> Option<String> {
    let found = sessions
        .iter()
        .filter(|session| session.exercises().iter().any(|exercise| exercise.name == name))
        .count();
    if found == 0 {
        return None;
    }
    let best = ProgressionEngine::new(sessions).best_estimated_1rm(name);
    Some(format!("{found} sessions, best est. 1RM {best:.1} kg"))
}

fn export_history<S: KeyValueStorage>(store: &SessionStore<S>, path: &Path) -> Result<(), AppError> {
    let document = store.export_all()?;
    fs::write(path, document)?;
    println!("History exported to {}", path.display());
    Ok(())
}

fn import_history<S: KeyValueStorage>(store: &SessionStore<S>, path: &Path) -> Result<(), AppError> {
    let text = fs::read_to_string(path)?;
    match store.import_all(&text) {
        Ok(count) => {
            println!("History imported ✅ ({count} sessions)");
            Ok(())
        }
        Err(e @ (StoreError::Format | StoreError::Parse(_))) => {
            warn!(error = %e, path = %path.display(), "import rejected");
            Err(AppError::InvalidInput(format!(
                "could not import {}: invalid format, is it an exported history?",
                path.display()
            )))
        }
        Err(e) => Err(e.into()),
    }
}

fn run_rest_timer(day: DayKey, exercise: usize) -> Result<(), AppError> {
    let plan = day_plan(day);
    let planned = plan
        .exercises
        .get(exercise)
        .ok_or_else(|| AppError::InvalidInput(format!("day {day} has no exercise {exercise}")))?;

    println!("{} — rest {}", planned.name, planned.rest);
    let mut timers = RestTimers::new();
    timers.start((day, exercise), rest_to_seconds(planned.rest), |_, tick| match tick {
        TimerTick::Remaining(seconds) => {
            print!("\r{}  ", format_clock(seconds));
            let _ = io::stdout().flush();
        }
        TimerTick::Finished => println!("\r✅     "),
    });
    timers.wait((day, exercise));
    Ok(())
}
