use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use jobdraft::cli::{Cli, Command};
use jobdraft::config::JobDraftConfig;
use jobdraft::error::JobDraftError;
use jobdraft::script::EventScript;
use jobdraft::state_machine::{Event, JobCreationMachine, ModelTreeNode, StateMachine};
use jobdraft::ui::TransitionPrinter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => JobDraftConfig::load_from(path, true)?,
        None => JobDraftConfig::load()?,
    };

    let filter = if cli.verbose {
        EnvFilter::new("jobdraft=debug")
    } else {
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let printer = TransitionPrinter::new(cli.verbose);

    match cli.command {
        Command::Replay { file, expect, json } => {
            let script = EventScript::load(&file)?;
            let mut machine = JobCreationMachine::with_config(&config);
            tracing::info!(file = %file.display(), events = script.events.len(), "replaying");

            let transitions = script.replay(&mut machine);
            let snapshot = machine.get_state();

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                for (step, (event, transition)) in
                    script.events.iter().zip(&transitions).enumerate()
                {
                    printer.transition(step + 1, event, transition);
                }
                printer.snapshot(&snapshot);
                printer.session(&machine.session_record());
            }

            if let Some(expected) = expect
                && snapshot.name != expected
            {
                return Err(JobDraftError::UnexpectedState {
                    expected,
                    actual: snapshot.name,
                }
                .into());
            }
        }
        Command::Table => {
            printer.table(&StateMachine::table());
        }
        Command::Demo => {
            run_demo(&config, &printer);
        }
    }

    Ok(())
}

fn run_demo(config: &JobDraftConfig, printer: &TransitionPrinter) {
    let mut machine = JobCreationMachine::with_config(config);
    let events = vec![
        Event::ModelTreeFetched {
            tree: vec![ModelTreeNode(serde_json::json!({
                "id": "resnet50",
                "versions": ["v1", "v2"]
            }))],
        },
        Event::ModelChanged,
        Event::UserEditing,
        Event::ModelChanged,
        Event::ModelChanged,
        Event::Reset,
    ];

    for (step, event) in events.into_iter().enumerate() {
        let transition = machine.send(event.clone());
        printer.transition(step + 1, &event, &transition);
    }
    printer.snapshot(&machine.get_state());
    printer.session(&machine.session_record());
}
