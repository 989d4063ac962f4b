//! Saída de terminal do jobdraft com cores.
//!
//! Usa a crate `console` para estilização. O [`TransitionPrinter`] imprime
//! cada transição de uma sessão do formulário e o resumo final.

use console::Style;

use crate::state_machine::{Event, SessionRecord, Snapshot, TableRow, Transition};

/// Impressora de transições para o terminal.
///
/// Transições aceitas em verde, atualizações só de contexto em ciano e
/// eventos ignorados em amarelo.
pub struct TransitionPrinter {
    green: Style,
    cyan: Style,
    yellow: Style,
    dim: Style,
    verbose: bool,
}

impl TransitionPrinter {
    pub fn new(verbose: bool) -> Self {
        Self {
            green: Style::new().green().bold(),
            cyan: Style::new().cyan(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            verbose,
        }
    }

    /// Imprime uma transição; com `verbose`, inclui o evento completo em JSON.
    pub fn transition(&self, step: usize, event: &Event, transition: &Transition) {
        let kind = event.kind();
        match transition {
            Transition::Taken { from, to, action } => {
                let action = action
                    .map(|a| format!(" [{a}]"))
                    .unwrap_or_default();
                println!(
                    "  {} {step:>3} {kind}: {from} → {to}{}",
                    self.green.apply_to("→"),
                    self.dim.apply_to(action)
                );
            }
            Transition::ContextOnly { state, action } => {
                println!(
                    "  {} {step:>3} {kind}: {state} {}",
                    self.cyan.apply_to("•"),
                    self.dim.apply_to(format!("[{action}]"))
                );
            }
            Transition::Ignored { state, .. } => {
                println!(
                    "  {} {step:>3} {kind}: ignored in {state}",
                    self.yellow.apply_to("∅")
                );
            }
        }
        if self.verbose {
            println!(
                "        {}",
                self.dim
                    .apply_to(serde_json::to_string(event).unwrap_or_default())
            );
        }
    }

    /// Imprime o snapshot final em JSON.
    pub fn snapshot(&self, snapshot: &Snapshot) {
        println!();
        println!("{}", self.green.apply_to(format!("─── State: {} ───", snapshot.name)));
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot.context).unwrap_or_default()
        );
    }

    /// Imprime o registro da sessão formatado em JSON.
    pub fn session(&self, record: &SessionRecord) {
        println!();
        println!("{}", self.cyan.apply_to("─── Session Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }

    /// Imprime a tabela de transições.
    pub fn table(&self, rows: &[TableRow]) {
        println!(
            "{:<22} {:<18} {:<22} {}",
            "SOURCE", "EVENT", "TARGET", "ACTION"
        );
        for row in rows {
            let target = row
                .target
                .map(|t| t.to_string())
                .unwrap_or_else(|| "(unchanged)".to_string());
            let action = row
                .action
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<22} {:<18} {:<22} {}",
                row.source.to_string(),
                row.event.to_string(),
                target,
                self.dim.apply_to(action)
            );
        }
    }
}
