//! Interface de linha de comando do jobdraft baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (replay, table, demo)
//! e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::state_machine::State;

/// jobdraft — máquina de estados do formulário de criação de jobs.
#[derive(Debug, Parser)]
#[command(name = "jobdraft", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./jobdraft.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reproduz um script de eventos (JSON ou TOML) numa máquina nova.
    Replay {
        /// Caminho para o script de eventos.
        file: PathBuf,

        /// Falha se o estado final for diferente deste.
        #[arg(long)]
        expect: Option<State>,

        /// Imprime apenas o snapshot final em JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mostra a tabela de transições.
    Table,

    /// Executa a demonstração embutida da máquina de estados.
    Demo,
}
