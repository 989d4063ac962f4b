//! Configuração do jobdraft carregada a partir de `jobdraft.toml`.
//!
//! A struct [`JobDraftConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `JOBDRAFT_LOG` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::JobDraftError;
use crate::state_machine::DEFAULT_HISTORY_LIMIT;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "jobdraft.toml";

/// Variável de ambiente que sobrescreve `log_filter`.
pub const LOG_ENV: &str = "JOBDRAFT_LOG";

/// Configuração de nível superior carregada de `jobdraft.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDraftConfig {
    /// Filtro do `tracing-subscriber` (ex.: `warn`, `jobdraft=debug`).
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Registra eventos ignorados em nível `warn` em vez de `trace`.
    #[serde(default)]
    pub warn_on_ignored: bool,

    /// Quantidade máxima de transições guardadas no histórico de um rascunho.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

// Valor padrão do filtro de log: "warn".
fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for JobDraftConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            warn_on_ignored: false,
            history_limit: default_history_limit(),
        }
    }
}

impl JobDraftConfig {
    /// Carrega a configuração de `jobdraft.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, JobDraftError> {
        Self::load_from(Path::new(CONFIG_FILE), false)
    }

    /// Carrega a configuração de um caminho explícito.
    ///
    /// Com `required = true`, a ausência do arquivo é um erro.
    pub fn load_from(path: &Path, required: bool) -> Result<Self, JobDraftError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)?
        } else if required {
            return Err(JobDraftError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para o filtro de log.
        if let Ok(filter) = std::env::var(LOG_ENV)
            && !filter.is_empty()
        {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Interpreta o conteúdo TOML e valida os valores.
    pub fn parse(contents: &str) -> Result<Self, JobDraftError> {
        let config: JobDraftConfig = toml::from_str(contents)?;
        if config.history_limit == 0 {
            return Err(JobDraftError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}
