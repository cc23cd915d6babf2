//! Interface de linha de comando do stepper baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (states, map, render,
//! inspect, select, demo) e flags globais (--layout, --no-color, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::LayoutPreference;

/// Lifecycle stepper for EKA-AI workshop job cards.
#[derive(Debug, Parser)]
#[command(name = "eka-stepper", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Camada de desenho do stepper.
    #[arg(long, global = true)]
    pub layout: Option<LayoutArg>,

    /// Desabilita cores na saída.
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Argumento de camada aceito pela CLI, mapeado para [`LayoutPreference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Decide pela largura do terminal.
    Auto,
    /// Marcadores ligados por uma linha de progresso.
    Wide,
    /// Contador de passos e barra proporcional.
    Narrow,
}

impl From<LayoutArg> for LayoutPreference {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutPreference::Auto,
            LayoutArg::Wide => LayoutPreference::Wide,
            LayoutArg::Narrow => LayoutPreference::Narrow,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista os estados canônicos do ciclo de vida.
    States,

    /// Mostra o estado canônico de cada status bruto.
    Map {
        /// Status como armazenados pelo backend.
        #[arg(required = true)]
        statuses: Vec<String>,
    },

    /// Desenha o stepper para um status.
    Render {
        /// Status atual do job card.
        status: String,

        /// Status anterior; posiciona o marcador de um job card cancelado.
        #[arg(long)]
        previous: Option<String>,
    },

    /// Desenha o stepper a partir de um documento JSON de job card.
    Inspect {
        /// Caminho do arquivo JSON, ou `-` para stdin.
        file: PathBuf,
    },

    /// Ativa um passo e imprime o corpo da requisição de transição.
    Select {
        /// Status atual do job card.
        status: String,

        /// Passo a ativar, contado a partir de 1.
        #[arg(long)]
        step: usize,

        /// Observações enviadas junto com a transição.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Executa o walkthrough de demonstração do ciclo de vida.
    Demo {
        /// Status de onde o walkthrough começa.
        #[arg(long)]
        from: Option<String>,

        /// Intervalo entre passos, em milissegundos.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}
