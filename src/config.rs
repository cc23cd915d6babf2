//! Configuração do stepper carregada a partir de `eka.toml`.
//!
//! A struct [`StepperConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `EKA_LAYOUT` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::StepperError;
use crate::ui::Layout;

/// Camada pedida pelo usuário; `Auto` decide pela largura do terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPreference {
    Auto,
    Wide,
    Narrow,
}

impl LayoutPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "wide" => Some(Self::Wide),
            "narrow" => Some(Self::Narrow),
            _ => None,
        }
    }

    /// Resolve a preferência para uma camada concreta.
    ///
    /// Em `Auto`, terminais com menos de `narrow_below` colunas recebem a
    /// camada estreita; sem terminal (saída redirecionada) usa-se a larga.
    pub fn resolve(self, columns: Option<u16>, narrow_below: usize) -> Layout {
        match self {
            Self::Wide => Layout::Wide,
            Self::Narrow => Layout::Narrow,
            Self::Auto => match columns {
                Some(cols) if usize::from(cols) < narrow_below => Layout::Narrow,
                _ => Layout::Wide,
            },
        }
    }
}

/// Configuração de nível superior carregada de `eka.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StepperConfig {
    /// Camada padrão quando não especificada via CLI.
    #[serde(default = "default_layout")]
    pub layout: LayoutPreference,

    /// Abaixo desta largura (em colunas) o modo `auto` usa a camada estreita.
    #[serde(default = "default_narrow_below_columns")]
    pub narrow_below_columns: usize,

    /// Saída colorida.
    #[serde(default = "default_color")]
    pub color: bool,

    /// Largura, em células, da barra de progresso da camada estreita.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Intervalo entre quadros do walkthrough, em milissegundos.
    #[serde(default = "default_demo_interval_ms")]
    pub demo_interval_ms: u64,
}

// Valor padrão para a camada: "auto".
fn default_layout() -> LayoutPreference {
    LayoutPreference::Auto
}

// Valor padrão para o limite da camada estreita: 100 colunas.
fn default_narrow_below_columns() -> usize {
    100
}

fn default_color() -> bool {
    true
}

// Valor padrão para a barra: 32 células.
fn default_bar_width() -> usize {
    32
}

// Valor padrão para o walkthrough: 800ms por passo.
fn default_demo_interval_ms() -> u64 {
    800
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            narrow_below_columns: default_narrow_below_columns(),
            color: default_color(),
            bar_width: default_bar_width(),
            demo_interval_ms: default_demo_interval_ms(),
        }
    }
}

impl StepperConfig {
    /// Carrega a configuração de `eka.toml` no diretório atual e aplica
    /// `EKA_LAYOUT`. Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, StepperError> {
        let mut config = Self::load_from(Path::new("eka.toml"))?;
        config.apply_layout_override(std::env::var("EKA_LAYOUT").ok().as_deref())?;
        Ok(config)
    }

    /// Carrega a configuração de `path`, ou os valores padrão se o arquivo
    /// não existir.
    pub fn load_from(path: &Path) -> Result<Self, StepperError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<StepperConfig>(&contents)?)
    }

    /// Variável de ambiente tem precedência sobre o arquivo; vazia é ignorada.
    pub fn apply_layout_override(&mut self, value: Option<&str>) -> Result<(), StepperError> {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return Ok(());
        };
        self.layout = LayoutPreference::parse(value).ok_or_else(|| {
            StepperError::Config(format!(
                "EKA_LAYOUT must be auto, wide or narrow, got {value:?}"
            ))
        })?;
        Ok(())
    }
}
