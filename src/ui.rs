//! Interface de terminal do stepper: camadas larga e estreita, tabelas e
//! a barra de progresso do walkthrough.
//!
//! Usa `console` para estilos e alinhamento e `indicatif` para a barra do
//! [`WalkthroughProgress`]. Todo o desenho parte de um [`StepperView`], de
//! modo que as duas camadas compartilham a mesma classificação.

use console::{Alignment, Style, measure_text_width, pad_str};
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::{Disposition, JobCard, LifecycleTable, Resolution};
use crate::stepper::{Step, StepStatus, StepperView};

// Connector cells between two step cells.
const GAP: usize = 2;

/// Camada efetiva de desenho, já resolvida a partir da preferência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Um marcador por estado, ligados por uma linha de progresso.
    Wide,
    /// "Step N of TOTAL", rótulo ativo e barra proporcional.
    Narrow,
}

// Estilos por classificação de passo.
struct Palette {
    completed: Style,
    active: Style,
    pending: Style,
    failed: Style,
    heading: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        if !color {
            return Self {
                completed: Style::new(),
                active: Style::new(),
                pending: Style::new(),
                failed: Style::new(),
                heading: Style::new(),
            };
        }
        Self {
            completed: Style::new().green().bold(),
            active: Style::new().yellow().bold(),
            pending: Style::new().dim(),
            failed: Style::new().red().bold(),
            heading: Style::new().cyan().bold(),
        }
    }

    fn for_status(&self, status: StepStatus) -> &Style {
        match status {
            StepStatus::Completed => &self.completed,
            StepStatus::Active => &self.active,
            StepStatus::Pending => &self.pending,
            StepStatus::Failed => &self.failed,
        }
    }
}

/// Desenha [`StepperView`]s e relatórios auxiliares como texto de terminal.
pub struct StepperRenderer {
    palette: Palette,
    bar_width: usize,
}

impl StepperRenderer {
    pub fn new(color: bool, bar_width: usize) -> Self {
        Self {
            palette: Palette::new(color),
            bar_width: bar_width.max(1),
        }
    }

    pub fn render(&self, view: &StepperView, layout: Layout) -> String {
        match layout {
            Layout::Wide => self.render_wide(view),
            Layout::Narrow => self.render_narrow(view),
        }
    }

    /// Linha de marcadores sobre a linha de rótulos.
    ///
    /// O trecho preenchido (`━`) da linha termina exatamente no marcador
    /// ativo; dali em diante a linha é `─`.
    pub fn render_wide(&self, view: &StepperView) -> String {
        let steps = view.steps();
        let mut markers = String::new();
        let mut labels = String::new();

        for (i, step) in steps.iter().enumerate() {
            let style = self.palette.for_status(step.status);
            let marker = format!("({})", step.marker());
            let cell = cell_width(step);
            let pad = cell.saturating_sub(measure_text_width(&marker));
            let (left, right) = (pad / 2, pad - pad / 2);
            let last = i + 1 == steps.len();

            if i == 0 {
                markers.push_str(&" ".repeat(left));
            } else {
                markers.push_str(&self.connector(view, i - 1, left));
            }
            markers.push_str(&style.apply_to(&marker).to_string());
            if !last {
                markers.push_str(&self.connector(view, i, right + GAP));
            }

            let label = style.apply_to(step.state.label).to_string();
            labels.push_str(&pad_str(&label, cell, Alignment::Center, None));
            if !last {
                labels.push_str(&" ".repeat(GAP));
            }
        }

        format!("{markers}\n{}", labels.trim_end())
    }

    /// Contador e rótulo ativo, barra proporcional e descrição do passo.
    pub fn render_narrow(&self, view: &StepperView) -> String {
        let current = view.current();
        let style = self.palette.for_status(current.status);
        let counter = view.step_counter();
        let label = if view.is_halted() {
            format!("{} (halted)", current.state.label)
        } else {
            current.state.label.to_string()
        };

        let width = self.bar_width + 2;
        let spacing = width
            .saturating_sub(measure_text_width(&counter) + measure_text_width(&label))
            .max(1);

        let fraction = view.fraction();
        let filled = ((fraction * self.bar_width as f64).round() as usize).min(self.bar_width);
        let bar = format!(
            "[{}{}]",
            style.apply_to("█".repeat(filled)),
            self.palette.pending.apply_to("░".repeat(self.bar_width - filled)),
        );

        format!(
            "{counter}{}{}\n{bar} {}\n{}",
            " ".repeat(spacing),
            style.apply_to(label),
            format_percent(fraction),
            current.state.description,
        )
    }

    /// Columns the wide layout needs for `view`.
    pub fn wide_width(view: &StepperView) -> usize {
        let cells: usize = view.steps().iter().map(cell_width).sum();
        cells + GAP * view.total().saturating_sub(1)
    }

    pub fn render_table(&self, table: &LifecycleTable) -> String {
        let id_width = table
            .states()
            .iter()
            .map(|s| s.id.as_str().len())
            .max()
            .unwrap_or(0);
        let label_width = table
            .states()
            .iter()
            .map(|s| measure_text_width(s.label))
            .max()
            .unwrap_or(0);

        let heading = if table.is_empty() {
            "Job-card lifecycle: (no states)".to_string()
        } else {
            format!(
                "Job-card lifecycle: {} → {}",
                table.initial().label,
                table.terminal().label
            )
        };
        let mut out = self.palette.heading.apply_to(heading).to_string();
        for (i, state) in table.states().iter().enumerate() {
            out.push_str(&format!(
                "\n  {:>2}  {}  {}  {}",
                i + 1,
                pad_str(state.id.as_str(), id_width, Alignment::Left, None),
                pad_str(state.label, label_width, Alignment::Left, None),
                state.description,
            ));
        }
        out
    }

    /// One line describing how `raw` was mapped.
    pub fn render_mapping(&self, raw: &str, resolution: &Resolution, table: &LifecycleTable) -> String {
        let position = match (table.index_of(resolution.state), table.get(resolution.state)) {
            (Some(i), Some(state)) => format!("step {} of {}, {}", i + 1, table.len(), state.label),
            _ => "not in table".to_string(),
        };

        let mut line = format!("{raw:?} → {} ({position})", resolution.state);
        if !resolution.recognized {
            line.push_str(&format!(" {}", self.palette.pending.apply_to("[default]")));
        }
        if resolution.disposition == Disposition::Halted {
            line.push_str(&format!(" {}", self.palette.failed.apply_to("[halted]")));
        }
        line
    }

    /// Cabeçalho de um job card lido do backend.
    pub fn render_header(&self, card: &JobCard) -> String {
        let mut parts = vec![format!(
            "Job card {}",
            card.reference().unwrap_or("(unnumbered)")
        )];
        parts.push(format!("status {}", card.status));
        if let Some(updated) = card.updated_at {
            parts.push(format!("updated {}", updated.format("%Y-%m-%d %H:%M UTC")));
        }
        self.palette.heading.apply_to(parts.join(" · ")).to_string()
    }

    fn connector(&self, view: &StepperView, k: usize, len: usize) -> String {
        if view.connector_filled(k) {
            self.palette.completed.apply_to("━".repeat(len)).to_string()
        } else {
            self.palette.pending.apply_to("─".repeat(len)).to_string()
        }
    }
}

// Wide enough for the label and for the numbered marker, so cells keep
// their width as steps complete.
fn cell_width(step: &Step) -> usize {
    let marker = step.number().to_string().len() + 2;
    measure_text_width(step.state.label).max(marker)
}

fn format_percent(fraction: f64) -> String {
    let percent = fraction * 100.0;
    if percent.fract().abs() < f64::EPSILON {
        format!("{percent:.0}%")
    } else {
        format!("{percent:.1}%")
    }
}

/// Barra de progresso do walkthrough, com os quadros do stepper impressos
/// acima dela.
pub struct WalkthroughProgress {
    // Barra do indicatif; posição = passo atual (1-based).
    pb: ProgressBar,
    // Estilo verde para a mensagem final.
    green: Style,
    // Estilo vermelho para um walkthrough interrompido.
    red: Style,
}

impl WalkthroughProgress {
    /// Inicia a barra com `total` passos.
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template("{bar:32.yellow/dim} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self::with_bar(pb)
    }

    /// Barra que não desenha nada; os quadros continuam indo para stdout.
    #[cfg(test)]
    pub fn hidden(total: usize) -> Self {
        let pb = ProgressBar::hidden();
        pb.set_length(total as u64);
        Self::with_bar(pb)
    }

    fn with_bar(pb: ProgressBar) -> Self {
        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Imprime o quadro e avança a barra até o passo de `view`.
    pub fn show(&self, view: &StepperView, frame: &str) {
        self.pb.suspend(|| println!("{frame}\n"));
        self.pb.set_position(view.current_index() as u64 + 1);
        self.pb.set_message(view.current().state.label);
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    /// Finaliza a barra e informa onde o walkthrough parou.
    pub fn finish(&self, last: Option<&StepperView>) {
        self.pb.finish_and_clear();
        match last {
            Some(view) => println!(
                "  {} Walkthrough reached {}",
                self.green.apply_to("✓"),
                view.current().state.label
            ),
            None => println!("  {} Walkthrough played no steps", self.red.apply_to("✗")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::StatusMapper;
    use crate::stepper::JobCardStepper;

    fn plain() -> StepperRenderer {
        StepperRenderer::new(false, 32)
    }

    #[test]
    fn wide_layout_in_progress() {
        let view = JobCardStepper::new("In-Progress").view();
        let out = plain().render_wide(&view);
        let (markers, labels) = out.split_once('\n').unwrap();

        assert_eq!(markers.matches("(✓)").count(), 4);
        for n in 5..=8 {
            assert!(markers.contains(&format!("({n})")), "missing marker {n}");
        }
        let (before, after) = markers.split_once("(5)").unwrap();
        assert!(before.contains('━'));
        assert!(!before.contains('─'));
        assert!(!after.contains('━'));
        assert!(after.contains('─'));

        assert!(labels.starts_with("Received"));
        assert!(labels.ends_with("Delivered"));
        assert!(labels.contains("In Progress"));
        assert_eq!(measure_text_width(labels), StepperRenderer::wide_width(&view));
        assert!(measure_text_width(markers) <= StepperRenderer::wide_width(&view));
    }

    #[test]
    fn wide_layout_initial_has_no_filled_connector() {
        let view = JobCardStepper::new("unknown_legacy_value").view();
        let out = plain().render_wide(&view);
        assert!(!out.contains('━'));
        assert!(!out.contains('✓'));
        assert!(out.contains("(1)"));
    }

    #[test]
    fn wide_layout_terminal_fills_every_connector() {
        let view = JobCardStepper::new("Delivered").view();
        let out = plain().render_wide(&view);
        let markers = out.lines().next().unwrap();
        assert_eq!(markers.matches("(✓)").count(), 7);
        assert!(markers.ends_with("(8)"));
        assert!(!markers.contains('─'));
    }

    #[test]
    fn narrow_layout_in_progress() {
        let view = JobCardStepper::new("In-Progress").view();
        let out = plain().render_narrow(&view);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Step 5 of 8"));
        assert!(lines[0].ends_with("In Progress"));
        assert_eq!(lines[1].matches('█').count(), 20);
        assert_eq!(lines[1].matches('░').count(), 12);
        assert!(lines[1].ends_with("62.5%"));
        assert_eq!(lines[2], "Technicians are working on the vehicle.");
    }

    #[test]
    fn narrow_layout_bounds() {
        let first = plain().render_narrow(&JobCardStepper::new("bogus").view());
        assert!(first.starts_with("Step 1 of 8"));
        assert!(first.contains("12.5%"));
        assert_eq!(first.matches('█').count(), 4);

        let last = plain().render_narrow(&JobCardStepper::new("CLOSED").view());
        assert!(last.starts_with("Step 8 of 8"));
        assert!(last.contains("100%"));
        assert_eq!(last.matches('░').count(), 0);
    }

    #[test]
    fn halted_card_is_drawn_as_failed() {
        let view = JobCardStepper::new("CANCELLED")
            .with_previous_status("ESTIMATED")
            .view();
        let wide = plain().render_wide(&view);
        assert!(wide.contains("(✗)"));
        let narrow = plain().render_narrow(&view);
        assert!(narrow.contains("Estimated (halted)"));
    }

    #[test]
    fn both_layouts_come_from_one_view() {
        let view = JobCardStepper::new("QC").view();
        let r = plain();
        assert_eq!(r.render(&view, Layout::Wide), r.render_wide(&view));
        assert_eq!(r.render(&view, Layout::Narrow), r.render_narrow(&view));
    }

    #[test]
    fn table_lists_every_state() {
        let table = LifecycleTable::canonical();
        let out = plain().render_table(&table);
        assert_eq!(out.lines().count(), table.len() + 1);
        assert_eq!(out.lines().next(), Some("Job-card lifecycle: Received → Delivered"));
        assert!(out.contains("quality_check"));
        assert!(out.contains(" 8  delivered"));
    }

    #[test]
    fn mapping_line_flags_defaults_and_halts() {
        let table = LifecycleTable::canonical();
        let r = plain();

        let line = r.render_mapping("In-Progress", &StatusMapper::resolve("In-Progress"), &table);
        assert_eq!(line, "\"In-Progress\" → in_progress (step 5 of 8, In Progress)");

        let line = r.render_mapping("xyz", &StatusMapper::resolve("xyz"), &table);
        assert!(line.ends_with("[default]"));

        let line = r.render_mapping("CANCELLED", &StatusMapper::resolve("CANCELLED"), &table);
        assert!(line.ends_with("[halted]"));
    }

    #[test]
    fn header_uses_reference_and_timestamp() {
        let card = JobCard::from_json(
            r#"{"job_card_number": "JC-7", "status": "PDI", "updated_at": "2025-01-15T11:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            plain().render_header(&card),
            "Job card JC-7 · status PDI · updated 2025-01-15 11:30 UTC"
        );
        assert_eq!(
            plain().render_header(&JobCard::new("Pending")),
            "Job card (unnumbered) · status Pending"
        );
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(0.625), "62.5%");
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(format_percent(0.25), "25%");
    }

    #[test]
    fn walkthrough_progress_tracks_position() {
        let progress = WalkthroughProgress::hidden(8);
        let view = JobCardStepper::new("Approved").view();
        progress.show(&view, "frame");
        assert_eq!(progress.position(), 4);
        progress.finish(Some(&view));
    }
}
