//! Exam Results - Graphical User Interface
//!
//! Search a student's result by exam number, print it, and browse the
//! top students. A live clock runs in the header.

use exam_results::clock::{current_year, format_full_datetime, Clock, TICK_INTERVAL};
use exam_results::config::Settings;
use exam_results::leaderboard::{self, LeaderboardCard, LeaderboardView};
use exam_results::loader::{
    load_in_background, DatasetLoader, DatasetSource, LoadError, LoadOutcome, Loaded,
};
use exam_results::panel::DetailPanel;
use exam_results::print::{PrintJob, Printer};
use exam_results::search::{self, Feedback, FeedbackKind};
use iced::widget::{button, column, container, row, rule, scrollable, text, text_input};
use iced::{Center, Color, Element, Fill, Subscription, Task, Theme};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fade-in length of a single leaderboard card.
const CARD_FADE: Duration = Duration::from_millis(400);

/// Cards per leaderboard row.
const CARDS_PER_ROW: usize = 5;

const SUCCESS_COLOR: Color = Color {
    r: 0.4,
    g: 0.9,
    b: 0.4,
    a: 1.0,
};
const ERROR_COLOR: Color = Color {
    r: 0.95,
    g: 0.4,
    b: 0.4,
    a: 1.0,
};
const MUTED_COLOR: Color = Color {
    r: 0.6,
    g: 0.6,
    b: 0.6,
    a: 1.0,
};
const TEXT_COLOR: Color = Color {
    r: 0.92,
    g: 0.92,
    b: 0.92,
    a: 1.0,
};

fn main() -> iced::Result {
    env_logger::init();
    iced::application(App::new, App::update, App::view)
        .title("Exam Results")
        .theme(App::theme)
        .subscription(App::subscription)
        .centered()
        .run()
}

// ============================================================================
// App State
// ============================================================================

struct App {
    loader: Arc<DatasetLoader>,
    printer: Printer,
    leaderboard_size: usize,

    // Header
    clock: Clock,
    year: i32,

    // Search form
    exam_input: String,
    feedback: Option<Feedback>,
    searching: bool,

    // Detail panel
    panel: DetailPanel,
    pending_print: Option<PrintJob>,

    // Leaderboard
    leaderboard: LeaderboardView,
    leaderboard_shown_at: Option<Instant>,
}

impl App {
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn new() -> (Self, Task<Message>) {
        let mut settings = Settings::load_or_default();
        if let Ok(source) = std::env::var("EXAM_RESULTS_SOURCE") {
            settings.dataset_source = source;
        }

        let loader = Arc::new(DatasetLoader::from_source(DatasetSource::parse(
            &settings.dataset_source,
        )));

        let now = chrono::Local::now();
        let mut clock = Clock::default();
        clock.tick(&now);

        let app = App {
            loader: loader.clone(),
            printer: Printer::new(settings.print_command.as_str()),
            leaderboard_size: settings.leaderboard_size,
            clock,
            year: current_year(&now),
            exam_input: String::new(),
            feedback: None,
            searching: false,
            panel: DetailPanel::new(settings.fail_keyword.as_str()),
            pending_print: None,
            leaderboard: LeaderboardView::Loading,
            leaderboard_shown_at: None,
        };

        (
            app,
            Task::perform(load_in_background(loader), Message::DatasetLoaded),
        )
    }

    /// Render the leaderboard once, from a freshly fetched dataset.
    fn show_leaderboard(&mut self, loaded: &Loaded) {
        if loaded.outcome != LoadOutcome::Fresh {
            return;
        }
        self.leaderboard = leaderboard::render(&loaded.dataset, self.leaderboard_size);
        self.leaderboard_shown_at = Some(Instant::now());
    }

    /// Whether any leaderboard card is still fading in.
    fn leaderboard_animating(&self, now: Instant) -> bool {
        let (Some(shown), LeaderboardView::Cards(cards)) =
            (self.leaderboard_shown_at, &self.leaderboard)
        else {
            return false;
        };
        let last_delay = cards.last().map(|c| c.entrance_delay).unwrap_or_default();
        now.saturating_duration_since(shown) < last_delay + CARD_FADE
    }

    fn card_alpha(&self, card: &LeaderboardCard, now: Instant) -> f32 {
        let Some(shown) = self.leaderboard_shown_at else {
            return 1.0;
        };
        let elapsed = now.saturating_duration_since(shown);
        let visible_for = elapsed.saturating_sub(card.entrance_delay);
        (visible_for.as_secs_f32() / CARD_FADE.as_secs_f32()).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone)]
enum Message {
    // Background loading
    DatasetLoaded(Result<Loaded, LoadError>),

    // Search form
    ExamInputChanged(String),
    Submit,
    SearchLoaded {
        exam_number: String,
        result: Result<Loaded, LoadError>,
    },

    // Detail panel
    Print,

    // Timers
    ClockTick,
    Frame,
}

// ============================================================================
// Update
// ============================================================================

impl App {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- Background loading --
            Message::DatasetLoaded(result) => {
                match &result {
                    Ok(loaded) => self.show_leaderboard(loaded),
                    Err(e) => self.leaderboard = LeaderboardView::Failed(e.to_string()),
                }
                Task::none()
            }

            // -- Search form --
            Message::ExamInputChanged(v) => {
                self.exam_input = v;
                Task::none()
            }
            Message::Submit => {
                let exam_number = match search::validate(&self.exam_input) {
                    Ok(n) => n,
                    Err(outcome) => {
                        let feedback =
                            search::apply(&outcome, &mut self.panel, String::new(), Instant::now());
                        self.feedback = Some(feedback);
                        return Task::none();
                    }
                };
                self.searching = true;
                Task::perform(load_in_background(self.loader.clone()), move |result| {
                    Message::SearchLoaded {
                        exam_number,
                        result,
                    }
                })
            }
            Message::SearchLoaded {
                exam_number,
                result,
            } => {
                self.searching = false;
                if let Ok(loaded) = &result {
                    self.show_leaderboard(loaded);
                }
                let outcome = search::resolve(
                    result.as_ref().map(|l| l.dataset.as_ref()),
                    &exam_number,
                );
                let stamp = format_full_datetime(&chrono::Local::now());
                self.feedback = Some(search::apply(
                    &outcome,
                    &mut self.panel,
                    stamp,
                    Instant::now(),
                ));
                Task::none()
            }

            // -- Detail panel --
            Message::Print => {
                let stamp = format_full_datetime(&chrono::Local::now());
                if let Some(job) = self.panel.print(stamp, Instant::now()) {
                    self.pending_print = Some(job);
                }
                Task::none()
            }

            // -- Timers --
            Message::ClockTick => {
                self.clock.tick(&chrono::Local::now());
                Task::none()
            }
            Message::Frame => {
                let now = Instant::now();
                if self.panel.exit_elapsed(now) {
                    self.panel.finish_exit();
                }
                if self.pending_print.as_ref().is_some_and(|j| j.is_due(now)) {
                    if let Some(job) = self.pending_print.take() {
                        if let Err(e) = self.printer.print(&job) {
                            log::warn!("Print failed: {:#}", e);
                            self.feedback = Some(Feedback::error(format!("Printing failed: {}", e)));
                        }
                    }
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let clock = iced::time::every(TICK_INTERVAL).map(|_| Message::ClockTick);

        let now = Instant::now();
        let animating = self.panel.is_animating(now)
            || self.pending_print.is_some()
            || self.leaderboard_animating(now);

        if animating {
            Subscription::batch([clock, iced::window::frames().map(|_| Message::Frame)])
        } else {
            clock
        }
    }
}

// ============================================================================
// View
// ============================================================================

impl App {
    fn view(&self) -> Element<'_, Message> {
        let now = Instant::now();

        let header = row![
            column![
                text("Exam Results").size(28),
                text("Look up a student's result by exam number").size(14),
            ]
            .spacing(4)
            .width(Fill),
            column![
                text(&self.clock.date).size(14),
                text(&self.clock.time).size(20),
            ]
            .spacing(2)
            .align_x(iced::Alignment::End),
        ]
        .align_y(Center);

        let footer = text(format!("© {} Exam Results", self.year))
            .size(12)
            .color(MUTED_COLOR);

        let body = column![
            self.view_search(),
            self.view_panel(now),
            rule::horizontal(1),
            self.view_leaderboard(now),
        ]
        .spacing(20);

        column![
            container(header).padding([10, 20]),
            rule::horizontal(1),
            scrollable(container(body).padding(20).width(Fill)).height(Fill),
            container(footer).padding([6, 20]),
        ]
        .into()
    }

    // -- Search form --
    fn view_search(&self) -> Element<'_, Message> {
        let input = text_input("Exam number", &self.exam_input)
            .on_input(Message::ExamInputChanged)
            .on_submit(Message::Submit)
            .width(240);

        let mut search_btn = button(text(if self.searching { "Searching..." } else { "Search" }));
        if !self.searching {
            search_btn = search_btn.on_press(Message::Submit);
        }

        let print_btn = button(text("Print")).on_press_maybe(if self.panel.print_enabled() {
            Some(Message::Print)
        } else {
            None
        });

        let feedback: Element<'_, Message> = match &self.feedback {
            Some(fb) => {
                let color = match fb.kind {
                    FeedbackKind::Success => SUCCESS_COLOR,
                    FeedbackKind::Error => ERROR_COLOR,
                };
                text(&fb.message).size(14).color(color).into()
            }
            None => column![].into(),
        };

        column![
            row![text("Exam number:").width(130), input, search_btn, print_btn]
                .spacing(10)
                .align_y(Center),
            feedback,
        ]
        .spacing(8)
        .into()
    }

    // -- Detail panel --
    fn view_panel(&self, now: Instant) -> Element<'_, Message> {
        if self.panel.is_hidden() {
            return column![].into();
        }

        let alpha = self.panel.opacity(now);
        let v = self.panel.view();
        let status_color = if v.status_fail { ERROR_COLOR } else { SUCCESS_COLOR };

        let mut fields = column![
            field_row("Name", &v.name, TEXT_COLOR, alpha),
            field_row("Grade", &v.grade, TEXT_COLOR, alpha),
            field_row("Exam number", &v.exam_number, TEXT_COLOR, alpha),
            field_row("Total", &v.total, TEXT_COLOR, alpha),
            field_row("Evaluation", &v.evaluation, TEXT_COLOR, alpha),
            field_row("Status", &v.status, status_color, alpha),
            field_row("Department", &v.department, TEXT_COLOR, alpha),
        ]
        .spacing(6);

        if !self.panel.stamp().is_empty() {
            fields = fields.push(
                text(format!("Printed: {}", self.panel.stamp()))
                    .size(12)
                    .color(faded(MUTED_COLOR, alpha)),
            );
        }

        container(fields)
            .padding(16)
            .width(Fill)
            .style(container::rounded_box)
            .into()
    }

    // -- Leaderboard --
    fn view_leaderboard(&self, now: Instant) -> Element<'_, Message> {
        let title = text("Top Students").size(20);

        let content: Element<'_, Message> = match &self.leaderboard {
            LeaderboardView::Loading => text("Loading results...").size(13).color(MUTED_COLOR).into(),
            LeaderboardView::Cards(cards) => {
                let rows: Vec<Element<'_, Message>> = cards
                    .chunks(CARDS_PER_ROW)
                    .map(|chunk| {
                        row(chunk
                            .iter()
                            .map(|card| leaderboard_card(card, self.card_alpha(card, now))))
                        .spacing(12)
                        .into()
                    })
                    .collect();
                column(rows).spacing(12).into()
            }
            other => text(other.fallback_text().unwrap_or_default().to_string())
                .size(13)
                .color(MUTED_COLOR)
                .into(),
        };

        column![title, content].spacing(12).into()
    }
}

// ============================================================================
// Helper widgets
// ============================================================================

fn faded(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}

/// Render a label/value row of the detail panel.
fn field_row<'a>(label: &'a str, value: &'a str, color: Color, alpha: f32) -> Element<'a, Message> {
    row![
        text(label).size(13).width(130).color(faded(MUTED_COLOR, alpha)),
        text(value).size(15).color(faded(color, alpha)),
    ]
    .spacing(10)
    .align_y(Center)
    .into()
}

/// Render one ranked student card.
fn leaderboard_card(card: &LeaderboardCard, alpha: f32) -> Element<'_, Message> {
    let body = column![
        text(format!("#{}", card.rank))
            .size(18)
            .color(faded(SUCCESS_COLOR, alpha)),
        row![
            text(&card.name).size(15).color(faded(TEXT_COLOR, alpha)).width(Fill),
            text(&card.total).size(14).color(faded(TEXT_COLOR, alpha)),
        ]
        .spacing(6),
        text(&card.grade).size(12).color(faded(MUTED_COLOR, alpha)),
        row![
            text(&card.evaluation).size(12).color(faded(MUTED_COLOR, alpha)).width(Fill),
            text(&card.department).size(12).color(faded(MUTED_COLOR, alpha)),
        ]
        .spacing(6),
    ]
    .spacing(4);

    container(body)
        .padding(12)
        .width(200)
        .style(container::rounded_box)
        .into()
}
