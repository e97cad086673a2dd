use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};

use crate::classifier::classify;
use crate::fmt::{money, short_date};
use crate::form::TransactionForm;
use crate::gesture::carousel::{Carousel, CarouselEffect, CarouselEvent, Direction};
use crate::gesture::swipe::{Swipe, SwipeEffect, SwipeEvent, SwipeState};
use crate::gesture::{Driver, Pointer, PointerKind};
use crate::keypad::Key;
use crate::models::{Category, Transaction};
use crate::months::{available_months, in_month, month_key, summarize};
use crate::store::Store;
use crate::tui::{self, DELETE_STYLE, FADED_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

/// Terminal cells are mapped to pixels so gesture thresholds keep their meaning.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;
const MOUSE_POINTER_ID: u64 = 1;
const FRAME_MS: u64 = 16;
const IDLE_POLL_MS: u64 = 250;
const CHART_HEIGHT: u16 = 11;

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Linear interpolation of a horizontal offset toward its latest target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tween {
    from: f64,
    to: f64,
    start_ms: u64,
    duration_ms: u64,
}

impl Tween {
    fn set(&mut self, px: f64, animate_ms: u64, now_ms: u64) {
        let current = self.value(now_ms);
        *self = Tween {
            from: current,
            to: px,
            start_ms: now_ms,
            duration_ms: animate_ms,
        };
    }

    fn value(&self, now_ms: u64) -> f64 {
        let end = self.start_ms + self.duration_ms;
        if self.duration_ms == 0 || now_ms >= end {
            return self.to;
        }
        let t = now_ms.saturating_sub(self.start_ms) as f64 / self.duration_ms as f64;
        self.from + (self.to - self.from) * t
    }

    fn animating(&self, now_ms: u64) -> bool {
        now_ms < self.start_ms + self.duration_ms
    }

    fn cells(&self, now_ms: u64) -> i32 {
        (self.value(now_ms) / CELL_WIDTH_PX).round() as i32
    }
}

// ---------------------------------------------------------------------------
// Browser state
// ---------------------------------------------------------------------------

struct RowGesture {
    driver: Driver<Swipe>,
    offset: Tween,
    faded: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Chart,
    Row(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Amount,
    Date,
    Category,
    Location,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Name,
        FormField::Amount,
        FormField::Date,
        FormField::Category,
        FormField::Location,
    ];

    fn step(self, forward: bool) -> FormField {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let n = Self::ORDER.len();
        Self::ORDER[if forward { (i + 1) % n } else { (i + n - 1) % n }]
    }
}

enum BrowseMode {
    Normal,
    Detail(String),
    Form {
        form: TransactionForm,
        field: FormField,
        category_touched: bool,
    },
}

pub enum BrowseAction {
    Continue,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
struct Areas {
    chart: Rect,
    list: Rect,
}

pub struct MonthBrowser {
    store: Store,
    symbol: String,
    today: NaiveDate,
    carousel: Driver<Carousel>,
    chart_offset: Tween,
    tooltips_hidden_until: u64,
    rows: HashMap<String, RowGesture>,
    active: Option<Target>,
    selected: usize,
    scroll: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    last_deleted: Vec<String>,
    areas: Areas,
    screen: Rect,
}

impl MonthBrowser {
    pub fn new(store: Store, symbol: String, today: NaiveDate, month: Option<&str>) -> Self {
        let months = available_months(store.transactions(), today);
        let wanted = month.map(str::to_string).unwrap_or_else(|| month_key(today));
        let index = months
            .iter()
            .position(|m| *m == wanted)
            .unwrap_or(months.len().saturating_sub(1));
        Self {
            store,
            symbol,
            today,
            carousel: Driver::new(Carousel::new(months, index, 0.0)),
            chart_offset: Tween::default(),
            tooltips_hidden_until: 0,
            rows: HashMap::new(),
            active: None,
            selected: 0,
            scroll: 0,
            mode: BrowseMode::Normal,
            status_message: None,
            last_deleted: Vec::new(),
            areas: Areas::default(),
            screen: Rect::default(),
        }
    }

    pub fn month(&self) -> String {
        self.carousel
            .machine()
            .month()
            .map(str::to_string)
            .unwrap_or_else(|| month_key(self.today))
    }

    fn visible(&self) -> Vec<&Transaction> {
        in_month(self.store.transactions(), &self.month())
    }

    fn selected_id(&self) -> Option<String> {
        self.visible().get(self.selected).map(|t| t.id.clone())
    }

    pub fn run(&mut self) -> io::Result<()> {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        crossterm::execute!(io::stdout(), EnableMouseCapture)?;
        let result = self.event_loop(&mut terminal);
        let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let clock = Instant::now();
        let now_ms = |clock: &Instant| clock.elapsed().as_millis() as u64;

        loop {
            let now = now_ms(&clock);
            self.tick(now);
            terminal.draw(|frame| self.draw_frame(frame, now))?;

            let wait = self.next_wakeup(now_ms(&clock));
            if !event::poll(wait)? {
                continue;
            }
            let now = now_ms(&clock);
            match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                }) => {
                    if kind != KeyEventKind::Press {
                        continue;
                    }
                    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                        break;
                    }
                    if let BrowseAction::Close = self.handle_key_event(code, now) {
                        break;
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse(mouse, now),
                Event::Resize(width, height) => self.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }
        self.carousel.unmount();
        for row in self.rows.values_mut() {
            row.driver.unmount();
        }
        Ok(())
    }

    /// How long the event loop may block before something needs redrawing.
    fn next_wakeup(&self, now_ms: u64) -> Duration {
        let animating = self.chart_offset.animating(now_ms)
            || self.rows.values().any(|r| r.offset.animating(now_ms))
            || now_ms < self.tooltips_hidden_until;
        if animating {
            return Duration::from_millis(FRAME_MS);
        }
        let deadline = self
            .rows
            .values()
            .filter_map(|r| r.driver.next_deadline())
            .chain(self.carousel.next_deadline())
            .min();
        match deadline {
            Some(at) => Duration::from_millis(at.saturating_sub(now_ms).min(IDLE_POLL_MS)),
            None => Duration::from_millis(IDLE_POLL_MS),
        }
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    fn layout(area: Rect) -> [Rect; 5] {
        Layout::vertical([
            Constraint::Length(1),            // title
            Constraint::Length(CHART_HEIGHT), // chart
            Constraint::Fill(1),              // list
            Constraint::Length(1),            // status
            Constraint::Length(1),            // keys
        ])
        .areas(area)
    }

    /// Recompute hit areas and tell the gestures their new widths.
    pub fn resize(&mut self, area: Rect) {
        if area == self.screen {
            return;
        }
        self.screen = area;
        let [_, chart, list, _, _] = Self::layout(area);
        self.areas = Areas { chart, list };
        let chart_px = f64::from(chart.width) * CELL_WIDTH_PX;
        let list_px = f64::from(list.width) * CELL_WIDTH_PX;
        self.carousel.push(CarouselEvent::Resize { width: chart_px });
        for row in self.rows.values_mut() {
            row.driver.push(SwipeEvent::Resize { width: list_px });
        }
    }

    fn list_capacity(&self) -> usize {
        self.areas.list.height.saturating_sub(1) as usize
    }

    fn keep_selection_visible(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        let cap = self.list_capacity().max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + cap {
            self.scroll = self.selected + 1 - cap;
        }
    }

    fn row_at(&self, column: u16, row: u16) -> Option<(usize, String)> {
        let list = self.areas.list;
        let inside = column >= list.x
            && column < list.x + list.width
            && row > list.y
            && row < list.y + list.height;
        if !inside {
            return None;
        }
        let index = self.scroll + (row - list.y - 1) as usize;
        self.visible().get(index).map(|t| (index, t.id.clone()))
    }

    fn in_chart(&self, column: u16, row: u16) -> bool {
        let chart = self.areas.chart;
        column >= chart.x && column < chart.x + chart.width && row >= chart.y && row < chart.y + chart.height
    }

    // -----------------------------------------------------------------------
    // Gesture plumbing
    // -----------------------------------------------------------------------

    /// Fire due timers on every gesture and apply what they emit.
    pub fn tick(&mut self, now_ms: u64) {
        let effects = self.carousel.advance(now_ms);
        self.apply_carousel(effects, now_ms);

        let ids: Vec<String> = self.rows.keys().cloned().collect();
        for id in ids {
            let effects = match self.rows.get_mut(&id) {
                Some(row) => row.driver.advance(now_ms),
                None => continue,
            };
            self.apply_swipe(&id, effects, now_ms);
        }

        self.rows.retain(|_, row| {
            row.driver.machine().state() != SwipeState::Idle
                || row.driver.has_pending_timers()
                || row.offset.animating(now_ms)
                || row.offset.to != 0.0
        });
    }

    fn apply_carousel(&mut self, effects: Vec<CarouselEffect>, now_ms: u64) {
        for effect in effects {
            match effect {
                CarouselEffect::Offset { px, animate_ms } => {
                    self.chart_offset.set(px, animate_ms, now_ms)
                }
                CarouselEffect::SuppressTooltips { ms } => {
                    self.tooltips_hidden_until = now_ms + ms;
                }
                CarouselEffect::MonthChanged { month, .. } => {
                    tracing::debug!(%month, "month changed");
                    self.selected = 0;
                    self.scroll = 0;
                    // Rows mid-commit stay until their delete fires.
                    self.rows.retain(|_, row| {
                        if row.driver.machine().state() == SwipeState::Committing {
                            return true;
                        }
                        row.driver.unmount();
                        false
                    });
                }
                CarouselEffect::CapturePointer(_) | CarouselEffect::ReleasePointer(_) => {}
            }
        }
    }

    fn apply_swipe(&mut self, id: &str, effects: Vec<SwipeEffect>, now_ms: u64) {
        for effect in effects {
            match effect {
                SwipeEffect::Offset { px, animate_ms } => {
                    if let Some(row) = self.rows.get_mut(id) {
                        row.offset.set(px, animate_ms, now_ms);
                    }
                }
                SwipeEffect::FadeContent => {
                    if let Some(row) = self.rows.get_mut(id) {
                        row.faded = true;
                    }
                }
                SwipeEffect::Delete => {
                    if let Some(mut row) = self.rows.remove(id) {
                        row.driver.unmount();
                    }
                    self.delete_ids(vec![id.to_string()]);
                }
                SwipeEffect::OpenDetail => self.mode = BrowseMode::Detail(id.to_string()),
                SwipeEffect::CapturePointer(_)
                | SwipeEffect::ReleasePointer(_)
                | SwipeEffect::PreventDefault
                | SwipeEffect::SwallowClick => {}
            }
        }
    }

    fn dispatch_row(&mut self, id: &str, event: SwipeEvent, now_ms: u64) {
        let width = f64::from(self.areas.list.width) * CELL_WIDTH_PX;
        let row = self.rows.entry(id.to_string()).or_insert_with(|| RowGesture {
            driver: Driver::new(Swipe::new(width)),
            offset: Tween::default(),
            faded: false,
        });
        let effects = row.driver.dispatch(event, now_ms);
        self.apply_swipe(id, effects, now_ms);
    }

    /// Terminal mouse reports arrive as touch: a terminal cannot tell them apart.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now_ms: u64) {
        if !matches!(self.mode, BrowseMode::Normal) {
            return;
        }
        let pointer = Pointer {
            id: MOUSE_POINTER_ID,
            kind: PointerKind::Touch,
            x: f64::from(mouse.column) * CELL_WIDTH_PX,
            y: f64::from(mouse.row) * CELL_HEIGHT_PX,
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.in_chart(mouse.column, mouse.row) {
                    self.active = Some(Target::Chart);
                    let effects = self.carousel.dispatch(CarouselEvent::Down(pointer), now_ms);
                    self.apply_carousel(effects, now_ms);
                } else if let Some((index, id)) = self.row_at(mouse.column, mouse.row) {
                    self.selected = index;
                    self.active = Some(Target::Row(id.clone()));
                    self.dispatch_row(&id, SwipeEvent::Down(pointer), now_ms);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.active.clone() {
                Some(Target::Chart) => {
                    let effects = self.carousel.dispatch(CarouselEvent::Move(pointer), now_ms);
                    self.apply_carousel(effects, now_ms);
                }
                Some(Target::Row(id)) => self.dispatch_row(&id, SwipeEvent::Move(pointer), now_ms),
                None => {}
            },
            MouseEventKind::Up(MouseButton::Left) => match self.active.take() {
                Some(Target::Chart) => {
                    let effects = self.carousel.dispatch(CarouselEvent::Up(pointer), now_ms);
                    self.apply_carousel(effects, now_ms);
                }
                Some(Target::Row(id)) => {
                    self.dispatch_row(&id, SwipeEvent::Up(pointer), now_ms);
                    let same_row = self
                        .row_at(mouse.column, mouse.row)
                        .is_some_and(|(_, under)| under == id);
                    if same_row && self.rows.contains_key(&id) {
                        self.dispatch_row(&id, SwipeEvent::Click, now_ms);
                    }
                }
                None => {}
            },
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Store mutations
    // -----------------------------------------------------------------------

    fn after_mutation(&mut self) {
        if let Some(e) = self.store.take_persist_error() {
            self.status_message = Some(format!("Not saved: {e}"));
        }
        let months = available_months(self.store.transactions(), self.today);
        self.carousel.push(CarouselEvent::SetMonths(months));
        self.keep_selection_visible();
    }

    fn delete_ids(&mut self, ids: Vec<String>) {
        let count = self.store.delete(&ids, Utc::now());
        if count > 0 {
            self.status_message = Some(format!("{count} moved to trash (u to undo)"));
            self.last_deleted = ids;
        }
        self.after_mutation();
    }

    fn undo_delete(&mut self) {
        if self.last_deleted.is_empty() {
            self.status_message = Some("Nothing to undo".to_string());
            return;
        }
        let ids = std::mem::take(&mut self.last_deleted);
        let result = self.store.restore(&ids, Utc::now());
        self.status_message = Some(match result.skipped {
            0 => format!("{} restored", result.restored),
            skipped => format!("{} restored, {skipped} already present", result.restored),
        });
        self.after_mutation();
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    pub fn handle_key_event(&mut self, code: KeyCode, now_ms: u64) -> BrowseAction {
        match self.mode {
            BrowseMode::Normal => {}
            BrowseMode::Detail(_) => {
                if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.mode = BrowseMode::Normal;
                }
                return BrowseAction::Continue;
            }
            BrowseMode::Form { .. } => {
                self.handle_form_key(code);
                return BrowseAction::Continue;
            }
        }

        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
            KeyCode::Left | KeyCode::Char('p') => self.step_month(Direction::Previous, now_ms),
            KeyCode::Right | KeyCode::Char('n') => self.step_month(Direction::Next, now_ms),
            KeyCode::Down => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
                self.keep_selection_visible();
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.keep_selection_visible();
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.mode = BrowseMode::Detail(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.delete_ids(vec![id]);
                }
            }
            KeyCode::Char('u') => self.undo_delete(),
            KeyCode::Char('a') => {
                let date = chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string();
                self.mode = BrowseMode::Form {
                    form: TransactionForm::new(&date),
                    field: FormField::Name,
                    category_touched: false,
                };
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    fn step_month(&mut self, direction: Direction, now_ms: u64) {
        if !self.carousel.machine().has_neighbor(direction) {
            self.status_message = Some("No more months".to_string());
            return;
        }
        let effects = self.carousel.dispatch(CarouselEvent::Step(direction), now_ms);
        self.apply_carousel(effects, now_ms);
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        let BrowseMode::Form {
            form,
            field,
            category_touched,
        } = &mut self.mode
        else {
            return;
        };

        match code {
            KeyCode::Esc => {
                self.mode = BrowseMode::Normal;
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            KeyCode::Tab | KeyCode::Down => *field = field.step(true),
            KeyCode::BackTab | KeyCode::Up => *field = field.step(false),
            KeyCode::Left | KeyCode::Right if *field == FormField::Category => {
                let all = Category::ALL;
                let i = all.iter().position(|c| *c == form.category).unwrap_or(0);
                let n = all.len();
                form.category = all[if code == KeyCode::Right { (i + 1) % n } else { (i + n - 1) % n }];
                *category_touched = true;
            }
            KeyCode::Backspace => match field {
                FormField::Name => {
                    form.name.pop();
                }
                FormField::Amount => form.amount.press(Key::Backspace),
                FormField::Date => {
                    form.date.pop();
                }
                FormField::Location => {
                    form.location.pop();
                }
                FormField::Category => {}
            },
            KeyCode::Delete if *field == FormField::Amount => form.amount.press(Key::Clear),
            KeyCode::Char(c) => match field {
                FormField::Name => form.name.push(c),
                FormField::Amount => {
                    if let Some(key) = Key::from_char(c) {
                        form.amount.press(key);
                    }
                }
                FormField::Date => form.date.push(c),
                FormField::Location => form.location.push(c),
                FormField::Category => {}
            },
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let BrowseMode::Form {
            form,
            category_touched,
            ..
        } = &self.mode
        else {
            return;
        };
        match form.done() {
            Err(errors) => self.status_message = Some(format!("Cannot save: {errors}")),
            Ok(mut draft) => {
                if !category_touched {
                    draft.category = classify(&draft.name).unwrap_or(draft.category);
                }
                let t = self.store.add(draft, Utc::now());
                self.mode = BrowseMode::Normal;
                self.status_message = Some(format!("Added {} {}", t.name, money(&self.symbol, t.amount)));
                self.after_mutation();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn draw_frame(&mut self, frame: &mut Frame, now_ms: u64) {
        let area = frame.area();
        self.resize(area);
        self.keep_selection_visible();
        let [title_area, chart_area, list_area, status_area, keys_area] = Self::layout(area);

        let carousel = self.carousel.machine();
        let title = Line::from(vec![
            Span::styled(format!("Bills \u{00b7} {}", self.month()), HEADER_STYLE),
            Span::styled(
                format!("  ({}/{})", carousel.index() + 1, available_months(self.store.transactions(), self.today).len()),
                FOOTER_STYLE,
            ),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);

        self.draw_chart(frame, chart_area, now_ms);
        self.draw_list(frame, list_area, now_ms);

        let status = self.status_message.clone().unwrap_or_default();
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys = match self.mode {
            BrowseMode::Normal => "\u{2190}/\u{2192}:month  \u{2191}/\u{2193}:select  Enter:detail  d:delete  u:undo  a:add  q:quit  (drag chart or swipe rows)",
            BrowseMode::Detail(_) => "Esc:close",
            BrowseMode::Form { .. } => "Tab:next field  \u{2190}/\u{2192}:category  =:evaluate  Enter:save  Esc:cancel",
        };
        frame.render_widget(Paragraph::new(keys).style(FOOTER_STYLE), keys_area);

        match &self.mode {
            BrowseMode::Normal => {}
            BrowseMode::Detail(id) => self.draw_detail(frame, area, id),
            BrowseMode::Form { form, field, .. } => self.draw_form(frame, area, form, *field),
        }
    }

    /// Render `widget` shifted horizontally by `cells`, clipped to `area`.
    fn render_shifted(frame: &mut Frame, area: Rect, cells: i32, paragraph: Paragraph) {
        if cells >= 0 {
            let shift = (cells as u16).min(area.width);
            let target = Rect {
                x: area.x + shift,
                width: area.width - shift,
                ..area
            };
            frame.render_widget(paragraph, target);
        } else {
            let skip = cells.unsigned_abs().min(u32::from(u16::MAX)) as u16;
            frame.render_widget(paragraph.scroll((0, skip)), area);
        }
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect, now_ms: u64) {
        let summary = summarize(self.store.transactions(), &self.month());
        let show_values = now_ms >= self.tooltips_hidden_until;
        let label_width = 6usize;
        let value_width = 14usize;
        let bar_room = (area.width as usize).saturating_sub(label_width + value_width).max(1);
        let max = summary
            .by_category
            .first()
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0);

        let mut lines = vec![Line::from(vec![
            Span::raw("Total "),
            tui::money_span(&self.symbol, summary.total),
            Span::styled(format!("  {} transaction(s)", summary.count), FOOTER_STYLE),
        ])];
        if summary.by_category.is_empty() {
            lines.push(Line::from(Span::styled("  No spending this month", FOOTER_STYLE)));
        }
        for (category, amount) in summary.by_category.iter().take(CHART_HEIGHT as usize - 1) {
            let len = if max > 0.0 {
                ((amount / max) * bar_room as f64).round().max(1.0) as usize
            } else {
                0
            };
            let mut spans = vec![
                Span::raw(format!("{:<4}  ", category.label())),
                Span::styled(
                    "\u{2588}".repeat(len),
                    Style::new().fg(tui::category_color(*category)),
                ),
            ];
            if show_values {
                spans.push(Span::raw(format!(" {}", money(&self.symbol, *amount))));
            }
            lines.push(Line::from(spans));
        }
        Self::render_shifted(frame, area, self.chart_offset.cells(now_ms), Paragraph::new(lines));
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, now_ms: u64) {
        frame.render_widget(
            Paragraph::new("Date         Name                          Category        Amount").style(HEADER_STYLE),
            Rect { height: 1.min(area.height), ..area },
        );

        let cap = self.list_capacity();
        let name_width = (area.width as usize).saturating_sub(11 + 2 + 8 + 14 + 3).max(8);
        let visible = self.visible();
        for (slot, (index, t)) in visible.iter().enumerate().skip(self.scroll).take(cap).enumerate() {
            let row_area = Rect {
                y: area.y + 1 + slot as u16,
                height: 1,
                ..area
            };
            let gesture = self.rows.get(&t.id);
            let cells = gesture.map(|g| g.offset.cells(now_ms)).unwrap_or(0);
            let faded = gesture.is_some_and(|g| g.faded);

            let name: String = t.name.chars().take(name_width).collect();
            let style = if faded {
                FADED_STYLE
            } else if index == self.selected {
                SELECTED_STYLE
            } else {
                Style::new()
            };
            let line = Line::from(vec![
                Span::raw(format!("{:<11}  ", short_date(&t.date))),
                Span::raw(format!("{name:<name_width$}  ")),
                Span::styled(format!("{:<4}  ", t.category.label()), Style::new().fg(tui::category_color(t.category))),
                tui::money_span(&self.symbol, t.amount),
            ])
            .style(style);

            if cells < 0 {
                let revealed = cells.unsigned_abs().min(u32::from(row_area.width)) as u16;
                let reveal_area = Rect {
                    x: row_area.x + row_area.width - revealed,
                    width: revealed,
                    ..row_area
                };
                frame.render_widget(Paragraph::new(" Delete").style(DELETE_STYLE), reveal_area);
                let content = Rect {
                    width: row_area.width - revealed,
                    ..row_area
                };
                Self::render_shifted(frame, content, cells, Paragraph::new(line));
            } else {
                frame.render_widget(Paragraph::new(line), row_area);
            }
        }
        if visible.is_empty() && area.height > 1 {
            frame.render_widget(
                Paragraph::new("  No transactions").style(FOOTER_STYLE),
                Rect { y: area.y + 1, height: 1, ..area },
            );
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, id: &str) {
        let Some(t) = self.store.get(id) else {
            return;
        };
        let popup = tui::centered(area, 60, 10);
        let (name, _) = tui::wrap_text(&t.name, popup.width.saturating_sub(13) as usize);
        let mut lines: Vec<Line> = name
            .lines()
            .enumerate()
            .map(|(i, part)| Line::from(format!("{:<11}{part}", if i == 0 { "Name:" } else { "" })))
            .collect();
        lines.push(Line::from(vec![Span::raw("Amount:    "), tui::money_span(&self.symbol, t.amount)]));
        lines.push(Line::from(format!("Date:      {}", t.date)));
        lines.push(Line::from(format!("Category:  {} ({})", t.category.label(), t.category.english())));
        lines.push(Line::from(format!("Location:  {}", t.location.as_deref().unwrap_or("\u{2014}"))));
        lines.push(Line::from(Span::styled(format!("ID:        {}", t.id), FOOTER_STYLE)));

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Transaction ")),
            popup,
        );
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &TransactionForm, field: FormField) {
        let popup = tui::centered(area, 56, 9);
        let row = |label: &str, value: String, this: FormField| {
            let cursor = if this == field { "\u{2588}" } else { "" };
            let style = if this == field { SELECTED_STYLE } else { Style::new() };
            Line::from(Span::styled(format!("{label:<10}{value}{cursor}"), style))
        };
        let preview = form.amount.value();
        let lines = vec![
            row("Name", form.name.clone(), FormField::Name),
            row(
                "Amount",
                format!("{}  = {}", form.amount.display(), money(&self.symbol, preview)),
                FormField::Amount,
            ),
            row("Date", form.date.clone(), FormField::Date),
            row("Category", format!("\u{2039} {} \u{203a}", form.category.label()), FormField::Category),
            row("Location", form.location.clone(), FormField::Location),
        ];
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" New transaction ")),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::carousel::SLIDE_MS;
    use crate::models::Draft;
    use crate::store::MemoryStorage;

    const SWITCH_SETTLE_MS: u64 = 2 * SLIDE_MS;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn browser_with(dates: &[(&str, &str, f64)]) -> MonthBrowser {
        let mut store = Store::open(Box::new(MemoryStorage::default()), Utc::now());
        for (name, date, amount) in dates {
            store.add(
                Draft {
                    name: name.to_string(),
                    category: Category::Other,
                    amount: *amount,
                    date: date.to_string(),
                    location: None,
                },
                Utc::now(),
            );
        }
        let mut browser = MonthBrowser::new(store, "¥".to_string(), today(), None);
        browser.resize(Rect::new(0, 0, 100, 30));
        browser.tick(0);
        browser
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn first_row_y(browser: &MonthBrowser) -> u16 {
        browser.areas.list.y + 1
    }

    #[test]
    fn test_opens_on_current_month() {
        let browser = browser_with(&[("Old", "2024-04-02T10:00", 5.0)]);
        assert_eq!(browser.month(), "2024-06");
        assert_eq!(browser.carousel.machine().index(), 1);
    }

    #[test]
    fn test_arrow_keys_page_months_with_animation() {
        let mut browser = browser_with(&[("Old", "2024-04-02T10:00", 5.0)]);
        browser.handle_key_event(KeyCode::Right, 0);
        assert_eq!(browser.status_message.as_deref(), Some("No more months"));

        browser.handle_key_event(KeyCode::Left, 0);
        assert_eq!(browser.month(), "2024-06");
        assert!(browser.tooltips_hidden_until > 0);
        browser.tick(SLIDE_MS);
        assert_eq!(browser.month(), "2024-04");
        browser.tick(SWITCH_SETTLE_MS);
        assert_eq!(browser.chart_offset.value(SWITCH_SETTLE_MS), 0.0);
    }

    #[test]
    fn test_dragging_chart_switches_month() {
        let mut browser = browser_with(&[("Old", "2024-05-02T10:00", 5.0)]);
        let y = browser.areas.chart.y + 2;
        browser.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20, y), 0);
        browser.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 50, y), 20);
        browser.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 50, y), 40);
        browser.tick(40 + SLIDE_MS);
        assert_eq!(browser.month(), "2024-05");
    }

    #[test]
    fn test_swipe_row_moves_it_to_trash() {
        let mut browser = browser_with(&[("Lunch", "2024-06-03T12:00", 15.0), ("Taxi", "2024-06-02T09:00", 30.0)]);
        let y = first_row_y(&browser);
        browser.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 90, y), 0);
        browser.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 30, y), 20);
        browser.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, y), 40);
        assert_eq!(browser.store.transactions().len(), 2);
        assert!(matches!(browser.mode, BrowseMode::Normal));

        browser.tick(40 + crate::gesture::swipe::COMMIT_DELAY_MS);
        assert_eq!(browser.store.transactions().len(), 1);
        assert_eq!(browser.store.trash()[0].transaction.name, "Lunch");

        browser.handle_key_event(KeyCode::Char('u'), 300);
        assert_eq!(browser.store.transactions().len(), 2);
        assert!(browser.store.trash().is_empty());
    }

    #[test]
    fn test_committed_swipe_survives_month_switch() {
        let mut browser = browser_with(&[
            ("Old", "2024-05-02T10:00", 5.0),
            ("Lunch", "2024-06-03T12:00", 15.0),
            ("Taxi", "2024-06-02T09:00", 30.0),
        ]);
        browser.handle_key_event(KeyCode::Left, 0);
        let y = first_row_y(&browser);
        browser.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 90, y), 0);
        browser.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 20, y), 50);
        browser.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 20, y), 100);
        assert!(browser
            .rows
            .values()
            .any(|row| row.driver.machine().state() == SwipeState::Committing));

        browser.tick(SLIDE_MS);
        assert_eq!(browser.month(), "2024-05");
        browser.tick(1_000);
        assert_eq!(browser.store.transactions().len(), 2);
        assert_eq!(browser.store.trash().len(), 1);
        assert_eq!(browser.store.trash()[0].transaction.name, "Lunch");
        assert!(browser.rows.is_empty());
    }

    #[test]
    fn test_short_swipe_springs_back() {
        let mut browser = browser_with(&[("Lunch", "2024-06-03T12:00", 15.0)]);
        let y = first_row_y(&browser);
        browser.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 90, y), 0);
        browser.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 70, y), 20);
        browser.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 70, y), 40);
        browser.tick(1_000);
        assert_eq!(browser.store.transactions().len(), 1);
        assert!(browser.rows.is_empty());
        assert!(matches!(browser.mode, BrowseMode::Normal));
    }

    #[test]
    fn test_tap_opens_detail() {
        let mut browser = browser_with(&[("Lunch", "2024-06-03T12:00", 15.0)]);
        let y = first_row_y(&browser);
        browser.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40, y), 0);
        browser.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 40, y), 50);
        browser.tick(500);
        assert!(matches!(browser.mode, BrowseMode::Detail(_)));
        browser.handle_key_event(KeyCode::Esc, 600);
        assert!(matches!(browser.mode, BrowseMode::Normal));
    }

    #[test]
    fn test_delete_key_and_undo() {
        let mut browser = browser_with(&[("Lunch", "2024-06-03T12:00", 15.0)]);
        browser.handle_key_event(KeyCode::Char('d'), 0);
        assert!(browser.store.transactions().is_empty());
        browser.handle_key_event(KeyCode::Char('u'), 10);
        assert_eq!(browser.store.transactions().len(), 1);
        assert_eq!(browser.status_message.as_deref(), Some("1 restored"));
    }

    #[test]
    fn test_add_form_uses_keypad_and_classifier() {
        let mut browser = browser_with(&[]);
        browser.handle_key_event(KeyCode::Char('a'), 0);
        for c in "Tokyo Pharmacy".chars() {
            browser.handle_key_event(KeyCode::Char(c), 0);
        }
        browser.handle_key_event(KeyCode::Tab, 0);
        for c in "12+3.5-1".chars() {
            browser.handle_key_event(KeyCode::Char(c), 0);
        }
        browser.handle_key_event(KeyCode::Tab, 0);
        for _ in 0..16 {
            browser.handle_key_event(KeyCode::Backspace, 0);
        }
        for c in "2024-06-10T08:00".chars() {
            browser.handle_key_event(KeyCode::Char(c), 0);
        }
        browser.handle_key_event(KeyCode::Enter, 0);

        assert!(matches!(browser.mode, BrowseMode::Normal));
        let t = &browser.store.transactions()[0];
        assert_eq!(t.amount, 14.5);
        assert_eq!(t.category, Category::Medical);
        assert_eq!(t.date, "2024-06-10T08:00");
    }

    #[test]
    fn test_form_reports_errors_and_stays_open() {
        let mut browser = browser_with(&[]);
        browser.handle_key_event(KeyCode::Char('a'), 0);
        browser.handle_key_event(KeyCode::Enter, 0);
        assert!(matches!(browser.mode, BrowseMode::Form { .. }));
        let status = browser.status_message.clone().unwrap_or_default();
        assert!(status.contains("name: required"));
        assert!(status.contains("amount: must be greater than zero"));
    }

    #[test]
    fn test_tween_interpolates() {
        let mut tween = Tween::default();
        tween.set(-400.0, 200, 0);
        assert_eq!(tween.value(100), -200.0);
        assert_eq!(tween.cells(200), -50);
        assert!(!tween.animating(200));
    }
}
