use crate::app::{App, View};
use crate::braille::BrailleCanvas;
use crate::chart::format_tick;
use crate::color::Rgb;
use crate::metric::Metric;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

const BUTTONS: [(Metric, &str); 2] = [
    (Metric::Energy, " [E] Energy "),
    (Metric::Impact, " [I] Impact "),
];
/// Columns left of the bar plot for tick labels
const AXIS_WIDTH: u16 = 8;
/// Rows under the bar plot for task labels
const LABEL_ROWS: u16 = 2;
const BORDER_COLOR: Color = Color::Rgb(80, 80, 80);
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const BAR_COLOR: Color = Color::Rgb(70, 130, 180);
const BAR_HOVER_COLOR: Color = Color::Rgb(253, 141, 60);
const PARTIAL_BLOCKS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];
const TITLE_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);
const TOOLTIP_STYLE: Style = Style::new().bg(Color::Rgb(250, 250, 250)).fg(Color::Black);

/// Screen regions, shared by drawing and mouse hit testing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Screen {
    pub toolbar: Rect,
    pub buttons: [Rect; 2],
    /// Inside of the bordered chart block
    pub body: Rect,
    /// Bar plot area inside `body`, without axis and labels
    pub plot: Rect,
    pub status: Rect,
}

impl Screen {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Toolbar
                Constraint::Min(3),    // Chart
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let toolbar = chunks[0];
        let body = Block::default().borders(Borders::ALL).inner(chunks[1]);

        let mut x = toolbar.x + 1;
        let buttons = BUTTONS.map(|(_, label)| {
            let width = label.chars().count() as u16;
            let rect = Rect::new(x, toolbar.y, width, 1).intersection(toolbar);
            x += rect.width + 1;
            rect
        });

        let axis = AXIS_WIDTH.min(body.width);
        let plot = Rect::new(
            body.x + axis,
            body.y,
            body.width - axis,
            body.height.saturating_sub(LABEL_ROWS),
        );

        Self {
            toolbar,
            buttons,
            body,
            plot,
            status: chunks[2],
        }
    }

    /// Metric of the toggle button at a terminal cell
    pub fn button_at(&self, col: u16, row: u16) -> Option<Metric> {
        self.buttons
            .iter()
            .zip(BUTTONS)
            .find(|(rect, _)| rect.contains(Position::new(col, row)))
            .map(|(_, (metric, _))| metric)
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let screen = app.screen;

    render_toolbar(frame, app, &screen);
    match app.view {
        View::Map => render_map(frame, app, &screen),
        View::Bar => render_bars(frame, app, &screen),
    }
    render_status_bar(frame, app, screen.status);

    if let Some((anchor, lines)) = app.tooltip() {
        let area = frame.area();
        render_tooltip(frame, anchor, &lines, area);
    }
}

fn render_toolbar(frame: &mut Frame, app: &App, screen: &Screen) {
    let buf = frame.buffer_mut();
    let map_view = app.view == View::Map;

    for (rect, (metric, label)) in screen.buttons.iter().zip(BUTTONS) {
        let style = if map_view && metric == app.metric() {
            let swatch = app.config.scales.for_metric(metric).color(f64::INFINITY);
            Style::default()
                .bg(swatch.into())
                .fg(text_on(swatch))
                .add_modifier(Modifier::BOLD)
        } else {
            DIM_STYLE.bg(Color::Rgb(40, 40, 40))
        };
        buf.set_stringn(rect.x, rect.y, label, rect.width as usize, style);
    }

    let tabs = Line::from(vec![
        view_tab("Map", app.view == View::Map),
        Span::styled(" | ", DIM_STYLE),
        view_tab("Tasks", app.view == View::Bar),
        Span::styled(" (Tab) ", DIM_STYLE),
    ]);
    let width = tabs.width() as u16;
    let toolbar = screen.toolbar;
    if width < toolbar.width {
        let area = Rect::new(toolbar.x + toolbar.width - width, toolbar.y, width, 1);
        frame.render_widget(Paragraph::new(tabs), area);
    }
}

/// Black or white, whichever reads better on `fill`
fn text_on(fill: Rgb) -> Color {
    if fill.luminance() > 0.5 {
        Color::Black
    } else {
        Color::White
    }
}

fn view_tab(name: &'static str, active: bool) -> Span<'static> {
    if active {
        Span::styled(name, TITLE_STYLE)
    } else {
        Span::styled(name, DIM_STYLE)
    }
}

fn chart_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(DIM_STYLE)
        .title(Span::styled(title, TITLE_STYLE))
}

fn render_map(frame: &mut Frame, app: &App, screen: &Screen) {
    let metric = app.metric();
    let title = format!(" {} by country ({}) ", metric.title(), metric.unit());
    let block = chart_block(title);
    frame.render_widget(block, block_area(screen));

    let highlight = app
        .highlighted()
        .map(|idx| app.map.outline(idx, &app.viewport));

    frame.render_widget(
        MapWidget {
            app,
            highlight: highlight.as_ref(),
        },
        screen.body,
    );

    render_legend(frame, app, screen.body);
}

/// Bordered area around `body`
fn block_area(screen: &Screen) -> Rect {
    Rect::new(
        screen.body.x.saturating_sub(1),
        screen.body.y.saturating_sub(1),
        screen.body.width + 2,
        screen.body.height + 2,
    )
}

/// Choropleth fill with half-block resolution, border and highlight overlays
struct MapWidget<'a> {
    app: &'a App,
    highlight: Option<&'a BrailleCanvas>,
}

impl MapWidget<'_> {
    fn fill(&self, idx: Option<usize>) -> Color {
        idx.and_then(|i| self.app.colors.get(i))
            .map(|&c| c.into())
            .unwrap_or(Color::Reset)
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = &self.app.frame;
        let rows = frame.rows.min(area.height as usize);
        let cols = frame.cols.min(area.width as usize);

        for row in 0..rows {
            for col in 0..cols {
                let [top, bottom] = frame.fill(col, row);
                let (top, bottom) = (self.fill(top), self.fill(bottom));
                let cell = &mut buf[(area.x + col as u16, area.y + row as u16)];

                if let Some(ch) = self.highlight.and_then(|h| h.glyph(col, row)) {
                    cell.set_char(ch).set_fg(HIGHLIGHT_COLOR).set_bg(bottom);
                } else if let Some(ch) = frame.borders.glyph(col, row) {
                    cell.set_char(ch).set_fg(BORDER_COLOR).set_bg(bottom);
                } else if top == bottom {
                    cell.set_char(' ').set_bg(bottom);
                } else {
                    cell.set_char('▀').set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

fn render_legend(frame: &mut Frame, app: &App, body: Rect) {
    const WIDTH: u16 = 30;
    const HEIGHT: u16 = 6;
    if body.width < WIDTH + 2 || body.height < HEIGHT + 2 {
        return;
    }

    let metric = app.metric();
    let scale = app.config.scales.for_metric(metric);
    let area = Rect::new(body.x + 1, body.y + body.height - HEIGHT - 1, WIDTH, HEIGHT);
    let ramp_width = (WIDTH - 2) as usize;

    let ramp: Vec<Span> = (0..ramp_width)
        .map(|i| {
            let t = i as f64 / (ramp_width - 1) as f64;
            let value = scale.min + t * (scale.max - scale.min);
            Span::styled(" ", Style::default().bg(scale.color(value).into()))
        })
        .collect();

    let min_label = metric.format_number(scale.min);
    let max_label = metric.format_number(scale.max);
    let gap = ramp_width.saturating_sub(min_label.len() + max_label.len());
    let mid: Rgb = scale.color((scale.min + scale.max) / 2.0);

    let lines = vec![
        Line::from(Span::styled(
            format!("{} ({})", metric.code(), metric.unit()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(ramp),
        Line::from(format!("{min_label}{}{max_label}", " ".repeat(gap))),
        Line::from(vec![
            Span::styled("  ", Style::default().bg(mid.brighter(1.0).into())),
            Span::raw(" regional average  "),
            Span::styled("  ", Style::default().bg(app.config.no_data.into())),
            Span::raw(" no data"),
        ]),
    ];

    let legend = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(DIM_STYLE),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(legend, area);
}

fn render_bars(frame: &mut Frame, app: &App, screen: &Screen) {
    let block = chart_block(" Average energy per task (Wh) ".to_string());
    frame.render_widget(block, block_area(screen));

    let layout = &app.bar_layout;
    let plot = screen.plot;
    let body = screen.body;
    if plot.width == 0 || plot.height == 0 {
        return;
    }
    let buf = frame.buffer_mut();
    let axis_style = DIM_STYLE;

    // Value axis
    let axis_x = plot.x - 1;
    for row in 0..plot.height {
        buf[(axis_x, plot.y + row)]
            .set_char('│')
            .set_style(axis_style);
    }
    for &(value, row) in &layout.ticks {
        let y = plot.y + row;
        buf[(axis_x, y)].set_char('┤').set_style(axis_style);
        let width = (axis_x - body.x) as usize;
        let label: String = format_tick(value).chars().take(width).collect();
        let x = axis_x - label.chars().count() as u16;
        buf.set_string(x, y, &label, Style::default().fg(Color::Gray));
    }

    // Bars, bottom up, with eighth-block tops
    for bar in &layout.bars {
        let color = if app.hovered_bar == Some(bar.index) {
            BAR_HOVER_COLOR
        } else {
            BAR_COLOR
        };
        let full = (bar.height_eighths / 8) as u16;
        let partial = (bar.height_eighths % 8) as usize;

        for dx in 0..bar.width {
            let x = plot.x + bar.x + dx;
            if x >= plot.x + plot.width {
                break;
            }
            for level in 0..full.min(plot.height) {
                let y = plot.y + plot.height - 1 - level;
                buf[(x, y)].set_char('█').set_fg(color);
            }
            if partial > 0 && full < plot.height {
                let y = plot.y + plot.height - 1 - full;
                buf[(x, y)].set_char(PARTIAL_BLOCKS[partial]).set_fg(color);
            }
        }
    }

    // Task labels, staggered over two rows
    let label_width = layout.label_width() as usize;
    let label_top = plot.y + plot.height;
    for bar in &layout.bars {
        let row = label_top + (bar.index % LABEL_ROWS as usize) as u16;
        if row >= body.y + body.height {
            continue;
        }
        let Some(task) = app.bars.tasks().get(bar.index) else {
            continue;
        };
        let x = plot.x + bar.x;
        let max = label_width.min((body.x + body.width).saturating_sub(x) as usize);
        let style = if app.hovered_bar == Some(bar.index) {
            Style::default().fg(BAR_HOVER_COLOR)
        } else {
            Style::default().fg(Color::Gray)
        };
        buf.set_stringn(x, row, &task.task, max, style);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let metric = app.metric();
    let value = Style::default().fg(Color::Yellow);
    let (borders, borders_color) = if app.show_borders {
        ("[B]orders ", Color::Green)
    } else {
        ("[b]orders ", Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(" Metric: ", DIM_STYLE),
        Span::styled(metric.code(), value),
        Span::styled(" Zoom: ", DIM_STYLE),
        Span::styled(app.zoom_level(), value),
        Span::raw(" "),
        Span::styled(borders, Style::default().fg(borders_color)),
    ];
    if let Some((idx, _)) = app.pinned {
        let name = app.map.shapes()[idx].name.clone();
        spans.push(Span::styled("| pinned: ", DIM_STYLE));
        spans.push(Span::styled(name, Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        "| e/i/m:metric Tab:view hjkl:pan +/-:zoom r:reset q:quit",
        DIM_STYLE,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tooltip(frame: &mut Frame, anchor: (u16, u16), lines: &[String], bounds: Rect) {
    if lines.is_empty() {
        return;
    }
    let text_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let width = (text_width + 4).min(bounds.width);
    let height = (lines.len() as u16 + 2).min(bounds.height);

    let (ax, ay) = anchor;
    let right = bounds.x + bounds.width;
    let bottom = bounds.y + bounds.height;
    let x = if ax + 2 + width <= right {
        ax + 2
    } else {
        ax.saturating_sub(width + 1).max(bounds.x)
    };
    let y = if ay + 1 + height <= bottom {
        ay + 1
    } else {
        ay.saturating_sub(height).max(bounds.y)
    };
    let area = Rect::new(x, y, width, height).intersection(bounds);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let text: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                Line::from(Span::styled(l.clone(), bold))
            } else {
                Line::from(l.clone())
            }
        })
        .collect();

    let tooltip = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray))
            .style(TOOLTIP_STYLE),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(tooltip, area);
}
