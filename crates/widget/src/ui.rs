use claim_core::dispatch::Variant;
use claim_core::theme::Theme;
use claim_core::view::{Button, ClaimArea, DropView, Slot, Stepper};
use claim_core::WidgetView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{short_address, App, Screen, Toast};

/// Terminal colours for one theme.
struct Palette {
    fg: Color,
    bg: Color,
    muted: Color,
    border: Color,
}

impl Palette {
    fn of(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::DarkGray,
                border: Color::Gray,
            },
            Theme::Dark => Palette {
                fg: Color::White,
                bg: Color::Black,
                muted: Color::Gray,
                border: Color::DarkGray,
            },
        }
    }
}

fn button_color(button: &Button) -> Color {
    button
        .color
        .as_ref()
        .and_then(|c| c.rgb())
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Blue)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let view = app.view();
    let theme = match &view {
        WidgetView::Drop(drop) => drop.theme,
        _ => app.config.as_ref().map(|c| c.theme).unwrap_or_default(),
    };
    let palette = Palette::of(theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title bar
            Constraint::Min(12),   // widget
            Constraint::Length(3), // action bar
            Constraint::Length(6), // message log
        ])
        .split(frame.area());

    draw_title_bar(frame, app, &view, chunks[0]);

    match (&view, app.screen) {
        (WidgetView::Drop(drop), Screen::Confirm) => draw_confirm(frame, app, drop, &palette, chunks[1]),
        (WidgetView::Drop(drop), Screen::Widget) => draw_drop(frame, app, drop, &palette, chunks[1]),
        (WidgetView::Empty { message }, _) => draw_message(frame, message, &palette, Color::Yellow, chunks[1]),
        (WidgetView::Misconfigured { message }, _) => draw_message(frame, message, &palette, Color::Red, chunks[1]),
    }

    draw_action_bar(frame, app, &view, chunks[2]);
    draw_message_log(frame, app, chunks[3]);

    if let Some(toast) = &app.toast {
        draw_toast(frame, toast, chunks[1]);
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, view: &WidgetView, area: Rect) {
    let wallet = app
        .state
        .wallet
        .as_deref()
        .map(short_address)
        .unwrap_or_else(|| "not connected".into());
    let refresh = app
        .last_refresh
        .map(|t| format!("{}s ago", t.elapsed().as_secs()))
        .unwrap_or_else(|| "never".into());

    let title = match view {
        WidgetView::Drop(drop) => format!(
            " Drop | {} #{} | {} | Wallet: {} | Last refresh: {} ",
            short_address(&drop.contract),
            drop.token_id,
            drop.chain,
            wallet,
            refresh,
        ),
        _ => " Drop ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);
}

fn draw_message(frame: &mut Frame, message: &str, palette: &Palette, accent: Color, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(palette.bg).fg(palette.fg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let para = Paragraph::new(vec![Line::from(""), Line::from(message.to_string())])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, inner);
}

fn draw_drop(frame: &mut Frame, app: &App, drop: &DropView, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.bg).fg(palette.fg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    draw_media(frame, drop, palette, cols[0]);
    draw_details(frame, app, drop, palette, cols[1]);
}

fn loading(palette: &Palette) -> Span<'static> {
    Span::styled("Loading...", Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC))
}

/// Header image and the supply counter under it.
fn draw_media(frame: &mut Frame, drop: &DropView, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let image_block = Block::default()
        .borders(Borders::ALL)
        .title(" Image ")
        .border_style(Style::default().fg(palette.border));
    let image = match &drop.image {
        Slot::Loading => Paragraph::new(Line::from(loading(palette))),
        Slot::Shown(uri) => Paragraph::new(uri.clone()).wrap(Wrap { trim: true }),
        Slot::Hidden => Paragraph::new(Span::styled("(no image)", Style::default().fg(palette.muted))),
    };
    frame.render_widget(image.block(image_block).alignment(Alignment::Center), rows[0]);

    let supply = match &drop.supply {
        Slot::Shown(label) => Line::from(Span::styled(label.clone(), Style::default().add_modifier(Modifier::BOLD))),
        _ => Line::from(loading(palette)),
    };
    frame.render_widget(Paragraph::new(supply).alignment(Alignment::Center), rows[1]);
}

fn draw_details(frame: &mut Frame, app: &App, drop: &DropView, palette: &Palette, area: Rect) {
    let mut lines: Vec<Line> = vec![Line::from("")];

    match &drop.title {
        Slot::Shown(title) => lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        Slot::Loading => lines.push(Line::from(vec![Span::raw("  "), loading(palette)])),
        Slot::Hidden => {}
    }
    match &drop.description {
        Slot::Shown(description) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", description),
                Style::default().fg(palette.muted),
            )));
        }
        Slot::Loading => lines.push(Line::from(vec![Span::raw("  "), loading(palette)])),
        Slot::Hidden => {}
    }
    lines.push(Line::from(""));

    match &drop.claim {
        ClaimArea::Message { text } => {
            lines.push(Line::from(Span::styled(
                format!("  {}", text),
                Style::default().fg(Color::Yellow),
            )));
        }
        ClaimArea::Controls { stepper, button } => {
            lines.push(stepper_line(stepper, palette));
            lines.push(Line::from(""));
            lines.push(button_line(button, app.claiming));
        }
    }

    let para = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

fn stepper_line(stepper: &Stepper, palette: &Palette) -> Line<'static> {
    let enabled = |on: bool| {
        if on {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        }
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled("[-]", enabled(stepper.can_decrement)),
        Span::raw(format!("  {:^10}  ", stepper.label)),
        Span::styled("[+]", enabled(stepper.can_increment)),
    ])
}

fn button_line(button: &Button, claiming: bool) -> Line<'static> {
    let text = if claiming {
        "Minting...".to_string()
    } else if button.loading {
        format!("… {}", button.text)
    } else {
        button.text.clone()
    };
    let style = if button.disabled || claiming {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::White)
            .bg(button_color(button))
            .add_modifier(Modifier::BOLD)
    };
    Line::from(vec![Span::raw("  "), Span::styled(format!("  {}  ", text), style)])
}

fn draw_confirm(frame: &mut Frame, app: &App, drop: &DropView, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm Mint ")
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(palette.bg).fg(palette.fg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title = drop.title.text().unwrap_or("this drop");
    let price = &drop.eligibility.price_to_mint;
    let mut lines = vec![
        Line::from(""),
        Line::from(format!("  Mint {} of {} (token #{})", app.quantity, title, drop.token_id)),
    ];
    if !price.is_empty() {
        lines.push(Line::from(format!("  Price: {}", price)));
    }
    if let Some(wallet) = &drop.wallet {
        lines.push(Line::from(format!("  Receiver: {}", wallet)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press [y] to confirm, [n] to cancel.",
        Style::default().fg(Color::Yellow),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_toast(frame: &mut Frame, toast: &Toast, area: Rect) {
    let width = area.width.saturating_sub(4).min(50);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 2),
        y: area.y + 1,
        width,
        height: 4.min(area.height),
    };
    let color = match toast.notification.variant {
        Variant::Success => Color::Green,
        Variant::Destructive => Color::Red,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", toast.notification.title))
        .border_style(Style::default().fg(color));
    let para = Paragraph::new(toast.notification.description.clone())
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, rect);
    frame.render_widget(para, rect);
}

fn draw_action_bar(frame: &mut Frame, app: &App, view: &WidgetView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Actions ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = match (view, app.screen) {
        (WidgetView::Drop(_), Screen::Confirm) => Line::from(vec![
            action_key("[y]"),
            action_label("Confirm  "),
            action_key("[n]"),
            action_label("Cancel"),
        ]),
        (WidgetView::Drop(drop), Screen::Widget) => {
            let mut spans = Vec::new();
            if let ClaimArea::Controls { .. } = &drop.claim {
                spans.push(action_key("[-/+]"));
                spans.push(action_label("Quantity  "));
                spans.push(action_key("[Enter]"));
                spans.push(action_label(if drop.wallet.is_some() { "Mint  " } else { "Connect  " }));
                if app.toast.is_some() {
                    spans.push(action_key("[Esc]"));
                    spans.push(action_label("Dismiss  "));
                }
            }
            spans.push(action_key("[r]"));
            spans.push(action_label("Refresh  "));
            spans.push(action_key("[q]"));
            spans.push(action_label("Quit"));
            Line::from(spans)
        }
        _ => Line::from(vec![action_key("[q]"), action_label("Quit")]),
    };
    frame.render_widget(Paragraph::new(line), inner);
}

fn action_key(key: &str) -> Span<'_> {
    Span::styled(key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn action_label(label: &str) -> Span<'_> {
    Span::raw(label)
}

fn draw_message_log(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .message_log
        .iter()
        .map(|m| Line::from(format!(" > {}", m)))
        .collect();

    let width = inner.width as usize;
    let total_rows: usize = lines
        .iter()
        .map(|line| {
            let len = line.width();
            if width == 0 {
                1
            } else {
                1_usize.max(len.div_ceil(width))
            }
        })
        .sum();
    let scroll = (total_rows as u16).saturating_sub(inner.height);

    let para = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(para, inner);
}

#[cfg(test)]
mod tests {
    use claim_core::WidgetConfig;
    use ratatui::backend::TestBackend;

    use super::*;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_empty_state() {
        let app = App::new(WidgetConfig::from_query(""), None, false);
        let screen = render(&app);
        assert!(screen.contains("No contract address provided"));
        assert!(screen.contains("[q]"));
    }

    #[test]
    fn test_renders_config_error() {
        let app = App::new(WidgetConfig::from_query("contract=0x12"), None, false);
        let screen = render(&app);
        assert!(screen.contains("Invalid contract address"));
    }

    #[test]
    fn test_button_color_from_swatch() {
        let button = Button {
            text: "Mint".into(),
            disabled: false,
            loading: false,
            color: Some(claim_core::theme::PrimaryColor::from_param("#ff0000")),
        };
        assert_eq!(button_color(&button), Color::Rgb(255, 0, 0));
        let plain = Button { color: None, ..button };
        assert_eq!(button_color(&plain), Color::Blue);
    }
}
