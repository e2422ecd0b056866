pub mod charts;

use crate::app_state::{App, FocusArea, InputMode, ViewMode};
use charts::money;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Length(10), // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);
}

fn focus_style(app: &App) -> Style {
    if app.focus_area == FocusArea::MainView {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let project = app.selected_project_name().unwrap_or("未选择项目");
    let category = app.scope.category.as_deref().unwrap_or("全部分类");
    let title_text = Line::from(vec![
        Span::styled(
            " 工程成本台账 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" - 项目: {}  分类: {}", project, category)),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = ViewMode::MENU
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = *mode == app.view_mode;

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, mode.title())).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter/c 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu =
        List::new(menu_items).block(Block::default().borders(Borders::ALL).title(title).style(
            if app.focus_area == FocusArea::Menu {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            },
        ));

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &App) {
    match app.view_mode {
        ViewMode::Overview => render_overview(f, area, app),
        ViewMode::Registry => render_registry(f, area, app),
        ViewMode::Budget => render_budget(f, area, app),
        ViewMode::Dashboard => render_dashboard(f, area, app),
    }
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let rows: Vec<Row> = app
        .registry
        .summaries
        .iter()
        .skip(app.main_scroll as usize)
        .map(|s| {
            let totals = app.dashboard.projects.iter().find(|p| p.project_id == s.id);
            let (budget, spent) = totals.map_or((0.0, 0.0), |t| (t.total_budget, t.total_spent));
            let balance = budget - spent;
            let style = if app.scope.project_id == Some(s.id) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(s.id.to_string()),
                Cell::from(s.name.clone()),
                Cell::from(fmt_date(s.start_date)),
                Cell::from(fmt_date(s.expected_end_date)),
                Cell::from(money(budget)),
                Cell::from(money(spent)),
                Cell::from(money(balance)).style(if balance < 0.0 {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Green)
                }),
            ])
            .style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::MainView {
        "项目总览 (p/P 切换项目, ↑↓ 滚动, ← 菜单)"
    } else {
        "项目总览"
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["ID", "项目", "开工", "预计完工", "预算", "支出", "余额"])
            .style(header_style()),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app)),
    );
    f.render_widget(table, chunks[0]);

    if app.dashboard.projects.is_empty() {
        let hint = Paragraph::new("暂无项目，输入 `/project add name=..` 或 `/seed` 生成演示数据")
            .block(Block::default().borders(Borders::ALL).title("项目预算 vs 支出"));
        f.render_widget(hint, chunks[1]);
    } else {
        f.render_widget(
            charts::project_comparison_chart(&app.dashboard.projects),
            chunks[1],
        );
    }
}

fn render_registry(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    let suppliers: Vec<ListItem> = app
        .registry
        .suppliers
        .iter()
        .map(|s| ListItem::new(format!("{:>4}  {}", s.id, s.name)))
        .collect();
    f.render_widget(
        List::new(suppliers).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("供应商 ({})", app.registry.suppliers.len())),
        ),
        left[0],
    );

    let budgets: Vec<ListItem> = app
        .registry
        .budgets
        .iter()
        .filter(|b| app.selected_project_name() == Some(b.project_name.as_str()))
        .map(|b| ListItem::new(format!("{:<16} {:>14}", b.category, money(b.budgeted_amount))))
        .collect();
    f.render_widget(
        List::new(budgets).block(Block::default().borders(Borders::ALL).title("当前项目预算")),
        left[1],
    );

    let rows: Vec<Row> = app
        .registry
        .line_items
        .iter()
        .skip(app.main_scroll as usize)
        .map(|item| {
            Row::new(vec![
                item.id.to_string(),
                item.entry_date.format("%Y-%m-%d").to_string(),
                item.category.clone(),
                item.supplier_name.clone().unwrap_or_else(|| "-".to_string()),
                money(item.invoiced_amount),
            ])
        })
        .collect();

    let project = app.selected_project_name().unwrap_or("未选择项目");
    let title = if app.focus_area == FocusArea::MainView {
        format!(
            "{} 的支出明细 ({} 条, ↑↓ 滚动, ← 菜单)",
            project,
            app.registry.line_items.len()
        )
    } else {
        format!("{} 的支出明细 ({} 条)", project, app.registry.line_items.len())
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(11),
            Constraint::Length(16),
            Constraint::Min(12),
            Constraint::Length(14),
        ],
    )
    .header(Row::new(vec!["ID", "日期", "分类", "供应商", "开票金额"]).style(header_style()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app)),
    );
    f.render_widget(table, columns[1]);
}

fn render_budget(f: &mut Frame, area: Rect, app: &App) {
    let dash = &app.dashboard;
    let Some(project) = app.selected_project_name() else {
        let p = Paragraph::new("未选择项目 (按 p 切换)")
            .block(Block::default().borders(Borders::ALL).title("预算对比"));
        f.render_widget(p, area);
        return;
    };

    let mut rows: Vec<Row> = dash
        .variance
        .iter()
        .map(|v| {
            let color = if v.variance < 0.0 {
                Color::Red
            } else {
                Color::Green
            };
            Row::new(vec![
                Cell::from(v.category.clone()),
                Cell::from(money(v.budgeted)),
                Cell::from(money(v.spent)),
                Cell::from(money(v.variance)).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let budgeted: f64 = dash.variance.iter().map(|v| v.budgeted).sum();
    let spent: f64 = dash.variance.iter().map(|v| v.spent).sum();
    rows.push(
        Row::new(vec![
            "合计".to_string(),
            money(budgeted),
            money(spent),
            money(budgeted - spent),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let title = if app.focus_area == FocusArea::MainView {
        format!("{} 预算 vs 实际 (p/P 切换项目, ← 菜单)", project)
    } else {
        format!("{} 预算 vs 实际", project)
    };
    let table = Table::new(
        rows.into_iter().skip(app.main_scroll as usize),
        [
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(Row::new(vec!["分类", "预算", "实际", "差额"]).style(header_style()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app)),
    );
    f.render_widget(table, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let dash = &app.dashboard;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    f.render_widget(charts::category_chart(&dash.by_category), top[0]);
    f.render_widget(charts::supplier_chart(&dash.by_supplier), top[1]);
    f.render_widget(
        charts::monthly_chart(
            &dash.monthly,
            app.selected_project_name(),
            dash.category_filter.as_deref(),
            dash.project_budget_total,
            dash.project_spent_total,
        ),
        rows[1],
    );
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app
            .command_input
            .char_indices()
            .nth(app.command_cursor)
            .map_or(app.command_input.len(), |(i, _)| i);
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));

        // 补全建议以灰色幽灵文本显示
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }

        vec![
            Line::from(spans),
            Line::from("Enter执行 Esc取消 Tab补全 ←→光标 Home/End ↑历史 ↓下一条"),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("命令: ", Style::default().fg(Color::Yellow)),
                Span::raw("(按 / 进入命令模式, 输入 help 查看命令)"),
            ]),
            Line::from("/命令 p/P项目 f分类筛选 r刷新 ←→切换 ↑↓导航 Enter/c确认 q退出"),
        ]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式"
            } else {
                "命令输入"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 最新的日志在顶部
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CategoryVariance, ProjectComparison};
    use crate::storage::repository::{ProjectRow, ProjectSummary};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn sample_app() -> App {
        let (cmd_tx, _cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        let mut app = App::new(vec!["✓ 数据库连接成功".into()], cmd_tx, evt_rx);
        app.scope.project_id = Some(1);
        app.registry.projects = vec![ProjectRow {
            id: 1,
            name: "Tower".into(),
        }];
        app.registry.summaries = vec![ProjectSummary {
            id: 1,
            name: "Tower".into(),
            start_date: None,
            expected_end_date: None,
        }];
        app.dashboard.projects = vec![ProjectComparison {
            project_id: 1,
            project: "Tower".into(),
            total_budget: 1000.0,
            total_spent: 1200.0,
        }];
        app.dashboard.variance = vec![CategoryVariance::new("Glass", 1000.0, 1200.0)];
        app
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn every_view_renders() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        for mode in ViewMode::MENU {
            app.view_mode = mode;
            terminal.draw(|f| draw(f, &app)).unwrap();
        }
    }

    #[test]
    fn overview_shows_negative_balance() {
        let app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("-200.00"));
    }
}
