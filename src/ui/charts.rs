use crate::report::ProjectComparison;
use crate::storage::repository::{CategorySpend, MonthlySpend, SupplierSpend};
use ratatui::{
    layout::Direction,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
};

/// 千分位金额，保留两位小数
pub fn money(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

/// 柱高只能是非负整数
pub fn bar_value(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn short(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(width.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}

fn chart_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(Color::White))
}

/// 每个项目一组：预算 / 支出
pub fn project_comparison_chart(rows: &[ProjectComparison]) -> BarChart<'static> {
    let mut chart = BarChart::default()
        .block(chart_block("项目预算 vs 支出 (蓝=预算 红=支出)".to_string()))
        .bar_width(7)
        .bar_gap(1)
        .group_gap(3)
        .value_style(Style::default().fg(Color::Black).add_modifier(Modifier::BOLD));

    for row in rows {
        let bars = [
            Bar::default()
                .value(bar_value(row.total_budget))
                .text_value(format!("{:.0}", row.total_budget))
                .style(Style::default().fg(Color::Blue)),
            Bar::default()
                .value(bar_value(row.total_spent))
                .text_value(format!("{:.0}", row.total_spent))
                .style(Style::default().fg(Color::Red)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(short(&row.project, 15)))
                .bars(&bars),
        );
    }
    chart
}

fn horizontal_chart(title: String, rows: Vec<(String, f64)>, color: Color) -> BarChart<'static> {
    let bars: Vec<Bar> = rows
        .into_iter()
        .map(|(label, total)| {
            Bar::default()
                .label(Line::from(short(&label, 16)))
                .value(bar_value(total))
                .text_value(money(total))
                .style(Style::default().fg(color))
        })
        .collect();

    BarChart::default()
        .block(chart_block(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .value_style(Style::default().fg(Color::White))
        .data(BarGroup::default().bars(&bars))
}

pub fn category_chart(rows: &[CategorySpend]) -> BarChart<'static> {
    horizontal_chart(
        "分类支出 (全部项目)".to_string(),
        rows.iter()
            .map(|r| (r.category.clone(), r.total_spent))
            .collect(),
        Color::Yellow,
    )
}

pub fn supplier_chart(rows: &[SupplierSpend]) -> BarChart<'static> {
    horizontal_chart(
        "供应商支出".to_string(),
        rows.iter()
            .map(|r| (r.supplier.clone(), r.total_spent))
            .collect(),
        Color::Magenta,
    )
}

/// 标题带项目预算总额与支出总额
pub fn monthly_chart(
    rows: &[MonthlySpend],
    project: Option<&str>,
    category: Option<&str>,
    budget_total: f64,
    spent_total: f64,
) -> BarChart<'static> {
    let title = format!(
        "月度支出 [{} / {}] 预算总额 {} 已支出 {}",
        project.unwrap_or("未选择项目"),
        category.unwrap_or("全部分类"),
        money(budget_total),
        money(spent_total)
    );
    let bars: Vec<Bar> = rows
        .iter()
        .map(|r| {
            Bar::default()
                .label(Line::from(r.month.clone()))
                .value(bar_value(r.total_spent))
                .text_value(format!("{:.0}", r.total_spent))
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    BarChart::default()
        .block(chart_block(title))
        .bar_width(8)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&bars))
}
