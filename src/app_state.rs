use crate::commands::AppCommand;
use crate::report::Dashboard;
use crate::storage::repository::{
    LineItemRow, ProjectBudgetRow, ProjectRow, ProjectSummary, SupplierRow,
};
use crossterm::event::KeyCode;
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    Overview,
    Registry,
    Budget,
    Dashboard,
}

impl ViewMode {
    pub const MENU: [ViewMode; 4] = [
        ViewMode::Overview,
        ViewMode::Registry,
        ViewMode::Budget,
        ViewMode::Dashboard,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Overview => "项目总览",
            ViewMode::Registry => "登记数据",
            ViewMode::Budget => "预算对比",
            ViewMode::Dashboard => "看板",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

/// 报表当前作用的项目与分类筛选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewScope {
    pub project_id: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryData {
    pub summaries: Vec<ProjectSummary>,
    pub projects: Vec<ProjectRow>,
    pub suppliers: Vec<SupplierRow>,
    pub line_items: Vec<LineItemRow>,
    pub budgets: Vec<ProjectBudgetRow>,
    pub categories: Vec<String>,
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Scope(ViewScope),
    Registry(Box<RegistryData>),
    Dashboard(Box<Dashboard>),
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub scope: ViewScope,
    pub registry: RegistryData,
    pub dashboard: Dashboard,
    pub main_scroll: u16,
    pub command_input: String,
    pub command_cursor: usize, // 字符位置，不是字节位置
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            view_mode: ViewMode::Overview,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::Menu,
            menu_selected_index: 0,
            scope: ViewScope::default(),
            registry: RegistryData::default(),
            dashboard: Dashboard::default(),
            main_scroll: 0,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.log_messages.push(msg)
            }
            AppEvent::Scope(scope) => self.scope = scope,
            AppEvent::Registry(data) => self.registry = *data,
            AppEvent::Dashboard(dashboard) => self.dashboard = *dashboard,
        }
    }

    pub fn selected_project_name(&self) -> Option<&str> {
        let id = self.scope.project_id?;
        self.registry
            .projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    /// 获取当前的补全建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let commands = [
            "supplier", "project", "entry", "budget", "filter", "seed", "export", "refresh",
            "help", "quit",
        ];
        let input = self.command_input.trim();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() == 1 && !self.command_input.ends_with(' ') {
            return commands
                .iter()
                .find(|cmd| cmd.starts_with(parts[0]) && **cmd != parts[0])
                .map(|cmd| cmd[parts[0].len()..].to_string());
        }

        let subs: &[&str] = match parts[0] {
            "supplier" | "entry" => &["add"],
            "project" => &["add", "delete"],
            "budget" => &["set"],
            "filter" => &["all"],
            _ => return None,
        };
        let cur = if parts.len() == 1 { "" } else { parts[1] };
        if parts.len() > 2 {
            return None;
        }
        subs.iter()
            .find(|s| s.starts_with(cur) && **s != cur)
            .map(|s| s[cur.len()..].to_string())
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.command_input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }

    fn input_len(&self) -> usize {
        self.command_input.chars().count()
    }

    fn reset_command_line(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn send(&self, cmd: AppCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// 在已登记项目之间切换，step 为 1 或 -1
    fn cycle_project(&mut self, step: isize) {
        let projects = &self.registry.projects;
        if projects.is_empty() {
            return;
        }
        let current = self
            .scope
            .project_id
            .and_then(|id| projects.iter().position(|p| p.id == id));
        let len = projects.len() as isize;
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        let id = projects[next].id;
        self.scope.project_id = Some(id);
        self.main_scroll = 0;
        self.send(AppCommand::SelectProject { id });
    }

    /// 分类筛选：全部 -> 各已出现分类 -> 全部
    fn cycle_category(&mut self) {
        let cats = &self.registry.categories;
        let next = match &self.scope.category {
            None => cats.first().cloned(),
            Some(cur) => cats
                .iter()
                .position(|c| c == cur)
                .and_then(|i| cats.get(i + 1))
                .cloned(),
        };
        self.scope.category = next.clone();
        self.send(AppCommand::Filter { category: next });
    }

    fn submit_command(&mut self) -> bool {
        let cmd_owned = self.command_input.trim().to_string();
        self.reset_command_line();
        if cmd_owned.is_empty() {
            return false;
        }

        self.command_history.push(cmd_owned.clone());
        self.command_history_index = None;

        let cmd = AppCommand::from_str(&cmd_owned)
            .unwrap_or_else(|_| AppCommand::Unknown(cmd_owned.clone()));
        if matches!(cmd, AppCommand::Quit) {
            return true;
        }
        self.send(cmd);
        false
    }

    /// 返回 true 表示退出应用
    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            match key {
                KeyCode::Enter => return self.submit_command(),
                KeyCode::Esc => self.reset_command_line(),
                KeyCode::Tab => {
                    if let Some(hint) = self.get_completion_hint() {
                        let insert = format!("{} ", hint);
                        let at = self.byte_index(self.command_cursor);
                        self.command_input.insert_str(at, &insert);
                        self.command_cursor += insert.chars().count();
                    }
                }
                KeyCode::Up => {
                    if self.command_history.is_empty() {
                        return false;
                    }
                    let next = match self.command_history_index {
                        None => self.command_history.len().saturating_sub(1),
                        Some(i) => i.saturating_sub(1),
                    };
                    self.command_history_index = Some(next);
                    if let Some(cmd) = self.command_history.get(next) {
                        self.command_input = cmd.clone();
                        self.command_cursor = self.input_len();
                    }
                }
                KeyCode::Down => {
                    let Some(i) = self.command_history_index else {
                        return false;
                    };
                    let n = i + 1;
                    if n >= self.command_history.len() {
                        self.command_history_index = None;
                        self.command_input.clear();
                        self.command_cursor = 0;
                        return false;
                    }
                    self.command_history_index = Some(n);
                    self.command_input = self.command_history[n].clone();
                    self.command_cursor = self.input_len();
                }
                KeyCode::Backspace => {
                    if self.command_cursor > 0 {
                        let at = self.byte_index(self.command_cursor - 1);
                        self.command_input.remove(at);
                        self.command_cursor -= 1;
                    }
                }
                KeyCode::Delete => {
                    if self.command_cursor < self.input_len() {
                        let at = self.byte_index(self.command_cursor);
                        self.command_input.remove(at);
                    }
                }
                KeyCode::Left => {
                    self.command_cursor = self.command_cursor.saturating_sub(1);
                }
                KeyCode::Right => {
                    if self.command_cursor < self.input_len() {
                        self.command_cursor += 1;
                    }
                }
                KeyCode::Home => self.command_cursor = 0,
                KeyCode::End => self.command_cursor = self.input_len(),
                KeyCode::Char(c) => {
                    let at = self.byte_index(self.command_cursor);
                    self.command_input.insert(at, c);
                    self.command_cursor += 1;
                }
                _ => {}
            }
            return false;
        }

        // 正常模式下的按键处理
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else {
                    self.main_scroll = self.main_scroll.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index < ViewMode::MENU.len() - 1 {
                        self.menu_selected_index += 1;
                    }
                } else {
                    self.main_scroll = self.main_scroll.saturating_add(1);
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    self.view_mode = ViewMode::MENU[self.menu_selected_index];
                    self.main_scroll = 0;
                    self.focus_area = FocusArea::MainView;
                }
            }
            KeyCode::Char('p') => self.cycle_project(1),
            KeyCode::Char('P') => self.cycle_project(-1),
            KeyCode::Char('f') => {
                if self.view_mode == ViewMode::Dashboard {
                    self.cycle_category();
                }
            }
            KeyCode::Char('r') => self.send(AppCommand::Refresh),
            _ => {}
        }
        false
    }
}
