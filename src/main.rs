mod app_service;
mod app_state;
mod commands;
mod config;
mod ledger;
mod report;
mod storage;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use sea_orm::DatabaseConnection;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_service::refresh_ui;
use crate::app_state::{App, AppEvent, ViewScope};
use crate::commands::{register, AppCommand, HELP_TEXT};
use crate::config::AppConfig;
use crate::storage::repository::ProjectRepository;
use crate::ui::draw;

fn init_logging(log_dir: &Path) -> anyhow::Result<PathBuf> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("create log file {}", log_path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // 输出到文件，避免干扰 TUI
        .filter_level(log::LevelFilter::Warn)
        .filter_module("buildcost", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();
    Ok(log_path)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let log_path = init_logging(&config.log_dir)?;

    let mut startup_info = Vec::new();
    match &config.env_file {
        Some(path) => startup_info.push(format!("✓ 已加载 .env: {}", path.display())),
        None => startup_info.push("⚠ 未找到 .env，使用进程环境变量".to_string()),
    }
    startup_info.push(format!("日志文件: {}", log_path.display()));
    info!("starting with database {}", config.database.url);

    let db = match storage::establish_connection(&config.database).await {
        Ok(connection) => {
            startup_info.push("✓ 数据库连接成功".to_string());
            Arc::new(connection)
        }
        Err(e) => {
            error!("database connection failed: {}", e);
            eprintln!("无法连接数据库: {}", e);
            return Err(e).context("数据库连接失败");
        }
    };

    // `buildcost seed`：只生成演示数据，不进入界面
    if std::env::args().nth(1).as_deref() == Some("seed") {
        let summary = commands::seed::run(&db).await?;
        println!(
            "已生成演示数据: 供应商 {}, 项目 {}, 预算 {}, 支出 {}",
            summary.suppliers, summary.projects, summary.budgets, summary.entries
        );
        return Ok(());
    }

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    // 单后台任务 (Actor)：所有写库与报表查询都在这里串行执行
    tokio::spawn(run_actor(Arc::clone(&db), cmd_rx, evt_tx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(startup_info, cmd_tx, evt_rx);
    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("ui loop ended with error: {}", e);
    }
    info!("bye");
    res?;
    Ok(())
}

async fn run_actor(
    db: Arc<DatabaseConnection>,
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let mut scope = ViewScope::default();
    refresh_ui(&db, &mut scope, &evt_tx).await;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            AppCommand::AddSupplier(new) => register::add_supplier(&db, new, &evt_tx).await,
            AppCommand::AddProject(new) => register::add_project(&db, new, &evt_tx).await,
            AppCommand::AddEntry(new) => register::add_entry(&db, new, &evt_tx).await,
            AppCommand::SetBudget {
                project_id,
                category,
                amount,
            } => register::set_budget(&db, project_id, &category, amount, &evt_tx).await,
            AppCommand::DeleteProject { id } => {
                register::delete_project(&db, id, &evt_tx).await;
            }
            AppCommand::SelectProject { id } => match ProjectRepository::find(&db, id).await {
                Ok(Some(project)) => {
                    scope.project_id = Some(project.id);
                    let _ = evt_tx.send(AppEvent::Message(format!("当前项目: {}", project.name)));
                }
                Ok(None) => {
                    let _ = evt_tx.send(AppEvent::Error(format!("✗ 项目 {} 不存在", id)));
                    continue;
                }
                Err(e) => {
                    error!("find project {} failed: {}", id, e);
                    let _ = evt_tx.send(AppEvent::Error(format!("✗ 查询项目失败: {}", e)));
                    continue;
                }
            },
            AppCommand::Filter { category } => {
                let label = category.clone().unwrap_or_else(|| "全部".to_string());
                let _ = evt_tx.send(AppEvent::Message(format!("分类筛选: {}", label)));
                scope.category = category;
            }
            AppCommand::Seed => {
                let _ = evt_tx.send(AppEvent::Message("正在生成演示数据...".to_string()));
                match commands::seed::run(&db).await {
                    Ok(s) => {
                        scope.project_id = None;
                        let _ = evt_tx.send(AppEvent::Log(format!(
                            "✓ 演示数据: 供应商 {}, 项目 {}, 预算 {}, 支出 {}",
                            s.suppliers, s.projects, s.budgets, s.entries
                        )));
                    }
                    Err(e) => {
                        error!("seed failed: {:#}", e);
                        let _ = evt_tx.send(AppEvent::Error(format!("✗ 生成演示数据失败: {}", e)));
                    }
                }
            }
            AppCommand::Export { path } => {
                let target = PathBuf::from(&path);
                match commands::export::run(
                    &db,
                    scope.project_id,
                    scope.category.as_deref(),
                    &target,
                )
                .await
                {
                    Ok(bytes) => {
                        let _ = evt_tx.send(AppEvent::Log(format!(
                            "✓ 已导出看板到 {} ({} 字节)",
                            path, bytes
                        )));
                    }
                    Err(e) => {
                        error!("export failed: {:#}", e);
                        let _ = evt_tx.send(AppEvent::Error(format!("✗ 导出失败: {:#}", e)));
                    }
                }
                continue;
            }
            AppCommand::Refresh => {}
            AppCommand::Help => {
                let _ = evt_tx.send(AppEvent::Message(HELP_TEXT.to_string()));
                continue;
            }
            AppCommand::Quit => {
                let _ = evt_tx.send(AppEvent::Message("收到退出命令".to_string()));
                continue;
            }
            AppCommand::Unknown(msg) => {
                let _ = evt_tx.send(AppEvent::Error(format!("✗ {}", msg)));
                continue;
            }
        }
        refresh_ui(&db, &mut scope, &evt_tx).await;
    }
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
