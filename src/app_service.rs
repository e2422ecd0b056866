use crate::app_state::{AppEvent, RegistryData, ViewScope};
use crate::report::ReportService;
use crate::storage::repository::{
    BudgetRepository, LineItemRepository, ProjectRepository, SupplierRepository,
};
use log::error;
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;

async fn load_registry(
    db: &DatabaseConnection,
    project_id: Option<i32>,
) -> Result<RegistryData, sea_orm::DbErr> {
    let (summaries, projects, suppliers, budgets, categories) = futures::try_join!(
        ProjectRepository::summaries(db),
        ProjectRepository::list(db),
        SupplierRepository::list(db),
        BudgetRepository::all_with_project(db),
        LineItemRepository::distinct_categories(db),
    )?;
    let line_items = match project_id {
        Some(pid) => LineItemRepository::list_by_project(db, pid).await?,
        None => Vec::new(),
    };
    Ok(RegistryData {
        summaries,
        projects,
        suppliers,
        line_items,
        budgets,
        categories,
    })
}

/// 重新读取登记数据与看板并推给界面。
/// 选中的项目不存在（被删除或尚未选择）时回落到第一个项目。
pub async fn refresh_ui(
    db: &DatabaseConnection,
    scope: &mut ViewScope,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    // 1. 校正当前项目
    match ProjectRepository::list(db).await {
        Ok(projects) => {
            let still_there = scope
                .project_id
                .is_some_and(|id| projects.iter().any(|p| p.id == id));
            if !still_there {
                scope.project_id = projects.first().map(|p| p.id);
            }
        }
        Err(e) => {
            error!("refresh: list projects failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 读取项目失败: {}", e)));
            return;
        }
    }
    let _ = tx.send(AppEvent::Scope(scope.clone()));

    // 2. 登记数据
    match load_registry(db, scope.project_id).await {
        Ok(data) => {
            let _ = tx.send(AppEvent::Registry(Box::new(data)));
        }
        Err(e) => {
            error!("refresh: registry query failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 读取登记数据失败: {}", e)));
        }
    }

    // 3. 看板
    match ReportService::dashboard(db, scope.project_id, scope.category.as_deref()).await {
        Ok(dashboard) => {
            let _ = tx.send(AppEvent::Dashboard(Box::new(dashboard)));
        }
        Err(e) => {
            error!("refresh: dashboard query failed: {}", e);
            let _ = tx.send(AppEvent::Error(format!("✗ 生成报表失败: {}", e)));
        }
    }
}
