use crate::app_state::AppEvent;
use crate::ledger::Ledger;
use crate::storage::repository::{NewLineItem, NewProject, NewSupplier};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;

// 表单式录入：写入成功与否只回一行日志，细节进日志文件

pub async fn add_supplier(
    db: &DatabaseConnection,
    new: NewSupplier,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let name = new.name.clone();
    if Ledger::new(db).save_supplier(new).await {
        let _ = evt_tx.send(AppEvent::Log(format!("✓ 供应商 '{}' 已登记", name)));
    } else {
        let _ = evt_tx.send(AppEvent::Error(format!(
            "✗ 登记供应商 '{}' 失败（名称必填，税号不可重复）",
            name
        )));
    }
}

pub async fn add_project(
    db: &DatabaseConnection,
    new: NewProject,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let name = new.name.clone();
    if Ledger::new(db).save_project(new).await {
        let _ = evt_tx.send(AppEvent::Log(format!("✓ 项目 '{}' 已登记", name)));
    } else {
        let _ = evt_tx.send(AppEvent::Error(format!("✗ 登记项目 '{}' 失败", name)));
    }
}

pub async fn add_entry(
    db: &DatabaseConnection,
    new: NewLineItem,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let (project_id, category, amount) = (new.project_id, new.category.clone(), new.invoiced_amount);
    if Ledger::new(db).save_line_item(new).await {
        let _ = evt_tx.send(AppEvent::Log(format!(
            "✓ 项目 {} 新增 {} 支出 {:.2}",
            project_id, category, amount
        )));
    } else {
        let _ = evt_tx.send(AppEvent::Error(format!(
            "✗ 录入支出失败（项目 {} 或供应商不存在？）",
            project_id
        )));
    }
}

pub async fn set_budget(
    db: &DatabaseConnection,
    project_id: i32,
    category: &str,
    amount: f64,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    if Ledger::new(db).save_budget(project_id, category, amount).await {
        let _ = evt_tx.send(AppEvent::Log(format!(
            "✓ 项目 {} 预算 {} = {:.2}",
            project_id, category, amount
        )));
    } else {
        let _ = evt_tx.send(AppEvent::Error(format!(
            "✗ 保存预算失败（项目 {} 不存在？）",
            project_id
        )));
    }
}

pub async fn delete_project(
    db: &DatabaseConnection,
    project_id: i32,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) -> bool {
    let ok = Ledger::new(db).delete_project(project_id).await;
    if ok {
        let _ = evt_tx.send(AppEvent::Log(format!(
            "✓ 项目 {} 及其支出、预算已删除",
            project_id
        )));
    } else {
        let _ = evt_tx.send(AppEvent::Error(format!("✗ 删除项目 {} 失败", project_id)));
    }
    ok
}
