use crate::report::ReportService;
use crate::storage::repository::ProjectRepository;
use anyhow::Context;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExportDocument<'a> {
    exported_at: String,
    project_summaries: Vec<crate::storage::repository::ProjectSummary>,
    dashboard: &'a crate::report::Dashboard,
}

/// 把当前看板写成 JSON，返回写入字节数
pub async fn run(
    db: &DatabaseConnection,
    project_id: Option<i32>,
    category: Option<&str>,
    path: &Path,
) -> anyhow::Result<usize> {
    let dashboard = ReportService::dashboard(db, project_id, category).await?;
    let doc = ExportDocument {
        exported_at: chrono::Local::now().to_rfc3339(),
        project_summaries: ProjectRepository::summaries(db).await?,
        dashboard: &dashboard,
    };
    let body = serde_json::to_vec_pretty(&doc)?;
    tokio::fs::write(path, &body)
        .await
        .with_context(|| format!("write export to {}", path.display()))?;
    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::storage::connection::memory_db;
    use crate::storage::repository::NewProject;

    #[tokio::test]
    async fn writes_dashboard_json() {
        let db = memory_db().await;
        let id = Ledger::new(&db)
            .try_save_project(NewProject {
                name: "Tower".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        Ledger::new(&db).try_save_budget(id, "Glass", 42.0).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        let written = run(&db, Some(id), None, &path).await.unwrap();
        assert!(written > 0);

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["dashboard"]["project_budget_total"], 42.0);
        assert_eq!(value["dashboard"]["projects"][0]["project"], "Tower");
        assert_eq!(value["project_summaries"][0]["name"], "Tower");
    }
}
