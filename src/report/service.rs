use crate::report::model::{Category, CategoryVariance, Dashboard, ProjectComparison};
use crate::storage::repository::{
    BudgetRepository, ProjectRepository, ReportRepository,
};
use sea_orm::DatabaseConnection;
use std::collections::{BTreeSet, HashMap};

pub struct ReportService;

impl ReportService {
    /// 项目各分类的预算/支出/差额。固定分类全部列出（缺的补 0），
    /// 之外的自由文本分类按字母序追加在后面。
    pub async fn budget_vs_spend(
        db: &DatabaseConnection,
        project_id: i32,
    ) -> Result<Vec<CategoryVariance>, sea_orm::DbErr> {
        let budgets: HashMap<String, f64> = BudgetRepository::by_project(db, project_id)
            .await?
            .into_iter()
            .map(|b| (b.category, b.budgeted_amount))
            .collect();
        let spent: HashMap<String, f64> =
            ReportRepository::spend_by_category(db, Some(project_id))
                .await?
                .into_iter()
                .map(|s| (s.category, s.total_spent))
                .collect();

        let mut rows: Vec<CategoryVariance> = Category::ALL
            .iter()
            .map(|c| {
                let key = c.label();
                CategoryVariance::new(
                    key,
                    budgets.get(key).copied().unwrap_or(0.0),
                    spent.get(key).copied().unwrap_or(0.0),
                )
            })
            .collect();

        let extra: BTreeSet<&String> = budgets
            .keys()
            .chain(spent.keys())
            .filter(|k| !Category::ALL.iter().any(|c| c.label() == k.as_str()))
            .collect();
        for key in extra {
            rows.push(CategoryVariance::new(
                key.clone(),
                budgets.get(key).copied().unwrap_or(0.0),
                spent.get(key).copied().unwrap_or(0.0),
            ));
        }

        Ok(rows)
    }

    /// 每个项目的预算总额与支出总额，缺失补 0
    pub async fn project_comparison(
        db: &DatabaseConnection,
    ) -> Result<Vec<ProjectComparison>, sea_orm::DbErr> {
        let projects = ProjectRepository::list(db).await?;
        let budgets: HashMap<i32, f64> = ReportRepository::budget_totals_by_project(db)
            .await?
            .into_iter()
            .map(|t| (t.project_id, t.total))
            .collect();
        let spent: HashMap<i32, f64> = ReportRepository::spend_totals_by_project(db)
            .await?
            .into_iter()
            .map(|t| (t.project_id, t.total))
            .collect();

        Ok(projects
            .into_iter()
            .map(|p| ProjectComparison {
                project_id: p.id,
                total_budget: budgets.get(&p.id).copied().unwrap_or(0.0),
                total_spent: spent.get(&p.id).copied().unwrap_or(0.0),
                project: p.name,
            })
            .collect())
    }

    pub async fn dashboard(
        db: &DatabaseConnection,
        project_id: Option<i32>,
        category: Option<&str>,
    ) -> Result<Dashboard, sea_orm::DbErr> {
        let (projects, by_category, by_supplier) = futures::try_join!(
            Self::project_comparison(db),
            ReportRepository::spend_by_category(db, None),
            ReportRepository::spend_by_supplier(db),
        )?;

        let mut dashboard = Dashboard {
            project_id,
            category_filter: category.map(str::to_string),
            projects,
            by_category,
            by_supplier,
            ..Default::default()
        };

        if let Some(pid) = project_id {
            let (monthly, budget_total, spent_total, variance) = futures::try_join!(
                ReportRepository::monthly_spend(db, Some(pid), category),
                ReportRepository::total_budget(db, pid),
                ReportRepository::total_spent(db, pid),
                Self::budget_vs_spend(db, pid),
            )?;
            dashboard.monthly = monthly;
            dashboard.project_budget_total = budget_total;
            dashboard.project_spent_total = spent_total;
            dashboard.variance = variance;
        }

        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::storage::connection::memory_db;
    use crate::storage::repository::{NewLineItem, NewProject};
    use chrono::NaiveDate;

    async fn project(ledger: &Ledger<'_>, name: &str) -> i32 {
        ledger
            .try_save_project(NewProject {
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn spend(ledger: &Ledger<'_>, project_id: i32, month: u32, category: &str, amount: f64) {
        ledger
            .try_save_line_item(NewLineItem {
                project_id,
                entry_date: NaiveDate::from_ymd_opt(2025, month, 10).unwrap(),
                category: category.into(),
                issue_date: None,
                document: None,
                supplier_id: None,
                description: None,
                invoiced_amount: amount,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn variance_covers_every_fixed_category() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        let p = project(&ledger, "Tower").await;
        ledger.try_save_budget(p, "Glass", 1000.0).await.unwrap();
        ledger.try_save_budget(p, "Paint", 200.0).await.unwrap();
        spend(&ledger, p, 1, "Glass", 400.0).await;
        spend(&ledger, p, 2, "Glass", 100.0).await;
        spend(&ledger, p, 2, "Installation", 75.0).await;

        let rows = ReportService::budget_vs_spend(&db, p).await.unwrap();
        assert_eq!(rows.len(), Category::ALL.len());
        assert_eq!(rows[0], CategoryVariance::new("Aluminum", 0.0, 0.0));

        let glass = rows.iter().find(|r| r.category == "Glass").unwrap();
        assert_eq!((glass.budgeted, glass.spent, glass.variance), (1000.0, 500.0, 500.0));
        let paint = rows.iter().find(|r| r.category == "Paint").unwrap();
        assert_eq!(paint.variance, 200.0);
        let install = rows.iter().find(|r| r.category == "Installation").unwrap();
        assert_eq!(install.variance, -75.0);

        for r in &rows {
            assert_eq!(r.variance, r.budgeted - r.spent);
        }
    }

    #[tokio::test]
    async fn free_text_categories_are_appended_and_keep_totals() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        let p = project(&ledger, "Tower").await;
        spend(&ledger, p, 1, "Scaffolding", 30.0).await;
        spend(&ledger, p, 1, "Glass", 70.0).await;
        ledger.try_save_budget(p, "Cleaning", 15.0).await.unwrap();

        let rows = ReportService::budget_vs_spend(&db, p).await.unwrap();
        let tail: Vec<&str> = rows[Category::ALL.len()..]
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(tail, vec!["Cleaning", "Scaffolding"]);

        let spent: f64 = rows.iter().map(|r| r.spent).sum();
        assert_eq!(
            spent,
            ReportRepository::total_spent(&db, p).await.unwrap()
        );
    }

    #[tokio::test]
    async fn comparison_lists_projects_without_data_as_zero() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        let busy = project(&ledger, "Busy").await;
        project(&ledger, "Idle").await;
        ledger.try_save_budget(busy, "Design", 90.0).await.unwrap();
        spend(&ledger, busy, 3, "Design", 120.0).await;

        let rows = ReportService::project_comparison(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].total_budget, rows[0].total_spent), (90.0, 120.0));
        assert_eq!(rows[1].project, "Idle");
        assert_eq!((rows[1].total_budget, rows[1].total_spent), (0.0, 0.0));
    }

    #[tokio::test]
    async fn dashboard_scopes_monthly_series_to_selection() {
        let db = memory_db().await;
        let ledger = Ledger::new(&db);
        let a = project(&ledger, "A").await;
        let b = project(&ledger, "B").await;
        ledger.try_save_budget(a, "Glass", 500.0).await.unwrap();
        spend(&ledger, a, 1, "Glass", 10.0).await;
        spend(&ledger, a, 2, "Paint", 20.0).await;
        spend(&ledger, b, 2, "Glass", 999.0).await;

        let unscoped = ReportService::dashboard(&db, None, None).await.unwrap();
        assert!(unscoped.monthly.is_empty());
        assert!(unscoped.variance.is_empty());
        assert_eq!(unscoped.projects.len(), 2);

        let dash = ReportService::dashboard(&db, Some(a), Some("Glass"))
            .await
            .unwrap();
        assert_eq!(dash.monthly.len(), 1);
        assert_eq!(dash.monthly[0].month, "2025-01");
        assert_eq!(dash.project_budget_total, 500.0);
        assert_eq!(dash.project_spent_total, 30.0);
        assert_eq!(dash.category_filter.as_deref(), Some("Glass"));
        assert_eq!(dash.by_category[0].category, "Glass");
    }
}
