use crate::storage::entity::budget_allocation::{self, Entity as BudgetAllocation};
use crate::storage::entity::line_item::{self, Entity as LineItem};
use crate::storage::entity::supplier;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct SupplierSpend {
    pub supplier: String,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct MonthlySpend {
    pub month: String, // YYYY-MM
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ProjectTotal {
    pub project_id: i32,
    pub total: f64,
}

fn spent_sum() -> SimpleExpr {
    Expr::col((line_item::Entity, line_item::Column::InvoicedAmount)).sum()
}

fn budget_sum() -> SimpleExpr {
    Expr::col((
        budget_allocation::Entity,
        budget_allocation::Column::BudgetedAmount,
    ))
    .sum()
}

/// 纯读聚合查询；空分组直接不出现在结果里，补零交给报表层
pub struct ReportRepository;

impl ReportRepository {
    pub async fn spend_by_category(
        db: &DatabaseConnection,
        project_id: Option<i32>,
    ) -> Result<Vec<CategorySpend>, sea_orm::DbErr> {
        let mut query = LineItem::find()
            .select_only()
            .column_as(line_item::Column::Category, "category")
            .column_as(spent_sum(), "total_spent");
        if let Some(pid) = project_id {
            query = query.filter(line_item::Column::ProjectId.eq(pid));
        }
        query
            .group_by(line_item::Column::Category)
            .order_by_desc(Expr::cust("total_spent"))
            .order_by_asc(line_item::Column::Category)
            .into_model::<CategorySpend>()
            .all(db)
            .await
    }

    /// 没有供应商的明细不计入
    pub async fn spend_by_supplier(
        db: &DatabaseConnection,
    ) -> Result<Vec<SupplierSpend>, sea_orm::DbErr> {
        LineItem::find()
            .select_only()
            .column_as(supplier::Column::Name, "supplier")
            .column_as(spent_sum(), "total_spent")
            .join(JoinType::InnerJoin, line_item::Relation::Supplier.def())
            .group_by(supplier::Column::Id)
            .group_by(supplier::Column::Name)
            .order_by_desc(Expr::cust("total_spent"))
            .order_by_asc(supplier::Column::Name)
            .into_model::<SupplierSpend>()
            .all(db)
            .await
    }

    pub async fn monthly_spend(
        db: &DatabaseConnection,
        project_id: Option<i32>,
        category: Option<&str>,
    ) -> Result<Vec<MonthlySpend>, sea_orm::DbErr> {
        let mut query = LineItem::find()
            .select_only()
            .column_as(
                Expr::cust("strftime('%Y-%m', \"line_items\".\"entry_date\")"),
                "month",
            )
            .column_as(spent_sum(), "total_spent");
        if let Some(pid) = project_id {
            query = query.filter(line_item::Column::ProjectId.eq(pid));
        }
        if let Some(cat) = category {
            query = query.filter(line_item::Column::Category.eq(cat));
        }
        query
            .group_by(Expr::cust("month"))
            .order_by_asc(Expr::cust("month"))
            .into_model::<MonthlySpend>()
            .all(db)
            .await
    }

    pub async fn budget_totals_by_project(
        db: &DatabaseConnection,
    ) -> Result<Vec<ProjectTotal>, sea_orm::DbErr> {
        BudgetAllocation::find()
            .select_only()
            .column_as(budget_allocation::Column::ProjectId, "project_id")
            .column_as(budget_sum(), "total")
            .group_by(budget_allocation::Column::ProjectId)
            .into_model::<ProjectTotal>()
            .all(db)
            .await
    }

    pub async fn spend_totals_by_project(
        db: &DatabaseConnection,
    ) -> Result<Vec<ProjectTotal>, sea_orm::DbErr> {
        LineItem::find()
            .select_only()
            .column_as(line_item::Column::ProjectId, "project_id")
            .column_as(spent_sum(), "total")
            .group_by(line_item::Column::ProjectId)
            .into_model::<ProjectTotal>()
            .all(db)
            .await
    }

    pub async fn total_budget(
        db: &DatabaseConnection,
        project_id: i32,
    ) -> Result<f64, sea_orm::DbErr> {
        let total = BudgetAllocation::find()
            .select_only()
            .column_as(budget_sum(), "total")
            .filter(budget_allocation::Column::ProjectId.eq(project_id))
            .into_tuple::<Option<f64>>()
            .one(db)
            .await?;
        Ok(total.flatten().unwrap_or(0.0))
    }

    pub async fn total_spent(
        db: &DatabaseConnection,
        project_id: i32,
    ) -> Result<f64, sea_orm::DbErr> {
        let total = LineItem::find()
            .select_only()
            .column_as(spent_sum(), "total")
            .filter(line_item::Column::ProjectId.eq(project_id))
            .into_tuple::<Option<f64>>()
            .one(db)
            .await?;
        Ok(total.flatten().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::memory_db;
    use crate::storage::repository::{
        BudgetRepository, LineItemRepository, NewLineItem, NewProject, NewSupplier,
        ProjectRepository, SupplierRepository,
    };
    use chrono::NaiveDate;

    struct Fixture {
        db: DatabaseConnection,
        tower: i32,
        annex: i32,
    }

    async fn add_entry(
        db: &DatabaseConnection,
        project_id: i32,
        date: (i32, u32, u32),
        category: &str,
        supplier_id: Option<i32>,
        amount: f64,
    ) {
        LineItemRepository::insert(
            db,
            NewLineItem {
                project_id,
                entry_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                category: category.into(),
                issue_date: None,
                document: None,
                supplier_id,
                description: None,
                invoiced_amount: amount,
            },
        )
        .await
        .unwrap();
    }

    async fn fixture() -> Fixture {
        let db = memory_db().await;
        let tower = ProjectRepository::insert(
            &db,
            NewProject {
                name: "Tower".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let annex = ProjectRepository::insert(
            &db,
            NewProject {
                name: "Annex".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let glass = SupplierRepository::insert(
            &db,
            NewSupplier {
                name: "Glassworks".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let paint = SupplierRepository::insert(
            &db,
            NewSupplier {
                name: "Paint Co".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        add_entry(&db, tower, (2025, 1, 5), "Glass", Some(glass), 100.0).await;
        add_entry(&db, tower, (2025, 1, 20), "Paint", Some(paint), 40.0).await;
        add_entry(&db, tower, (2025, 2, 3), "Glass", Some(glass), 60.0).await;
        add_entry(&db, tower, (2025, 3, 9), "Design", None, 25.0).await;
        add_entry(&db, annex, (2025, 2, 14), "Paint", Some(paint), 500.0).await;

        BudgetRepository::upsert(&db, tower, "Glass", 300.0).await.unwrap();
        BudgetRepository::upsert(&db, tower, "Paint", 50.0).await.unwrap();

        Fixture { db, tower, annex }
    }

    #[tokio::test]
    async fn category_totals_sum_to_project_total() {
        let f = fixture().await;
        let by_category = ReportRepository::spend_by_category(&f.db, Some(f.tower))
            .await
            .unwrap();
        let sum: f64 = by_category.iter().map(|r| r.total_spent).sum();

        assert_eq!(sum, ReportRepository::total_spent(&f.db, f.tower).await.unwrap());
        assert_eq!(by_category[0].category, "Glass");
        assert_eq!(by_category[0].total_spent, 160.0);
    }

    #[tokio::test]
    async fn global_category_totals_are_sorted_descending() {
        let f = fixture().await;
        let rows = ReportRepository::spend_by_category(&f.db, None).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Paint", "Glass", "Design"]);
        assert_eq!(rows[0].total_spent, 540.0);
    }

    #[tokio::test]
    async fn supplier_totals_skip_entries_without_supplier() {
        let f = fixture().await;
        let rows = ReportRepository::spend_by_supplier(&f.db).await.unwrap();
        assert_eq!(
            rows,
            vec![
                SupplierSpend {
                    supplier: "Paint Co".into(),
                    total_spent: 540.0
                },
                SupplierSpend {
                    supplier: "Glassworks".into(),
                    total_spent: 160.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn monthly_series_honours_filters() {
        let f = fixture().await;

        let all = ReportRepository::monthly_spend(&f.db, None, None).await.unwrap();
        let months: Vec<&str> = all.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
        assert_eq!(all[1].total_spent, 560.0);

        let tower_glass = ReportRepository::monthly_spend(&f.db, Some(f.tower), Some("Glass"))
            .await
            .unwrap();
        assert_eq!(
            tower_glass,
            vec![
                MonthlySpend {
                    month: "2025-01".into(),
                    total_spent: 100.0
                },
                MonthlySpend {
                    month: "2025-02".into(),
                    total_spent: 60.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn totals_default_to_zero() {
        let f = fixture().await;
        assert_eq!(ReportRepository::total_budget(&f.db, f.tower).await.unwrap(), 350.0);
        assert_eq!(ReportRepository::total_budget(&f.db, f.annex).await.unwrap(), 0.0);
        assert_eq!(ReportRepository::total_spent(&f.db, 999).await.unwrap(), 0.0);

        let budgets = ReportRepository::budget_totals_by_project(&f.db).await.unwrap();
        assert_eq!(budgets.len(), 1);
        let spend = ReportRepository::spend_totals_by_project(&f.db).await.unwrap();
        assert_eq!(spend.len(), 2);
    }
}
