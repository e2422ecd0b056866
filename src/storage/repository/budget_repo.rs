use crate::storage::entity::budget_allocation::{
    self, ActiveModel as BudgetAllocationActiveModel, Entity as BudgetAllocation,
};
use crate::storage::entity::project;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub budgeted_amount: f64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ProjectBudgetRow {
    pub project_name: String,
    pub category: String,
    pub budgeted_amount: f64,
}

pub struct BudgetRepository;

impl BudgetRepository {
    /// 按 (project_id, category) 插入或更新预算金额
    pub async fn upsert(
        db: &DatabaseConnection,
        project_id: i32,
        category: &str,
        amount: f64,
    ) -> Result<u64, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = BudgetAllocationActiveModel {
            project_id: Set(project_id),
            category: Set(category.to_string()),
            budgeted_amount: Set(amount),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        BudgetAllocation::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    budget_allocation::Column::ProjectId,
                    budget_allocation::Column::Category,
                ])
                .update_columns([
                    budget_allocation::Column::BudgetedAmount,
                    budget_allocation::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
    }

    pub async fn by_project(
        db: &DatabaseConnection,
        project_id: i32,
    ) -> Result<Vec<BudgetRow>, sea_orm::DbErr> {
        BudgetAllocation::find()
            .select_only()
            .column(budget_allocation::Column::Category)
            .column(budget_allocation::Column::BudgetedAmount)
            .filter(budget_allocation::Column::ProjectId.eq(project_id))
            .order_by_asc(budget_allocation::Column::Id)
            .into_model::<BudgetRow>()
            .all(db)
            .await
    }

    pub async fn all_with_project(
        db: &DatabaseConnection,
    ) -> Result<Vec<ProjectBudgetRow>, sea_orm::DbErr> {
        BudgetAllocation::find()
            .select_only()
            .column_as(project::Column::Name, "project_name")
            .column_as(budget_allocation::Column::Category, "category")
            .column_as(budget_allocation::Column::BudgetedAmount, "budgeted_amount")
            .join(JoinType::InnerJoin, budget_allocation::Relation::Project.def())
            .order_by_asc(budget_allocation::Column::ProjectId)
            .order_by_asc(budget_allocation::Column::Id)
            .into_model::<ProjectBudgetRow>()
            .all(db)
            .await
    }

    pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let res = BudgetAllocation::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }
}
