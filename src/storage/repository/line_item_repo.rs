use crate::storage::entity::line_item::{
    self, ActiveModel as LineItemActiveModel, Entity as LineItem,
};
use crate::storage::entity::{project, supplier};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub project_id: i32,
    pub entry_date: NaiveDate,
    pub category: String,
    pub issue_date: Option<NaiveDate>,
    pub document: Option<String>,
    pub supplier_id: Option<i32>,
    pub description: Option<String>,
    pub invoiced_amount: f64,
}

/// 明细列表行：带项目名与供应商名（供应商可为空）
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct LineItemRow {
    pub id: i32,
    pub project_name: String,
    pub supplier_name: Option<String>,
    pub entry_date: NaiveDate,
    pub category: String,
    pub invoiced_amount: f64,
}

pub struct LineItemRepository;

impl LineItemRepository {
    pub async fn insert(db: &DatabaseConnection, new: NewLineItem) -> Result<i32, sea_orm::DbErr> {
        let active_model = LineItemActiveModel {
            project_id: Set(new.project_id),
            entry_date: Set(new.entry_date),
            category: Set(new.category),
            issue_date: Set(new.issue_date),
            document: Set(new.document),
            supplier_id: Set(new.supplier_id),
            description: Set(new.description),
            invoiced_amount: Set(new.invoiced_amount),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.id)
    }

    pub async fn list_by_project(
        db: &DatabaseConnection,
        project_id: i32,
    ) -> Result<Vec<LineItemRow>, sea_orm::DbErr> {
        LineItem::find()
            .select_only()
            .column_as(line_item::Column::Id, "id")
            .column_as(project::Column::Name, "project_name")
            .column_as(supplier::Column::Name, "supplier_name")
            .column_as(line_item::Column::EntryDate, "entry_date")
            .column_as(line_item::Column::Category, "category")
            .column_as(line_item::Column::InvoicedAmount, "invoiced_amount")
            .join(JoinType::InnerJoin, line_item::Relation::Project.def())
            .join(JoinType::LeftJoin, line_item::Relation::Supplier.def())
            .filter(line_item::Column::ProjectId.eq(project_id))
            .order_by_asc(line_item::Column::EntryDate)
            .order_by_asc(line_item::Column::Id)
            .into_model::<LineItemRow>()
            .all(db)
            .await
    }

    /// 已出现过的分类（用于看板的分类筛选）
    pub async fn distinct_categories(
        db: &DatabaseConnection,
    ) -> Result<Vec<String>, sea_orm::DbErr> {
        LineItem::find()
            .select_only()
            .column(line_item::Column::Category)
            .distinct()
            .order_by_asc(line_item::Column::Category)
            .into_tuple::<String>()
            .all(db)
            .await
    }

    pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let res = LineItem::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::memory_db;
    use crate::storage::repository::{
        NewProject, NewSupplier, ProjectRepository, SupplierRepository,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn entry(project_id: i32, supplier_id: Option<i32>, d: u32, amount: f64) -> NewLineItem {
        NewLineItem {
            project_id,
            entry_date: day(d),
            category: "Glass".into(),
            issue_date: None,
            document: Some("NF-1".into()),
            supplier_id,
            description: None,
            invoiced_amount: amount,
        }
    }

    #[tokio::test]
    async fn rows_join_project_and_optional_supplier() {
        let db = memory_db().await;
        let project_id = ProjectRepository::insert(
            &db,
            NewProject {
                name: "Tower A".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let supplier_id = SupplierRepository::insert(
            &db,
            NewSupplier {
                name: "Glassworks".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        LineItemRepository::insert(&db, entry(project_id, None, 20, 50.0))
            .await
            .unwrap();
        LineItemRepository::insert(&db, entry(project_id, Some(supplier_id), 2, 120.5))
            .await
            .unwrap();

        let rows = LineItemRepository::list_by_project(&db, project_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry_date, day(2));
        assert_eq!(rows[0].project_name, "Tower A");
        assert_eq!(rows[0].supplier_name.as_deref(), Some("Glassworks"));
        assert_eq!(rows[0].invoiced_amount, 120.5);
        assert_eq!(rows[1].supplier_name, None);
    }

    #[tokio::test]
    async fn entry_for_missing_project_fails() {
        let db = memory_db().await;
        assert!(LineItemRepository::insert(&db, entry(404, None, 1, 10.0))
            .await
            .is_err());
    }
}
