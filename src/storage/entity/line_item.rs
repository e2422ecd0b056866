use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 一条费用记录（发票/支出），必须挂在某个项目下
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub entry_date: Date,
    pub category: String, // 自由文本，界面上约定为 8 个固定分类
    #[sea_orm(nullable)]
    pub issue_date: Option<Date>,
    #[sea_orm(nullable)]
    pub document: Option<String>,
    #[sea_orm(nullable)]
    pub supplier_id: Option<i32>,
    #[sea_orm(nullable)]
    pub description: Option<String>,
    pub invoiced_amount: f64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
