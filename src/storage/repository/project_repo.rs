use crate::storage::entity::project::{self, ActiveModel as ProjectActiveModel, Entity as Project};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryOrder, QuerySelect,
    Set,
};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ProjectRow {
    pub id: i32,
    pub name: String,
}

/// 总览页使用的项目摘要
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ProjectSummary {
    pub id: i32,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
}

pub struct ProjectRepository;

impl ProjectRepository {
    pub async fn insert(db: &DatabaseConnection, new: NewProject) -> Result<i32, sea_orm::DbErr> {
        let active_model = ProjectActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            start_date: Set(new.start_date),
            expected_end_date: Set(new.expected_end_date),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.id)
    }

    pub async fn list(db: &DatabaseConnection) -> Result<Vec<ProjectRow>, sea_orm::DbErr> {
        Project::find()
            .select_only()
            .column(project::Column::Id)
            .column(project::Column::Name)
            .order_by_asc(project::Column::Id)
            .into_model::<ProjectRow>()
            .all(db)
            .await
    }

    pub async fn summaries(
        db: &DatabaseConnection,
    ) -> Result<Vec<ProjectSummary>, sea_orm::DbErr> {
        Project::find()
            .select_only()
            .column(project::Column::Id)
            .column(project::Column::Name)
            .column(project::Column::StartDate)
            .column(project::Column::ExpectedEndDate)
            .order_by_asc(project::Column::Id)
            .into_model::<ProjectSummary>()
            .all(db)
            .await
    }

    pub async fn find(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<project::Model>, sea_orm::DbErr> {
        Project::find_by_id(id).one(db).await
    }

    /// 删除项目，明细与预算随外键级联删除
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let res = Project::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let res = Project::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::memory_db;

    #[tokio::test]
    async fn summary_keeps_dates() {
        let db = memory_db().await;
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        ProjectRepository::insert(
            &db,
            NewProject {
                name: "Tower A".into(),
                description: Some("facade".into()),
                start_date: Some(start),
                expected_end_date: Some(end),
            },
        )
        .await
        .unwrap();
        ProjectRepository::insert(
            &db,
            NewProject {
                name: "Annex".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let summaries = ProjectRepository::summaries(&db).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].start_date, Some(start));
        assert_eq!(summaries[0].expected_end_date, Some(end));
        assert_eq!(summaries[1].start_date, None);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = memory_db().await;
        let id = ProjectRepository::insert(
            &db,
            NewProject {
                name: "Short lived".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ProjectRepository::delete(&db, id).await.unwrap(), 1);
        assert_eq!(ProjectRepository::delete(&db, id).await.unwrap(), 0);
        assert!(ProjectRepository::find(&db, id).await.unwrap().is_none());
    }
}
