use crate::storage::entity::supplier::{
    self, ActiveModel as SupplierActiveModel, Entity as Supplier,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryOrder, QuerySelect,
    Set,
};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct SupplierRow {
    pub id: i32,
    pub name: String,
}

pub struct SupplierRepository;

impl SupplierRepository {
    pub async fn insert(
        db: &DatabaseConnection,
        new: NewSupplier,
    ) -> Result<i32, sea_orm::DbErr> {
        let active_model = SupplierActiveModel {
            name: Set(new.name),
            tax_id: Set(new.tax_id),
            phone: Set(new.phone),
            email: Set(new.email),
            address: Set(new.address),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.id)
    }

    pub async fn list(db: &DatabaseConnection) -> Result<Vec<SupplierRow>, sea_orm::DbErr> {
        Supplier::find()
            .select_only()
            .column(supplier::Column::Id)
            .column(supplier::Column::Name)
            .order_by_asc(supplier::Column::Id)
            .into_model::<SupplierRow>()
            .all(db)
            .await
    }

    pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        let res = Supplier::delete_many().exec(db).await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::memory_db;

    fn named(name: &str, tax_id: Option<&str>) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            tax_id: tax_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lists_inserted_suppliers_in_id_order() {
        let db = memory_db().await;
        let a = SupplierRepository::insert(&db, named("Glassworks", Some("11")))
            .await
            .unwrap();
        let b = SupplierRepository::insert(&db, named("Alu Profiles", None))
            .await
            .unwrap();

        let rows = SupplierRepository::list(&db).await.unwrap();
        assert_eq!(
            rows,
            vec![
                SupplierRow { id: a, name: "Glassworks".into() },
                SupplierRow { id: b, name: "Alu Profiles".into() },
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_tax_id_is_rejected_but_missing_ones_are_not() {
        let db = memory_db().await;
        SupplierRepository::insert(&db, named("A", Some("99"))).await.unwrap();
        assert!(SupplierRepository::insert(&db, named("B", Some("99")))
            .await
            .is_err());

        SupplierRepository::insert(&db, named("C", None)).await.unwrap();
        SupplierRepository::insert(&db, named("D", None)).await.unwrap();
        assert_eq!(SupplierRepository::list(&db).await.unwrap().len(), 3);
    }
}
